mod api_doc;
pub mod forms;
pub mod root;

use crate::api_state::ApiContext;
use crate::forms::router::forms_router;
use crate::root::router::root_public_router;
use crate::routes::api_doc::ApiDoc;
use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// --- Router Construction ---
pub fn create_router(api_state: ApiContext) -> Router {
    let max_upload_bytes = api_state.settings.detection.max_upload_bytes;
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .merge(root_public_router())
        .merge(forms_router(max_upload_bytes))
        .with_state(api_state)
}
