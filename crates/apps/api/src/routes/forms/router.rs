use crate::api_state::ApiContext;
use crate::routes::forms::handlers::{
    accept_detections_handler, delete_detection_handler, get_detection_handler,
    import_form_handler, list_detections_handler, reject_detections_handler,
};
use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn forms_router(max_upload_bytes: usize) -> Router<ApiContext> {
    Router::new()
        .route(
            "/forms/import/{template_id}",
            post(import_form_handler).layer(DefaultBodyLimit::max(
                max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route(
            "/forms/{template_id}/detections",
            get(list_detections_handler),
        )
        .route(
            "/forms/{template_id}/detections/{detection_id}",
            get(get_detection_handler),
        )
        .route(
            "/forms/{template_id}/detections/{detection_id}/accept",
            post(accept_detections_handler),
        )
        .route(
            "/forms/{template_id}/detections/{detection_id}/reject",
            post(reject_detections_handler),
        )
        .route(
            "/forms/detections/{detection_id}",
            delete(delete_detection_handler),
        )
}
