use crate::routes::{forms, root};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::root,
        root::handlers::health_check,
        // Forms handlers
        forms::handlers::import_form_handler,
        forms::handlers::list_detections_handler,
        forms::handlers::get_detection_handler,
        forms::handlers::accept_detections_handler,
        forms::handlers::reject_detections_handler,
        forms::handlers::delete_detection_handler,
    ),
    tags(
        (name = "Forms", description = "Form import, OCR field detection and review"),
        (name = "System", description = "Health check"),
    )
)]
pub struct ApiDoc;
