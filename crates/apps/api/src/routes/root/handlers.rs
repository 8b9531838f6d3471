use axum::extract::State;
use axum::http::StatusCode;
use common_services::database::DetectionStore;
use std::sync::Arc;
use tracing::error;

#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    responses(
        (status = 200, description = "Root message")
    )
)]
pub async fn root() -> &'static str {
    "FormCraft form detection API"
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    responses(
        (status = 200, description = "API is healthy and ready to accept traffic", body = String),
        (status = 503, description = "API is not healthy, likely due to a database issue.")
    )
)]
pub async fn health_check(
    State(store): State<Arc<dyn DetectionStore>>,
) -> Result<&'static str, StatusCode> {
    match store.health_check().await {
        Ok(()) => Ok("OK"),
        Err(e) => {
            error!("Health check failed: database connection error: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
