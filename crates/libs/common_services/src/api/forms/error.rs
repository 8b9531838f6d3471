use crate::database::DbError;
use crate::ocr_client::OcrClientError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use common_types::form_detection::FieldStatus;
use form_detection::DetectionError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum FormsError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("internal error")]
    Internal(#[from] eyre::Report),

    #[error("OCR service configuration error: {0}")]
    OcrNotConfigured(String),

    #[error("OCR service error: {0}")]
    Ocr(OcrClientError),

    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),

    #[error("Image file too large. Maximum {limit} bytes.")]
    PayloadTooLarge { limit: usize },

    #[error("Could not detect page dimensions from image")]
    MissingPageDimensions,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid detection index: {0}")]
    InvalidFieldIndex(i64),

    #[error("Detection {index} was already {status}")]
    AlreadyReviewed { index: usize, status: FieldStatus },

    #[error("Bad Request: {0}")]
    BadRequest(String),
}

fn log_error(error: &FormsError) {
    match error {
        FormsError::Database(e) => error!("Database query failed: {}", e),
        FormsError::Internal(e) => error!("Internal error: {:?}", e),
        FormsError::OcrNotConfigured(message) => error!("OCR configuration error: {}", message),
        FormsError::Ocr(e) => error!("OCR processing error: {}", e),
        FormsError::UnsupportedMediaType(media_type) => {
            warn!("Forms -> Unsupported media type: {}", media_type);
        }
        FormsError::PayloadTooLarge { limit } => {
            warn!("Forms -> Upload exceeds {} bytes", limit);
        }
        FormsError::MissingPageDimensions => warn!("Forms -> No page dimensions detected"),
        FormsError::NotFound(id) => warn!("Forms -> Detection not found: {}", id),
        FormsError::InvalidFieldIndex(index) => {
            warn!("Forms -> Invalid detection index: {}", index);
        }
        FormsError::AlreadyReviewed { index, status } => {
            warn!("Forms -> Detection {} already {}", index, status);
        }
        FormsError::BadRequest(message) => warn!("Forms -> Bad Request: {}", message),
    }
}

impl IntoResponse for FormsError {
    fn into_response(self) -> Response {
        log_error(&self);

        let (status, error_message) = match self {
            Self::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "A database error occurred.".to_string(),
            ),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred.".to_string(),
            ),
            Self::OcrNotConfigured(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "OCR service configuration error".to_string(),
            ),
            Self::Ocr(_) => (
                StatusCode::BAD_GATEWAY,
                "Failed to process form image.".to_string(),
            ),
            e @ Self::UnsupportedMediaType(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("{e}. Only JPEG and PNG are supported."),
            ),
            e @ Self::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()),
            e @ Self::MissingPageDimensions => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                format!("Detection not found: {message}"),
            ),
            e @ Self::InvalidFieldIndex(_) => (StatusCode::BAD_REQUEST, e.to_string()),
            e @ Self::AlreadyReviewed { .. } => (StatusCode::CONFLICT, e.to_string()),
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, format!("Bad request: {message}"))
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl From<OcrClientError> for FormsError {
    fn from(err: OcrClientError) -> Self {
        match err {
            OcrClientError::NotConfigured(_) => Self::OcrNotConfigured(err.to_string()),
            other => Self::Ocr(other),
        }
    }
}

impl From<DetectionError> for FormsError {
    fn from(err: DetectionError) -> Self {
        match err {
            DetectionError::MissingPageDimensions => Self::MissingPageDimensions,
            DetectionError::Units(e) => Self::Internal(eyre::Report::new(e)),
        }
    }
}

impl From<tokio::task::JoinError> for FormsError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(eyre::Report::new(err))
    }
}
