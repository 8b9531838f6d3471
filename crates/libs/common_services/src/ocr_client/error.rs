use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrClientError {
    #[error("OCR service is not configured: missing {0}")]
    NotConfigured(&'static str),

    #[error("Invalid OCR endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Analyze response did not include an Operation-Location header")]
    MissingOperationLocation,

    #[error("Layout analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Layout analysis did not finish within {0:?}")]
    Timeout(Duration),
}
