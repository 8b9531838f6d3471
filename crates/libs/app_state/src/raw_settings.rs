use crate::ClassifierTables;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub secrets: RawSecretSettings,
    pub ocr: OcrSettings,
    pub detection: DetectionSettings,
    pub constants: RawConstants,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

/// Configuration for the API server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u32,
    pub allowed_origins: Vec<String>,
    pub public_url: String,
}

/// Secrets as read from file/env. Blank values mean "not configured".
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawSecretSettings {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub ocr_endpoint: Option<String>,
    #[serde(default)]
    pub ocr_key: Option<String>,
}

/// Layout analysis (OCR) service options.
#[derive(Debug, Deserialize, Clone)]
pub struct OcrSettings {
    /// Document Intelligence model, e.g. `prebuilt-layout`.
    pub model_id: String,
    pub api_version: String,
    /// Delay between polls of the long-running analyze operation.
    pub poll_interval_ms: u64,
    /// Give up on an analyze operation after this many seconds.
    pub timeout_secs: u64,
}

/// Knobs for turning OCR output into field candidates.
#[derive(Debug, Deserialize, Clone)]
pub struct DetectionSettings {
    /// Resolution assumed when the image carries no usable resolution metadata.
    pub default_dpi: u32,
    /// Manhattan distance in pixels within which other words count as context.
    pub proximity_px: f64,
    /// Upload ceiling in bytes.
    pub max_upload_bytes: usize,
    pub allowed_media_types: Vec<String>,
    #[serde(default)]
    pub classifier: ClassifierTables,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawConstants {
    pub database: DatabaseConstants,
}

/// Database connection and related configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConstants {
    pub max_connections: u32,
    pub min_connection: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
    pub acquire_timeout: u64,
}
