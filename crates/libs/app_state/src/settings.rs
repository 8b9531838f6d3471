use crate::{
    non_empty, ApiSettings, AppConstants, DetectionSettings, LoggingSettings, OcrSettings,
    RawSettings,
};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub logging: LoggingSettings,
    pub api: ApiSettings,
    pub secrets: SecretSettings,
    pub ocr: OcrSettings,
    pub detection: DetectionSettings,
    pub constants: AppConstants,
}

/// Secrets with blank values normalized to `None`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SecretSettings {
    pub database_url: Option<String>,
    pub ocr_endpoint: Option<String>,
    pub ocr_key: Option<String>,
}

impl From<RawSettings> for AppSettings {
    fn from(raw: RawSettings) -> Self {
        let constants = AppConstants::from(&raw);
        let secrets = SecretSettings {
            database_url: non_empty(raw.secrets.database_url),
            ocr_endpoint: non_empty(raw.secrets.ocr_endpoint)
                .map(|e| e.trim_end_matches('/').to_string()),
            ocr_key: non_empty(raw.secrets.ocr_key),
        };

        Self {
            logging: raw.logging,
            api: raw.api,
            secrets,
            ocr: raw.ocr,
            detection: raw.detection,
            constants,
        }
    }
}

impl DetectionSettings {
    /// Whether an upload with this `Content-Type` may be analyzed.
    #[must_use]
    pub fn is_allowed_media_type(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        self.allowed_media_types.iter().any(|m| *m == essence)
    }
}
