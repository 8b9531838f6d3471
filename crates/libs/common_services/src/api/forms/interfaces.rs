use common_types::form_detection::DetectionRecord;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// --- Request Payloads ---

#[derive(Debug, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportFormParams {
    /// Zero-based page of the template the image belongs to.
    pub page_index: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetectionsRequest {
    /// Positions in the record's `detectedFields` array.
    pub detection_ids: Vec<i64>,
}

/// An uploaded form image as received from the multipart body.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// --- Response Payloads ---

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDetectionsResponse {
    pub message: String,
    pub updated_count: usize,
    pub detection: DetectionRecord,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDetectionResponse {
    pub message: String,
}
