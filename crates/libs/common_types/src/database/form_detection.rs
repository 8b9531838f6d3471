use crate::{PageDimensions, PhysicalBBox};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use utoipa::ToSchema;
use uuid::Uuid;

/// Suggested element type for a detected field.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Date,
    Currency,
    Text,
    Number,
    Signature,
    Checkbox,
    /// Never produced by the classifier. Kept so stored records using it still deserialize.
    Unknown,
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Date => "date",
            Self::Currency => "currency",
            Self::Text => "text",
            Self::Number => "number",
            Self::Signature => "signature",
            Self::Checkbox => "checkbox",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Review state of a detected field.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// What a reviewer decided about a set of pending fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Accept,
    Reject,
}

impl ReviewDecision {
    /// Status a pending field moves to under this decision.
    #[must_use]
    pub const fn status(self) -> FieldStatus {
        match self {
            Self::Accept => FieldStatus::Accepted,
            Self::Reject => FieldStatus::Rejected,
        }
    }
}

/// A classified, unit-converted OCR word awaiting review.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectedField {
    pub text: String,
    /// Bounding box in millimeters.
    pub bbox: PhysicalBBox,
    pub confidence: f64,
    pub suggested_type: FieldType,
    #[serde(default)]
    pub status: FieldStatus,
}

/// Data needed to persist a new detection. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDetection {
    pub template_id: Uuid,
    pub page_index: i32,
    pub detected_fields: Vec<DetectedField>,
    pub page_dimensions: PageDimensions,
}

/// Per-page aggregate of detected fields, the unit of review.
///
/// The position of a field in `detected_fields` is the handle used to accept or reject it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRecord {
    pub id: Uuid,
    pub template_id: Uuid,
    pub page_index: i32,
    pub detected_fields: Vec<DetectedField>,
    /// Page size in millimeters.
    pub page_dimensions: PageDimensions,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_serializes_with_lowercase_labels() -> serde_json::Result<()> {
        let field = DetectedField {
            text: "15/03/2024".to_string(),
            bbox: PhysicalBBox {
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
            },
            confidence: 0.98,
            suggested_type: FieldType::Date,
            status: FieldStatus::Pending,
        };
        let value = serde_json::to_value(&field)?;
        assert_eq!(value["suggestedType"], "date");
        assert_eq!(value["status"], "pending");
        Ok(())
    }

    #[test]
    fn decisions_never_map_back_to_pending() {
        assert_eq!(ReviewDecision::Accept.status(), FieldStatus::Accepted);
        assert_eq!(ReviewDecision::Reject.status(), FieldStatus::Rejected);
    }

    #[test]
    fn missing_status_defaults_to_pending() -> serde_json::Result<()> {
        let field: DetectedField = serde_json::from_str(
            r#"{"text":"","bbox":{"x":0,"y":0,"width":5,"height":5},"confidence":0.5,"suggestedType":"unknown"}"#,
        )?;
        assert_eq!(field.status, FieldStatus::Pending);
        assert_eq!(field.suggested_type, FieldType::Unknown);
        Ok(())
    }
}
