use crate::{PagePixels, PixelBBox};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single word as detected by the layout analysis service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct OcrWord {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bbox: PixelBBox,
    #[serde(default)]
    pub confidence: f64,
}

/// A line of words. Reported by the layout service but not used for classification.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct OcrLine {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bbox: PixelBBox,
}

/// Result of analyzing the first page of a document image.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayoutAnalysis {
    pub words: Vec<OcrWord>,
    pub lines: Vec<OcrLine>,
    /// `None` when the service found no page in the document.
    pub page_dimensions: Option<PagePixels>,
}
