use common_types::{LayoutAnalysis, OcrLine, OcrWord, PagePixels, PixelBBox};
use serde::Deserialize;

/// Status document returned by the `Operation-Location` poll endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOperation {
    pub status: OperationStatus,
    #[serde(default)]
    pub analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Default)]
pub struct AnalyzeResult {
    #[serde(default)]
    pub pages: Vec<AnalyzedPage>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzedPage {
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(default)]
    pub words: Vec<AnalyzedWord>,
    #[serde(default)]
    pub lines: Vec<AnalyzedLine>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzedWord {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub polygon: Vec<f64>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzedLine {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub polygon: Vec<f64>,
}

impl From<AnalyzeResult> for LayoutAnalysis {
    /// Keeps the first page only. Words and lines without a usable polygon are dropped.
    fn from(result: AnalyzeResult) -> Self {
        let Some(page) = result.pages.into_iter().next() else {
            return Self::default();
        };

        let words = page
            .words
            .into_iter()
            .filter_map(|word| {
                Some(OcrWord {
                    bbox: PixelBBox::from_polygon(&word.polygon)?,
                    text: word.content,
                    confidence: word.confidence.unwrap_or(0.0).clamp(0.0, 1.0),
                })
            })
            .collect();
        let lines = page
            .lines
            .into_iter()
            .filter_map(|line| {
                Some(OcrLine {
                    bbox: PixelBBox::from_polygon(&line.polygon)?,
                    text: line.content,
                })
            })
            .collect();
        let page_dimensions = page
            .width
            .zip(page.height)
            .map(|(width, height)| PagePixels { width, height });

        Self {
            words,
            lines,
            page_dimensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;

    #[test]
    fn converts_first_page_words_and_lines() -> Result<()> {
        let operation: AnalyzeOperation = serde_json::from_str(
            r#"{
                "status": "succeeded",
                "analyzeResult": {
                    "pages": [
                        {
                            "pageNumber": 1,
                            "width": 2480,
                            "height": 3508,
                            "unit": "pixel",
                            "words": [
                                {"content": "Amount", "polygon": [10, 20, 110, 20, 110, 60, 10, 60], "confidence": 0.993},
                                {"content": "short", "polygon": [1, 2, 3, 4]},
                                {"content": "1,250.00", "polygon": [130, 18, 260, 22, 258, 64, 128, 60], "confidence": 1.7},
                                {"content": "sig", "polygon": [300, 300, 340, 300, 340, 320, 300, 320]}
                            ],
                            "lines": [
                                {"content": "Amount 1,250.00", "polygon": [10, 18, 260, 18, 260, 64, 10, 64]}
                            ]
                        },
                        {"width": 10, "height": 10, "words": [{"content": "page two", "polygon": [0, 0, 1, 0, 1, 1, 0, 1]}]}
                    ]
                }
            }"#,
        )?;
        assert_eq!(operation.status, OperationStatus::Succeeded);
        let analysis: LayoutAnalysis = operation.analyze_result.unwrap_or_default().into();

        let texts: Vec<&str> = analysis.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["Amount", "1,250.00", "sig"]);
        assert_eq!(
            analysis.words[1].bbox,
            PixelBBox {
                x: 128.0,
                y: 18.0,
                width: 132.0,
                height: 46.0,
            }
        );
        assert!((analysis.words[0].confidence - 0.993).abs() < f64::EPSILON);
        assert!((analysis.words[1].confidence - 1.0).abs() < f64::EPSILON);
        assert!(analysis.words[2].confidence.abs() < f64::EPSILON);
        assert_eq!(analysis.lines.len(), 1);
        assert_eq!(
            analysis.page_dimensions,
            Some(PagePixels {
                width: 2480.0,
                height: 3508.0,
            })
        );
        Ok(())
    }

    #[test]
    fn no_pages_means_no_dimensions() -> Result<()> {
        let operation: AnalyzeOperation =
            serde_json::from_str(r#"{"status": "succeeded", "analyzeResult": {"pages": []}}"#)?;
        let analysis: LayoutAnalysis = operation.analyze_result.unwrap_or_default().into();
        assert!(analysis.words.is_empty());
        assert!(analysis.lines.is_empty());
        assert_eq!(analysis.page_dimensions, None);
        Ok(())
    }

    #[test]
    fn unexpected_status_is_tolerated() -> Result<()> {
        let operation: AnalyzeOperation = serde_json::from_str(r#"{"status": "paused"}"#)?;
        assert_eq!(operation.status, OperationStatus::Unknown);
        Ok(())
    }
}
