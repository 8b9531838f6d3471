use crate::{FieldClassifier, UnitConverter, UnitError};
use common_types::{DetectedField, FieldStatus, OcrWord, PageDimensions, PagePixels};
use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
pub enum DetectionError {
    #[error("Layout analysis reported no page dimensions")]
    MissingPageDimensions,

    #[error(transparent)]
    Units(#[from] UnitError),
}

/// Field candidates for one page, in the order the words were reported.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDetection {
    pub fields: Vec<DetectedField>,
    /// Page size in millimeters.
    pub page_dimensions: PageDimensions,
}

/// Turns the words of one analyzed page into pending, classified fields with millimeter boxes.
///
/// Context for each word is every other word whose origin lies within `proximity_px`.
pub fn detect_fields(
    classifier: &FieldClassifier,
    words: &[OcrWord],
    page_pixels: Option<PagePixels>,
    dpi: u32,
    proximity_px: f64,
) -> Result<PageDetection, DetectionError> {
    let page = page_pixels.ok_or(DetectionError::MissingPageDimensions)?;
    let converter = UnitConverter::new(page.width, page.height, dpi)?;

    let fields: Vec<DetectedField> = words
        .par_iter()
        .map(|word| {
            let bbox = converter.convert_bbox(&word.bbox);
            let nearby = FieldClassifier::nearby_labels(&word.bbox, words, proximity_px);
            DetectedField {
                text: word.text.clone(),
                suggested_type: classifier.classify(&word.text, &bbox, &nearby),
                bbox,
                confidence: word.confidence,
                status: FieldStatus::Pending,
            }
        })
        .collect();

    info!("Detected {} fields at {} dpi", fields.len(), dpi);
    Ok(PageDetection {
        fields,
        page_dimensions: converter.page_dimensions_mm(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use app_state::ClassifierTables;
    use color_eyre::Result;
    use common_types::{FieldType, PixelBBox};

    fn word(text: &str, x: f64, y: f64, width: f64, height: f64) -> OcrWord {
        OcrWord {
            text: text.to_string(),
            bbox: PixelBBox {
                x,
                y,
                width,
                height,
            },
            confidence: 0.87,
        }
    }

    const PAGE: PagePixels = PagePixels {
        width: 2480.0,
        height: 3508.0,
    };

    #[test]
    fn fields_follow_word_order() -> Result<()> {
        let classifier = FieldClassifier::new(&ClassifierTables::default())?;
        let words = vec![
            word("Amount", 100.0, 100.0, 150.0, 40.0),
            word("1,250.00", 180.0, 110.0, 200.0, 40.0),
            word("15/03/2024", 1200.0, 100.0, 300.0, 40.0),
            word("X", 100.0, 2000.0, 100.0, 100.0),
            word("Signature", 1500.0, 3000.0, 300.0, 40.0),
            word("Ahmed", 2000.0, 1500.0, 200.0, 40.0),
        ];

        let detection = detect_fields(&classifier, &words, Some(PAGE), 300, 100.0)?;

        assert_eq!(detection.fields.len(), words.len());
        for (field, word) in detection.fields.iter().zip(&words) {
            assert_eq!(field.text, word.text);
            assert_eq!(field.status, FieldStatus::Pending);
            assert!((field.confidence - 0.87).abs() < f64::EPSILON);
        }
        let types: Vec<FieldType> = detection.fields.iter().map(|f| f.suggested_type).collect();
        assert_eq!(
            types,
            vec![
                FieldType::Currency,
                FieldType::Currency,
                FieldType::Date,
                FieldType::Checkbox,
                FieldType::Signature,
                FieldType::Text,
            ]
        );
        assert_eq!(
            detection.page_dimensions,
            PageDimensions {
                width: 209.97,
                height: 297.01,
            }
        );
        Ok(())
    }

    #[test]
    fn empty_page_yields_no_fields() -> Result<()> {
        let classifier = FieldClassifier::new(&ClassifierTables::default())?;
        let detection = detect_fields(&classifier, &[], Some(PAGE), 96, 100.0)?;
        assert!(detection.fields.is_empty());
        Ok(())
    }

    #[test]
    fn missing_page_dimensions_fail_fast() -> Result<()> {
        let classifier = FieldClassifier::new(&ClassifierTables::default())?;
        let words = vec![word("hello", 0.0, 0.0, 10.0, 10.0)];
        assert_eq!(
            detect_fields(&classifier, &words, None, 96, 100.0),
            Err(DetectionError::MissingPageDimensions)
        );
        Ok(())
    }

    #[test]
    fn zero_dpi_is_reported() -> Result<()> {
        let classifier = FieldClassifier::new(&ClassifierTables::default())?;
        assert_eq!(
            detect_fields(&classifier, &[], Some(PAGE), 0, 100.0),
            Err(DetectionError::Units(UnitError::InvalidResolution(0)))
        );
        Ok(())
    }
}
