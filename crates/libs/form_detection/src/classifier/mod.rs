mod rules;

use app_state::ClassifierTables;
use common_types::{FieldType, OcrWord, PhysicalBBox, PixelBBox};
use rules::{CompiledTables, FieldContext, RULES};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Invalid classifier pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Suggests a field type for an OCR word from its text, its size on paper and the words around it.
///
/// Built once from [`ClassifierTables`] and shared between requests.
#[derive(Debug, Clone)]
pub struct FieldClassifier {
    tables: CompiledTables,
}

impl FieldClassifier {
    pub fn new(tables: &ClassifierTables) -> Result<Self, ClassifierError> {
        Ok(Self {
            tables: CompiledTables::compile(tables)?,
        })
    }

    /// Texts of all words whose origin lies within `max_distance` (Manhattan, exclusive) of the
    /// target's origin, in input order. The target word itself is included when it is in `words`.
    #[must_use]
    pub fn nearby_labels(target: &PixelBBox, words: &[OcrWord], max_distance: f64) -> Vec<String> {
        words
            .iter()
            .filter(|word| {
                let distance = (word.bbox.x - target.x).abs() + (word.bbox.y - target.y).abs();
                distance < max_distance
            })
            .map(|word| word.text.clone())
            .collect()
    }

    #[must_use]
    pub fn classify(&self, text: &str, bbox: &PhysicalBBox, nearby_labels: &[String]) -> FieldType {
        let ctx = FieldContext::new(text, bbox, nearby_labels);
        let field_type = RULES
            .iter()
            .find(|rule| (rule.predicate)(&self.tables, &ctx))
            .map_or(FieldType::Text, |rule| rule.label);
        debug!(
            "Classified '{}' as {} (context: '{}')",
            ctx.text, field_type, ctx.nearby
        );
        field_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::Result;

    fn classifier() -> Result<FieldClassifier> {
        Ok(FieldClassifier::new(&ClassifierTables::default())?)
    }

    fn mm(width: f64, height: f64) -> PhysicalBBox {
        PhysicalBBox {
            x: 10.0,
            y: 10.0,
            width,
            height,
        }
    }

    fn word(text: &str, x: f64, y: f64) -> OcrWord {
        OcrWord {
            text: text.to_string(),
            bbox: PixelBBox {
                x,
                y,
                width: 20.0,
                height: 10.0,
            },
            confidence: 0.9,
        }
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn square_single_character_is_checkbox() -> Result<()> {
        let c = classifier()?;
        assert_eq!(c.classify("X", &mm(10.0, 11.0), &[]), FieldType::Checkbox);
        assert_eq!(c.classify("", &mm(5.0, 5.0), &[]), FieldType::Checkbox);
        Ok(())
    }

    #[test]
    fn tall_box_is_not_checkbox() -> Result<()> {
        let c = classifier()?;
        assert_eq!(c.classify("X", &mm(10.0, 20.0), &[]), FieldType::Text);
        assert_eq!(c.classify("X", &mm(15.0, 15.0), &[]), FieldType::Text);
        assert_eq!(c.classify("X", &mm(0.0, 0.0), &[]), FieldType::Text);
        assert_eq!(c.classify("ab", &mm(10.0, 10.0), &[]), FieldType::Text);
        Ok(())
    }

    #[test]
    fn date_from_pattern_or_keyword() -> Result<()> {
        let c = classifier()?;
        let wide = mm(40.0, 8.0);
        assert_eq!(c.classify("15/03/2024", &wide, &[]), FieldType::Date);
        assert_eq!(c.classify("2024-03-15", &wide, &[]), FieldType::Date);
        assert_eq!(c.classify("15 03 24", &wide, &[]), FieldType::Date);
        assert_eq!(
            c.classify("____", &wide, &labels(&["التاريخ:"])),
            FieldType::Date
        );
        assert_eq!(c.classify("____", &wide, &labels(&["DATE"])), FieldType::Date);
        Ok(())
    }

    #[test]
    fn amount_is_currency_only_with_context() -> Result<()> {
        let c = classifier()?;
        let wide = mm(40.0, 8.0);
        assert_eq!(
            c.classify("1,250.00", &wide, &labels(&["Amount"])),
            FieldType::Currency
        );
        assert_eq!(c.classify("1,250.00", &wide, &[]), FieldType::Number);
        assert_eq!(c.classify("250$", &wide, &[]), FieldType::Currency);
        assert_eq!(c.classify("500 SAR", &wide, &[]), FieldType::Currency);
        assert_eq!(c.classify("500 sar", &wide, &[]), FieldType::Text);
        Ok(())
    }

    #[test]
    fn date_wins_over_currency() -> Result<()> {
        let c = classifier()?;
        assert_eq!(
            c.classify("15/03/2024", &mm(40.0, 8.0), &labels(&["Amount"])),
            FieldType::Date
        );
        Ok(())
    }

    #[test]
    fn signature_from_nearby_keyword() -> Result<()> {
        let c = classifier()?;
        assert_eq!(
            c.classify("", &mm(60.0, 10.0), &labels(&["التوقيع"])),
            FieldType::Signature
        );
        assert_eq!(
            c.classify("x", &mm(10.0, 10.0), &labels(&["signature"])),
            FieldType::Signature
        );
        Ok(())
    }

    #[test]
    fn unicode_digits_are_numbers() -> Result<()> {
        let c = classifier()?;
        let wide = mm(40.0, 8.0);
        assert_eq!(c.classify("١٢٣٤", &wide, &[]), FieldType::Number);
        assert_eq!(c.classify("12 345", &wide, &[]), FieldType::Number);
        assert_eq!(c.classify(",.", &wide, &[]), FieldType::Text);
        assert_eq!(c.classify("12a", &wide, &[]), FieldType::Text);
        Ok(())
    }

    #[test]
    fn classification_is_deterministic() -> Result<()> {
        let c = classifier()?;
        let context = labels(&["Amount", "Date"]);
        let first = c.classify("1,000", &mm(30.0, 6.0), &context);
        for _ in 0..10 {
            assert_eq!(c.classify("1,000", &mm(30.0, 6.0), &context), first);
        }
        Ok(())
    }

    #[test]
    fn nearby_labels_use_manhattan_distance() {
        let words = vec![
            word("self", 100.0, 100.0),
            word("close", 150.0, 140.0),
            word("edge", 160.0, 140.0),
            word("far", 400.0, 100.0),
        ];
        let target = words[0].bbox;
        assert_eq!(
            FieldClassifier::nearby_labels(&target, &words, 100.0),
            labels(&["self", "close"])
        );
        assert!(FieldClassifier::nearby_labels(&target, &words, 0.0).is_empty());
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let tables = ClassifierTables {
            date_patterns: vec!["(unclosed".to_string()],
            ..ClassifierTables::default()
        };
        assert!(matches!(
            FieldClassifier::new(&tables),
            Err(ClassifierError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn blank_keywords_are_ignored() -> Result<()> {
        let tables = ClassifierTables {
            date_keywords: vec![String::new(), "  ".to_string()],
            ..ClassifierTables::default()
        };
        let c = FieldClassifier::new(&tables)?;
        assert_eq!(
            c.classify("hello", &mm(40.0, 8.0), &labels(&["anything"])),
            FieldType::Text
        );
        Ok(())
    }
}
