use app_state::ClassifierTables;
use common_types::{FieldType, PhysicalBBox};
use regex::Regex;

use super::ClassifierError;

/// Classifier tables with patterns compiled and keywords lowercased.
#[derive(Debug, Clone)]
pub(super) struct CompiledTables {
    date_keywords: Vec<String>,
    currency_keywords: Vec<String>,
    signature_keywords: Vec<String>,
    currency_symbols: Vec<String>,
    date_patterns: Vec<Regex>,
    digits_only: Regex,
    checkbox_min_aspect_ratio: f64,
    checkbox_max_aspect_ratio: f64,
    checkbox_max_size_mm: f64,
    checkbox_max_text_len: usize,
}

fn lowercase_keywords(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn compile(pattern: &str) -> Result<Regex, ClassifierError> {
    Regex::new(pattern).map_err(|source| ClassifierError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl CompiledTables {
    pub(super) fn compile(tables: &ClassifierTables) -> Result<Self, ClassifierError> {
        let date_patterns = tables
            .date_patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            date_keywords: lowercase_keywords(&tables.date_keywords),
            currency_keywords: lowercase_keywords(&tables.currency_keywords),
            signature_keywords: lowercase_keywords(&tables.signature_keywords),
            currency_symbols: tables
                .currency_symbols
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect(),
            date_patterns,
            digits_only: compile(r"^\p{Nd}+$")?,
            checkbox_min_aspect_ratio: tables.checkbox_min_aspect_ratio,
            checkbox_max_aspect_ratio: tables.checkbox_max_aspect_ratio,
            checkbox_max_size_mm: tables.checkbox_max_size_mm,
            checkbox_max_text_len: tables.checkbox_max_text_len,
        })
    }
}

/// Everything a rule may look at for one word.
pub(super) struct FieldContext<'a> {
    pub text: &'a str,
    pub bbox: &'a PhysicalBBox,
    /// Nearby label texts joined by spaces, lowercased.
    pub nearby: String,
}

impl<'a> FieldContext<'a> {
    pub(super) fn new(text: &'a str, bbox: &'a PhysicalBBox, nearby_labels: &[String]) -> Self {
        Self {
            text,
            bbox,
            nearby: nearby_labels.join(" ").to_lowercase(),
        }
    }

    fn nearby_mentions(&self, keywords: &[String]) -> bool {
        keywords.iter().any(|k| self.nearby.contains(k.as_str()))
    }
}

pub(super) struct Rule {
    pub label: FieldType,
    pub predicate: fn(&CompiledTables, &FieldContext<'_>) -> bool,
}

/// Evaluated top to bottom, the first matching rule wins. Anything left over is text.
pub(super) const RULES: [Rule; 5] = [
    Rule {
        label: FieldType::Date,
        predicate: is_date,
    },
    Rule {
        label: FieldType::Currency,
        predicate: is_currency,
    },
    Rule {
        label: FieldType::Signature,
        predicate: is_signature,
    },
    Rule {
        label: FieldType::Checkbox,
        predicate: is_checkbox,
    },
    Rule {
        label: FieldType::Number,
        predicate: is_number,
    },
];

fn is_date(tables: &CompiledTables, ctx: &FieldContext<'_>) -> bool {
    ctx.nearby_mentions(&tables.date_keywords)
        || tables.date_patterns.iter().any(|p| p.is_match(ctx.text))
}

// A grouped amount next to a currency keyword is already covered by the keyword check.
fn is_currency(tables: &CompiledTables, ctx: &FieldContext<'_>) -> bool {
    ctx.nearby_mentions(&tables.currency_keywords)
        || tables
            .currency_symbols
            .iter()
            .any(|s| ctx.text.contains(s.as_str()))
}

fn is_signature(tables: &CompiledTables, ctx: &FieldContext<'_>) -> bool {
    ctx.nearby_mentions(&tables.signature_keywords)
}

fn is_checkbox(tables: &CompiledTables, ctx: &FieldContext<'_>) -> bool {
    let PhysicalBBox { width, height, .. } = *ctx.bbox;
    if width <= 0.0 || height <= 0.0 {
        return false;
    }
    let aspect_ratio = width / height;
    (tables.checkbox_min_aspect_ratio..=tables.checkbox_max_aspect_ratio).contains(&aspect_ratio)
        && width < tables.checkbox_max_size_mm
        && height < tables.checkbox_max_size_mm
        && ctx.text.trim().chars().count() <= tables.checkbox_max_text_len
}

fn is_number(tables: &CompiledTables, ctx: &FieldContext<'_>) -> bool {
    let stripped: String = ctx
        .text
        .chars()
        .filter(|c| !matches!(c, ',' | '.' | ' '))
        .collect();
    tables.digits_only.is_match(&stripped)
}
