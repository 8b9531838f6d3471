use serde::Deserialize;

/// Locale keyword lists, patterns and geometry thresholds used by the field classifier.
///
/// Every list can be overridden from `detection.classifier` in the settings file. Omitted
/// entries fall back to the Arabic/English seed data below.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClassifierTables {
    /// Nearby label text hinting at a date field.
    pub date_keywords: Vec<String>,
    /// Nearby label text hinting at an amount or currency field.
    pub currency_keywords: Vec<String>,
    /// Nearby label text hinting at a signature area.
    pub signature_keywords: Vec<String>,
    /// Symbols/codes that mark a word itself as currency. Matched case-sensitively.
    pub currency_symbols: Vec<String>,
    /// Regexes searched (not fully matched) in the word text.
    pub date_patterns: Vec<String>,
    pub checkbox_min_aspect_ratio: f64,
    pub checkbox_max_aspect_ratio: f64,
    /// Both checkbox sides must be strictly smaller than this, in millimeters.
    pub checkbox_max_size_mm: f64,
    pub checkbox_max_text_len: usize,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

impl Default for ClassifierTables {
    fn default() -> Self {
        Self {
            date_keywords: strings(&["تاريخ", "التاريخ", "اليوم", "Date"]),
            currency_keywords: strings(&[
                "مبلغ", "المبلغ", "القيمة", "Amount", "EGP", "ر.س", "SAR", "AED",
            ]),
            signature_keywords: strings(&["توقيع", "التوقيع", "Signature"]),
            currency_symbols: strings(&["EGP", "ر.س", "SAR", "AED", "USD", "$"]),
            date_patterns: strings(&[
                r"\d{1,2}[-/]\d{1,2}[-/]\d{2,4}",
                r"\d{4}[-/]\d{1,2}[-/]\d{1,2}",
                r"\d{1,2}\s+\d{1,2}\s+\d{2,4}",
            ]),
            checkbox_min_aspect_ratio: 0.8,
            checkbox_max_aspect_ratio: 1.2,
            checkbox_max_size_mm: 15.0,
            checkbox_max_text_len: 1,
        }
    }
}
