use crate::{DatabaseConstants, RawSettings};
use serde::Deserialize;

/// Millimeters per inch, the bridge between DPI and physical units.
pub const MM_PER_INCH: f64 = 25.4;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConstants {
    pub database: DatabaseConstants,
}

impl From<&RawSettings> for AppConstants {
    fn from(raw: &RawSettings) -> Self {
        Self {
            database: raw.constants.database.clone(),
        }
    }
}
