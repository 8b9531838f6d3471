#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]
mod database;
mod geometry;
mod ocr;

pub use database::*;
pub use geometry::*;
pub use ocr::*;
