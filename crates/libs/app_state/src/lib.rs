#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

mod classifier_tables;
mod constants;
mod load_settings;
mod raw_settings;
mod settings;
mod utils;

pub use classifier_tables::*;
pub use constants::*;
pub use load_settings::*;
pub use raw_settings::*;
pub use settings::*;
pub use utils::*;
