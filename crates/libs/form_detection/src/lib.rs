#![deny(clippy::unwrap_used)]
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

mod classifier;
mod pipeline;
mod units;

pub use classifier::*;
pub use pipeline::*;
pub use units::*;
