pub mod form_detection;

pub use form_detection::*;
