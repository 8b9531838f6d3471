mod client;
mod error;
mod interfaces;

pub use client::*;
pub use error::*;
