mod detection_store;
mod memory_detection_store;

pub use detection_store::*;
pub use memory_detection_store::*;
