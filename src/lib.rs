// Library exports for the chart-ocr binary and tests

pub mod classify;
pub mod config;
pub mod layout;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use classify::{HeaderSet, HormoneRecord};
pub use config::{ChartConfig, GLAND_HEADERS};
pub use layout::Region;
pub use pipeline::{ChartExtraction, ChartExtractor};
pub use utils::{OcrEngine, TesseractCli};
