pub mod ocr;
pub mod text_processor;

pub use ocr::{recognize_region, OcrEngine, OcrError, RecognizedFragment, TesseractCli};
pub use text_processor::{join_fragments, normalize_whitespace};
