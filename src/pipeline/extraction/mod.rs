pub mod types;
pub mod normalize;
pub mod plate_match;
pub mod ocr;
pub mod orchestrator;

pub use types::*;
pub use normalize::*;
pub use plate_match::*;
pub use ocr::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No plate-shaped text found")]
    NoCandidateFound,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("OCR provider returned {status}: {body}")]
    OcrProvider { status: u16, body: String },

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("Failed to parse OCR response: {0}")]
    ResponseParsing(String),

    #[error("OCR provider not configured: {0}")]
    NotConfigured(String),
}
