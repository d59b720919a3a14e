pub mod csv;
pub mod encoding;
pub mod extractor;
pub mod format;
pub mod ocr;
pub mod ofx;
pub mod pdf;
pub mod sanitize;
pub mod types;

pub use extractor::DocumentExtractor;
pub use format::detect_format;
pub use ocr::OcrClient;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("text decoding failed: {0}")]
    Decode(String),

    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("document yielded no usable text")]
    NoUsableText,
}
