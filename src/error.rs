//! Error types for the document pipeline
//!
//! Each stage has its own error enum; the facade wraps them into
//! [`PipelineError`] with enough context (filename or stage) to diagnose.

use thiserror::Error;

use crate::ocr::OcrError;
use crate::pdf::PdfBackendError;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Per-document failure
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Extension outside the pdf/jpg/jpeg/png whitelist
    #[error("Unsupported file type: {filename}")]
    UnsupportedFileType { filename: String },

    /// Image bytes could not be decoded
    #[error("Failed to decode image {filename}: {source}")]
    ImageDecode {
        filename: String,
        #[source]
        source: image::ImageError,
    },

    /// Recognizer failed on a directly uploaded image
    #[error("Error extracting text from image: {0}")]
    ImageOcr(#[source] OcrError),

    /// Rasterize-and-OCR phase failed for a PDF
    #[error("Error processing PDF with OCR: {0}")]
    PdfOcr(#[source] PdfOcrError),
}

/// Cause of a failed rasterize-and-OCR pass
#[derive(Debug, Error)]
pub enum PdfOcrError {
    #[error(transparent)]
    Render(#[from] PdfBackendError),

    #[error("page {page}: {source}")]
    Recognize {
        page: usize,
        #[source]
        source: OcrError,
    },
}

impl PipelineError {
    /// Name of the stage that produced the error
    pub fn stage(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType { .. } => "dispatch",
            Self::ImageDecode { .. } => "image decode",
            Self::ImageOcr(_) => "image extraction",
            Self::PdfOcr(_) => "PDF OCR",
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown OCR engine '{0}' (expected 'tesseract' or 'easyocr')")]
    UnknownEngine(String),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}
