//! Scanlens Library
//!
//! OCR preprocessing and text extraction for uploaded documents.
//! The command-line runner is in main.rs.
//!
//! # Modules
//!
//! - `preprocess`: Grayscale, blur, adaptive threshold, deskew, denoise
//! - `ocr`: Recognizer strategies (Tesseract, neural model)
//! - `pdf`: Native text layer with rasterize-and-OCR fallback
//! - `document`: Facade that dispatches uploads by file type
//! - `batch`: Per-document reports for a set of uploads
//! - `extraction`: Structured field extraction over extracted text

pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod extraction;
pub mod ocr;
pub mod pdf;
pub mod preprocess;

pub use config::Config;
pub use document::{DocumentFile, DocumentKind, DocumentPipeline};
pub use error::{PipelineError, Result};
