//! PDF text module
//!
//! Provides native text extraction with a rasterize-and-OCR fallback.
//! MuPDF does the parsing and rendering behind the [`PdfBackend`] trait.

mod backend;
mod mupdf_backend;
mod resolver;

pub use backend::{PdfBackend, PdfBackendError};
pub use mupdf_backend::MupdfBackend;
pub use resolver::{
    classify_native_text, join_native_pages, NativeExtraction, PdfExtractionOutcome,
    PdfTextResolver, MIN_NATIVE_TEXT_CHARS, RASTER_DPI,
};

#[cfg(test)]
pub(crate) use backend::FakePdfBackend;
