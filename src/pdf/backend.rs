//! PDF backend abstraction
//!
//! The resolver only needs two things from a PDF library: per-page text
//! layers and per-page rasters.

use image::DynamicImage;
use thiserror::Error;

/// PDF backend errors
#[derive(Error, Debug)]
pub enum PdfBackendError {
    #[error("Failed to load PDF: {0}")]
    LoadError(String),
    #[error("Failed to extract text from page {page}: {message}")]
    TextError { page: usize, message: String },
    #[error("Failed to render page {page}: {message}")]
    RenderError { page: usize, message: String },
    #[error("Image buffer error: {0}")]
    ImageError(String),
}

/// Page-level access to a PDF held in memory
pub trait PdfBackend: Send + Sync {
    /// Embedded text layer of every readable page, in page order
    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>, PdfBackendError>;

    /// Render every page at `dpi`, in page order
    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<DynamicImage>, PdfBackendError>;
}

/// In-memory backend for tests
#[cfg(test)]
pub struct FakePdfBackend {
    /// `None` simulates a PDF without a parsable text layer
    pub texts: Option<Vec<String>>,
    /// Width of each rendered page
    pub page_widths: Vec<u32>,
    pub render_fails: bool,
    pub rendered_dpi: parking_lot::Mutex<Option<u32>>,
}

#[cfg(test)]
impl FakePdfBackend {
    pub fn new(texts: Option<Vec<&str>>, page_widths: Vec<u32>) -> Self {
        Self {
            texts: texts.map(|t| t.into_iter().map(String::from).collect()),
            page_widths,
            render_fails: false,
            rendered_dpi: parking_lot::Mutex::new(None),
        }
    }
}

#[cfg(test)]
impl PdfBackend for FakePdfBackend {
    fn page_texts(&self, _pdf: &[u8]) -> Result<Vec<String>, PdfBackendError> {
        self.texts
            .clone()
            .ok_or_else(|| PdfBackendError::LoadError("no xref table".to_string()))
    }

    fn rasterize(&self, _pdf: &[u8], dpi: u32) -> Result<Vec<DynamicImage>, PdfBackendError> {
        *self.rendered_dpi.lock() = Some(dpi);
        if self.render_fails {
            return Err(PdfBackendError::RenderError {
                page: 1,
                message: "out of memory".to_string(),
            });
        }
        Ok(self
            .page_widths
            .iter()
            .map(|&w| DynamicImage::ImageRgb8(image::RgbImage::from_pixel(w, 20, image::Rgb([250, 250, 250]))))
            .collect())
    }
}
