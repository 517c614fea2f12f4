//! PDF backend using MuPDF
//!
//! Opens a fresh document per operation; MuPDF's context is not
//! thread-safe, so nothing is cached between calls.

use image::{DynamicImage, RgbImage};
use mupdf::{Colorspace, Document, Matrix};

use super::backend::{PdfBackend, PdfBackendError};

/// PDF points per inch
const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }

    fn open(pdf: &[u8]) -> Result<Document, PdfBackendError> {
        Document::from_bytes(pdf, "application/pdf")
            .map_err(|e| PdfBackendError::LoadError(e.to_string()))
    }

    fn page_count(doc: &Document) -> Result<usize, PdfBackendError> {
        doc.page_count()
            .map(|n| n.max(0) as usize)
            .map_err(|e| PdfBackendError::LoadError(e.to_string()))
    }

    fn pixmap_to_image(
        pixmap: &mupdf::Pixmap,
        page: usize,
    ) -> Result<DynamicImage, PdfBackendError> {
        rgb_from_samples(
            page,
            pixmap.width() as u32,
            pixmap.height() as u32,
            pixmap.n() as usize,
            pixmap.samples(),
        )
    }
}

/// Copy `n`-component pixmap samples into an RGB page image
fn rgb_from_samples(
    page: usize,
    width: u32,
    height: u32,
    n: usize,
    samples: &[u8],
) -> Result<DynamicImage, PdfBackendError> {
    if width == 0 || height == 0 || n == 0 {
        return Err(PdfBackendError::RenderError {
            page,
            message: format!("empty pixmap ({}x{}, {} components)", width, height, n),
        });
    }

    let mut rgb_buffer = Vec::with_capacity(width as usize * height as usize * 3);
    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(255);
            let (g, b) = if n >= 3 {
                (
                    samples.get(offset + 1).copied().unwrap_or(255),
                    samples.get(offset + 2).copied().unwrap_or(255),
                )
            } else {
                (r, r)
            };
            rgb_buffer.extend_from_slice(&[r, g, b]);
        }
    }

    let img = RgbImage::from_raw(width, height, rgb_buffer).ok_or_else(|| {
        PdfBackendError::ImageError("Failed to create image buffer".to_string())
    })?;
    Ok(DynamicImage::ImageRgb8(img))
}

/// Text of every page that could be read; unreadable pages are skipped
fn collect_page_texts<F>(page_count: usize, mut read_page: F) -> Vec<String>
where
    F: FnMut(usize) -> Result<String, PdfBackendError>,
{
    (0..page_count)
        .filter_map(|i| match read_page(i) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!(page = i + 1, "Skipping page text: {}", e);
                None
            }
        })
        .collect()
}

impl PdfBackend for MupdfBackend {
    fn page_texts(&self, pdf: &[u8]) -> Result<Vec<String>, PdfBackendError> {
        let doc = Self::open(pdf)?;
        let page_count = Self::page_count(&doc)?;

        Ok(collect_page_texts(page_count, |i| {
            let text_error = |e: mupdf::Error| PdfBackendError::TextError {
                page: i + 1,
                message: e.to_string(),
            };
            let page = doc.load_page(i as i32).map_err(text_error)?;
            page.to_text().map_err(text_error)
        }))
    }

    fn rasterize(&self, pdf: &[u8], dpi: u32) -> Result<Vec<DynamicImage>, PdfBackendError> {
        let doc = Self::open(pdf)?;
        let page_count = Self::page_count(&doc)?;

        let scale = dpi as f32 / POINTS_PER_INCH;
        let matrix = Matrix::new_scale(scale, scale);
        let colorspace = Colorspace::device_rgb();

        let mut pages = Vec::with_capacity(page_count);
        for i in 0..page_count {
            let render_error = |e: mupdf::Error| PdfBackendError::RenderError {
                page: i + 1,
                message: e.to_string(),
            };
            let page = doc.load_page(i as i32).map_err(render_error)?;
            // to_pixmap signature: (ctm, colorspace, alpha, show_extras) -> Pixmap
            let pixmap = page
                .to_pixmap(&matrix, &colorspace, false, true)
                .map_err(render_error)?;
            tracing::debug!(
                page = i + 1,
                width = pixmap.width(),
                height = pixmap.height(),
                "Rendered PDF page"
            );
            pages.push(Self::pixmap_to_image(&pixmap, i + 1)?);
        }

        Ok(pages)
    }
}
