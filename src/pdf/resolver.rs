//! PDF text resolution
//!
//! Tries the embedded text layer first and only rasterizes and OCRs the
//! pages when that layer is too thin to be real content.

use std::sync::Arc;

use super::backend::PdfBackend;
use crate::config::PdfConfig;
use crate::error::{PdfOcrError, PipelineError, Result};
use crate::ocr::Recognizer;
use crate::preprocess::{preprocess_with, PreprocessConfig};

/// Trimmed native text shorter than this many characters needs OCR
pub const MIN_NATIVE_TEXT_CHARS: usize = 50;

/// Resolution pages are rendered at for OCR
pub const RASTER_DPI: u32 = 200;

/// Result of the native text phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeExtraction {
    /// Enough embedded text to skip OCR
    Sufficient(String),
    /// Too little (or no) embedded text; OCR required
    Insufficient(String),
}

/// Final text together with the path that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfExtractionOutcome {
    NativeText(String),
    OcrText(String),
}

impl PdfExtractionOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::NativeText(text) | Self::OcrText(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::NativeText(text) | Self::OcrText(text) => text,
        }
    }

    pub fn is_ocr(&self) -> bool {
        matches!(self, Self::OcrText(_))
    }
}

/// Decide whether native text is enough, counting characters after trimming
pub fn classify_native_text(text: &str, min_chars: usize) -> NativeExtraction {
    let trimmed = text.trim();
    if trimmed.chars().count() < min_chars {
        NativeExtraction::Insufficient(trimmed.to_string())
    } else {
        NativeExtraction::Sufficient(trimmed.to_string())
    }
}

/// Join the non-blank page texts with newlines
pub fn join_native_pages(pages: &[String]) -> String {
    pages
        .iter()
        .filter(|page| !page.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Thin native text stays in front of the OCR output, one line apart
fn append_ocr_text(native: &str, ocr: &str) -> String {
    format!("{}\n{}", native, ocr).trim().to_string()
}

/// Resolves PDF bytes to text via the cheapest sufficient method
pub struct PdfTextResolver {
    backend: Arc<dyn PdfBackend>,
    recognizer: Arc<dyn Recognizer>,
    config: PdfConfig,
    preprocess: PreprocessConfig,
}

impl PdfTextResolver {
    pub fn new(
        backend: Arc<dyn PdfBackend>,
        recognizer: Arc<dyn Recognizer>,
        config: PdfConfig,
    ) -> Self {
        Self {
            backend,
            recognizer,
            config,
            preprocess: PreprocessConfig::default(),
        }
    }

    pub fn with_preprocess(mut self, preprocess: PreprocessConfig) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Native phase. Parse failures count as "no native text".
    pub fn extract_native(&self, pdf: &[u8]) -> NativeExtraction {
        let text = match self.backend.page_texts(pdf) {
            Ok(pages) => join_native_pages(&pages),
            Err(e) => {
                tracing::debug!("No usable text layer, falling back to OCR: {}", e);
                String::new()
            }
        };

        classify_native_text(&text, self.config.min_native_chars)
    }

    /// Rasterize every page and OCR it. Any failure fails the whole document.
    pub fn ocr_pages(&self, pdf: &[u8]) -> Result<String> {
        let pages = self
            .backend
            .rasterize(pdf, self.config.raster_dpi)
            .map_err(|e| PipelineError::PdfOcr(e.into()))?;

        let mut texts = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let processed = preprocess_with(page, &self.preprocess);
            let text = self.recognizer.recognize(&processed).map_err(|source| {
                PipelineError::PdfOcr(PdfOcrError::Recognize {
                    page: index + 1,
                    source,
                })
            })?;
            tracing::debug!(page = index + 1, chars = text.len(), "OCR page done");
            texts.push(text);
        }

        Ok(texts.join("\n").trim().to_string())
    }

    /// Resolve text and report which path produced it
    pub fn resolve_outcome(&self, pdf: &[u8]) -> Result<PdfExtractionOutcome> {
        match self.extract_native(pdf) {
            NativeExtraction::Sufficient(text) => {
                tracing::debug!(chars = text.chars().count(), "Using native PDF text");
                Ok(PdfExtractionOutcome::NativeText(text))
            }
            NativeExtraction::Insufficient(text) => {
                tracing::info!(
                    native_chars = text.chars().count(),
                    dpi = self.config.raster_dpi,
                    "Native PDF text insufficient, running OCR"
                );
                let ocr = self.ocr_pages(pdf)?;
                Ok(PdfExtractionOutcome::OcrText(append_ocr_text(&text, &ocr)))
            }
        }
    }

    /// Resolve PDF bytes to trimmed text
    pub fn resolve(&self, pdf: &[u8]) -> Result<String> {
        self.resolve_outcome(pdf).map(PdfExtractionOutcome::into_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::MockRecognizer;
    use crate::pdf::FakePdfBackend;

    fn resolver(backend: FakePdfBackend, recognizer: MockRecognizer) -> PdfTextResolver {
        PdfTextResolver::new(Arc::new(backend), Arc::new(recognizer), PdfConfig::default())
    }

    #[test]
    fn test_classify_threshold_boundary() {
        let just_short = "a".repeat(49);
        let just_enough = "a".repeat(50);
        assert!(matches!(
            classify_native_text(&just_short, 50),
            NativeExtraction::Insufficient(_)
        ));
        assert!(matches!(
            classify_native_text(&just_enough, 50),
            NativeExtraction::Sufficient(_)
        ));
    }

    #[test]
    fn test_classify_trims_before_counting() {
        let padded = format!("   \n{}\n\n  ", "b".repeat(49));
        assert_eq!(
            classify_native_text(&padded, 50),
            NativeExtraction::Insufficient("b".repeat(49))
        );
    }

    #[test]
    fn test_classify_counts_characters_not_bytes() {
        // 25 Tamil letters, 75 bytes
        let tamil = "க".repeat(25);
        assert!(matches!(
            classify_native_text(&tamil, 50),
            NativeExtraction::Insufficient(_)
        ));
    }

    #[test]
    fn test_join_skips_blank_pages() {
        let pages = vec![
            "first".to_string(),
            "   ".to_string(),
            String::new(),
            "second".to_string(),
        ];
        assert_eq!(join_native_pages(&pages), "first\nsecond");
    }

    #[test]
    fn test_49_native_chars_triggers_ocr() {
        let text = "x".repeat(49);
        let r = resolver(
            FakePdfBackend::new(Some(vec![text.as_str()]), vec![30]),
            MockRecognizer::default(),
        );
        let outcome = r.resolve_outcome(b"%PDF").unwrap();
        assert_eq!(
            outcome,
            PdfExtractionOutcome::OcrText(format!("{}\ntext from 30x20 page", text))
        );
    }

    #[test]
    fn test_50_native_chars_skips_ocr() {
        let text = "x".repeat(50);
        let backend = FakePdfBackend::new(Some(vec![text.as_str()]), vec![30]);
        let r = PdfTextResolver::new(
            Arc::new(backend),
            Arc::new(MockRecognizer::default()),
            PdfConfig::default(),
        );
        let outcome = r.resolve_outcome(b"%PDF").unwrap();
        assert_eq!(outcome, PdfExtractionOutcome::NativeText(text));
        assert!(!outcome.is_ocr());
    }

    #[test]
    fn test_native_pages_joined_across_pages() {
        let page_one = "Invoice number 2024-118 issued to Acme Industries";
        let page_two = "Total due: 1,250.00 USD";
        let r = resolver(
            FakePdfBackend::new(Some(vec![page_one, "", page_two]), vec![]),
            MockRecognizer::default(),
        );
        assert_eq!(
            r.resolve(b"%PDF").unwrap(),
            format!("{}\n{}", page_one, page_two)
        );
    }

    #[test]
    fn test_parse_failure_falls_back_to_ocr() {
        let r = resolver(
            FakePdfBackend::new(None, vec![40, 41]),
            MockRecognizer::default(),
        );
        assert_eq!(
            r.resolve(b"scanned").unwrap(),
            "text from 40x20 page\ntext from 41x20 page"
        );
    }

    #[test]
    fn test_scanned_pdf_with_thin_text_layer() {
        // Ten characters of watermark, three scanned pages
        let backend = Arc::new(FakePdfBackend::new(Some(vec!["CONFIDENTI"]), vec![30, 31, 32]));
        let r = PdfTextResolver::new(
            backend.clone(),
            Arc::new(MockRecognizer::default()),
            PdfConfig::default(),
        );

        let text = r.resolve(b"%PDF").unwrap();
        assert_eq!(
            text,
            "CONFIDENTI\ntext from 30x20 page\ntext from 31x20 page\ntext from 32x20 page"
        );
        assert_ne!(text, "CONFIDENTI");
        assert_eq!(*backend.rendered_dpi.lock(), Some(200));
    }

    #[test]
    fn test_custom_threshold_and_dpi() {
        let backend = Arc::new(FakePdfBackend::new(Some(vec!["short but enough"]), vec![30]));
        let r = PdfTextResolver::new(
            backend.clone(),
            Arc::new(MockRecognizer::default()),
            PdfConfig {
                min_native_chars: 10,
                raster_dpi: 300,
            },
        );
        assert_eq!(r.resolve(b"%PDF").unwrap(), "short but enough");
        assert_eq!(*backend.rendered_dpi.lock(), None);

        let strict = PdfTextResolver::new(
            backend.clone(),
            Arc::new(MockRecognizer::default()),
            PdfConfig {
                min_native_chars: 100,
                raster_dpi: 300,
            },
        );
        assert!(strict.resolve_outcome(b"%PDF").unwrap().is_ocr());
        assert_eq!(*backend.rendered_dpi.lock(), Some(300));
    }

    #[test]
    fn test_render_failure_is_fatal() {
        let mut backend = FakePdfBackend::new(None, vec![30]);
        backend.render_fails = true;
        let r = resolver(backend, MockRecognizer::default());

        let err = r.resolve(b"%PDF").unwrap_err();
        assert!(matches!(err, PipelineError::PdfOcr(PdfOcrError::Render(_))));
        assert!(err.to_string().starts_with("Error processing PDF with OCR: "));
    }

    #[test]
    fn test_recognizer_failure_returns_no_partial_text() {
        let r = resolver(
            FakePdfBackend::new(None, vec![30, 31, 32]),
            MockRecognizer {
                fail_on_width: Some(31),
                ..Default::default()
            },
        );
        match r.resolve(b"%PDF") {
            Err(err @ PipelineError::PdfOcr(PdfOcrError::Recognize { page: 2, .. })) => {
                assert!(err.to_string().contains(": page 2: "));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_thin_text_layer_survives_blank_scan() {
        let r = resolver(
            FakePdfBackend::new(Some(vec!["  Page 1  ", ""]), vec![30, 31]),
            MockRecognizer {
                blank: true,
                ..Default::default()
            },
        );
        assert_eq!(r.resolve(b"%PDF").unwrap(), "Page 1");
    }

    #[test]
    fn test_zero_width_page_does_not_panic() {
        let r = resolver(FakePdfBackend::new(None, vec![0, 30]), MockRecognizer::default());
        assert_eq!(
            r.resolve(b"%PDF").unwrap(),
            "text from 0x20 page\ntext from 30x20 page"
        );
    }

    #[test]
    fn test_blank_scans_resolve_to_empty_text() {
        let r = resolver(
            FakePdfBackend::new(Some(vec![]), vec![30, 31]),
            MockRecognizer {
                blank: true,
                ..Default::default()
            },
        );
        assert_eq!(r.resolve(b"%PDF").unwrap(), "");
    }
}
