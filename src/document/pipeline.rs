//! Document pipeline facade
//!
//! Single entry point: dispatches each file to the PDF or image path and
//! returns trimmed text.

use std::sync::Arc;

use super::types::{DocumentFile, DocumentKind};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::ocr::{build_recognizer, NeuralModel, OcrError, Recognizer};
use crate::pdf::{MupdfBackend, PdfBackend, PdfExtractionOutcome, PdfTextResolver};
use crate::preprocess::{preprocess_with, PreprocessConfig};

/// Text extraction pipeline for uploaded documents.
///
/// Holds no mutable state, so one pipeline can be reused for a whole batch
/// and a failure in one document never affects the next.
pub struct DocumentPipeline {
    recognizer: Arc<dyn Recognizer>,
    pdf: PdfTextResolver,
    preprocess: PreprocessConfig,
}

impl DocumentPipeline {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        backend: Arc<dyn PdfBackend>,
        config: &Config,
    ) -> Self {
        let preprocess = PreprocessConfig::default();
        let pdf = PdfTextResolver::new(backend, recognizer.clone(), config.pdf.clone())
            .with_preprocess(preprocess.clone());
        Self {
            recognizer,
            pdf,
            preprocess,
        }
    }

    /// Build the production pipeline: configured recognizer plus MuPDF.
    ///
    /// `model` lets the caller hand in an already loaded neural model.
    pub fn from_config(
        config: &Config,
        model: Option<Arc<dyn NeuralModel>>,
    ) -> std::result::Result<Self, OcrError> {
        let recognizer = build_recognizer(&config.ocr, model)?;
        Ok(Self::new(recognizer, Arc::new(MupdfBackend::new()), config))
    }

    pub fn recognizer(&self) -> &Arc<dyn Recognizer> {
        &self.recognizer
    }

    /// Extract text from one document
    pub fn process_document(&self, file: &DocumentFile) -> Result<String> {
        match DocumentKind::from_filename(&file.name) {
            Some(DocumentKind::Pdf) => self.extract_text_from_pdf(&file.bytes),
            Some(DocumentKind::Image) => self.extract_text_from_image(&file.name, &file.bytes),
            None => Err(PipelineError::UnsupportedFileType {
                filename: file.name.clone(),
            }),
        }
    }

    /// Like [`process_document`](Self::process_document) for PDFs, but keeps
    /// track of whether the text came from the text layer or from OCR
    pub fn process_pdf_outcome(&self, file: &DocumentFile) -> Result<PdfExtractionOutcome> {
        match DocumentKind::from_filename(&file.name) {
            Some(DocumentKind::Pdf) => self.pdf.resolve_outcome(&file.bytes),
            _ => Err(PipelineError::UnsupportedFileType {
                filename: file.name.clone(),
            }),
        }
    }

    pub fn extract_text_from_pdf(&self, bytes: &[u8]) -> Result<String> {
        self.pdf.resolve(bytes)
    }

    pub fn extract_text_from_image(&self, filename: &str, bytes: &[u8]) -> Result<String> {
        let image = image::load_from_memory(bytes).map_err(|source| PipelineError::ImageDecode {
            filename: filename.to_string(),
            source,
        })?;

        let processed = preprocess_with(&image, &self.preprocess);
        let text = self
            .recognizer
            .recognize(&processed)
            .map_err(PipelineError::ImageOcr)?;

        Ok(text.trim().to_string())
    }
}
