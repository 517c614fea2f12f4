//! OCR Recognizers
//!
//! Defines the recognizer trait and its two strategies: the classical
//! Tesseract engine and a neural engine backed by a loaded model.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

use parking_lot::Mutex;

use super::types::{OcrEngine, OcrError, RecognitionResult};
use crate::preprocess::PreprocessedImage;

/// Converts a preprocessed page into raw text.
///
/// An empty string means the page is blank, not that recognition failed.
pub trait Recognizer: Send + Sync {
    /// Which engine backs this recognizer
    fn engine(&self) -> OcrEngine;

    /// Recognize all text on the page
    fn recognize(&self, image: &PreprocessedImage) -> Result<String, OcrError>;
}

/// Tesseract OCR engine, invoked through its command-line interface.
///
/// Stateless: every call writes its own uniquely named temporary files,
/// so one instance can serve concurrent callers.
pub struct TesseractRecognizer {
    command: PathBuf,
    /// Language set in Tesseract syntax, e.g. `eng+tam`
    languages: String,
}

impl TesseractRecognizer {
    pub fn new(command: impl Into<PathBuf>, languages: &[String]) -> Self {
        Self {
            command: command.into(),
            languages: languages.join("+"),
        }
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }

    /// Check if the engine binary can be run
    pub fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }
}

impl Recognizer for TesseractRecognizer {
    fn engine(&self) -> OcrEngine {
        OcrEngine::Tesseract
    }

    fn recognize(&self, image: &PreprocessedImage) -> Result<String, OcrError> {
        let png = image
            .to_png()
            .map_err(|e| OcrError::ImageEncoding(e.to_string()))?;

        let temp_dir = std::env::temp_dir();
        let id = uuid::Uuid::new_v4();
        let input_path = temp_dir.join(format!("scanlens_ocr_input_{}.png", id));
        let output_base = temp_dir.join(format!("scanlens_ocr_output_{}", id));
        let output_path = output_base.with_extension("txt");

        std::fs::write(&input_path, &png)
            .map_err(|e| OcrError::Engine(format!("Failed to write temp file: {}", e)))?;

        let output = Command::new(&self.command)
            .arg(&input_path)
            .arg(&output_base)
            .arg("-l")
            .arg(&self.languages)
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("3")
            .output();

        let _ = std::fs::remove_file(&input_path);

        let output = output.map_err(|e| {
            OcrError::EngineNotAvailable(format!(
                "Failed to run {}: {}",
                self.command.display(),
                e
            ))
        })?;

        if !output.status.success() {
            let _ = std::fs::remove_file(&output_path);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "Tesseract failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = std::fs::read_to_string(&output_path)
            .map_err(|e| OcrError::Engine(format!("Failed to read output: {}", e)));
        let _ = std::fs::remove_file(&output_path);

        text
    }
}

/// A loaded neural OCR model.
///
/// Loading is expensive and happens once per process; after that the model
/// is only read.
pub trait NeuralModel: Send + Sync {
    /// Detect and recognize text regions, in detection order
    fn read_text(&self, image: &PreprocessedImage) -> Result<RecognitionResult, OcrError>;
}

/// Neural OCR strategy over a shared, already loaded model
pub struct NeuralRecognizer {
    model: Arc<dyn NeuralModel>,
}

impl NeuralRecognizer {
    pub fn new(model: Arc<dyn NeuralModel>) -> Self {
        Self { model }
    }
}

impl Recognizer for NeuralRecognizer {
    fn engine(&self) -> OcrEngine {
        OcrEngine::EasyOcr
    }

    fn recognize(&self, image: &PreprocessedImage) -> Result<String, OcrError> {
        let result = self.model.read_text(image)?;
        tracing::debug!(fragments = result.fragments.len(), "Neural OCR finished");
        Ok(result.joined_text())
    }
}

/// Serializes calls into a model whose engine is not reentrant
pub struct SerializedModel {
    inner: Arc<dyn NeuralModel>,
    lock: Mutex<()>,
}

impl SerializedModel {
    pub fn new(inner: Arc<dyn NeuralModel>) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }
}

impl NeuralModel for SerializedModel {
    fn read_text(&self, image: &PreprocessedImage) -> Result<RecognitionResult, OcrError> {
        let _guard = self.lock.lock();
        self.inner.read_text(image)
    }
}

/// Mock model for testing
#[cfg(test)]
pub struct MockModel {
    pub fragments: Vec<&'static str>,
    pub fail: bool,
}

#[cfg(test)]
impl NeuralModel for MockModel {
    fn read_text(&self, _image: &PreprocessedImage) -> Result<RecognitionResult, OcrError> {
        if self.fail {
            return Err(OcrError::Engine("corrupt image buffer".to_string()));
        }
        Ok(RecognitionResult::new(
            self.fragments
                .iter()
                .map(|t| super::types::TextFragment::new(*t))
                .collect(),
        ))
    }
}

/// Mock recognizer for testing; reports the page size it was given
#[cfg(test)]
#[derive(Default)]
pub struct MockRecognizer {
    pub fail_on_width: Option<u32>,
    pub blank: bool,
}

#[cfg(test)]
impl Recognizer for MockRecognizer {
    fn engine(&self) -> OcrEngine {
        OcrEngine::Tesseract
    }

    fn recognize(&self, image: &PreprocessedImage) -> Result<String, OcrError> {
        if self.fail_on_width == Some(image.width()) {
            return Err(OcrError::Engine("corrupt image buffer".to_string()));
        }
        if self.blank {
            return Ok("\n\u{c}".to_string());
        }
        Ok(format!("text from {}x{} page", image.width(), image.height()))
    }
}
