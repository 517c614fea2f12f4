//! OCR Types
//!
//! Engine choice, recognized fragments and OCR errors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which recognizer serves the deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngine {
    /// Classical Tesseract engine
    Tesseract,
    /// Neural EasyOCR detector/recognizer
    EasyOcr,
}

impl Default for OcrEngine {
    fn default() -> Self {
        Self::Tesseract
    }
}

impl FromStr for OcrEngine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tesseract" => Ok(Self::Tesseract),
            "easyocr" => Ok(Self::EasyOcr),
            other => Err(ConfigError::UnknownEngine(other.to_string())),
        }
    }
}

impl fmt::Display for OcrEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tesseract => f.write_str("tesseract"),
            Self::EasyOcr => f.write_str("easyocr"),
        }
    }
}

/// One detected text region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    /// Engine score, 0-1 (not used by the pipeline)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Region corners in pixel coordinates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<[f64; 2]>>,
}

impl TextFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            bbox: None,
        }
    }
}

/// Fragments in detection order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecognitionResult {
    pub fragments: Vec<TextFragment>,
}

impl RecognitionResult {
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        Self { fragments }
    }

    /// Fragment texts joined by single spaces, order preserved
    pub fn joined_text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("OCR engine not available: {0}")]
    EngineNotAvailable(String),

    #[error("Failed to load OCR model: {0}")]
    ModelLoad(String),

    #[error("Failed to encode image: {0}")]
    ImageEncoding(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("API error: {0}")]
    ApiError(String),
}

/// Map a Tesseract language code to the two-letter code EasyOCR expects
pub fn easyocr_language(code: &str) -> String {
    match code {
        "eng" => "en",
        "tam" => "ta",
        "hin" => "hi",
        "fra" => "fr",
        "deu" => "de",
        "spa" => "es",
        "chi_sim" => "ch_sim",
        "jpn" => "ja",
        "kor" => "ko",
        other => other,
    }
    .to_string()
}
