//! OCR Module
//!
//! Converts preprocessed page images into text.
//!
//! Supports two interchangeable engines, chosen once at startup:
//! - Tesseract (classical, local binary)
//! - EasyOCR (neural, model loaded once and shared)
//!
//! The neural model is wrapped in [`SerializedModel`] unless
//! `OcrConfig::easyocr_serialize` is turned off, so concurrent callers take
//! turns.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scanlens::config::OcrConfig;
//! use scanlens::ocr::build_recognizer;
//! use scanlens::preprocess::preprocess;
//!
//! let recognizer = build_recognizer(&OcrConfig::default(), None)?;
//! let text = recognizer.recognize(&preprocess(&page))?;
//! ```

mod easyocr;
mod provider;
mod service;
mod types;

pub use easyocr::EasyOcrModel;
pub use provider::{NeuralModel, NeuralRecognizer, Recognizer, SerializedModel, TesseractRecognizer};
pub use service::build_recognizer;
pub use types::{easyocr_language, OcrEngine, OcrError, RecognitionResult, TextFragment};

#[cfg(test)]
pub(crate) use provider::{MockModel, MockRecognizer};
