//! Configuration management for Scanlens
//!
//! Values are read once at startup. The engine choice and language set are
//! static properties of the deployment and never change during a run.

use std::env;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::ocr::OcrEngine;
use crate::pdf::{MIN_NATIVE_TEXT_CHARS, RASTER_DPI};

#[derive(Debug, Clone)]
pub struct Config {
    pub ocr: OcrConfig,
    pub pdf: PdfConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub engine: OcrEngine,
    /// Tesseract language codes, e.g. `["eng", "tam"]`
    pub languages: Vec<String>,
    pub tesseract_cmd: String,
    pub easyocr_url: String,
    pub easyocr_timeout_secs: u64,
    /// Send one request at a time to the neural model
    pub easyocr_serialize: bool,
}

#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Trimmed native text shorter than this falls back to OCR
    pub min_native_chars: usize,
    /// Rasterization resolution for the OCR fallback
    pub raster_dpi: u32,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_file_size_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ocr: OcrConfig::default(),
            pdf: PdfConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        OcrConfig {
            engine: OcrEngine::Tesseract,
            languages: vec!["eng".to_string(), "tam".to_string()],
            tesseract_cmd: "tesseract".to_string(),
            easyocr_url: "http://127.0.0.1:8765".to_string(),
            easyocr_timeout_secs: 120,
            easyocr_serialize: true,
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        PdfConfig {
            min_native_chars: MIN_NATIVE_TEXT_CHARS,
            raster_dpi: RASTER_DPI,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig { max_file_size_mb: 10 }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let engine = match lookup("OCR_ENGINE") {
            Some(value) => value.parse()?,
            None => defaults.ocr.engine,
        };

        let languages = match lookup("OCR_LANGUAGES") {
            Some(value) => {
                let langs: Vec<String> = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if langs.is_empty() {
                    return Err(ConfigError::Empty("OCR_LANGUAGES"));
                }
                langs
            }
            None => defaults.ocr.languages,
        };

        Ok(Config {
            ocr: OcrConfig {
                engine,
                languages,
                tesseract_cmd: lookup("TESSERACT_CMD").unwrap_or(defaults.ocr.tesseract_cmd),
                easyocr_url: lookup("EASYOCR_URL").unwrap_or(defaults.ocr.easyocr_url),
                easyocr_timeout_secs: parse_var(
                    &lookup,
                    "EASYOCR_TIMEOUT_SECS",
                    defaults.ocr.easyocr_timeout_secs,
                )?,
                easyocr_serialize: parse_var(
                    &lookup,
                    "EASYOCR_SERIALIZE",
                    defaults.ocr.easyocr_serialize,
                )?,
            },
            pdf: PdfConfig {
                min_native_chars: parse_var(
                    &lookup,
                    "PDF_MIN_NATIVE_CHARS",
                    defaults.pdf.min_native_chars,
                )?,
                raster_dpi: parse_var(&lookup, "PDF_RASTER_DPI", defaults.pdf.raster_dpi)?,
            },
            batch: BatchConfig {
                max_file_size_mb: parse_var(
                    &lookup,
                    "MAX_FILE_SIZE_MB",
                    defaults.batch.max_file_size_mb,
                )?,
            },
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}
