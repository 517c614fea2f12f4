//! EasyOCR model client
//!
//! The neural network lives in an EasyOCR sidecar process that loads the
//! reader once for the configured languages. This client talks to it over
//! HTTP; images travel as base64-encoded PNG.

use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::provider::NeuralModel;
use super::types::{easyocr_language, OcrError, RecognitionResult, TextFragment};
use crate::config::OcrConfig;
use crate::preprocess::PreprocessedImage;

/// Handle to a loaded EasyOCR reader
pub struct EasyOcrModel {
    client: reqwest::blocking::Client,
    base_url: String,
    languages: Vec<String>,
}

#[derive(Serialize)]
struct LoadRequest<'a> {
    languages: &'a [String],
}

#[derive(Serialize)]
struct ReadRequest<'a> {
    image_base64: String,
    languages: &'a [String],
}

/// Single detected region as returned by `readtext`
#[derive(Deserialize)]
struct TextBox {
    #[serde(rename = "box", default)]
    bbox: Vec<[f64; 2]>,
    text: String,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Deserialize)]
struct ReadResponse {
    boxes: Vec<TextBox>,
}

impl EasyOcrModel {
    /// Load the reader for the configured languages.
    ///
    /// This is the single initialization point for the neural engine; call
    /// it once at startup and share the result.
    pub fn load(config: &OcrConfig) -> Result<Self, OcrError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.easyocr_timeout_secs))
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("Failed to create HTTP client: {}", e)))?;

        let model = Self {
            client,
            base_url: config.easyocr_url.trim_end_matches('/').to_string(),
            languages: config
                .languages
                .iter()
                .map(|l| easyocr_language(l))
                .collect(),
        };

        let url = format!("{}/load", model.base_url);
        let response = model
            .client
            .post(&url)
            .json(&LoadRequest {
                languages: &model.languages,
            })
            .send()
            .map_err(|e| OcrError::ModelLoad(format!("Failed to reach EasyOCR at {}: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(OcrError::ModelLoad(format!(
                "EasyOCR returned {}: {}",
                status, body
            )));
        }

        tracing::info!(languages = ?model.languages, "EasyOCR model loaded");
        Ok(model)
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }
}

impl NeuralModel for EasyOcrModel {
    fn read_text(&self, image: &PreprocessedImage) -> Result<RecognitionResult, OcrError> {
        let png = image
            .to_png()
            .map_err(|e| OcrError::ImageEncoding(e.to_string()))?;

        let request = ReadRequest {
            image_base64: base64::engine::general_purpose::STANDARD.encode(png),
            languages: &self.languages,
        };

        let response = self
            .client
            .post(format!("{}/readtext", self.base_url))
            .json(&request)
            .send()
            .map_err(|e| OcrError::ApiError(format!("Failed to call EasyOCR: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(OcrError::Engine(format!(
                "EasyOCR returned {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .map_err(|e| OcrError::ApiError(format!("Failed to read response: {}", e)))?;

        parse_read_response(&body)
    }
}

/// Turn a `readtext` response body into fragments, keeping detection order
fn parse_read_response(body: &str) -> Result<RecognitionResult, OcrError> {
    let parsed: ReadResponse = serde_json::from_str(body)
        .map_err(|e| OcrError::ApiError(format!("Failed to parse response: {}", e)))?;

    Ok(RecognitionResult::new(
        parsed
            .boxes
            .into_iter()
            .map(|b| TextFragment {
                text: b.text,
                confidence: b.score,
                bbox: if b.bbox.is_empty() { None } else { Some(b.bbox) },
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_detection_order() {
        let body = r#"{
            "boxes": [
                {"box": [[10, 5], [80, 5], [80, 20], [10, 20]], "text": "Hello", "score": 0.98},
                {"box": [[90, 5], [150, 5], [150, 20], [90, 20]], "text": "World", "score": 0.91}
            ]
        }"#;
        let result = parse_read_response(body).unwrap();
        assert_eq!(result.joined_text(), "Hello World");
        assert_eq!(result.fragments[0].confidence, Some(0.98));
        assert_eq!(result.fragments[1].bbox.as_ref().map(|b| b.len()), Some(4));
    }

    #[test]
    fn test_parse_empty_page() {
        let result = parse_read_response(r#"{"boxes": []}"#).unwrap();
        assert!(result.fragments.is_empty());
        assert_eq!(result.joined_text(), "");
    }

    #[test]
    fn test_parse_tolerates_missing_geometry() {
        let result = parse_read_response(r#"{"boxes": [{"text": "வணக்கம்"}]}"#).unwrap();
        assert_eq!(result.fragments[0].text, "வணக்கம்");
        assert_eq!(result.fragments[0].bbox, None);
        assert_eq!(result.fragments[0].confidence, None);
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        assert!(matches!(
            parse_read_response("<html>502</html>"),
            Err(OcrError::ApiError(_))
        ));
    }

    #[test]
    fn test_load_fails_without_sidecar() {
        let config = OcrConfig {
            easyocr_url: "http://127.0.0.1:9".to_string(),
            easyocr_timeout_secs: 2,
            ..OcrConfig::default()
        };
        assert!(matches!(
            EasyOcrModel::load(&config),
            Err(OcrError::ModelLoad(_))
        ));
    }
}
