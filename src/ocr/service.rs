//! Recognizer factory
//!
//! Reads the static engine choice once and builds the matching strategy.

use std::sync::Arc;

use super::easyocr::EasyOcrModel;
use super::provider::{
    NeuralModel, NeuralRecognizer, Recognizer, SerializedModel, TesseractRecognizer,
};
use super::types::{OcrEngine, OcrError};
use crate::config::OcrConfig;

/// Build the recognizer selected by configuration.
///
/// For the neural engine a preloaded `model` is used when supplied;
/// otherwise the EasyOCR reader is loaded here, once. With
/// `easyocr_serialize` set, calls into the model are made one at a time.
pub fn build_recognizer(
    config: &OcrConfig,
    model: Option<Arc<dyn NeuralModel>>,
) -> Result<Arc<dyn Recognizer>, OcrError> {
    match config.engine {
        OcrEngine::Tesseract => {
            let recognizer = TesseractRecognizer::new(&config.tesseract_cmd, &config.languages);
            if !recognizer.is_available() {
                tracing::warn!(
                    "Tesseract not found at '{}', recognition will fail until it is installed",
                    config.tesseract_cmd
                );
            }
            tracing::info!(languages = recognizer.languages(), "Using Tesseract OCR");
            Ok(Arc::new(recognizer))
        }
        OcrEngine::EasyOcr => {
            let model = match model {
                Some(model) => model,
                None => Arc::new(EasyOcrModel::load(config)?),
            };
            let model: Arc<dyn NeuralModel> = if config.easyocr_serialize {
                Arc::new(SerializedModel::new(model))
            } else {
                model
            };
            tracing::info!(serialized = config.easyocr_serialize, "Using EasyOCR");
            Ok(Arc::new(NeuralRecognizer::new(model)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::provider::MockModel;
    use crate::ocr::RecognitionResult;
    use crate::preprocess::{preprocess, PreprocessedImage};
    use image::{DynamicImage, GrayImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records the highest number of overlapping `read_text` calls
    #[derive(Default)]
    struct OverlapCounter {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl NeuralModel for OverlapCounter {
        fn read_text(&self, _image: &PreprocessedImage) -> Result<RecognitionResult, OcrError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(RecognitionResult::default())
        }
    }

    #[test]
    fn test_builds_tesseract_by_default() {
        let recognizer = build_recognizer(&OcrConfig::default(), None).unwrap();
        assert_eq!(recognizer.engine(), OcrEngine::Tesseract);
    }

    #[test]
    fn test_builds_neural_with_supplied_model() {
        let config = OcrConfig {
            engine: OcrEngine::EasyOcr,
            ..OcrConfig::default()
        };
        let model: Arc<dyn NeuralModel> = Arc::new(MockModel {
            fragments: vec!["x"],
            fail: false,
        });
        let recognizer = build_recognizer(&config, Some(model)).unwrap();
        assert_eq!(recognizer.engine(), OcrEngine::EasyOcr);
    }

    #[test]
    fn test_neural_calls_are_serialized_by_default() {
        let counter = Arc::new(OverlapCounter::default());
        let config = OcrConfig {
            engine: OcrEngine::EasyOcr,
            ..OcrConfig::default()
        };
        let model: Arc<dyn NeuralModel> = counter.clone();
        let recognizer = build_recognizer(&config, Some(model)).unwrap();
        let page = preprocess(&DynamicImage::ImageLuma8(GrayImage::new(8, 8)));

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| recognizer.recognize(&page).unwrap());
            }
        });

        assert_eq!(counter.peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_neural_without_sidecar_fails_to_load() {
        let config = OcrConfig {
            engine: OcrEngine::EasyOcr,
            easyocr_url: "http://127.0.0.1:9".to_string(),
            easyocr_timeout_secs: 2,
            ..OcrConfig::default()
        };
        assert!(matches!(
            build_recognizer(&config, None),
            Err(OcrError::ModelLoad(_))
        ));
    }
}
