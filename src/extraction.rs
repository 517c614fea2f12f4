//! Structured field extraction
//!
//! Turns extracted document text into a typed record. Extractors are
//! pluggable; a keyword classifier ships in-crate, and replies from an
//! external language model can be parsed with
//! [`ExtractedDocument::from_model_reply`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field extraction errors
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Extractor unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed extractor reply: {0}")]
    MalformedReply(String),
}

/// Document category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Invoice,
    Receipt,
    Contract,
    Letter,
    Form,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedFields {
    pub names: Vec<String>,
    pub dates: Vec<String>,
    pub amounts: Vec<String>,
    pub addresses: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub email_addresses: Vec<String>,
    pub key_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    pub language: String,
    pub page_count: u32,
    pub word_count: usize,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            language: "unknown".to_string(),
            page_count: 1,
            word_count: 0,
        }
    }
}

/// Structured view of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedDocument {
    pub document_type: DocumentType,
    pub confidence_score: f64,
    pub extracted_fields: ExtractedFields,
    pub summary: String,
    pub metadata: DocumentMetadata,
}

impl ExtractedDocument {
    /// Low-confidence record used when no extractor result is available
    pub fn fallback(text: &str) -> Self {
        let word_count = text.split_whitespace().count();
        Self {
            document_type: DocumentType::Other,
            confidence_score: 0.5,
            extracted_fields: ExtractedFields::default(),
            summary: format!(
                "Document processed with basic extraction. Contains approximately {} words.",
                word_count
            ),
            metadata: DocumentMetadata {
                word_count,
                ..Default::default()
            },
        }
    }

    /// Parse a model reply that should be JSON but may be wrapped in prose.
    ///
    /// Missing keys take their defaults; the outermost `{...}` span is tried
    /// when the reply as a whole does not parse.
    pub fn from_model_reply(reply: &str) -> Result<Self, ExtractionError> {
        if let Ok(doc) = serde_json::from_str::<Self>(reply) {
            return Ok(doc.clamped());
        }

        let start = reply.find('{');
        let end = reply.rfind('}');
        match (start, end) {
            (Some(start), Some(end)) if end > start => {
                serde_json::from_str::<Self>(&reply[start..=end])
                    .map(Self::clamped)
                    .map_err(|e| ExtractionError::MalformedReply(e.to_string()))
            }
            _ => Err(ExtractionError::MalformedReply(
                "no JSON object in reply".to_string(),
            )),
        }
    }

    fn clamped(mut self) -> Self {
        self.confidence_score = self.confidence_score.clamp(0.0, 1.0);
        self
    }
}

/// Maps document text to structured fields
pub trait FieldExtractor: Send + Sync {
    fn extract_fields(&self, text: &str) -> Result<ExtractedDocument, ExtractionError>;
}

/// Run an extractor, substituting [`ExtractedDocument::fallback`] on failure
pub fn extract_or_fallback(extractor: &dyn FieldExtractor, text: &str) -> ExtractedDocument {
    match extractor.extract_fields(text) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "Field extraction failed, using fallback");
            ExtractedDocument::fallback(text)
        }
    }
}

/// Classify documents by keywords
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    const RULES: [(DocumentType, &'static [&'static str]); 5] = [
        (DocumentType::Invoice, &["invoice", "bill", "amount due", "total:"]),
        (DocumentType::Receipt, &["receipt", "paid", "transaction", "purchase"]),
        (DocumentType::Contract, &["contract", "agreement", "terms", "party"]),
        (DocumentType::Letter, &["dear", "sincerely", "regards"]),
        (DocumentType::Form, &["form", "application", "please fill"]),
    ];

    /// First rule with a matching keyword wins
    pub fn classify(text: &str) -> DocumentType {
        let lower = text.to_lowercase();
        Self::RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(kind, _)| *kind)
            .unwrap_or(DocumentType::Other)
    }
}

impl FieldExtractor for KeywordClassifier {
    fn extract_fields(&self, text: &str) -> Result<ExtractedDocument, ExtractionError> {
        let mut doc = ExtractedDocument::fallback(text);
        doc.document_type = Self::classify(text);
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingExtractor;

    impl FieldExtractor for FailingExtractor {
        fn extract_fields(&self, _text: &str) -> Result<ExtractedDocument, ExtractionError> {
            Err(ExtractionError::Unavailable("no model configured".to_string()))
        }
    }

    #[test]
    fn test_fallback_counts_words() {
        let doc = ExtractedDocument::fallback("Total due:  42.00\nThank you");
        assert_eq!(doc.document_type, DocumentType::Other);
        assert_eq!(doc.confidence_score, 0.5);
        assert_eq!(doc.metadata.word_count, 5);
        assert_eq!(doc.metadata.language, "unknown");
        assert_eq!(doc.metadata.page_count, 1);
        assert!(doc.summary.contains("approximately 5 words"));
        assert!(doc.extracted_fields.names.is_empty());
    }

    #[test]
    fn test_fallback_on_empty_text() {
        assert_eq!(ExtractedDocument::fallback("").metadata.word_count, 0);
    }

    #[test]
    fn test_extract_or_fallback_on_failure() {
        let doc = extract_or_fallback(&FailingExtractor, "one two three");
        assert_eq!(doc, ExtractedDocument::fallback("one two three"));
    }

    #[test]
    fn test_keyword_classifier() {
        assert_eq!(
            KeywordClassifier::classify("INVOICE #1001\nAmount due: $40"),
            DocumentType::Invoice
        );
        assert_eq!(
            KeywordClassifier::classify("Dear Sir, ... Sincerely"),
            DocumentType::Letter
        );
        assert_eq!(KeywordClassifier::classify("லண்டன்"), DocumentType::Other);

        let doc = extract_or_fallback(&KeywordClassifier, "Rental agreement between parties");
        assert_eq!(doc.document_type, DocumentType::Contract);
        assert_eq!(doc.metadata.word_count, 4);
    }

    #[test]
    fn test_model_reply_defaults_missing_keys() {
        let doc = ExtractedDocument::from_model_reply(
            r#"{"document_type": "receipt", "confidence_score": 0.9,
                "extracted_fields": {"amounts": ["$12.50"]}}"#,
        )
        .unwrap();
        assert_eq!(doc.document_type, DocumentType::Receipt);
        assert_eq!(doc.extracted_fields.amounts, vec!["$12.50"]);
        assert!(doc.extracted_fields.dates.is_empty());
        assert_eq!(doc.metadata.page_count, 1);
    }

    #[test]
    fn test_model_reply_wrapped_in_prose() {
        let doc = ExtractedDocument::from_model_reply(
            "Here is the JSON:\n{\"document_type\": \"memo\", \"confidence_score\": 3}\nDone.",
        )
        .unwrap();
        assert_eq!(doc.document_type, DocumentType::Other);
        assert_eq!(doc.confidence_score, 1.0);
    }

    #[test]
    fn test_model_reply_without_json() {
        assert!(matches!(
            ExtractedDocument::from_model_reply("I cannot help with that."),
            Err(ExtractionError::MalformedReply(_))
        ));
    }

    #[test]
    fn test_serializes_lowercase_type() {
        let json = serde_json::to_value(ExtractedDocument::fallback("a b")).unwrap();
        assert_eq!(json["document_type"], "other");
        assert_eq!(json["metadata"]["word_count"], 2);
    }
}
