//! Batch runner
//!
//! Processes uploaded documents one after another with a shared pipeline.
//! A failure is recorded against its document and never stops the batch.

use serde::Serialize;

use crate::config::BatchConfig;
use crate::document::{DocumentFile, DocumentPipeline};

const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Skipped,
    Failed,
}

/// Outcome for one document
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub filename: String,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl DocumentReport {
    fn success(filename: &str, text: String) -> Self {
        Self {
            filename: filename.to_string(),
            status: ReportStatus::Success,
            text: Some(text),
            reason: None,
        }
    }

    fn skipped(filename: &str, reason: String) -> Self {
        Self {
            filename: filename.to_string(),
            status: ReportStatus::Skipped,
            text: None,
            reason: Some(reason),
        }
    }

    fn failed(filename: &str, reason: String) -> Self {
        Self {
            filename: filename.to_string(),
            status: ReportStatus::Failed,
            text: None,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub documents: Vec<DocumentReport>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.documents.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(ReportStatus::Success)
    }

    pub fn failed(&self) -> usize {
        self.count(ReportStatus::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, status: ReportStatus) -> usize {
        self.documents.iter().filter(|d| d.status == status).count()
    }
}

pub struct BatchProcessor<'a> {
    pipeline: &'a DocumentPipeline,
    max_file_size: u64,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(pipeline: &'a DocumentPipeline, config: &BatchConfig) -> Self {
        Self {
            pipeline,
            max_file_size: config.max_file_size_mb.saturating_mul(BYTES_PER_MB),
        }
    }

    pub fn process(&self, files: &[DocumentFile]) -> BatchSummary {
        let documents = files.iter().map(|file| self.process_one(file)).collect();
        let summary = BatchSummary { documents };

        tracing::info!(
            total = summary.total(),
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "Batch finished"
        );
        summary
    }

    fn process_one(&self, file: &DocumentFile) -> DocumentReport {
        let size = file.size() as u64;
        if size > self.max_file_size {
            let reason = format!(
                "File too large ({:.1}MB)",
                size as f64 / BYTES_PER_MB as f64
            );
            tracing::warn!(filename = %file.name, "Skipping: {}", reason);
            return DocumentReport::skipped(&file.name, reason);
        }

        match self.pipeline.process_document(file) {
            Ok(text) if text.trim().is_empty() => {
                tracing::warn!(filename = %file.name, "No text extracted");
                DocumentReport::skipped(&file.name, "No text extracted".to_string())
            }
            Ok(text) => {
                tracing::info!(
                    filename = %file.name,
                    chars = text.chars().count(),
                    "Document processed"
                );
                DocumentReport::success(&file.name, text)
            }
            Err(e) => {
                tracing::error!(filename = %file.name, stage = e.stage(), "Processing failed: {}", e);
                DocumentReport::failed(&file.name, e.to_string())
            }
        }
    }
}
