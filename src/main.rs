//! Scanlens
//!
//! Extracts text from scanned PDFs and images.
//!
//! Usage: `scanlens [--json] <file>...`

use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scanlens::batch::{BatchProcessor, BatchSummary, ReportStatus};
use scanlens::extraction::{extract_or_fallback, KeywordClassifier};
use scanlens::{Config, DocumentFile, DocumentPipeline};

struct Args {
    json: bool,
    files: Vec<String>,
}

impl Args {
    fn parse() -> anyhow::Result<Self> {
        let mut json = false;
        let mut files = Vec::new();
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--json" => json = true,
                "-h" | "--help" => anyhow::bail!("usage: scanlens [--json] <file>..."),
                _ => files.push(arg),
            }
        }
        if files.is_empty() {
            anyhow::bail!("usage: scanlens [--json] <file>...");
        }
        Ok(Self { json, files })
    }
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scanlens=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run() {
        Ok(summary) if summary.has_failures() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<BatchSummary> {
    let args = Args::parse()?;

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting Scanlens v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "OCR engine: {} ({})",
        config.ocr.engine,
        config.ocr.languages.join(",")
    );

    // The recognizer is built once and shared by every document
    let pipeline = DocumentPipeline::from_config(&config, None)
        .context("Failed to initialize OCR engine")?;

    let files = args
        .files
        .iter()
        .map(|path| {
            DocumentFile::from_path(path).with_context(|| format!("Failed to read {}", path))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let summary = BatchProcessor::new(&pipeline, &config.batch).process(&files);

    if args.json {
        let report: Vec<_> = summary
            .documents
            .iter()
            .map(|doc| {
                let fields = doc
                    .text
                    .as_deref()
                    .map(|text| extract_or_fallback(&KeywordClassifier, text));
                serde_json::json!({ "report": doc, "fields": fields })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for doc in &summary.documents {
            match doc.status {
                ReportStatus::Success => {
                    println!("==> {} <==", doc.filename);
                    println!("{}", doc.text.as_deref().unwrap_or_default());
                }
                ReportStatus::Skipped | ReportStatus::Failed => {
                    eprintln!(
                        "{}: {:?}: {}",
                        doc.filename,
                        doc.status,
                        doc.reason.as_deref().unwrap_or_default()
                    );
                }
            }
        }
    }

    tracing::info!(
        "Processed {}/{} documents",
        summary.succeeded(),
        summary.total()
    );
    Ok(summary)
}
