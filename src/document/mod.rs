//! Document pipeline
//!
//! Routes each uploaded file to the right extraction path:
//!
//! ```text
//!              DocumentPipeline::process_document
//!                           │
//!           ┌───────────────┴───────────────┐
//!           ▼ .pdf                          ▼ .jpg / .jpeg / .png
//!   ┌──────────────────┐            ┌──────────────────┐
//!   │ PdfTextResolver  │            │  decode image    │
//!   │ native text, or  │            └────────┬─────────┘
//!   │ rasterize + OCR  │                     ▼
//!   └────────┬─────────┘            preprocess ─▶ Recognizer
//!            ▼                               ▼
//!         trimmed text                 trimmed text
//! ```

mod pipeline;
mod types;

pub use pipeline::DocumentPipeline;
pub use types::{DocumentFile, DocumentKind};
