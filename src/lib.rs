//! # ecosummarize
//!
//! Summarise uploaded PDF documents in Vietnamese, as bullet points, with a
//! hosted language model.
//!
//! ## Why three tiers?
//!
//! Digitally-produced PDFs carry a text layer that is free to read. Scanned
//! PDFs do not, but OCR recovers their text cheaply. Some pages defeat OCR
//! (handwriting, photos, odd scripts); for those a vision model can still
//! read the first page directly. Each tier only runs when the previous one
//! came up empty.
//!
//! ## Pipeline Overview
//!
//! ```text
//! filename
//!  │
//!  ├─ 1. Input   resolve inside the flat uploads folder (400 / 404 here)
//!  ├─ 2. Text    embedded text layer via pdfium
//!  ├─ 3. OCR     render every page, tesseract each image      (if 2 empty)
//!  ├─ 4. Model   text model on the extracted text              (if 2 or 3 non-empty)
//!  └─ 4'. Vision render page 1 → base64 PNG → vision model     (if 2 and 3 empty)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ecosummarize::{PdfiumEngine, ProviderModel, Summarizer, SummarizerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SummarizerConfig::default();
//!     let engine = Arc::new(PdfiumEngine::bind(config.max_rendered_pixels)?);
//!     let model = Arc::new(ProviderModel::from_config(&config)?);
//!     let summarizer = Summarizer::builder(config)
//!         .pdfium(engine)
//!         .model(model)
//!         .build()?;
//!
//!     let summary = summarizer.summarize(Some("report.pdf")).await?;
//!     println!("{}", summary.answer);
//!     Ok(())
//! }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PageSelection, SummarizerConfig, SummarizerConfigBuilder};
pub use error::{ExtractionError, ModelError, SummarizeError, VisionError};
pub use output::{DocumentEntry, ModelReply, Summary, SummaryTier};
pub use pipeline::llm::{ProviderModel, SummaryModel};
pub use pipeline::ocr::{OcrEngine, TesseractEngine};
pub use pipeline::render::{PageRenderer, PdfiumEngine};
pub use pipeline::text::TextLayer;
pub use pipeline::{TextSource, TierOutcome};
pub use server::router;
pub use summarize::{ensure_uploads_dir, Summarizer, SummarizerBuilder};
