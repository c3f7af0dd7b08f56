//! Pipeline stages for PDF summarisation.
//!
//! Each submodule implements exactly one step, behind a trait where an
//! external library sits, so every tier can be tested with mocks.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─ text ──(non-empty)──────────────┐
//! input ──▶  │                                   ├──▶ llm (text model)
//!            └─ ocr ───(non-empty)──────────────┘
//!                 │
//!              (empty)
//!                 ▼
//!            vision: render page 1 ──▶ encode ──▶ llm (vision model)
//! ```
//!
//! 1. [`input`]  — resolve a filename inside the uploads folder; list PDFs
//! 2. [`text`]   — embedded text layer, page by page
//! 3. [`render`] — rasterise pages via pdfium (blocking, run in `spawn_blocking`)
//! 4. [`ocr`]    — tesseract over every rendered page
//! 5. [`llm`]    — the two model calls (text summary, page-image summary)
//! 6. [`vision`] — the last-resort tier: render page 1, PNG-encode it, call 5
//!
//! Tiers 2 and 4 are [`TextSource`]s tried in order by [`run_text_chain`].

pub mod input;
pub mod llm;
pub mod ocr;
pub mod render;
pub mod text;
pub mod vision;

use crate::error::ExtractionError;
use crate::output::SummaryTier;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of running one text-producing tier.
///
/// `Empty` and `Failed` both make the chain move on, but they stay distinct
/// so logs and tests can tell "the library found nothing" from "the library
/// threw".
#[derive(Debug)]
pub enum TierOutcome {
    /// Non-blank text, one `\n`-terminated fragment per page.
    Text(String),
    /// The tier ran cleanly and found nothing.
    Empty,
    /// The tier hit an error; `partial` holds whatever was gathered first.
    Failed {
        partial: String,
        error: ExtractionError,
    },
}

impl TierOutcome {
    /// Classify a buffer built by a tier, with the error that stopped it (if any).
    pub fn collected(buffer: String, error: Option<ExtractionError>) -> Self {
        match error {
            Some(error) => TierOutcome::Failed {
                partial: buffer,
                error,
            },
            None if buffer.trim().is_empty() => TierOutcome::Empty,
            None => TierOutcome::Text(buffer),
        }
    }

    /// Raw text produced by the tier, partial text included.
    pub fn text(&self) -> &str {
        match self {
            TierOutcome::Text(t) => t,
            TierOutcome::Empty => "",
            TierOutcome::Failed { partial, .. } => partial,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TierOutcome::Failed { .. })
    }
}

/// A tier that turns a PDF on disk into text.
///
/// Implementations are blocking; callers run them inside `spawn_blocking`.
/// They must never panic on a bad document: every library error is returned
/// as [`TierOutcome::Failed`].
pub trait TextSource: Send + Sync {
    /// Tier reported when this source yields the text.
    fn tier(&self) -> SummaryTier;

    /// Extract text from the document at `pdf_path`.
    fn extract(&self, pdf_path: &Path) -> TierOutcome;
}

/// Text gathered by the chain and the tier that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainResult {
    /// Trimmed text; empty when every source came up blank.
    pub text: String,
    /// `None` when the buffer is still empty after every source.
    pub tier: Option<SummaryTier>,
}

/// Try each source in order, appending to one buffer, and stop at the
/// first point where the buffer is non-blank.
pub fn run_text_chain(sources: &[Arc<dyn TextSource>], pdf_path: &Path) -> ChainResult {
    let mut buffer = String::new();

    for (i, source) in sources.iter().enumerate() {
        let tier = source.tier();
        let outcome = source.extract(pdf_path);

        match &outcome {
            TierOutcome::Text(t) => debug!("{} tier produced {} chars", tier, t.len()),
            TierOutcome::Empty => info!("{} tier found no text", tier),
            TierOutcome::Failed { partial, error } => warn!(
                "{} tier failed after {} chars: {}",
                tier,
                partial.len(),
                error
            ),
        }

        buffer.push_str(outcome.text());

        let trimmed = buffer.trim();
        if !trimmed.is_empty() {
            return ChainResult {
                text: trimmed.to_string(),
                tier: Some(tier),
            };
        }

        if let Some(next) = sources.get(i + 1) {
            info!("No text from {} tier, switching to {}", tier, next.tier());
        }
    }

    ChainResult {
        text: String::new(),
        tier: None,
    }
}
