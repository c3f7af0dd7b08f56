//! Result types returned by the library.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which tier of the fallback chain produced the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryTier {
    /// Embedded text layer, summarised by the text model.
    DirectText,
    /// OCR text, summarised by the text model.
    Ocr,
    /// First page image, summarised by the vision model.
    Vision,
}

impl SummaryTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryTier::DirectText => "direct_text",
            SummaryTier::Ocr => "ocr",
            SummaryTier::Vision => "vision",
        }
    }
}

impl fmt::Display for SummaryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one successful summarisation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// The model's free-text answer, returned to the caller as-is.
    pub answer: String,
    /// Tier that produced the answer.
    pub tier: SummaryTier,
    /// Characters of extracted text sent to the text model (0 for vision).
    pub extracted_chars: usize,
    pub input_tokens: usize,
    pub output_tokens: usize,
    /// Wall-clock time for the whole request.
    pub duration_ms: u64,
}

/// One PDF in the uploads folder, as listed by `GET /uploads`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub filename: String,
    /// Size in MiB, rounded to two decimals.
    pub size_mb: f64,
}

/// A model reply with token usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl ModelReply {
    /// Reply with no token accounting; handy for mocks.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}
