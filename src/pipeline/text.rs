//! Direct text extraction from the embedded text layer.

use crate::error::ExtractionError;
use crate::output::SummaryTier;
use crate::pipeline::{TextSource, TierOutcome};
use std::path::Path;
use std::sync::Arc;

/// Page-indexed access to a PDF's embedded text.
pub trait TextLayer: Send + Sync {
    /// Text of every page in order. A page that fails to read yields `""`.
    ///
    /// Returns `Err` only when the document itself cannot be opened.
    fn page_texts(&self, pdf_path: &Path) -> Result<Vec<String>, ExtractionError>;
}

/// First tier: read what the PDF already carries as text.
pub struct DirectTextExtractor {
    layer: Arc<dyn TextLayer>,
}

impl DirectTextExtractor {
    pub fn new(layer: Arc<dyn TextLayer>) -> Self {
        Self { layer }
    }
}

impl TextSource for DirectTextExtractor {
    fn tier(&self) -> SummaryTier {
        SummaryTier::DirectText
    }

    fn extract(&self, pdf_path: &Path) -> TierOutcome {
        match self.layer.page_texts(pdf_path) {
            Ok(pages) => TierOutcome::collected(join_pages(&pages), None),
            Err(e) => TierOutcome::collected(String::new(), Some(e)),
        }
    }
}

/// Concatenate non-empty pages, each followed by a newline.
fn join_pages(pages: &[String]) -> String {
    let mut buffer = String::new();
    for page in pages.iter().filter(|p| !p.is_empty()) {
        buffer.push_str(page);
        buffer.push('\n');
    }
    buffer
}
