//! OCR tier: rasterise every page and run tesseract on each image.
//!
//! Tesseract is driven through its command-line tool. Each page is written as
//! a PNG into a private [`TempDir`] that is removed when recognition returns,
//! so no page image outlives the request.

use crate::config::PageSelection;
use crate::error::ExtractionError;
use crate::output::SummaryTier;
use crate::pipeline::render::PageRenderer;
use crate::pipeline::{TextSource, TierOutcome};
use image::DynamicImage;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;
use tempfile::TempDir;
use tracing::debug;

/// Image-to-text recognition.
pub trait OcrEngine: Send + Sync {
    /// Recognise the text on one rendered page (`page` is 1-indexed, for logs).
    fn recognize(&self, page: usize, image: &DynamicImage) -> Result<String, ExtractionError>;
}

/// Tesseract via the `tesseract` binary.
pub struct TesseractEngine {
    language: String,
}

impl TesseractEngine {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    fn run_tesseract(&self, page: usize, image_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => Err(ExtractionError::OcrFailed {
                page,
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                ExtractionError::OcrUnavailable("tesseract not found (install tesseract-ocr)".into()),
            ),
            Err(e) => Err(ExtractionError::Io(e)),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, page: usize, image: &DynamicImage) -> Result<String, ExtractionError> {
        let start = Instant::now();
        let temp_dir = TempDir::new()?;
        let image_path = temp_dir.path().join(format!("page-{page}.png"));
        image.save_with_format(&image_path, image::ImageFormat::Png)?;

        let text = self.run_tesseract(page, &image_path)?;
        debug!(
            "OCR page {}: {} chars in {}ms",
            page,
            text.len(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

/// Second tier: OCR over every page, in order.
pub struct OcrExtractor {
    renderer: Arc<dyn PageRenderer>,
    engine: Arc<dyn OcrEngine>,
}

impl OcrExtractor {
    pub fn new(renderer: Arc<dyn PageRenderer>, engine: Arc<dyn OcrEngine>) -> Self {
        Self { renderer, engine }
    }
}

impl TextSource for OcrExtractor {
    fn tier(&self) -> SummaryTier {
        SummaryTier::Ocr
    }

    /// A failure on page N keeps the text of pages 1..N.
    fn extract(&self, pdf_path: &Path) -> TierOutcome {
        let pages = match self.renderer.render(pdf_path, PageSelection::All) {
            Ok(pages) => pages,
            Err(e) => return TierOutcome::collected(String::new(), Some(e)),
        };

        let mut buffer = String::new();
        for (idx, image) in &pages {
            match self.engine.recognize(idx + 1, image) {
                Ok(text) => {
                    buffer.push_str(&text);
                    buffer.push('\n');
                }
                Err(e) => return TierOutcome::collected(buffer, Some(e)),
            }
        }

        TierOutcome::collected(buffer, None)
    }
}
