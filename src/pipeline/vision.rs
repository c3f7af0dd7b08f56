//! Last-resort tier: let a vision model read the first page directly.
//!
//! Only page 1 is rendered, which bounds the cost of a scanned document to
//! one image. The answer from this tier is returned as-is; no second text
//! summarisation call follows.

use crate::config::PageSelection;
use crate::error::{ExtractionError, VisionError};
use crate::output::ModelReply;
use crate::pipeline::llm::SummaryModel;
use crate::pipeline::render::PageRenderer;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub struct VisionSummarizer {
    renderer: Arc<dyn PageRenderer>,
}

impl VisionSummarizer {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }

    /// Render page 1, encode it, and ask `model` for the summary.
    pub async fn summarize(
        &self,
        pdf_path: &Path,
        model: &dyn SummaryModel,
    ) -> Result<ModelReply, VisionError> {
        let renderer = Arc::clone(&self.renderer);
        let path = pdf_path.to_path_buf();

        let pages = tokio::task::spawn_blocking(move || {
            renderer.render(&path, PageSelection::Single(1))
        })
        .await
        .map_err(|e| ExtractionError::Task(format!("render task panicked: {e}")))??;

        let (_, first) = pages.into_iter().next().ok_or(ExtractionError::NoPages)?;
        let image = page_attachment(&first)?;

        let reply = model.summarize_page(image).await?;
        if reply.content.trim().is_empty() {
            return Err(VisionError::EmptyAnswer);
        }
        Ok(reply)
    }
}

/// PNG-encode a rendered page as a base64 attachment.
///
/// pdfium renders opaque pages, so the alpha channel is dropped before
/// encoding; `detail: "high"` keeps small print legible to the model.
fn page_attachment(page: &DynamicImage) -> Result<ImageData, ExtractionError> {
    let rgb = page.to_rgb8();
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;
    debug!(
        "Page 1 as PNG: {}x{} px, {} bytes, calling vision model",
        rgb.width(),
        rgb.height(),
        png.len()
    );
    Ok(ImageData::new(STANDARD.encode(&png), "image/png").with_detail("high"))
}
