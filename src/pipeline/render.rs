//! PDF rasterisation and the pdfium-backed PDF engine.
//!
//! ## Why one shared engine?
//!
//! pdfium-render keeps its library bindings in process-global state, so the
//! library is bound exactly once at startup and the resulting [`PdfiumEngine`]
//! is shared behind an `Arc`. The `thread_safe` feature serialises calls into
//! pdfium; `sync` lets the engine cross thread boundaries. All methods are
//! blocking and are called from `spawn_blocking`.
//!
//! ## Why cap pixels, not DPI?
//!
//! Page sizes vary wildly: an A0 poster at 150 DPI would produce a
//! 12,000 × 17,000 px image. `max_rendered_pixels` caps the longest edge
//! regardless of physical size, keeping memory bounded for both tesseract and
//! the vision request.

use crate::config::PageSelection;
use crate::error::{ExtractionError, SummarizeError};
use crate::pipeline::text::TextLayer;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Something that can rasterise pages of a PDF.
pub trait PageRenderer: Send + Sync {
    /// Render the selected pages in page order.
    ///
    /// # Returns
    /// A vector of `(page_index_0based, DynamicImage)` tuples. Out-of-range
    /// selections yield an empty vector, not an error.
    fn render(
        &self,
        pdf_path: &Path,
        selection: PageSelection,
    ) -> Result<Vec<(usize, DynamicImage)>, ExtractionError>;
}

/// The pdfium library, bound once, serving both the text layer and rendering.
pub struct PdfiumEngine {
    pdfium: Pdfium,
    max_rendered_pixels: u32,
}

impl PdfiumEngine {
    pub fn new(pdfium: Pdfium, max_rendered_pixels: u32) -> Self {
        Self {
            pdfium,
            max_rendered_pixels,
        }
    }

    /// Bind to pdfium, downloading and caching the library on first use.
    ///
    /// Blocking: may perform a ~30 MB download.
    pub fn bind(max_rendered_pixels: u32) -> Result<Self, SummarizeError> {
        let pdfium = pdfium_auto::bind_pdfium_silent()
            .map_err(|e| SummarizeError::PdfiumBindingFailed(e.to_string()))?;
        info!("PDFium bound");
        Ok(Self::new(pdfium, max_rendered_pixels))
    }

    fn open<'a>(&'a self, pdf_path: &Path) -> Result<PdfDocument<'a>, ExtractionError> {
        self.pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| ExtractionError::OpenFailed {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })
    }
}

impl PageRenderer for PdfiumEngine {
    fn render(
        &self,
        pdf_path: &Path,
        selection: PageSelection,
    ) -> Result<Vec<(usize, DynamicImage)>, ExtractionError> {
        let document = self.open(pdf_path)?;
        let pages = document.pages();
        let total_pages = pages.len() as usize;
        let page_indices = selection.to_indices(total_pages);
        debug!(
            "Rendering {} of {} pages from {}",
            page_indices.len(),
            total_pages,
            pdf_path.display()
        );

        let render_config = PdfRenderConfig::new()
            .set_target_width(self.max_rendered_pixels as i32)
            .set_maximum_height(self.max_rendered_pixels as i32);

        let mut results = Vec::with_capacity(page_indices.len());

        for idx in page_indices {
            let page = pages
                .get(idx as u16)
                .map_err(|e| ExtractionError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                ExtractionError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );

            results.push((idx, image));
        }

        Ok(results)
    }
}

impl TextLayer for PdfiumEngine {
    fn page_texts(&self, pdf_path: &Path) -> Result<Vec<String>, ExtractionError> {
        let document = self.open(pdf_path)?;

        let texts = document
            .pages()
            .iter()
            .enumerate()
            .map(|(idx, page)| match page.text() {
                Ok(text) => text.all(),
                Err(e) => {
                    warn!("Page {}: text layer unreadable: {:?}", idx + 1, e);
                    String::new()
                }
            })
            .collect::<Vec<_>>();

        debug!("Read text layer of {} pages", texts.len());
        Ok(texts)
    }
}
