//! Configuration types for the summarisation service.
//!
//! Every knob lives in [`SummarizerConfig`], built via its
//! [`SummarizerConfigBuilder`]. The config is created once at startup and is
//! read-only afterwards; the collaborators it configures (PDF engine, OCR
//! engine, LLM provider) are attached separately through
//! [`crate::Summarizer::builder`] so tests can swap them for mocks.

use crate::error::SummarizeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the summarisation pipeline and HTTP front end.
///
/// # Example
/// ```rust
/// use ecosummarize::SummarizerConfig;
///
/// let config = SummarizerConfig::builder()
///     .uploads_dir("/srv/pdfs")
///     .ocr_language("vie+eng")
///     .build()
///     .unwrap();
/// assert_eq!(config.text_model, "gpt-3.5-turbo");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Flat folder holding the uploaded PDFs. Default: `uploads`.
    pub uploads_dir: PathBuf,

    /// Folder holding the static front end (`index.html`). Default: `frontend`.
    pub frontend_dir: PathBuf,

    /// LLM provider name passed to `ProviderFactory`. Default: `openai`.
    pub provider_name: String,

    /// Model used to summarise extracted text. Default: `gpt-3.5-turbo`.
    pub text_model: String,

    /// Vision-capable model used when no text could be extracted. Default: `gpt-4o-mini`.
    ///
    /// Must accept image attachments; a text-only model will reject the request.
    pub vision_model: String,

    /// Sampling temperature. `None` leaves the provider default in place.
    pub temperature: Option<f32>,

    /// Maximum output tokens per model call. `None` leaves the provider default.
    pub max_tokens: Option<usize>,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    ///
    /// Applies to both OCR and vision renders. Tesseract reads 2000 px pages
    /// well, and the vision request stays far below upload limits.
    pub max_rendered_pixels: u32,

    /// Tesseract language string, e.g. `eng` or `vie+eng`. Default: `eng`.
    pub ocr_language: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("uploads"),
            frontend_dir: PathBuf::from("frontend"),
            provider_name: "openai".to_string(),
            text_model: "gpt-3.5-turbo".to_string(),
            vision_model: "gpt-4o-mini".to_string(),
            temperature: None,
            max_tokens: None,
            max_rendered_pixels: 2000,
            ocr_language: "eng".to_string(),
        }
    }
}

impl SummarizerConfig {
    /// Create a new builder for `SummarizerConfig`.
    pub fn builder() -> SummarizerConfigBuilder {
        SummarizerConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SummarizerConfig`].
#[derive(Debug)]
pub struct SummarizerConfigBuilder {
    config: SummarizerConfig,
}

impl SummarizerConfigBuilder {
    pub fn uploads_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.uploads_dir = dir.into();
        self
    }

    pub fn frontend_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.frontend_dir = dir.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.config.text_model = model.into();
        self
    }

    pub fn vision_model(mut self, model: impl Into<String>) -> Self {
        self.config.vision_model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = Some(n);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SummarizerConfig, SummarizeError> {
        let c = &self.config;
        if c.provider_name.trim().is_empty() {
            return Err(SummarizeError::InvalidConfig(
                "Provider name must not be empty".into(),
            ));
        }
        if c.text_model.trim().is_empty() || c.vision_model.trim().is_empty() {
            return Err(SummarizeError::InvalidConfig(
                "Text and vision model names must not be empty".into(),
            ));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(SummarizeError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        if c.max_tokens == Some(0) {
            return Err(SummarizeError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which pages of a PDF to rasterise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Every page, in order (OCR tier). Default.
    #[default]
    All,
    /// A single page (1-indexed). The vision tier uses `Single(1)`.
    Single(usize),
}

impl PageSelection {
    /// Expand the selection into a sorted list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
        }
    }
}
