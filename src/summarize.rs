//! The summarisation pipeline: resolve, extract, summarise.
//!
//! A [`Summarizer`] is built once at startup and shared read-only between
//! request handlers. Each request runs on its own buffers; nothing carries
//! over from one request to the next.
//!
//! Per request the pipeline walks one of three paths:
//!
//! ```text
//! START → text layer (non-empty) ───────────────┐
//! START → text layer (empty) → OCR (non-empty) ─┴─▶ text model → DONE
//! START → text layer (empty) → OCR (empty) → vision model → DONE
//! any failure that is not recovered inside a tier → ERROR → DONE
//! ```

use crate::config::SummarizerConfig;
use crate::error::SummarizeError;
use crate::output::{DocumentEntry, Summary, SummaryTier};
use crate::pipeline::llm::SummaryModel;
use crate::pipeline::ocr::{OcrEngine, OcrExtractor, TesseractEngine};
use crate::pipeline::render::{PageRenderer, PdfiumEngine};
use crate::pipeline::text::{DirectTextExtractor, TextLayer};
use crate::pipeline::vision::VisionSummarizer;
use crate::pipeline::{input, run_text_chain, TextSource};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

const DEFAULT_UNCONFIGURED_HINT: &str =
    "Set the provider's API key (e.g. OPENAI_API_KEY) and restart the server.";

/// The configured pipeline.
pub struct Summarizer {
    config: SummarizerConfig,
    sources: Vec<Arc<dyn TextSource>>,
    vision: VisionSummarizer,
    model: Option<Arc<dyn SummaryModel>>,
    unconfigured_hint: String,
}

impl Summarizer {
    /// Start building a summarizer from `config`.
    pub fn builder(config: SummarizerConfig) -> SummarizerBuilder {
        SummarizerBuilder {
            config,
            text_layer: None,
            renderer: None,
            ocr: None,
            model: None,
            unconfigured_hint: DEFAULT_UNCONFIGURED_HINT.to_string(),
        }
    }

    /// Whether a language model is available.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Summarise the uploaded document called `filename`.
    ///
    /// # Errors
    /// - [`SummarizeError::MissingFilename`] / [`SummarizeError::InvalidFilename`]
    ///   / [`SummarizeError::FileNotFound`]: checked before any tier runs.
    /// - [`SummarizeError::ProviderNotConfigured`]: no model was available at startup.
    /// - [`SummarizeError::LlmApiError`]: the text summarisation call failed.
    /// - [`SummarizeError::NothingExtracted`]: no text and the vision tier failed.
    pub async fn summarize(&self, filename: Option<&str>) -> Result<Summary, SummarizeError> {
        let start = Instant::now();
        let name = filename.ok_or(SummarizeError::MissingFilename)?;
        let pdf_path = input::resolve_document(&self.config.uploads_dir, name).await?;
        let model = self.model()?;

        info!("Summarising {}", pdf_path.display());

        let sources = self.sources.clone();
        let path = pdf_path.clone();
        let chain = tokio::task::spawn_blocking(move || run_text_chain(&sources, &path))
            .await
            .map_err(|e| SummarizeError::Internal(format!("Extraction task panicked: {e}")))?;

        let (reply, tier, extracted_chars) = match chain.tier {
            Some(tier) => {
                let chars = chain.text.chars().count();
                info!("Sending {} chars from {} tier to text model", chars, tier);
                let reply = model.summarize_text(&chain.text).await?;
                (reply, tier, chars)
            }
            None => {
                info!("No text extracted, falling back to vision on page 1");
                match self.vision.summarize(&pdf_path, model.as_ref()).await {
                    Ok(reply) => (reply, SummaryTier::Vision, 0),
                    Err(e) => {
                        warn!("Vision fallback failed for {}: {}", pdf_path.display(), e);
                        return Err(SummarizeError::NothingExtracted);
                    }
                }
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Summary ready via {} tier: {} tokens in / {} out, {}ms",
            tier, reply.input_tokens, reply.output_tokens, duration_ms
        );

        Ok(Summary {
            answer: reply.content,
            tier,
            extracted_chars,
            input_tokens: reply.input_tokens,
            output_tokens: reply.output_tokens,
            duration_ms,
        })
    }

    /// List the PDFs in the uploads folder.
    pub async fn list_documents(&self) -> Result<Vec<DocumentEntry>, SummarizeError> {
        input::list_documents(&self.config.uploads_dir).await
    }

    /// Resolve an uploaded document to its path on disk.
    pub async fn document_path(&self, name: &str) -> Result<PathBuf, SummarizeError> {
        input::resolve_document(&self.config.uploads_dir, name).await
    }

    /// Path of the static front-end page.
    pub fn index_page(&self) -> PathBuf {
        self.config.frontend_dir.join("index.html")
    }

    fn model(&self) -> Result<&Arc<dyn SummaryModel>, SummarizeError> {
        self.model
            .as_ref()
            .ok_or_else(|| SummarizeError::ProviderNotConfigured {
                provider: self.config.provider_name.clone(),
                hint: self.unconfigured_hint.clone(),
            })
    }
}

/// Builder for [`Summarizer`].
pub struct SummarizerBuilder {
    config: SummarizerConfig,
    text_layer: Option<Arc<dyn TextLayer>>,
    renderer: Option<Arc<dyn PageRenderer>>,
    ocr: Option<Arc<dyn OcrEngine>>,
    model: Option<Arc<dyn SummaryModel>>,
    unconfigured_hint: String,
}

impl SummarizerBuilder {
    /// Use one pdfium engine for both the text layer and rendering.
    pub fn pdfium(self, engine: Arc<PdfiumEngine>) -> Self {
        self.text_layer(engine.clone()).renderer(engine)
    }

    pub fn text_layer(mut self, layer: Arc<dyn TextLayer>) -> Self {
        self.text_layer = Some(layer);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Override the OCR engine. Default: tesseract with `config.ocr_language`.
    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }

    pub fn model(mut self, model: Arc<dyn SummaryModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Record why no model is available; repeated in every `/chat` error.
    pub fn model_unavailable(mut self, hint: impl Into<String>) -> Self {
        self.model = None;
        self.unconfigured_hint = hint.into();
        self
    }

    pub fn build(self) -> Result<Summarizer, SummarizeError> {
        let text_layer = self.text_layer.ok_or_else(|| {
            SummarizeError::InvalidConfig("No text layer backend configured".into())
        })?;
        let renderer = self.renderer.ok_or_else(|| {
            SummarizeError::InvalidConfig("No page renderer configured".into())
        })?;
        let ocr: Arc<dyn OcrEngine> = match self.ocr {
            Some(engine) => engine,
            None => Arc::new(TesseractEngine::new(self.config.ocr_language.clone())),
        };

        let sources: Vec<Arc<dyn TextSource>> = vec![
            Arc::new(DirectTextExtractor::new(text_layer)),
            Arc::new(OcrExtractor::new(renderer.clone(), ocr)),
        ];

        Ok(Summarizer {
            config: self.config,
            sources,
            vision: VisionSummarizer::new(renderer),
            model: self.model,
            unconfigured_hint: self.unconfigured_hint,
        })
    }
}

/// Create the uploads folder if it does not exist yet.
pub fn ensure_uploads_dir(dir: &Path) -> Result<(), SummarizeError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        SummarizeError::InvalidConfig(format!(
            "Cannot create uploads folder {}: {e}",
            dir.display()
        ))
    })
}
