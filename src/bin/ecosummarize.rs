//! Server binary for ecosummarize.
//!
//! Maps CLI flags and environment variables to `SummarizerConfig`, binds
//! pdfium and the LLM provider once, then serves the HTTP API.

use anyhow::{Context, Result};
use clap::Parser;
use ecosummarize::{
    ensure_uploads_dir, router, PdfiumEngine, ProviderModel, Summarizer, SummarizerConfig,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = "\
ENDPOINTS:
  POST /chat                {\"pdf\": \"report.pdf\"} → {\"answer\": \"...\"}
  GET  /uploads             list uploaded PDFs
  GET  /uploads/<filename>  download one PDF
  GET  /                    web front end

ENVIRONMENT:
  OPENAI_API_KEY            credential for the default provider
  RUST_LOG                  overrides the log filter (e.g. ecosummarize=debug)

A .env file in the working directory is loaded before flags are parsed.
Without a credential the server still starts; every /chat call then
fails with a \"not configured\" error.";

#[derive(Parser, Debug)]
#[command(
    name = "ecosummarize",
    version,
    about = "Summarise uploaded PDFs in Vietnamese over HTTP",
    long_about = "Serve a small HTTP API that summarises PDFs from an uploads folder as \
Vietnamese bullet points. Text is read from the PDF's text layer, falling back to OCR \
and finally to a vision model reading the first page.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Interface to listen on.
    #[arg(long, env = "ECOSUMMARIZE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// TCP port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Folder holding the uploaded PDFs (created if missing).
    #[arg(long, env = "ECOSUMMARIZE_UPLOADS_DIR", default_value = "uploads")]
    uploads_dir: PathBuf,

    /// Folder holding the static front end (index.html).
    #[arg(long, env = "ECOSUMMARIZE_FRONTEND_DIR", default_value = "frontend")]
    frontend_dir: PathBuf,

    /// LLM provider: openai, anthropic, gemini, mistral, openrouter, ollama.
    #[arg(long, env = "ECOSUMMARIZE_PROVIDER", default_value = "openai")]
    provider: String,

    /// Model used to summarise extracted text.
    #[arg(long, env = "ECOSUMMARIZE_TEXT_MODEL", default_value = "gpt-3.5-turbo")]
    text_model: String,

    /// Vision-capable model used when no text can be extracted.
    #[arg(long, env = "ECOSUMMARIZE_VISION_MODEL", default_value = "gpt-4o-mini")]
    vision_model: String,

    /// Tesseract language string, e.g. `eng` or `vie+eng`.
    #[arg(long, env = "ECOSUMMARIZE_OCR_LANG", default_value = "eng")]
    ocr_language: String,

    /// Maximum rendered page dimension in pixels.
    #[arg(long, env = "ECOSUMMARIZE_MAX_PIXELS", default_value_t = 2000,
          value_parser = clap::value_parser!(u32).range(100..=10000))]
    max_rendered_pixels: u32,

    /// Sampling temperature (0.0–2.0). Provider default when unset.
    #[arg(long, env = "ECOSUMMARIZE_TEMPERATURE")]
    temperature: Option<f32>,

    /// Maximum output tokens per model call. Provider default when unset.
    #[arg(long, env = "ECOSUMMARIZE_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Enable debug logging.
    #[arg(short, long, env = "ECOSUMMARIZE_VERBOSE")]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> Result<SummarizerConfig> {
        let mut builder = SummarizerConfig::builder()
            .uploads_dir(&self.uploads_dir)
            .frontend_dir(&self.frontend_dir)
            .provider_name(&self.provider)
            .text_model(&self.text_model)
            .vision_model(&self.vision_model)
            .ocr_language(&self.ocr_language)
            .max_rendered_pixels(self.max_rendered_pixels);

        if let Some(t) = self.temperature {
            builder = builder.temperature(t);
        }
        if let Some(n) = self.max_tokens {
            builder = builder.max_tokens(n);
        }

        builder.build().context("Invalid configuration")
    }
}

/// Bind `host:port`; `host` may be an IP address or a name such as `localhost`.
async fn bind_listener(host: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.to_config()?;
    ensure_uploads_dir(&config.uploads_dir)?;

    // ── PDF engine ───────────────────────────────────────────────────────
    // First start downloads the pdfium library into the user cache.
    let max_px = config.max_rendered_pixels;
    let engine = tokio::task::block_in_place(|| PdfiumEngine::bind(max_px))
        .context("Failed to bind PDFium engine")?;

    // ── LLM provider ─────────────────────────────────────────────────────
    let mut builder = Summarizer::builder(config.clone()).pdfium(Arc::new(engine));
    builder = match ProviderModel::from_config(&config) {
        Ok(model) => builder.model(Arc::new(model)),
        Err(e) => {
            warn!("{e}");
            warn!("Starting without a language model; /chat will report the error");
            builder.model_unavailable(e.to_string())
        }
    };
    let summarizer = Arc::new(builder.build()?);

    // ── Serve ────────────────────────────────────────────────────────────
    let listener = bind_listener(&cli.host, cli.port).await?;
    let addr = listener.local_addr().context("Listener has no local address")?;

    info!(
        "Serving {} on http://{} (language model: {})",
        config.uploads_dir.display(),
        addr,
        if summarizer.has_model() { "ready" } else { "not configured" }
    );
    axum::serve(listener, router(summarizer))
        .await
        .context("Server error")?;

    Ok(())
}
