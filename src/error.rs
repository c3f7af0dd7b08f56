//! Error types for the ecosummarize library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`SummarizeError`] — **Fatal for the request**: bad input, missing file,
//!   provider not configured, model call failed, or every tier came up empty.
//!   Returned as `Err(SummarizeError)` from [`crate::Summarizer::summarize`]
//!   and mapped to an HTTP status by [`crate::server`].
//!
//! * [`ExtractionError`] — **Recovered inside a tier**: the PDF would not
//!   parse, a page failed to render, tesseract crashed. Carried inside
//!   [`crate::pipeline::TierOutcome::Failed`] and logged, never surfaced.
//!   The next tier runs exactly as if the library had found nothing.
//!
//! * [`ModelError`] — a single LLM call failed. The text path surfaces it as
//!   [`SummarizeError::LlmApiError`]; the vision path swallows it and the
//!   request ends in [`SummarizeError::NothingExtracted`].

use std::path::PathBuf;
use thiserror::Error;

/// All request-level errors returned by the ecosummarize library.
#[derive(Debug, Error)]
pub enum SummarizeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The request did not name a document.
    #[error("No PDF filename provided")]
    MissingFilename,

    /// The filename tried to escape the uploads folder.
    #[error("Invalid PDF filename '{name}'")]
    InvalidFilename { name: String },

    /// The request body could not be read as JSON.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No document with that name exists in the uploads folder.
    #[error("File not found")]
    FileNotFound { path: PathBuf },

    /// Listing the uploads folder failed.
    #[error("Could not list files: {source}")]
    ListingFailed {
        #[source]
        source: std::io::Error,
    },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No LLM provider could be built at startup (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured. {hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The text summarisation call failed.
    #[error("LLM error: {message}")]
    LlmApiError { message: String },

    /// Text layer and OCR were empty and the vision call produced nothing.
    #[error("Could not extract any text or summarize PDF")]
    NothingExtracted,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first start.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Processing error: {0}")]
    Internal(String),
}

/// A recoverable failure inside one extraction tier.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// pdfium could not open or parse the document.
    #[error("could not open PDF '{path}': {detail}")]
    OpenFailed { path: PathBuf, detail: String },

    /// A page could not be rasterised.
    #[error("rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The document rendered to zero pages.
    #[error("document has no pages to render")]
    NoPages,

    /// The OCR engine ran but returned an error.
    #[error("OCR failed on page {page}: {detail}")]
    OcrFailed { page: usize, detail: String },

    /// The OCR engine is not installed.
    #[error("OCR engine not available: {0}")]
    OcrUnavailable(String),

    /// A rendered page could not be PNG-encoded.
    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking extraction task panicked or was cancelled.
    #[error("extraction task failed: {0}")]
    Task(String),
}

/// A failed LLM call.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The provider returned an error (network, auth, rate limit, context length…).
    #[error("{message}")]
    Api { message: String },
}

/// Why the vision tier produced no summary.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("vision model call failed: {0}")]
    Model(#[from] ModelError),

    /// The model answered with nothing but whitespace.
    #[error("vision model returned an empty answer")]
    EmptyAnswer,
}

impl From<ModelError> for SummarizeError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Api { message } => SummarizeError::LlmApiError { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_messages_match_http_contract() {
        assert_eq!(
            SummarizeError::MissingFilename.to_string(),
            "No PDF filename provided"
        );
        let e = SummarizeError::FileNotFound {
            path: PathBuf::from("uploads/x.pdf"),
        };
        assert_eq!(e.to_string(), "File not found");
    }

    #[test]
    fn total_failure_display() {
        assert_eq!(
            SummarizeError::NothingExtracted.to_string(),
            "Could not extract any text or summarize PDF"
        );
    }

    #[test]
    fn model_error_becomes_labeled_llm_error() {
        let e: SummarizeError = ModelError::Api {
            message: "context_length_exceeded".into(),
        }
        .into();
        assert_eq!(e.to_string(), "LLM error: context_length_exceeded");
    }

    #[test]
    fn provider_not_configured_display() {
        let e = SummarizeError::ProviderNotConfigured {
            provider: "openai".into(),
            hint: "Set OPENAI_API_KEY.".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("openai"), "got: {msg}");
        assert!(msg.contains("not configured"), "got: {msg}");
    }

    #[test]
    fn ocr_failure_display() {
        let e = ExtractionError::OcrFailed {
            page: 3,
            detail: "segfault".into(),
        };
        assert!(e.to_string().contains("page 3"));
    }
}
