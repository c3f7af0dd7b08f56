//! HTTP API.
//!
//! | Route | Method | Purpose |
//! |-------|--------|---------|
//! | `/chat` | POST | `{"pdf": name}` → `{"answer": summary}` |
//! | `/uploads` | GET | list uploaded PDFs with sizes |
//! | `/uploads/{filename}` | GET | raw PDF bytes |
//! | `/` | GET | static front end |
//!
//! Every error body is `{"error": message}`; status codes come from
//! [`SummarizeError`].

use crate::error::SummarizeError;
use crate::output::DocumentEntry;
use crate::summarize::Summarizer;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared handler state.
pub struct AppState {
    pub summarizer: Arc<Summarizer>,
}

/// Body of `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub pdf: Option<String>,
}

/// Successful `POST /chat` response.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

/// Build the application router.
pub fn router(summarizer: Arc<Summarizer>) -> Router {
    let index = ServeFile::new(summarizer.index_page());
    let state = Arc::new(AppState { summarizer });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route_service("/", index)
        .route("/chat", post(chat_handler))
        .route("/uploads", get(list_documents_handler))
        .route("/uploads/{filename}", get(serve_document_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Summarise one uploaded PDF.
async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, SummarizeError> {
    let Json(request) = payload.map_err(|e| SummarizeError::InvalidRequest(e.body_text()))?;

    let summary = state.summarizer.summarize(request.pdf.as_deref()).await?;
    info!(
        "Answered /chat for {:?} via {} tier",
        request.pdf, summary.tier
    );

    Ok(Json(ChatResponse {
        answer: summary.answer,
    }))
}

/// List uploaded PDFs.
async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DocumentEntry>>, SummarizeError> {
    Ok(Json(state.summarizer.list_documents().await?))
}

/// Serve one uploaded PDF as raw bytes.
///
/// Unsafe names answer 404 like any other name outside the folder.
async fn serve_document_handler(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, SummarizeError> {
    let path = state
        .summarizer
        .document_path(&filename)
        .await
        .map_err(|e| match e {
            SummarizeError::MissingFilename | SummarizeError::InvalidFilename { .. } => {
                SummarizeError::FileNotFound {
                    path: PathBuf::from(&filename),
                }
            }
            other => other,
        })?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| SummarizeError::FileNotFound { path })?;

    Ok(([(header::CONTENT_TYPE, "application/pdf")], bytes).into_response())
}

impl SummarizeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SummarizeError::MissingFilename
            | SummarizeError::InvalidFilename { .. }
            | SummarizeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SummarizeError::FileNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client.
    fn client_message(&self) -> String {
        match self {
            SummarizeError::InvalidConfig(_) | SummarizeError::PdfiumBindingFailed(_) => {
                format!("Processing error: {self}")
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for SummarizeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(json!({ "error": self.client_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_taxonomy() {
        let cases = [
            (SummarizeError::MissingFilename, StatusCode::BAD_REQUEST),
            (
                SummarizeError::InvalidFilename { name: "../x".into() },
                StatusCode::BAD_REQUEST,
            ),
            (
                SummarizeError::FileNotFound {
                    path: PathBuf::from("uploads/x.pdf"),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                SummarizeError::LlmApiError {
                    message: "429".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                SummarizeError::NothingExtracted,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                SummarizeError::ProviderNotConfigured {
                    provider: "openai".into(),
                    hint: String::new(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn internal_errors_are_labelled_processing_errors() {
        let e = SummarizeError::Internal("task panicked".into());
        assert_eq!(e.client_message(), "Processing error: task panicked");
        let e = SummarizeError::InvalidConfig("bad".into());
        assert!(e.client_message().starts_with("Processing error: "));
    }
}
