//! HTTP-level tests for the summarisation service.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`. The PDF
//! engine, OCR engine and language model are replaced with recording fakes,
//! so these tests need neither pdfium, tesseract nor an API key.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use ecosummarize::{
    router, ExtractionError, ModelError, ModelReply, OcrEngine, PageRenderer, PageSelection,
    Summarizer, SummarizerConfig, SummaryModel, TextLayer,
};
use edgequake_llm::ImageData;
use image::{DynamicImage, Rgba, RgbaImage};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

// ── Fakes ────────────────────────────────────────────────────────────────

/// One fake PDF: what its text layer holds and what OCR reads on each page.
/// The page count is the number of scanned pages.
struct FakeDoc {
    text_pages: Vec<&'static str>,
    scan_pages: Vec<&'static str>,
}

/// Stands in for pdfium (text layer + renderer) and tesseract.
#[derive(Default)]
struct FakeLibrary {
    docs: HashMap<String, FakeDoc>,
    current: Mutex<String>,
    text_calls: AtomicUsize,
    renders: Mutex<Vec<(String, PageSelection)>>,
    ocr_calls: AtomicUsize,
}

impl FakeLibrary {
    fn doc(&self, pdf_path: &Path) -> Result<&FakeDoc, ExtractionError> {
        let name = file_name(pdf_path);
        self.docs.get(&name).ok_or_else(|| ExtractionError::OpenFailed {
            path: pdf_path.to_path_buf(),
            detail: "not a PDF".into(),
        })
    }

    fn renders(&self) -> Vec<(String, PageSelection)> {
        self.renders.lock().unwrap().clone()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

impl TextLayer for FakeLibrary {
    fn page_texts(&self, pdf_path: &Path) -> Result<Vec<String>, ExtractionError> {
        self.text_calls.fetch_add(1, Ordering::SeqCst);
        let doc = self.doc(pdf_path)?;
        Ok(doc.text_pages.iter().map(|p| p.to_string()).collect())
    }
}

impl PageRenderer for FakeLibrary {
    fn render(
        &self,
        pdf_path: &Path,
        selection: PageSelection,
    ) -> Result<Vec<(usize, DynamicImage)>, ExtractionError> {
        let name = file_name(pdf_path);
        self.renders.lock().unwrap().push((name.clone(), selection));
        *self.current.lock().unwrap() = name;

        let doc = self.doc(pdf_path)?;
        Ok(selection
            .to_indices(doc.scan_pages.len())
            .into_iter()
            .map(|i| {
                let px = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
                (i, DynamicImage::ImageRgba8(px))
            })
            .collect())
    }
}

impl OcrEngine for FakeLibrary {
    fn recognize(&self, page: usize, _image: &DynamicImage) -> Result<String, ExtractionError> {
        self.ocr_calls.fetch_add(1, Ordering::SeqCst);
        let name = self.current.lock().unwrap().clone();
        let doc = &self.docs[&name];
        Ok(doc.scan_pages[page - 1].to_string())
    }
}

/// Language model that records what it was asked.
struct RecordingModel {
    text_reply: Result<&'static str, &'static str>,
    vision_reply: Result<&'static str, &'static str>,
    texts: Mutex<Vec<String>>,
    pages: AtomicUsize,
}

impl RecordingModel {
    fn new() -> Self {
        Self {
            text_reply: Ok("- Ý chính từ văn bản"),
            vision_reply: Ok("- Ý chính từ hình ảnh"),
            texts: Mutex::new(Vec::new()),
            pages: AtomicUsize::new(0),
        }
    }

    fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    fn page_calls(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
    }
}

fn reply(r: Result<&'static str, &'static str>) -> Result<ModelReply, ModelError> {
    r.map(ModelReply::text)
        .map_err(|m| ModelError::Api { message: m.into() })
}

#[async_trait]
impl SummaryModel for RecordingModel {
    async fn summarize_text(&self, text: &str) -> Result<ModelReply, ModelError> {
        self.texts.lock().unwrap().push(text.to_string());
        reply(self.text_reply)
    }

    async fn summarize_page(&self, image: ImageData) -> Result<ModelReply, ModelError> {
        assert_eq!(image.mime_type, "image/png");
        self.pages.fetch_add(1, Ordering::SeqCst);
        reply(self.vision_reply)
    }
}

// ── Harness ──────────────────────────────────────────────────────────────

struct TestApp {
    router: Router,
    library: Arc<FakeLibrary>,
    _dir: TempDir,
}

const INDEX_HTML: &str = "<!doctype html><title>ecosummarize</title>";

fn library() -> FakeLibrary {
    let mut docs = HashMap::new();
    docs.insert(
        "a.pdf".to_string(),
        FakeDoc {
            text_pages: vec!["Nội dung trang một", "", "Trang ba"],
            scan_pages: vec!["never read", "never read", "never read"],
        },
    );
    docs.insert(
        "scan.pdf".to_string(),
        FakeDoc {
            text_pages: vec!["", ""],
            scan_pages: vec!["Scanned page one", "Scanned page two"],
        },
    );
    docs.insert(
        "image_only.pdf".to_string(),
        FakeDoc {
            text_pages: vec!["", "", ""],
            scan_pages: vec!["", " ", "\n"],
        },
    );
    docs.insert(
        "blank.pdf".to_string(),
        FakeDoc {
            text_pages: vec![],
            scan_pages: vec![],
        },
    );
    FakeLibrary {
        docs,
        ..Default::default()
    }
}

fn app(model: Option<Arc<RecordingModel>>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let uploads = dir.path().join("uploads");
    let frontend = dir.path().join("frontend");
    std::fs::create_dir_all(&uploads).unwrap();
    std::fs::create_dir_all(&frontend).unwrap();
    std::fs::write(frontend.join("index.html"), INDEX_HTML).unwrap();

    std::fs::write(uploads.join("a.pdf"), b"%PDF-1.4 text").unwrap();
    std::fs::write(uploads.join("scan.pdf"), vec![0u8; 3 * 1024 * 1024]).unwrap();
    std::fs::write(uploads.join("image_only.pdf"), b"%PDF-1.4 image").unwrap();
    std::fs::write(uploads.join("blank.pdf"), b"%PDF-1.4").unwrap();
    std::fs::write(uploads.join("notes.txt"), b"not a pdf").unwrap();

    let config = SummarizerConfig::builder()
        .uploads_dir(&uploads)
        .frontend_dir(&frontend)
        .build()
        .unwrap();

    let library = Arc::new(library());
    let mut builder = Summarizer::builder(config)
        .text_layer(library.clone())
        .renderer(library.clone())
        .ocr_engine(library.clone());
    builder = match model {
        Some(model) => builder.model(model),
        None => builder.model_unavailable("Set OPENAI_API_KEY and restart the server."),
    };
    let summarizer = Arc::new(builder.build().unwrap());

    TestApp {
        router: router(summarizer),
        library,
        _dir: dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn chat(router: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(router, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

// ── /chat ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn text_layer_goes_straight_to_text_model() {
    let model = Arc::new(RecordingModel::new());
    let app = app(Some(model.clone()));

    let (status, body) = chat(&app.router, json!({ "pdf": "a.pdf" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "answer": "- Ý chính từ văn bản" }));
    assert_eq!(model.texts(), vec!["Nội dung trang một\nTrang ba"]);
    assert_eq!(model.page_calls(), 0);
    assert!(app.library.renders().is_empty(), "OCR must not run");
}

#[tokio::test]
async fn scanned_document_is_read_by_ocr() {
    let model = Arc::new(RecordingModel::new());
    let app = app(Some(model.clone()));

    let (status, body) = chat(&app.router, json!({ "pdf": "scan.pdf" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "- Ý chính từ văn bản");
    assert_eq!(model.texts(), vec!["Scanned page one\nScanned page two"]);
    assert_eq!(model.page_calls(), 0);
    assert_eq!(
        app.library.renders(),
        vec![("scan.pdf".to_string(), PageSelection::All)]
    );
    assert_eq!(app.library.ocr_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn image_only_document_falls_back_to_vision_on_first_page() {
    let model = Arc::new(RecordingModel::new());
    let app = app(Some(model.clone()));

    let (status, body) = chat(&app.router, json!({ "pdf": "image_only.pdf" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "- Ý chính từ hình ảnh");
    assert!(model.texts().is_empty(), "text model must not be called");
    assert_eq!(model.page_calls(), 1);
    assert_eq!(
        app.library.renders(),
        vec![
            ("image_only.pdf".to_string(), PageSelection::All),
            ("image_only.pdf".to_string(), PageSelection::Single(1)),
        ]
    );
}

#[tokio::test]
async fn nothing_extractable_reports_fixed_message() {
    let model = Arc::new(RecordingModel::new());
    let app = app(Some(model.clone()));

    let (status, body) = chat(&app.router, json!({ "pdf": "blank.pdf" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "error": "Could not extract any text or summarize PDF" })
    );
    assert!(model.texts().is_empty());
    assert_eq!(model.page_calls(), 0);
}

#[tokio::test]
async fn vision_failure_reports_fixed_message() {
    let model = Arc::new(RecordingModel {
        vision_reply: Err("content policy"),
        ..RecordingModel::new()
    });
    let app = app(Some(model.clone()));

    let (status, body) = chat(&app.router, json!({ "pdf": "image_only.pdf" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Could not extract any text or summarize PDF");
    assert_eq!(model.page_calls(), 1);
}

#[tokio::test]
async fn missing_filename_is_bad_request() {
    let model = Arc::new(RecordingModel::new());
    let app = app(Some(model.clone()));

    for body in [json!({}), json!({ "pdf": null }), json!({ "pdf": "" })] {
        let (status, reply) = chat(&app.router, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(reply, json!({ "error": "No PDF filename provided" }));
    }

    assert_eq!(app.library.text_calls.load(Ordering::SeqCst), 0);
    assert!(model.texts().is_empty());
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = app(Some(Arc::new(RecordingModel::new())));
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, bytes) = send(&app.router, request).await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_file_is_not_found() {
    let model = Arc::new(RecordingModel::new());
    let app = app(Some(model.clone()));

    let (status, body) = chat(&app.router, json!({ "pdf": "missing.pdf" })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "File not found" }));
    assert_eq!(app.library.text_calls.load(Ordering::SeqCst), 0);
    assert!(model.texts().is_empty());
}

#[tokio::test]
async fn path_traversal_in_chat_is_bad_request() {
    let app = app(Some(Arc::new(RecordingModel::new())));

    let (status, _) = chat(&app.router, json!({ "pdf": "../uploads/a.pdf" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.library.text_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn filenames_are_matched_exactly() {
    let model = Arc::new(RecordingModel::new());
    let app = app(Some(model.clone()));

    for name in [" a.pdf ", "   "] {
        let (status, body) = chat(&app.router, json!({ "pdf": name })).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{name:?}");
        assert_eq!(body, json!({ "error": "File not found" }));
    }

    assert_eq!(app.library.text_calls.load(Ordering::SeqCst), 0);
    assert!(model.texts().is_empty());
}

#[tokio::test]
async fn missing_credential_fails_each_chat_call() {
    let app = app(None);

    for _ in 0..2 {
        let (status, body) = chat(&app.router, json!({ "pdf": "a.pdf" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().unwrap();
        assert!(message.contains("not configured"), "{message}");
        assert!(message.contains("OPENAI_API_KEY"), "{message}");
    }

    // Input errors still take precedence.
    let (status, _) = chat(&app.router, json!({ "pdf": "missing.pdf" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The rest of the API keeps working.
    let (status, _) = get(&app.router, "/uploads").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn text_model_error_is_reported() {
    let model = Arc::new(RecordingModel {
        text_reply: Err("rate limited"),
        ..RecordingModel::new()
    });
    let app = app(Some(model));

    let (status, body) = chat(&app.router, json!({ "pdf": "a.pdf" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("LLM error:"), "{message}");
    assert!(message.contains("rate limited"), "{message}");
}

#[tokio::test]
async fn repeated_requests_take_the_same_path() {
    let model = Arc::new(RecordingModel::new());
    let app = app(Some(model.clone()));

    let (_, first) = chat(&app.router, json!({ "pdf": "scan.pdf" })).await;
    let (_, second) = chat(&app.router, json!({ "pdf": "scan.pdf" })).await;

    assert_eq!(first, second);
    let texts = model.texts();
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0], texts[1]);
    assert_eq!(model.page_calls(), 0);
}

// ── /uploads ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn lists_uploaded_pdfs_with_sizes() {
    let app = app(None);

    let (status, bytes) = get(&app.router, "/uploads").await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            { "filename": "a.pdf", "size_mb": 0.0 },
            { "filename": "blank.pdf", "size_mb": 0.0 },
            { "filename": "image_only.pdf", "size_mb": 0.0 },
            { "filename": "scan.pdf", "size_mb": 3.0 },
        ])
    );
}

#[tokio::test]
async fn serves_raw_pdf_bytes() {
    let app = app(None);

    let request = Request::builder()
        .uri("/uploads/a.pdf")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 text");
}

#[tokio::test]
async fn unknown_upload_is_not_found() {
    let app = app(None);

    let (status, bytes) = get(&app.router, "/uploads/nope.pdf").await;
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "File not found" }));
}

#[tokio::test]
async fn unsafe_download_names_are_not_found() {
    let app = app(None);

    for uri in [
        "/uploads/..%2Ffrontend%2Findex.html",
        "/uploads/%2E%2E",
        "/uploads/%20",
    ] {
        let (status, bytes) = get(&app.router, uri).await;
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, json!({ "error": "File not found" }), "{uri}");
    }
}

// ── / ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn serves_front_end() {
    let app = app(None);

    let (status, bytes) = get(&app.router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(bytes).unwrap(), INDEX_HTML);
}
