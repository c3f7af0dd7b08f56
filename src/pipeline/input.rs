//! Input resolution: map a requested filename to a PDF in the uploads folder.
//!
//! The uploads folder is flat and read-only from this service's point of
//! view. Names are matched literally; anything that could climb out of the
//! folder is rejected before touching the file system.

use crate::error::SummarizeError;
use crate::output::DocumentEntry;
use std::path::{Path, PathBuf};
use tracing::debug;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Check that `name` is a bare file name with no path components.
///
/// Names are taken as given: surrounding whitespace is part of the name.
pub fn validate_filename(name: &str) -> Result<&str, SummarizeError> {
    if name.is_empty() {
        return Err(SummarizeError::MissingFilename);
    }
    if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
        return Err(SummarizeError::InvalidFilename {
            name: name.to_string(),
        });
    }
    Ok(name)
}

/// Resolve `name` to an existing file inside `uploads_dir`.
pub async fn resolve_document(uploads_dir: &Path, name: &str) -> Result<PathBuf, SummarizeError> {
    let name = validate_filename(name)?;
    let path = uploads_dir.join(name);

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {
            debug!("Resolved document: {}", path.display());
            Ok(path)
        }
        _ => Err(SummarizeError::FileNotFound { path }),
    }
}

/// List every `.pdf` file in `uploads_dir`, sorted by name.
pub async fn list_documents(uploads_dir: &Path) -> Result<Vec<DocumentEntry>, SummarizeError> {
    let listing_failed = |source| SummarizeError::ListingFailed { source };

    let mut dir = tokio::fs::read_dir(uploads_dir).await.map_err(listing_failed)?;
    let mut entries = Vec::new();

    while let Some(entry) = dir.next_entry().await.map_err(listing_failed)? {
        let filename = entry.file_name().to_string_lossy().to_string();
        if !filename.ends_with(".pdf") {
            continue;
        }
        let meta = entry.metadata().await.map_err(listing_failed)?;
        if !meta.is_file() {
            continue;
        }
        entries.push(DocumentEntry {
            filename,
            size_mb: size_mb(meta.len()),
        });
    }

    entries.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(entries)
}

/// Bytes → MiB rounded to two decimals.
fn size_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}
