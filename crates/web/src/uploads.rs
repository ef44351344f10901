//! Report photo storage.
//!
//! Uploaded photos land in the configured uploads directory under a
//! generated `uuid.ext` name, so client filenames never touch the
//! filesystem. Deletion is best-effort: a missing file is logged, the
//! request still succeeds.

use ecocusco_core::validation::FileMeta;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// An uploaded file pulled out of a multipart form: its descriptor for the
/// validator plus the buffered bytes.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub meta: FileMeta,
    pub bytes: Vec<u8>,
}

/// Persist an uploaded photo, returning the stored filename.
pub async fn save_photo(config: &AppConfig, upload: &UploadedFile) -> AppResult<String> {
    let ext = upload
        .meta
        .extension()
        .ok_or_else(|| AppError::BadRequest("El archivo no tiene extensión".to_string()))?;
    let filename = format!("{}.{ext}", Uuid::new_v4());
    let path = std::path::Path::new(&config.uploads_dir).join(&filename);

    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .map_err(|err| AppError::InternalError(format!("uploads dir: {err}")))?;
    tokio::fs::write(&path, &upload.bytes)
        .await
        .map_err(|err| AppError::InternalError(format!("photo write: {err}")))?;

    tracing::debug!(%filename, bytes = upload.bytes.len(), "photo stored");
    Ok(filename)
}

/// Remove a stored photo by filename. Best-effort.
pub async fn delete_photo(config: &AppConfig, filename: &str) {
    // Stored names are always generated uuid.ext values, but never follow
    // anything that smells like a path.
    if filename.contains('/') || filename.contains("..") {
        tracing::warn!(%filename, "refusing to delete suspicious photo name");
        return;
    }
    let path = std::path::Path::new(&config.uploads_dir).join(filename);
    if let Err(err) = tokio::fs::remove_file(&path).await {
        tracing::warn!(%err, %filename, "photo delete failed");
    }
}
