// src/utils/upload.rs

use std::path::Path;

use axum::http::{HeaderMap, header};
use url::Url;

use crate::error::AppError;

/// Stores an uploaded question image under `upload_dir`.
///
/// Only `image/*` content types are accepted. The stored name is the
/// upload time in milliseconds followed by the sanitized original name.
/// Returns the public path, e.g. "/uploads/1700000000000-diagram.png".
pub async fn save_image(
    upload_dir: &str,
    original_name: Option<&str>,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<String, AppError> {
    match content_type {
        Some(mime) if mime.starts_with("image/") => {}
        _ => return Err(AppError::BadRequest("Only image uploads are allowed".to_string())),
    }
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded image is empty".to_string()));
    }

    let file_name = format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        sanitize_file_name(original_name.unwrap_or("image"))
    );

    tokio::fs::create_dir_all(upload_dir).await.map_err(|e| {
        tracing::error!("Failed to create upload dir {}: {:?}", upload_dir, e);
        AppError::InternalServerError(e.to_string())
    })?;

    let path = Path::new(upload_dir).join(&file_name);
    tokio::fs::write(&path, bytes).await.map_err(|e| {
        tracing::error!("Failed to write upload {:?}: {:?}", path, e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!("Stored question image {}", file_name);
    Ok(format!("/uploads/{}", file_name))
}

/// Removes a file previously returned by `save_image`. Used when the
/// request that uploaded it fails afterwards.
pub async fn discard_image(upload_dir: &str, public_path: &str) {
    let Some(file_name) = public_path.strip_prefix("/uploads/") else {
        return;
    };
    let path = Path::new(upload_dir).join(file_name);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!("Failed to discard upload {:?}: {:?}", path, e);
    }
}

/// Keeps the final path segment and replaces anything outside
/// `[A-Za-z0-9._-]` with '_'.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Origin the client used to reach us, taken from the `Host` header.
/// Used to turn stored "/uploads/..." paths into absolute URLs.
pub fn base_url(headers: &HeaderMap) -> Option<Url> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .filter(|proto| matches!(*proto, "http" | "https"))
        .unwrap_or("http");

    Url::parse(&format!("{}://{}", scheme, host)).ok()
}
