//! Inline image embedding for palette and legend entries.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

use crate::error::{AppError, AppResult};

/// `data:<mime>;base64,<payload>`. No size limit is applied.
pub fn image_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, B64.encode(bytes))
}

/// MIME type guessed from the file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}

/// Read a whole image file into a data URI.
pub fn read_image_data_uri(path: &Path) -> AppResult<String> {
    let bytes = std::fs::read(path).map_err(|source| AppError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image_data_uri(&bytes, mime_for_path(path)))
}
