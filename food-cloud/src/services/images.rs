//! Local image storage for category and menu item pictures
//!
//! Files land in the upload directory as `<millis>-<sanitized name>` and are
//! served under `/uploads`. The sniffed content format must match the
//! extension and decode with the `image` crate before anything is written.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use shared::error::{AppError, ErrorCode};

/// Maximum upload size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Content format an allowed extension must carry
fn expected_format(ext: &str) -> Option<ImageFormat> {
    match ext {
        "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// URL prefix the upload directory is served under
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// Keep ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image");
    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if missing
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Validate and write an upload; returns its public path
    pub async fn save(&self, original_name: &str, data: &[u8], now: i64) -> Result<String, AppError> {
        if data.is_empty() {
            return Err(AppError::with_message(ErrorCode::InvalidRequest, "Empty file"));
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::new(ErrorCode::ImageTooLarge));
        }

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        let Some(expected) = expected_format(&ext) else {
            return Err(AppError::new(ErrorCode::ImageFormatUnsupported));
        };

        match image::guess_format(data) {
            Ok(actual) if actual == expected => {}
            Ok(actual) => {
                tracing::debug!(
                    file = %original_name,
                    ?actual,
                    "Upload content does not match extension"
                );
                return Err(AppError::with_message(
                    ErrorCode::ImageInvalid,
                    "File content does not match its extension",
                ));
            }
            Err(_) => return Err(AppError::new(ErrorCode::ImageInvalid)),
        }
        if let Err(e) = image::load_from_memory_with_format(data, expected) {
            tracing::debug!(file = %original_name, error = %e, "Rejected upload");
            return Err(AppError::new(ErrorCode::ImageInvalid));
        }

        let file_name = format!("{now}-{}", sanitize_filename(original_name));
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, data).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to write upload");
            AppError::new(ErrorCode::InternalError)
        })?;
        tracing::info!(file = %file_name, bytes = data.len(), "Image stored");
        Ok(format!("{PUBLIC_PREFIX}{file_name}"))
    }

    /// Best-effort removal of a stored image by its public path
    pub async fn remove(&self, public_path: &str) {
        let name = public_path.strip_prefix(PUBLIC_PREFIX).unwrap_or(public_path);
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            tracing::warn!(path = %public_path, "Refusing to delete image outside upload dir");
            return;
        }
        let path = self.dir.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::info!(file = %name, "Image deleted"),
            Err(e) => tracing::warn!(file = %name, error = %e, "Image delete failed"),
        }
    }
}
