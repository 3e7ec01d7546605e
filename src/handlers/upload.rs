use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::{ApiResponse, ApiResult};
use crate::config::UploadConfig;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
    pub filename: String,
}

/// The `file` part of an upload form.
#[derive(Debug)]
pub struct FilePart {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Replace everything outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

/// Validate a parsed upload form. `file_type` is the optional `fileType` field.
pub fn check_upload<'a>(
    file: Option<&'a FilePart>,
    file_type: Option<&str>,
    limits: &UploadConfig,
) -> Result<&'a FilePart, ApiError> {
    let file = file.ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let is_image = file_type == Some("image");

    if is_image && !file.content_type.starts_with("image/") {
        return Err(ApiError::bad_request("File must be an image"));
    }

    let (max_bytes, label) = if is_image {
        (limits.image_max_bytes, size_label(limits.image_max_bytes))
    } else {
        (limits.file_max_bytes, size_label(limits.file_max_bytes))
    };
    if file.bytes.len() > max_bytes {
        return Err(ApiError::bad_request(format!("File size must be less than {}", label)));
    }
    Ok(file)
}

fn size_label(bytes: usize) -> String {
    const MIB: usize = 1024 * 1024;
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// A body cut off by the request size limit reports the largest accepted size.
fn read_error(err: MultipartError, limits: &UploadConfig) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let max_bytes = limits.file_max_bytes.max(limits.image_max_bytes);
        return ApiError::bad_request(format!("File size must be less than {}", size_label(max_bytes)));
    }
    err.into()
}

/// POST /api/upload - Store a multipart `file` under the uploads directory
pub async fn post(State(state): State<AppState>, multipart: Multipart) -> ApiResult<UploadedFile> {
    store(&state, multipart)
        .await
        .map_err(|e| e.or_fallback("Failed to upload file"))
}

async fn store(state: &AppState, mut multipart: Multipart) -> ApiResult<UploadedFile> {
    let mut file: Option<FilePart> = None;
    let mut file_type: Option<String> = None;
    let uploads = &state.config.uploads;

    // Read the whole form before validating anything
    while let Some(field) = multipart.next_field().await.map_err(|e| read_error(e, uploads))? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(|e| read_error(e, uploads))?;
                file = Some(FilePart {
                    name: file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "fileType" => {
                file_type = Some(field.text().await.map_err(|e| read_error(e, uploads))?);
            }
            _ => {}
        }
    }

    let file = check_upload(file.as_ref(), file_type.as_deref(), uploads)?;

    tokio::fs::create_dir_all(&uploads.dir)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create upload directory: {}", e)))?;

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let filename = format!("{}-{}", millis, sanitize_file_name(&file.name));
    let path = uploads.dir.join(&filename);
    tokio::fs::write(&path, &file.bytes)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!("Stored upload {} ({} bytes)", filename, file.bytes.len());
    let url = format!("{}/{}", uploads.public_path.trim_end_matches('/'), filename);
    Ok(ApiResponse::success(UploadedFile { url, filename }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn part(content_type: &str, len: usize) -> FilePart {
        FilePart {
            name: "photo.png".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_file_name("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_file_name("plan-v2.pdf"), "plan-v2.pdf");
        assert_eq!(sanitize_file_name("café.jpg"), "caf_.jpg");
    }

    #[test]
    fn missing_file_and_wrong_type() {
        let limits = AppConfig::development().uploads;
        assert_eq!(check_upload(None, None, &limits).unwrap_err().message(), "No file provided");

        let pdf = part("application/pdf", 10);
        assert_eq!(
            check_upload(Some(&pdf), Some("image"), &limits).unwrap_err().message(),
            "File must be an image"
        );
        assert!(check_upload(Some(&pdf), Some("file"), &limits).is_ok());
    }

    #[test]
    fn size_limits_depend_on_kind() {
        let limits = AppConfig::development().uploads;
        let big_image = part("image/png", 5 * 1024 * 1024 + 1);
        assert_eq!(
            check_upload(Some(&big_image), Some("image"), &limits).unwrap_err().message(),
            "File size must be less than 5MB"
        );
        assert!(check_upload(Some(&big_image), None, &limits).is_ok());

        let huge = part("application/zip", 10 * 1024 * 1024 + 1);
        assert_eq!(
            check_upload(Some(&huge), None, &limits).unwrap_err().message(),
            "File size must be less than 10MB"
        );
    }
}
