use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cli::utils::output_envelope;
use crate::cli::OutputFormat;
use crate::client::BuildProClient;

/// Media type from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
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
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

pub async fn handle(
    client: &BuildProClient,
    path: PathBuf,
    image: bool,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let content_type = content_type_for(&path);

    let envelope = if image {
        client.upload_image(&file_name, bytes, content_type).await
    } else {
        client.upload_file(&file_name, bytes, content_type).await
    };
    output_envelope(&output_format, &envelope, "Uploaded")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_media_types() {
        assert_eq!(content_type_for(Path::new("site/photo.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("plan.pdf")), "application/pdf");
        assert_eq!(content_type_for(Path::new("README")), "application/octet-stream");
    }
}
