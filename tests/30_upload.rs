mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

use common::{error_of, TestServer};

async fn upload(server: &TestServer, form: Form) -> Result<(StatusCode, Value)> {
    let res = server.client.post(server.url("/api/upload")).multipart(form).send().await?;
    let status = res.status();
    Ok((status, res.json().await?))
}

fn part(name: &str, bytes: Vec<u8>, content_type: &str) -> Part {
    Part::bytes(bytes).file_name(name.to_string()).mime_str(content_type).unwrap()
}

fn stored_files(server: &TestServer) -> usize {
    std::fs::read_dir(server.uploads.path()).map(|d| d.count()).unwrap_or(0)
}

#[tokio::test]
async fn stores_and_serves_an_upload() -> Result<()> {
    let server = common::spawn_server().await?;
    let form = Form::new()
        .part("file", part("site photo (1).png", b"not really a png".to_vec(), "image/png"))
        .text("fileType", "image");

    let (status, body) = upload(&server, form).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let filename = body["data"]["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with("-site_photo__1_.png"), "{}", filename);
    assert_eq!(body["data"]["url"], format!("/uploads/{}", filename));

    let stored = std::fs::read(server.uploads.path().join(&filename))?;
    assert_eq!(stored, b"not really a png");

    let served = server.client.get(server.url(&format!("/uploads/{}", filename))).send().await?;
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await?.as_ref(), b"not really a png");
    Ok(())
}

#[tokio::test]
async fn image_upload_rejects_other_media_types_before_writing() -> Result<()> {
    let server = common::spawn_server().await?;
    let form = Form::new()
        .part("file", part("notes.txt", b"hello".to_vec(), "text/plain"))
        .text("fileType", "image");

    let (status, body) = upload(&server, form).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "File must be an image");
    assert_eq!(stored_files(&server), 0);
    Ok(())
}

#[tokio::test]
async fn missing_file_part() -> Result<()> {
    let server = common::spawn_server().await?;
    let form = Form::new().text("fileType", "file");

    let (status, body) = upload(&server, form).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "No file provided");
    Ok(())
}

#[tokio::test]
async fn oversized_image_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let form = Form::new()
        .part("file", part("big.jpg", vec![0; 5 * 1024 * 1024 + 1], "image/jpeg"))
        .text("fileType", "image");

    let (status, body) = upload(&server, form).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "File size must be less than 5MB");
    assert_eq!(stored_files(&server), 0);
    Ok(())
}

#[tokio::test]
async fn general_files_accept_any_media_type() -> Result<()> {
    let server = common::spawn_server().await?;
    let form = Form::new()
        .part("file", part("contract.pdf", b"%PDF-1.4".to_vec(), "application/pdf"))
        .text("fileType", "file");

    let (status, body) = upload(&server, form).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(stored_files(&server), 1);
    Ok(())
}

#[tokio::test]
async fn body_over_the_request_limit_reports_the_size_rule() -> Result<()> {
    let server = common::spawn_server().await?;
    let form = Form::new()
        .part("file", part("archive.zip", vec![0; 12 * 1024 * 1024], "application/zip"))
        .text("fileType", "file");

    let (status, body) = upload(&server, form).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&body), "File size must be less than 10MB");
    assert_eq!(stored_files(&server), 0);
    Ok(())
}
