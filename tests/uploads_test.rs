//! Proposal PDF uploads and static serving.

mod common;

use axum::{body, http::Method};
use common::{response_json, TestApp};

const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\n%%EOF\n";

#[tokio::test]
async fn pdf_upload_is_stored_and_served() {
    let app = TestApp::new().await;

    let response = app
        .upload("pdf", "application/pdf", PDF_BYTES, Some(&app.salesperson.token))
        .await;
    assert_eq!(response.status(), 201);
    let body = response_json(response).await;

    let filename = body["filename"].as_str().unwrap();
    assert!(filename.starts_with("proposal-"));
    assert!(filename.ends_with(".pdf"));
    assert_eq!(body["url"], format!("/uploads/pdfs/{filename}"));

    let on_disk = std::fs::read(app.upload_path().join("pdfs").join(filename)).unwrap();
    assert_eq!(on_disk, PDF_BYTES);

    let served = app
        .request(Method::GET, body["url"].as_str().unwrap(), None, None)
        .await;
    assert_eq!(served.status(), 200);
    let bytes = body::to_bytes(served.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], PDF_BYTES);
}

#[tokio::test]
async fn non_pdf_uploads_are_rejected() {
    let app = TestApp::new().await;
    let response = app
        .upload("pdf", "image/png", b"\x89PNG\r\n", Some(&app.admin.token))
        .await;
    assert_eq!(response.status(), 400);
    assert!(!app.upload_path().join("pdfs").exists());
}

#[tokio::test]
async fn missing_pdf_field_is_a_bad_request() {
    let app = TestApp::new().await;
    let response = app
        .upload("arquivo", "application/pdf", PDF_BYTES, Some(&app.admin.token))
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn oversized_uploads_are_rejected() {
    let app = TestApp::new().await;
    let limit = app.state.config.upload_max_bytes;

    let too_big = vec![b'x'; limit + 1];
    let response = app
        .upload("pdf", "application/pdf", &too_big, Some(&app.admin.token))
        .await;
    assert_eq!(response.status(), 413);

    let far_too_big = vec![b'x'; limit * 4];
    let response = app
        .upload("pdf", "application/pdf", &far_too_big, Some(&app.admin.token))
        .await;
    assert_eq!(response.status(), 413);

    assert!(!app.upload_path().join("pdfs").exists());
}

#[tokio::test]
async fn uploads_require_a_token() {
    let app = TestApp::new().await;
    let response = app.upload("pdf", "application/pdf", PDF_BYTES, None).await;
    assert_eq!(response.status(), 401);
}
