//! Integration tests for the image conversion routes and the dispatcher.

mod helpers;

use http::{StatusCode, header};

use translation_core::TranslationOptions;

#[tokio::test]
async fn test_jpeg_to_png() {
    let app = helpers::TestApp::new();

    let response = app
        .post("/conversion/1.0/image/jpg-to-png", helpers::jpeg_fixture(2, 2))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("image/png"));
    assert_eq!(&response.body[..4], &[137, 80, 78, 71]);
    assert_eq!(
        response.header(header::CONTENT_LENGTH),
        Some(response.body.len().to_string().as_str())
    );
    assert_eq!(response.image_dimensions(), (2, 2));
}

#[tokio::test]
async fn test_png_to_jpeg() {
    let app = helpers::TestApp::new();

    let response = app
        .post("/conversion/1.0/image/png-to-jpg", helpers::png_fixture(2, 2))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("image/jpeg"));
    assert_eq!(&response.body[..3], &[0xFF, 0xD8, 0xFF]);
}

#[tokio::test]
async fn test_empty_body_is_rejected() {
    let app = helpers::TestApp::new();

    for path in [
        "/conversion/1.0/image/jpg-to-png",
        "/conversion/1.0/pdf-to-page-png/1",
        "/conversion/1.0/pdf-to-page-jpg/1/100",
    ] {
        let response = app.post(path, Vec::new()).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(
            response.json()["error"],
            "No file data provided in request body."
        );
    }
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = helpers::TestApp::with_options(TranslationOptions {
        max_file_size: Some(16),
        ..Default::default()
    });

    let response = app
        .post("/conversion/1.0/image/jpg-to-png", vec![0u8; 64])
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        response.json()["error"],
        "File size exceeds maximum allowed size of 16 bytes."
    );
}

#[tokio::test]
async fn test_body_at_limit_is_accepted() {
    let jpeg = helpers::jpeg_fixture(2, 2);
    let app = helpers::TestApp::with_options(TranslationOptions {
        max_file_size: Some(jpeg.len() as u64),
        ..Default::default()
    });

    let response = app.post("/conversion/1.0/image/jpg-to-png", jpeg).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_image_data() {
    let app = helpers::TestApp::new();

    let response = app
        .post("/conversion/1.0/image/jpg-to-png", b"this is not an image".to_vec())
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.json()["error"].as_str().unwrap_or_default().to_string();
    assert!(error.starts_with("Conversion failed: "), "{error}");
}

#[tokio::test]
async fn test_custom_route_prefix_and_version() {
    let app = helpers::TestApp::with_options(TranslationOptions {
        route_prefix: Some("custom/".to_string()),
        version: Some("2.0".to_string()),
        ..Default::default()
    });

    let response = app
        .post("/custom/2.0/image/jpg-to-png", helpers::jpeg_fixture(2, 2))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .post("/conversion/1.0/image/jpg-to-png", helpers::jpeg_fixture(2, 2))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_on_conversion_route_not_allowed() {
    let app = helpers::TestApp::new();

    let response = app.get("/conversion/1.0/image/jpg-to-png").await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_list_converters() {
    let app = helpers::TestApp::new();

    let response = app.get("/conversion/1.0/converters").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json()["converters"],
        serde_json::json!([
            "image/jpg-to-png",
            "image/png-to-jpg",
            "pdf-to-page-png/:Page",
            "pdf-to-page-jpg/:Page",
            "pdf-to-page-png/:Page/:LongSidePixels",
            "pdf-to-page-jpg/:Page/:LongSidePixels",
        ])
    );
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "ok");
    assert!(response.json()["version"].is_string());
}
