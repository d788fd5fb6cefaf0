//! Integration tests for the PDF page routes. Skipped when pdftk or
//! pdftoppm is not installed.

mod helpers;

use http::{StatusCode, header};

macro_rules! require_pdf_tools {
    ($app:expr) => {
        if !$app.pdf_tools_available().await {
            eprintln!("skipping: pdftk/pdftoppm not installed");
            return;
        }
    };
}

#[tokio::test]
async fn test_pdf_page_to_png() {
    let app = helpers::TestApp::new();
    require_pdf_tools!(app);

    let response = app
        .post("/conversion/1.0/pdf-to-page-png/1", helpers::pdf_fixture())
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("image/png"));
    assert_eq!(&response.body[..4], &[137, 80, 78, 71]);
    // 72pt at 150 DPI
    assert_eq!(response.image_dimensions(), (150, 150));
}

#[tokio::test]
async fn test_pdf_page_to_jpeg() {
    let app = helpers::TestApp::new();
    require_pdf_tools!(app);

    let response = app
        .post("/conversion/1.0/pdf-to-page-jpg/1", helpers::pdf_fixture())
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("image/jpeg"));
    assert_eq!(&response.body[..3], &[0xFF, 0xD8, 0xFF]);
}

#[tokio::test]
async fn test_pdf_page_resized_png() {
    let app = helpers::TestApp::new();
    require_pdf_tools!(app);

    let response = app
        .post("/conversion/1.0/pdf-to-page-png/1/100", helpers::pdf_fixture())
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("image/png"));
    let (width, height) = response.image_dimensions();
    assert_eq!(width.max(height), 100);
}

#[tokio::test]
async fn test_pdf_page_resized_jpeg() {
    let app = helpers::TestApp::new();
    require_pdf_tools!(app);

    let response = app
        .post("/conversion/1.0/pdf-to-page-jpg/1/200", helpers::pdf_fixture())
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header(header::CONTENT_TYPE), Some("image/jpeg"));
    let (width, height) = response.image_dimensions();
    assert_eq!(width.max(height), 200);
}

#[tokio::test]
async fn test_page_out_of_range() {
    let app = helpers::TestApp::new();
    require_pdf_tools!(app);

    let response = app
        .post("/conversion/1.0/pdf-to-page-png/999", helpers::pdf_fixture())
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        response.json()["error"]
            .as_str()
            .is_some_and(|e| e.starts_with("Conversion failed: "))
    );
}

#[tokio::test]
async fn test_non_pdf_input() {
    let app = helpers::TestApp::new();
    require_pdf_tools!(app);

    let response = app
        .post("/conversion/1.0/pdf-to-page-png/1", b"not a pdf".to_vec())
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_invalid_page_parameters() {
    let app = helpers::TestApp::new();

    for path in [
        "/conversion/1.0/pdf-to-page-png/0",
        "/conversion/1.0/pdf-to-page-png/abc",
        "/conversion/1.0/pdf-to-page-jpg/1/-5",
        "/conversion/1.0/pdf-to-page-jpg/1/0",
    ] {
        let response = app.post(path, helpers::pdf_fixture()).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        let error = response.json()["error"].as_str().unwrap_or_default().to_string();
        assert!(error.starts_with("Conversion failed: Invalid"), "{error}");
    }

    assert!(app.temp_entries().is_empty());
}

#[tokio::test]
async fn test_no_residual_temp_files() {
    let app = helpers::TestApp::new();
    require_pdf_tools!(app);

    assert!(app.temp_entries().is_empty());

    for path in [
        "/conversion/1.0/pdf-to-page-png/1",
        "/conversion/1.0/pdf-to-page-jpg/1/50",
        "/conversion/1.0/pdf-to-page-png/999",
    ] {
        app.post(path, helpers::pdf_fixture()).await;
    }
    app.post("/conversion/1.0/pdf-to-page-png/1", b"garbage".to_vec())
        .await;

    assert_eq!(app.temp_entries(), Vec::<std::path::PathBuf>::new());
}

#[tokio::test]
async fn test_concurrent_conversions() {
    let app = helpers::TestApp::new();
    require_pdf_tools!(app);

    let requests = (0..4).map(|_| {
        app.post("/conversion/1.0/pdf-to-page-png/1/64", helpers::pdf_fixture())
    });
    let responses = futures::future::join_all(requests).await;

    for response in responses {
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.image_dimensions(), (64, 64));
    }
    assert!(app.temp_entries().is_empty());
}
