//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode, header};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use translation_converter::FileTranslation;
use translation_core::{AppError, TranslationConfig, TranslationOptions, TranslationSettings};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// The service the router was bound from
    pub translation: FileTranslation,
    /// Private temp directory handed to the PDF tools
    pub temp_dir: TempDir,
}

impl TestApp {
    /// Create a test application with default options
    pub fn new() -> Self {
        Self::with_options(TranslationOptions::default())
    }

    /// Create a test application; `temp_dir` is always overridden with a
    /// fresh directory
    pub fn with_options(mut options: TranslationOptions) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        options.temp_dir = Some(temp_dir.path().to_path_buf());

        let config = TranslationConfig::resolve(&options, &TranslationSettings::default())
            .expect("Failed to resolve config");
        let translation = FileTranslation::new(config);
        let router = translation_api::connect_routes(&translation).expect("Failed to bind routes");

        Self {
            router,
            translation,
            temp_dir,
        }
    }

    /// Rebind routes after converters were added
    pub fn reconnect(&mut self) {
        self.try_reconnect().expect("Failed to bind routes");
    }

    /// Rebind routes, keeping the current router when binding fails
    pub fn try_reconnect(&mut self) -> Result<(), AppError> {
        self.router = translation_api::connect_routes(&self.translation)?;
        Ok(())
    }

    /// POST raw bytes
    pub async fn post(&self, path: &str, body: impl Into<Bytes>) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(Body::from(body.into()))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// GET a path
    pub async fn get(&self, path: &str) -> TestResponse {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send an arbitrary request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Names of everything currently in the temp directory
    pub fn temp_entries(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.temp_dir.path())
            .expect("Failed to list temp dir")
            .map(|e| e.expect("Failed to read entry").path())
            .collect()
    }

    /// Whether both PDF tools are installed
    pub async fn pdf_tools_available(&self) -> bool {
        self.translation.missing_tools().await.is_empty()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON, `Null` when it is not JSON
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    /// A response header as a string
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decoded image dimensions of the body
    pub fn image_dimensions(&self) -> (u32, u32) {
        let img = image::load_from_memory(&self.body).expect("Body is not an image");
        (img.width(), img.height())
    }
}

/// A solid red JPEG
pub fn jpeg_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([255, 0, 0]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .expect("Failed to encode JPEG");
    buf
}

/// A solid blue PNG with alpha
pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("Failed to encode PNG");
    buf
}

/// A one-page PDF with a 72x72 point red page
pub fn pdf_fixture() -> Vec<u8> {
    concat!(
        "%PDF-1.4\n",
        "1 0 obj<</Type/Catalog/Pages 2 0 R>>endobj\n",
        "2 0 obj<</Type/Pages/Kids[3 0 R]/Count 1>>endobj\n",
        "3 0 obj<</Type/Page/Parent 2 0 R/MediaBox[0 0 72 72]/Contents 4 0 R>>endobj\n",
        "4 0 obj<</Length 44>>stream\n",
        "1 0 0 rg\n",
        "0 0 72 72 re\n",
        "f\n",
        "endstream\n",
        "endobj\n",
        "xref\n",
        "0 5\n",
        "0000000000 65535 f \n",
        "0000000009 00000 n \n",
        "0000000058 00000 n \n",
        "0000000115 00000 n \n",
        "0000000210 00000 n \n",
        "trailer<</Root 1 0 R/Size 5>>\n",
        "startxref\n",
        "304\n",
        "%%EOF",
    )
    .as_bytes()
    .to_vec()
}
