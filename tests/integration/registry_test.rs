//! Integration tests for registering converters on a running service.

mod helpers;

use std::sync::Arc;

use bytes::Bytes;
use http::{StatusCode, header};

use translation_converter::{
    ConversionError, ConversionOutput, Converter, FnConverter, RouteParams,
};

fn echo() -> Arc<dyn Converter> {
    Arc::new(FnConverter::new("echo", |input: Bytes, _: RouteParams| async move {
        Ok::<_, ConversionError>(ConversionOutput {
            data: input,
            content_type: "application/octet-stream".to_string(),
        })
    }))
}

/// Converter that fails on purpose, to exercise the 500 path.
#[derive(Debug)]
struct AlwaysFails;

#[async_trait::async_trait]
impl Converter for AlwaysFails {
    async fn convert(
        &self,
        _input: Bytes,
        _params: &RouteParams,
    ) -> Result<ConversionOutput, ConversionError> {
        Err(ConversionError::ToolOutputMissing {
            tool: "nothing".to_string(),
        })
    }
}

#[tokio::test]
async fn test_custom_converter_is_routable_after_reconnect() {
    let mut app = helpers::TestApp::new();
    let before = app.translation.converters().len();

    app.translation.add_converter("custom/echo", echo());
    assert_eq!(app.translation.converters().len(), before + 1);

    // routes bound earlier do not see it
    let response = app.post("/conversion/1.0/custom/echo", "hello world").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    app.reconnect();

    let response = app.post("/conversion/1.0/custom/echo", "hello world").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        Some("application/octet-stream")
    );
    assert_eq!(&response.body[..], b"hello world");
}

#[tokio::test]
async fn test_custom_converter_with_parameters() {
    let mut app = helpers::TestApp::new();

    app.translation.add_converter(
        "text/repeat/:Times",
        Arc::new(FnConverter::new("repeat", |input: Bytes, params: RouteParams| async move {
            let times = params.positive("Times")?;
            Ok::<_, ConversionError>(ConversionOutput {
                data: Bytes::from(input.repeat(times as usize)),
                content_type: "text/plain".to_string(),
            })
        })),
    );
    app.reconnect();

    let response = app.post("/conversion/1.0/text/repeat/3", "ab").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], b"ababab");

    let response = app.post("/conversion/1.0/text/repeat/zero", "ab").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_last_registration_wins() {
    let mut app = helpers::TestApp::new();
    let before = app.translation.converters().len();

    app.translation.add_converter("image/jpg-to-png", echo());
    app.reconnect();

    assert_eq!(app.translation.converters().len(), before);

    let response = app.post("/conversion/1.0/image/jpg-to-png", "not a jpeg").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], b"not a jpeg");
}

#[tokio::test]
async fn test_converter_failure_maps_to_500() {
    let mut app = helpers::TestApp::new();

    app.translation.add_converter("broken", Arc::new(AlwaysFails));
    app.reconnect();

    let response = app.post("/conversion/1.0/broken", "x").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json()["error"],
        "Conversion failed: nothing produced no output file."
    );
}

#[tokio::test]
async fn test_listing_includes_custom_converters() {
    let mut app = helpers::TestApp::new();

    app.translation.add_converter("custom/echo", echo());
    app.reconnect();

    let response = app.get("/conversion/1.0/converters").await;
    let converters = response.json()["converters"].clone();

    assert_eq!(converters.as_array().map(Vec::len), Some(7));
    assert_eq!(converters[6], "custom/echo");
}

#[tokio::test]
async fn test_conflicting_pattern_is_a_configuration_error() {
    let mut app = helpers::TestApp::new();

    app.translation.add_converter("pdf-to-page-png/:Number", echo());
    let err = app.try_reconnect().expect_err("parameter names clash");

    assert_eq!(err.kind, translation_core::ErrorKind::Configuration);
    assert!(err.message.contains("conflicts with /conversion/1.0/pdf-to-page-png/:Page"));

    // the previous router keeps serving
    let response = app.get("/conversion/1.0/converters").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_undecodable_route_parameter_maps_to_500() {
    let mut app = helpers::TestApp::new();

    app.translation.add_converter("text/echo/:Name", echo());
    app.reconnect();

    let response = app.post("/conversion/1.0/text/echo/%FF", "x").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = response.json()["error"].as_str().unwrap_or_default().to_string();
    assert!(
        message.starts_with("Conversion failed: Invalid route parameters"),
        "{message}"
    );
}
