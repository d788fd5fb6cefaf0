//! Conversion handler: the per-route dispatch state machine.
//!
//! collect body → reject empty → convert → respond. Collection failures
//! are `413`, an empty body is `400`, every converter failure is `500`
//! with a `"Conversion failed: "` message.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Request};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tracing::{debug, error, warn};

use translation_converter::{Converter, RouteParams};
use translation_core::AppError;

use crate::body::{BodySource, CollectError, collect_body};
use crate::error::ApiError;
use crate::state::AppState;

/// Message for requests without a body.
pub const EMPTY_BODY_MESSAGE: &str = "No file data provided in request body.";

/// A converter bound to its registry pattern.
#[derive(Debug, Clone)]
pub struct ConverterRoute {
    pub pattern: Arc<str>,
    pub converter: Arc<dyn Converter>,
}

/// Route parameters from the path extractor.
///
/// A path that cannot be decoded, such as one carrying `%FF`, is reported
/// as a failed conversion rather than the extractor's plain-text `400`.
pub fn route_params(
    route: &ConverterRoute,
    params: Result<Path<HashMap<String, String>>, PathRejection>,
) -> Result<RouteParams, ApiError> {
    match params {
        Ok(Path(params)) => Ok(RouteParams::from(params)),
        Err(rejection) => {
            let reason = rejection.body_text();
            warn!(pattern = %route.pattern, error = %reason, "Rejected route parameters");
            Err(AppError::conversion(format!("Invalid route parameters: {reason}")).into())
        }
    }
}

/// POST {prefix}/{version}/{pattern}
pub async fn convert(
    state: AppState,
    route: ConverterRoute,
    params: RouteParams,
    request: Request,
) -> Result<Response, ApiError> {
    let limit = state.config.max_file_size_bytes();

    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if declared.is_some_and(|len| len > state.config.max_file_size) {
        let err = CollectError::SizeExceeded { limit };
        warn!(pattern = %route.pattern, error = %err, "Rejected oversized upload");
        return Err(err.into());
    }

    let input = collect_body(BodySource::Streaming(request.into_body()), limit)
        .await
        .map_err(|e| {
            warn!(pattern = %route.pattern, error = %e, "Request body collection failed");
            ApiError::from(e)
        })?;

    if input.is_empty() {
        return Err(AppError::validation(EMPTY_BODY_MESSAGE).into());
    }

    let input_len = input.len();
    let output = route.converter.convert(input, &params).await.map_err(|e| {
        error!(pattern = %route.pattern, error = %e, "Conversion failed");
        ApiError::from(e)
    })?;

    debug!(
        pattern = %route.pattern,
        input_bytes = input_len,
        output_bytes = output.data.len(),
        content_type = %output.content_type,
        "Conversion succeeded"
    );

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, output.content_type)
        .header(header::CONTENT_LENGTH, output.data.len())
        .body(Body::from(output.data))
        .map_err(|e| ApiError::from(AppError::internal(format!("Failed to build response: {e}"))))
}
