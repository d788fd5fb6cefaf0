//! Health and discovery handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ConvertersResponse, HealthResponse};
use crate::state::AppState;

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET {prefix}/{version}/converters
pub async fn list_converters(State(state): State<AppState>) -> Json<ConvertersResponse> {
    Json(ConvertersResponse {
        converters: state.registry.patterns().map(str::to_string).collect(),
    })
}
