//! Response DTOs.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
}

/// Registered converter patterns, in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertersResponse {
    pub converters: Vec<String>,
}
