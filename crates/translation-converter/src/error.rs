//! Unified error type for conversion operations.
//!
//! Every failure a converter can produce (parameter validation, external
//! tool invocation, tool output handling, image codec) is a variant of
//! [`ConversionError`], whose `Display` text is the user-facing reason.

use translation_core::error::AppError;
use thiserror::Error;

/// Unified error type for all conversion operations.
#[derive(Debug, Error)]
pub enum ConversionError {
    // --- Validation errors ---
    /// A route parameter is not a positive integer.
    #[error("Invalid {name} value '{value}'. Must be a positive integer.")]
    InvalidParameter {
        /// The route parameter name.
        name: String,
        /// The raw value that failed to parse.
        value: String,
    },

    /// A route parameter the converter needs was not supplied.
    #[error("Missing route parameter: {name}")]
    MissingParameter {
        /// The route parameter name.
        name: String,
    },

    // --- Temp artifact errors ---
    /// The input could not be staged into a temporary file.
    #[error("Failed to write temporary PDF file: {0}")]
    TempWrite(#[source] std::io::Error),

    // --- Tool invocation errors ---
    /// The tool could not be started or exited with a non-zero status.
    /// `message` is the tool's stderr when it produced any.
    #[error("{tool} failed: {message}")]
    ToolFailed {
        /// Tool label (e.g. `pdftk`).
        tool: String,
        /// Diagnostic text.
        message: String,
    },

    /// The tool did not finish within the configured timeout.
    #[error("{tool} failed: timed out after {timeout_seconds}s")]
    ToolTimeout {
        /// Tool label.
        tool: String,
        /// The timeout that was exceeded.
        timeout_seconds: u64,
    },

    /// The tool wrote more to stdout or stderr than the configured ceiling.
    #[error("{tool} failed: output exceeded maximum buffer size of {limit} bytes")]
    ToolOutputExceeded {
        /// Tool label.
        tool: String,
        /// The ceiling in bytes.
        limit: usize,
    },

    // --- Tool output errors ---
    /// The tool succeeded but the expected output file is absent.
    #[error("{tool} produced no output file.")]
    ToolOutputMissing {
        /// Tool label.
        tool: String,
    },

    /// The tool's output file exists but could not be read.
    #[error("Failed to read {tool} output: {source}")]
    ToolOutputUnreadable {
        /// Tool label.
        tool: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    // --- Codec errors ---
    /// Image decode, encode, or resize failed.
    #[error("Image {operation} failed: {message}")]
    Codec {
        /// `"decode"`, `"encode"`, `"transcode"`, or `"resize"`.
        operation: &'static str,
        /// Codec diagnostic.
        message: String,
    },

    // --- Generic errors ---
    /// Tokio blocking task join error.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ConversionError {
    /// Build a codec error from any displayable cause.
    pub fn codec(operation: &'static str, cause: impl std::fmt::Display) -> Self {
        Self::Codec {
            operation,
            message: cause.to_string(),
        }
    }
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        AppError::conversion(err)
    }
}
