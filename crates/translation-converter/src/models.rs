//! Domain models: output formats, route parameters, conversion output.

use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

use crate::error::ConversionError;

/// Raster formats a converter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Portable Network Graphics.
    Png,
    /// JPEG / JFIF.
    Jpeg,
}

impl OutputFormat {
    /// MIME type for the `Content-Type` header.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// File extension (without dot) pdftoppm gives files in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// pdftoppm output-format flag.
    pub fn pdftoppm_flag(self) -> &'static str {
        match self {
            Self::Png => "-png",
            Self::Jpeg => "-jpeg",
        }
    }

    /// Route segment naming this format (`png` / `jpg`).
    pub fn route_name(self) -> &'static str {
        self.extension()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => write!(f, "png"),
            Self::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// Named path parameters captured by the HTTP layer for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    /// Wrap a parameter map.
    pub fn new(params: HashMap<String, String>) -> Self {
        Self(params)
    }

    /// Raw parameter value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Parameter parsed as a positive (non-zero) integer.
    ///
    /// Parsing is strict: surrounding whitespace is trimmed, but trailing
    /// text such as `"12abc"` or a fraction such as `"1.5"` is rejected
    /// rather than truncated to its leading digits.
    pub fn positive(&self, name: &str) -> Result<u32, ConversionError> {
        let raw = self
            .get(name)
            .ok_or_else(|| ConversionError::MissingParameter {
                name: name.to_string(),
            })?;

        match raw.trim().parse::<u32>() {
            Ok(value) if value >= 1 => Ok(value),
            _ => Err(ConversionError::InvalidParameter {
                name: name.to_string(),
                value: raw.to_string(),
            }),
        }
    }
}

impl From<HashMap<String, String>> for RouteParams {
    fn from(params: HashMap<String, String>) -> Self {
        Self(params)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for RouteParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// Converted file bytes.
    pub data: Bytes,
    /// MIME type.
    pub content_type: String,
}

impl ConversionOutput {
    /// Output in one of the built-in raster formats.
    pub fn image(data: Bytes, format: OutputFormat) -> Self {
        Self {
            data,
            content_type: format.content_type().to_string(),
        }
    }
}
