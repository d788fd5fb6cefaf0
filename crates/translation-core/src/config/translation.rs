//! Conversion service configuration and its three-tier resolution.
//!
//! Every setting resolves as: explicit per-instance option, then the
//! process-wide setting, then the built-in default. Resolution happens
//! once, in [`TranslationConfig::resolve`]; the result is immutable.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::result::AppResult;

/// Default route prefix.
pub const DEFAULT_ROUTE_PREFIX: &str = "/conversion";
/// Default API version segment.
pub const DEFAULT_VERSION: &str = "1.0";
/// Default service log level (0 = quiet).
pub const DEFAULT_LOG_LEVEL: u8 = 0;
/// Default maximum accepted file size (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
/// Default page-extraction tool.
pub const DEFAULT_PDFTK_PATH: &str = "pdftk";
/// Default page-rasterization tool.
pub const DEFAULT_PDFTOPPM_PATH: &str = "pdftoppm";
/// Default external tool timeout.
pub const DEFAULT_TOOL_TIMEOUT_SECONDS: u64 = 30;
/// Default ceiling on the pixel count of a resized image (40 megapixels).
pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = 40_000_000;

/// Explicit per-instance options. Highest precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationOptions {
    pub route_prefix: Option<String>,
    pub version: Option<String>,
    pub log_level: Option<u8>,
    pub max_file_size: Option<u64>,
    pub pdftk_path: Option<PathBuf>,
    pub pdftoppm_path: Option<PathBuf>,
    pub tool_timeout_seconds: Option<u64>,
    pub temp_dir: Option<PathBuf>,
    pub max_output_pixels: Option<u64>,
}

/// Process-wide settings, loaded from the `[translation]` configuration
/// section. Consulted only when the instance option is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub route_prefix: Option<String>,
    pub version: Option<String>,
    pub log_level: Option<u8>,
    pub max_file_size: Option<u64>,
    pub pdftk_path: Option<PathBuf>,
    pub pdftoppm_path: Option<PathBuf>,
    pub tool_timeout_seconds: Option<u64>,
    pub temp_dir: Option<PathBuf>,
    pub max_output_pixels: Option<u64>,
}

/// Resolved, immutable conversion service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Validate, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Route prefix, normalized to a leading slash and no trailing slash.
    pub route_prefix: String,
    /// API version segment.
    #[validate(length(min = 1))]
    pub version: String,
    /// `> 0` logs converter registration, `> 1` logs tool command lines.
    pub log_level: u8,
    /// Ceiling for inbound bodies and for captured tool output, in bytes.
    #[validate(range(min = 1))]
    pub max_file_size: u64,
    /// Page-extraction tool (pdftk).
    pub pdftk_path: PathBuf,
    /// Page-rasterization tool (pdftoppm).
    pub pdftoppm_path: PathBuf,
    /// Per-invocation timeout for both external tools.
    #[validate(range(min = 1, max = 3600))]
    pub tool_timeout_seconds: u64,
    /// Directory where temporary artifacts are created.
    pub temp_dir: PathBuf,
    /// Largest `width * height` a resize may produce. Upscaling is allowed
    /// up to this size.
    #[validate(range(min = 1))]
    pub max_output_pixels: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            version: DEFAULT_VERSION.to_string(),
            log_level: DEFAULT_LOG_LEVEL,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            pdftk_path: PathBuf::from(DEFAULT_PDFTK_PATH),
            pdftoppm_path: PathBuf::from(DEFAULT_PDFTOPPM_PATH),
            tool_timeout_seconds: DEFAULT_TOOL_TIMEOUT_SECONDS,
            temp_dir: std::env::temp_dir(),
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
        }
    }
}

impl TranslationConfig {
    /// Resolve options over settings over defaults and validate the result.
    pub fn resolve(
        options: &TranslationOptions,
        settings: &TranslationSettings,
    ) -> AppResult<Self> {
        let config = Self {
            route_prefix: normalize_prefix(&cascade(
                &options.route_prefix,
                &settings.route_prefix,
                || DEFAULT_ROUTE_PREFIX.to_string(),
            )),
            version: cascade(&options.version, &settings.version, || {
                DEFAULT_VERSION.to_string()
            }),
            log_level: cascade(&options.log_level, &settings.log_level, || {
                DEFAULT_LOG_LEVEL
            }),
            max_file_size: cascade(&options.max_file_size, &settings.max_file_size, || {
                DEFAULT_MAX_FILE_SIZE
            }),
            pdftk_path: cascade(&options.pdftk_path, &settings.pdftk_path, || {
                PathBuf::from(DEFAULT_PDFTK_PATH)
            }),
            pdftoppm_path: cascade(&options.pdftoppm_path, &settings.pdftoppm_path, || {
                PathBuf::from(DEFAULT_PDFTOPPM_PATH)
            }),
            tool_timeout_seconds: cascade(
                &options.tool_timeout_seconds,
                &settings.tool_timeout_seconds,
                || DEFAULT_TOOL_TIMEOUT_SECONDS,
            ),
            temp_dir: cascade(&options.temp_dir, &settings.temp_dir, std::env::temp_dir),
            max_output_pixels: cascade(
                &options.max_output_pixels,
                &settings.max_output_pixels,
                || DEFAULT_MAX_OUTPUT_PIXELS,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Full route for a converter pattern: `{prefix}/{version}/{pattern}`.
    pub fn route_for(&self, pattern: &str) -> String {
        format!(
            "{}/{}/{}",
            self.route_prefix,
            self.version,
            pattern.trim_start_matches('/')
        )
    }

    /// `max_file_size` as a `usize`, saturating on 32-bit targets.
    pub fn max_file_size_bytes(&self) -> usize {
        usize::try_from(self.max_file_size).unwrap_or(usize::MAX)
    }
}

fn cascade<T: Clone>(option: &Option<T>, setting: &Option<T>, default: impl FnOnce() -> T) -> T {
    option
        .as_ref()
        .or(setting.as_ref())
        .cloned()
        .unwrap_or_else(default)
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
