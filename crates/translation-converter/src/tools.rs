//! External PDF tool adapter.
//!
//! [`PageTools`] isolates page extraction and rasterization behind a trait;
//! [`PdfToolkit`] implements it with `pdftk` and `pdftoppm` driven through
//! temp files. pdftoppm picks its own output file name, so the produced
//! image is located by scanning the temp directory for the reserved
//! prefix. A toolkit whose rasterizer accepts an exact output path can
//! replace that scan without touching the converters.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use translation_core::TranslationConfig;

use crate::codec::ImageCodec;
use crate::error::ConversionError;
use crate::executor::{ToolExecutor, ToolInvocation};
use crate::filesystem::{TempArtifact, TempPrefix};
use crate::models::OutputFormat;

/// Label for the page-extraction tool in logs and errors.
pub const PDFTK: &str = "pdftk";
/// Label for the rasterization tool in logs and errors.
pub const PDFTOPPM: &str = "pdftoppm";

/// Render DPI when the caller keeps the native size.
pub const NATIVE_DPI: u32 = 150;
/// Render DPI when the result is downsampled to a requested long side.
pub const RESIZE_SOURCE_DPI: u32 = 300;

/// Optional rendering parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pin the longer image side to this many pixels.
    pub long_side_pixels: Option<u32>,
}

impl RenderOptions {
    /// Requested long side, if a resize was asked for.
    pub fn resize_target(&self) -> Option<u32> {
        self.long_side_pixels.filter(|px| *px > 0)
    }

    /// DPI to rasterize at for these options.
    pub fn dpi(&self) -> u32 {
        if self.resize_target().is_some() {
            RESIZE_SOURCE_DPI
        } else {
            NATIVE_DPI
        }
    }
}

/// PDF page operations.
#[async_trait]
pub trait PageTools: Send + Sync + std::fmt::Debug {
    /// Extract the 1-based `page` of `pdf` as a single-page PDF.
    async fn extract_page(&self, pdf: Bytes, page: u32) -> Result<Bytes, ConversionError>;

    /// Rasterize the 1-based `page` of `pdf` into `format`, optionally
    /// resized per `options`.
    async fn render_page(
        &self,
        pdf: Bytes,
        page: u32,
        format: OutputFormat,
        options: RenderOptions,
    ) -> Result<Bytes, ConversionError>;
}

/// [`PageTools`] backed by the `pdftk` and `pdftoppm` command-line tools.
#[derive(Debug, Clone)]
pub struct PdfToolkit {
    pdftk_path: PathBuf,
    pdftoppm_path: PathBuf,
    temp_dir: PathBuf,
    timeout: Duration,
    max_output_bytes: usize,
    executor: ToolExecutor,
    codec: Arc<dyn ImageCodec>,
}

impl PdfToolkit {
    /// Create a toolkit from the resolved configuration. `codec` performs
    /// the optional resize after rasterization.
    pub fn new(config: &TranslationConfig, codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            pdftk_path: config.pdftk_path.clone(),
            pdftoppm_path: config.pdftoppm_path.clone(),
            temp_dir: config.temp_dir.clone(),
            timeout: Duration::from_secs(config.tool_timeout_seconds),
            max_output_bytes: config.max_file_size_bytes(),
            executor: ToolExecutor::new(config.log_level),
            codec,
        }
    }

    fn invocation(&self, tool: &str, program: &Path) -> ToolInvocation {
        ToolInvocation::new(tool, program)
            .timeout(self.timeout)
            .max_output_bytes(self.max_output_bytes)
    }
}

#[async_trait]
impl PageTools for PdfToolkit {
    async fn extract_page(&self, pdf: Bytes, page: u32) -> Result<Bytes, ConversionError> {
        let input = TempArtifact::create(&self.temp_dir, "file_translation_extract_input", "pdf", &pdf)
            .await
            .map_err(ConversionError::TempWrite)?;
        let output = TempArtifact::reserve(&self.temp_dir, "file_translation_extract_output", "pdf");

        let invocation = self
            .invocation(PDFTK, &self.pdftk_path)
            .arg(input.path())
            .arg("cat")
            .arg(page.to_string())
            .arg("output")
            .arg(output.path());

        self.executor.run(&invocation).await?;

        let data = tokio::fs::read(output.path())
            .await
            .map_err(|source| ConversionError::ToolOutputUnreadable {
                tool: PDFTK.to_string(),
                source,
            })?;

        debug!(page, bytes = data.len(), "Extracted PDF page");
        Ok(Bytes::from(data))
    }

    async fn render_page(
        &self,
        pdf: Bytes,
        page: u32,
        format: OutputFormat,
        options: RenderOptions,
    ) -> Result<Bytes, ConversionError> {
        let input = TempArtifact::create(&self.temp_dir, "file_translation_render_input", "pdf", &pdf)
            .await
            .map_err(ConversionError::TempWrite)?;
        let output = TempPrefix::reserve(&self.temp_dir, "file_translation_render_output");

        let page_arg = page.to_string();
        let invocation = self
            .invocation(PDFTOPPM, &self.pdftoppm_path)
            .arg(format.pdftoppm_flag())
            .arg("-f")
            .arg(&page_arg)
            .arg("-l")
            .arg(&page_arg)
            .arg("-r")
            .arg(options.dpi().to_string())
            .arg(input.path())
            .arg(output.root());

        self.executor.run(&invocation).await?;

        let unreadable = |source| ConversionError::ToolOutputUnreadable {
            tool: PDFTOPPM.to_string(),
            source,
        };

        let produced = output
            .find_output(format.extension())
            .await
            .map_err(unreadable)?
            .ok_or_else(|| ConversionError::ToolOutputMissing {
                tool: PDFTOPPM.to_string(),
            })?;
        let raster = tokio::fs::read(&produced).await.map_err(unreadable)?;

        // Release temp files before the codec runs.
        drop(output);
        drop(input);

        debug!(page, dpi = options.dpi(), bytes = raster.len(), "Rasterized PDF page");

        match options.resize_target() {
            Some(long_side) => {
                self.codec
                    .resize_to_long_side(Bytes::from(raster), long_side, format)
                    .await
            }
            None => Ok(Bytes::from(raster)),
        }
    }
}
