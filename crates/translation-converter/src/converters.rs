//! Converters and the built-in converter set.
//!
//! A [`Converter`] turns an input buffer plus route parameters into an
//! output buffer and its content type. The HTTP layer treats every
//! converter as opaque.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::codec::ImageCodec;
use crate::error::ConversionError;
use crate::models::{ConversionOutput, OutputFormat, RouteParams};
use crate::tools::{PageTools, RenderOptions};

/// Route parameter naming the 1-based PDF page.
pub const PAGE_PARAM: &str = "Page";
/// Route parameter naming the requested long-side pixel count.
pub const LONG_SIDE_PARAM: &str = "LongSidePixels";

/// A named capability translating an input file into an output file.
#[async_trait]
pub trait Converter: Send + Sync + fmt::Debug {
    /// Convert `input`, reading any route parameters from `params`.
    async fn convert(
        &self,
        input: Bytes,
        params: &RouteParams,
    ) -> Result<ConversionOutput, ConversionError>;
}

/// Adapts an async closure into a [`Converter`].
pub struct FnConverter<F> {
    name: String,
    f: F,
}

impl<F> FnConverter<F> {
    /// Wrap `f`; `name` only appears in debug output.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnConverter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConverter").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F, Fut> Converter for FnConverter<F>
where
    F: Fn(Bytes, RouteParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ConversionOutput, ConversionError>> + Send + 'static,
{
    async fn convert(
        &self,
        input: Bytes,
        params: &RouteParams,
    ) -> Result<ConversionOutput, ConversionError> {
        (self.f)(input, params.clone()).await
    }
}

/// Pure codec re-encode (`image/jpg-to-png`, `image/png-to-jpg`).
#[derive(Debug, Clone)]
pub struct ImageTranscode {
    codec: Arc<dyn ImageCodec>,
    target: OutputFormat,
}

impl ImageTranscode {
    /// Transcode into `target`.
    pub fn new(codec: Arc<dyn ImageCodec>, target: OutputFormat) -> Self {
        Self { codec, target }
    }

    /// Route pattern for this converter.
    pub fn pattern(&self) -> &'static str {
        match self.target {
            OutputFormat::Png => "image/jpg-to-png",
            OutputFormat::Jpeg => "image/png-to-jpg",
        }
    }
}

#[async_trait]
impl Converter for ImageTranscode {
    async fn convert(
        &self,
        input: Bytes,
        _params: &RouteParams,
    ) -> Result<ConversionOutput, ConversionError> {
        let data = self.codec.transcode(input, self.target).await?;
        Ok(ConversionOutput::image(data, self.target))
    }
}

/// Single PDF page to raster image, optionally resized
/// (`pdf-to-page-{png,jpg}/:Page[/:LongSidePixels]`).
///
/// The page is first extracted into a single-page PDF, then that page is
/// rasterized.
#[derive(Debug, Clone)]
pub struct PdfPageRender {
    tools: Arc<dyn PageTools>,
    format: OutputFormat,
    sized: bool,
}

impl PdfPageRender {
    /// Render at native size.
    pub fn new(tools: Arc<dyn PageTools>, format: OutputFormat) -> Self {
        Self {
            tools,
            format,
            sized: false,
        }
    }

    /// Render and resize to the `LongSidePixels` route parameter.
    pub fn sized(tools: Arc<dyn PageTools>, format: OutputFormat) -> Self {
        Self {
            tools,
            format,
            sized: true,
        }
    }

    /// Route pattern for this converter.
    pub fn pattern(&self) -> String {
        let base = format!("pdf-to-page-{}/:{PAGE_PARAM}", self.format.route_name());
        if self.sized {
            format!("{base}/:{LONG_SIDE_PARAM}")
        } else {
            base
        }
    }
}

#[async_trait]
impl Converter for PdfPageRender {
    async fn convert(
        &self,
        input: Bytes,
        params: &RouteParams,
    ) -> Result<ConversionOutput, ConversionError> {
        let page = params.positive(PAGE_PARAM)?;
        let options = RenderOptions {
            long_side_pixels: if self.sized {
                Some(params.positive(LONG_SIDE_PARAM)?)
            } else {
                None
            },
        };

        let single_page = self.tools.extract_page(input, page).await?;
        let data = self
            .tools
            .render_page(single_page, 1, self.format, options)
            .await?;

        Ok(ConversionOutput::image(data, self.format))
    }
}

/// The six built-in converters keyed by route pattern, in registration
/// order.
pub fn builtin_converters(
    tools: Arc<dyn PageTools>,
    codec: Arc<dyn ImageCodec>,
) -> Vec<(String, Arc<dyn Converter>)> {
    let mut converters: Vec<(String, Arc<dyn Converter>)> = Vec::with_capacity(6);

    for target in [OutputFormat::Png, OutputFormat::Jpeg] {
        let converter = ImageTranscode::new(Arc::clone(&codec), target);
        converters.push((converter.pattern().to_string(), Arc::new(converter)));
    }

    for format in [OutputFormat::Png, OutputFormat::Jpeg] {
        let converter = PdfPageRender::new(Arc::clone(&tools), format);
        converters.push((converter.pattern(), Arc::new(converter)));
    }

    for format in [OutputFormat::Png, OutputFormat::Jpeg] {
        let converter = PdfPageRender::sized(Arc::clone(&tools), format);
        converters.push((converter.pattern(), Arc::new(converter)));
    }

    converters
}
