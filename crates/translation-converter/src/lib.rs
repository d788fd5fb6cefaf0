//! # translation-converter
//!
//! The conversion pipeline behind the file translation service.
//!
//! A [`FileTranslation`] owns the resolved configuration, the two adapters
//! (external PDF tools and the image codec), and the [`ConverterRegistry`]
//! mapping route patterns to [`Converter`]s. Built-in converters cover
//! JPEG/PNG transcoding and PDF page rasterization; callers may register
//! their own at any time before routes are bound.

pub mod codec;
pub mod converters;
pub mod error;
pub mod executor;
pub mod filesystem;
pub mod models;
pub mod registry;
pub mod service;
pub mod tools;

pub use codec::{ImageCodec, RasterCodec};
pub use converters::{Converter, FnConverter, ImageTranscode, PdfPageRender};
pub use error::ConversionError;
pub use executor::ToolExecutor;
pub use models::{ConversionOutput, OutputFormat, RouteParams};
pub use registry::ConverterRegistry;
pub use service::FileTranslation;
pub use tools::{PageTools, PdfToolkit, RenderOptions};
