//! Image codec adapter.
//!
//! [`ImageCodec`] is the seam the converters and the PDF toolkit use for
//! decode/re-encode and aspect-preserving resizes. [`RasterCodec`] is the
//! `image`-crate implementation; CPU-bound work runs on the blocking pool
//! so it never stalls other in-flight requests.

use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

use translation_core::config::translation::DEFAULT_MAX_OUTPUT_PIXELS;

use crate::error::ConversionError;
use crate::models::OutputFormat;

/// JPEG quality used for every JPEG this service encodes.
pub const JPEG_QUALITY: u8 = 80;

/// Decode, re-encode, and resize image bytes.
#[async_trait]
pub trait ImageCodec: Send + Sync + std::fmt::Debug {
    /// Re-encode `input` in `format` without resizing.
    async fn transcode(&self, input: Bytes, format: OutputFormat) -> Result<Bytes, ConversionError>;

    /// Resize so the longer of width/height equals `long_side`, scaling the
    /// other proportionally, then encode in `format`.
    async fn resize_to_long_side(
        &self,
        input: Bytes,
        long_side: u32,
        format: OutputFormat,
    ) -> Result<Bytes, ConversionError>;

    /// Pixel dimensions `(width, height)` of `input`.
    async fn dimensions(&self, input: Bytes) -> Result<(u32, u32), ConversionError>;
}

/// [`ImageCodec`] backed by the `image` crate.
///
/// Resizes are refused when the target would exceed `max_output_pixels`.
#[derive(Debug, Clone, Copy)]
pub struct RasterCodec {
    max_output_pixels: u64,
}

impl Default for RasterCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OUTPUT_PIXELS)
    }
}

impl RasterCodec {
    /// Create a codec whose resizes produce at most `max_output_pixels`.
    pub fn new(max_output_pixels: u64) -> Self {
        Self { max_output_pixels }
    }
}

#[async_trait]
impl ImageCodec for RasterCodec {
    async fn transcode(&self, input: Bytes, format: OutputFormat) -> Result<Bytes, ConversionError> {
        tokio::task::spawn_blocking(move || {
            let img = decode(&input, "transcode")?;
            encode(&img, format, "transcode")
        })
        .await?
    }

    async fn resize_to_long_side(
        &self,
        input: Bytes,
        long_side: u32,
        format: OutputFormat,
    ) -> Result<Bytes, ConversionError> {
        let max_pixels = self.max_output_pixels;

        tokio::task::spawn_blocking(move || {
            let img = decode(&input, "resize")?;
            let (width, height) = long_side_dimensions(img.width(), img.height(), long_side);

            let pixels = u64::from(width) * u64::from(height);
            if pixels > max_pixels {
                return Err(ConversionError::codec(
                    "resize",
                    format!(
                        "target size {width}x{height} exceeds the limit of {max_pixels} pixels"
                    ),
                ));
            }

            let resized = img.resize_exact(width, height, FilterType::Lanczos3);
            encode(&resized, format, "resize")
        })
        .await?
    }

    async fn dimensions(&self, input: Bytes) -> Result<(u32, u32), ConversionError> {
        tokio::task::spawn_blocking(move || Ok(decode(&input, "decode")?.dimensions())).await?
    }
}

/// Target dimensions pinning the longer side to `long_side`.
///
/// Square and landscape images pin the width; portrait images pin the
/// height. The shorter side is rounded and never drops below one pixel.
pub fn long_side_dimensions(width: u32, height: u32, long_side: u32) -> (u32, u32) {
    let scale = |short: u32, long: u32| -> u32 {
        if long == 0 {
            return long_side;
        }
        let scaled = (u64::from(short) * u64::from(long_side) + u64::from(long) / 2) / u64::from(long);
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    };

    if width >= height {
        (long_side, scale(height, width))
    } else {
        (scale(width, height), long_side)
    }
}

fn decode(data: &[u8], operation: &'static str) -> Result<DynamicImage, ConversionError> {
    image::load_from_memory(data).map_err(|e| ConversionError::codec(operation, e))
}

fn encode(
    img: &DynamicImage,
    format: OutputFormat,
    operation: &'static str,
) -> Result<Bytes, ConversionError> {
    let mut buf = Vec::new();

    match format {
        OutputFormat::Png => img
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .map_err(|e| ConversionError::codec(operation, e))?,
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = img.to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
                .encode_image(&rgb)
                .map_err(|e| ConversionError::codec(operation, e))?
        }
    }

    Ok(Bytes::from(buf))
}
