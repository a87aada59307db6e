//! Format-aware encoding.
//!
//! | Format | Encoder | Pre-encode normalization | Knob |
//! |---|---|---|---|
//! | JPEG | `JpegEncoder` | alpha dropped, grayscale kept | quality 1–100 (default `quality.jpeg`) |
//! | PNG | `PngEncoder`, adaptive filter | none | `quality.png_compression` 0–9 |
//! | WEBP | `WebPEncoder` (lossless) | RGB posterized below quality 100 | quality 1–100 (default `quality.webp`) |
//! | GIF | `DynamicImage::write_to` | forced to RGBA | n/a |
//! | BMP, TIFF | `DynamicImage::write_to` | none | n/a |
//!
//! The WebP encoder in the `image` crate is lossless only. Lossy behavior is
//! emulated by reducing each color channel to fewer levels before encoding:
//! the lossless coder compresses the flatter palette much better, so smaller
//! quality values produce smaller files. Alpha is never posterized.

pub mod export;
pub mod optimize;

use crate::buffer::{ColorMode, PixelBuffer};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::imaging::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder};
use std::borrow::Cow;
use std::io::Cursor;
use tracing::trace;

fn color_type(mode: ColorMode) -> ExtendedColorType {
    match mode {
        ColorMode::Grayscale => ExtendedColorType::L8,
        ColorMode::Rgb => ExtendedColorType::Rgb8,
        ColorMode::Rgba => ExtendedColorType::Rgba8,
    }
}

/// Resolved quality for `format`: the explicit value clamped to 1–100, else
/// the configured default. `None` for formats without a quality knob.
pub fn effective_quality(format: Format, quality: Option<u8>, config: &Config) -> Option<u8> {
    let default = match format {
        Format::Jpeg => config.quality.jpeg,
        Format::Webp => config.quality.webp,
        _ => return None,
    };
    Some(Quality::new(quality.unwrap_or(default) as u32).value())
}

fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Number of levels kept per color channel at a WebP quality.
///
/// Quadratic in quality so high settings stay close to the source while low
/// settings flatten aggressively. 100 keeps all 256 levels.
pub(crate) fn webp_levels(quality: u8) -> u16 {
    if quality >= 100 {
        return 256;
    }
    let normalized = (quality as f32).clamp(1.0, 100.0) / 100.0;
    (2.0 + normalized * normalized * 254.0).round().clamp(2.0, 256.0) as u16
}

fn posterize(data: &mut [u8], stride: usize, quality: u8) {
    let levels = webp_levels(quality);
    if levels >= 256 {
        return;
    }
    let step = 255.0 / (levels as f32 - 1.0);
    let colors = stride.min(3);
    for px in data.chunks_exact_mut(stride) {
        for channel in px.iter_mut().take(colors) {
            let bucket = (*channel as f32 / step).round();
            *channel = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Encode `buffer` as `format`.
///
/// `quality` only affects JPEG and WEBP; other formats ignore it.
pub fn encode(
    buffer: &PixelBuffer,
    format: Format,
    quality: Option<u8>,
    config: &Config,
) -> Result<Vec<u8>> {
    let output = |source| Error::Output { format, source };
    let (width, height) = buffer.dimensions();
    let mut out = Cursor::new(Vec::new());

    match format {
        Format::Jpeg => {
            let q = effective_quality(format, quality, config).unwrap_or(config.quality.jpeg);
            let (data, mode): (Cow<[u8]>, ColorMode) = match buffer.mode() {
                ColorMode::Rgba => (Cow::Owned(buffer.to_rgb().into_raw()), ColorMode::Rgb),
                mode => (Cow::Borrowed(buffer.as_bytes()), mode),
            };
            JpegEncoder::new_with_quality(&mut out, q)
                .encode(&data, width, height, color_type(mode))
                .map_err(output)?;
        }
        Format::Png => {
            PngEncoder::new_with_quality(
                &mut out,
                png_compression(config.quality.png_compression),
                FilterType::Adaptive,
            )
            .write_image(buffer.as_bytes(), width, height, color_type(buffer.mode()))
            .map_err(output)?;
        }
        Format::Webp => {
            let q = effective_quality(format, quality, config).unwrap_or(config.quality.webp);
            let mode = buffer.mode();
            let mut data = buffer.as_bytes().to_vec();
            posterize(&mut data, mode.channels(), q);
            WebPEncoder::new_lossless(&mut out)
                .encode(&data, width, height, color_type(mode))
                .map_err(output)?;
        }
        Format::Gif => {
            DynamicImage::ImageRgba8(buffer.to_rgba())
                .write_to(&mut out, format.as_image_format())
                .map_err(output)?;
        }
        Format::Bmp | Format::Tiff => {
            buffer
                .as_dynamic()
                .write_to(&mut out, format.as_image_format())
                .map_err(output)?;
        }
    }

    let bytes = out.into_inner();
    trace!(%format, quality = ?effective_quality(format, quality, config), size = bytes.len(), "encoded");
    Ok(bytes)
}
