//! Inline placeholders derived from a buffer: LQIP, dominant color,
//! palette and a single-rect SVG.

use crate::buffer::PixelBuffer;
use crate::config::Config;
use crate::encode::{encode, export};
use crate::error::Result;
use crate::format::Format;
use crate::imaging::quantize;
use crate::imaging::resize::resample;

pub const LQIP_WIDTH: u32 = 20;
pub const LQIP_QUALITY: u8 = 20;
pub const PALETTE_SIZE: usize = 5;

/// Tiny WEBP preview as a data URI.
///
/// The preview is exactly `width` pixels wide (enlarging tiny sources) with
/// height following the aspect ratio, floor 1.
pub fn lqip(buffer: &PixelBuffer, width: u32, config: &Config) -> Result<String> {
    let width = width.max(1);
    let (orig_w, orig_h) = buffer.dimensions();
    let height = ((orig_h as f64 * width as f64 / orig_w.max(1) as f64).round() as u32).max(1);
    let small = resample(buffer, width, height);
    let bytes = encode(&small, Format::Webp, Some(LQIP_QUALITY), config)?;
    Ok(export::data_uri(&bytes, Format::Webp))
}

/// Dominant color as `#rrggbb`.
pub fn dominant_color(buffer: &PixelBuffer) -> String {
    quantize::dominant_color(buffer).to_hex()
}

pub fn color_palette(buffer: &PixelBuffer, count: usize) -> Vec<String> {
    quantize::palette(buffer, count)
        .into_iter()
        .map(|c| c.to_hex())
        .collect()
}

/// A single rectangle filled with the dominant color. Dimensions default to
/// the buffer's.
pub fn svg_placeholder(buffer: &PixelBuffer, width: Option<u32>, height: Option<u32>) -> String {
    let w = width.unwrap_or(buffer.width());
    let h = height.unwrap_or(buffer.height());
    let color = dominant_color(buffer);
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="{w}" height="{h}" fill="{color}"/></svg>"#
    )
}
