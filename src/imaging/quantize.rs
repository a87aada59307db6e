//! Color quantization for dominant color and palette extraction.
//!
//! The buffer is first shrunk to fit a `SAMPLE_SIZE` square (never enlarged)
//! and forced to RGB. Each channel is bucketed to 16 levels by clearing its
//! low four bits, and buckets are ranked by frequency. Ties keep the order in
//! which buckets were first seen, scanning row by row.

use super::calculations::thumbnail_dimensions;
use super::resize::resample;
use crate::buffer::PixelBuffer;
use crate::color::Color;
use std::collections::HashMap;

pub const SAMPLE_SIZE: u32 = 100;

fn bucket(v: u8) -> u8 {
    (v >> 4) << 4
}

fn sample(buffer: &PixelBuffer) -> image::RgbImage {
    match thumbnail_dimensions(buffer.dimensions(), (SAMPLE_SIZE, SAMPLE_SIZE), false) {
        Some((w, h)) => resample(buffer, w, h).into_rgb(),
        None => buffer.to_rgb(),
    }
}

/// The `count` most frequent color buckets, most frequent first.
pub fn palette(buffer: &PixelBuffer, count: usize) -> Vec<Color> {
    if buffer.width() == 0 || buffer.height() == 0 || count == 0 {
        return Vec::new();
    }
    let rgb = sample(buffer);

    let mut counts: HashMap<[u8; 3], (usize, usize)> = HashMap::new();
    for (order, p) in rgb.pixels().enumerate() {
        let key = p.0.map(bucket);
        counts.entry(key).or_insert((0, order)).0 += 1;
    }

    let mut ranked: Vec<([u8; 3], (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)));
    ranked
        .into_iter()
        .take(count)
        .map(|([r, g, b], _)| Color::rgb(r, g, b))
        .collect()
}

/// Most frequent color bucket. Black for an empty buffer.
pub fn dominant_color(buffer: &PixelBuffer) -> Color {
    palette(buffer, 1).first().copied().unwrap_or(Color::BLACK)
}
