//! Text rasterization for overlays.
//!
//! Glyphs are drawn into a coverage map, trimmed to the tight bounding box
//! of lit pixels, then colorized. Two glyph sources exist:
//!
//! - **Builtin**: the `font8x8` bitmap font scaled nearest-neighbor by
//!   `max(1, size / 8)`, one scale-width gap between glyphs.
//! - **TrueType/OpenType** via `ab_glyph`, from a file or shared bytes,
//!   laid out on a single baseline with kerning.

use super::params::FontSource;
use crate::color::Color;
use crate::error::OperationError;
use ab_glyph::{Font, FontRef, FontVec, PxScale, ScaleFont, point};
use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{GrayImage, Luma, Rgba, RgbaImage};

type Result<T> = std::result::Result<T, OperationError>;

fn builtin_coverage(text: &str, size: u32) -> GrayImage {
    let scale = (size / 8).max(1);
    let count = text.chars().count() as u32;
    if count == 0 {
        return GrayImage::new(0, 0);
    }
    let advance = 8 * scale + scale;
    let mut map = GrayImage::new(count * advance - scale, 8 * scale);

    for (idx, ch) in text.chars().enumerate() {
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')).unwrap_or([0; 8]);
        let origin_x = idx as u32 * advance;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8u32 {
                if (bits >> col) & 1 == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        map.put_pixel(
                            origin_x + col * scale + dx,
                            row as u32 * scale + dy,
                            Luma([255]),
                        );
                    }
                }
            }
        }
    }
    map
}

fn outline_coverage<F: Font>(font: &F, text: &str, size: u32) -> GrayImage {
    let scale = PxScale::from(size as f32);
    let scaled = font.as_scaled(scale);

    let mut width = 0.0f32;
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            width += scaled.kern(p, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }

    // Side bearings may overhang the advance box; pad by one em on each side.
    let pad = size as f32;
    let canvas_w = (width + 2.0 * pad).ceil().max(1.0) as u32;
    let canvas_h = (scaled.height() + 2.0 * pad).ceil().max(1.0) as u32;
    let mut map = GrayImage::new(canvas_w, canvas_h);

    let baseline = pad + scaled.ascent();
    let mut cursor = pad;
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(p) = prev {
            cursor += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, point(cursor, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = gx as i64 + bounds.min.x as i64;
                let y = gy as i64 + bounds.min.y as i64;
                if x >= 0 && y >= 0 && x < canvas_w as i64 && y < canvas_h as i64 {
                    let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                    let px = map.get_pixel_mut(x as u32, y as u32);
                    px[0] = px[0].max(value);
                }
            });
        }
        cursor += scaled.h_advance(id);
        prev = Some(id);
    }
    map
}

/// Bounding box `(x, y, w, h)` of nonzero coverage, or `None` when blank.
fn lit_bounds(map: &GrayImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in map.enumerate_pixels() {
        if p[0] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| (x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}

fn coverage(text: &str, size: u32, font: &FontSource) -> Result<GrayImage> {
    match font {
        FontSource::Builtin => Ok(builtin_coverage(text, size)),
        FontSource::Bytes(bytes) => {
            let font = FontRef::try_from_slice(bytes.as_slice())
                .map_err(|e| OperationError::Font(e.to_string()))?;
            Ok(outline_coverage(&font, text, size))
        }
        FontSource::File(path) => {
            let data = std::fs::read(path)
                .map_err(|e| OperationError::Font(format!("cannot read {}: {e}", path.display())))?;
            let font = FontVec::try_from_vec(data)
                .map_err(|e| OperationError::Font(format!("{}: {e}", path.display())))?;
            Ok(outline_coverage(&font, text, size))
        }
    }
}

/// Render `text` as a tightly trimmed RGBA layer.
///
/// Coverage scales the color's alpha. Returns `None` when nothing is lit,
/// e.g. for empty or whitespace-only text.
pub fn render_text(
    text: &str,
    size: u32,
    color: Color,
    font: &FontSource,
) -> Result<Option<RgbaImage>> {
    if size == 0 {
        return Err(OperationError::InvalidParameter("font size must be positive".into()));
    }
    let map = coverage(text, size, font)?;
    let Some((x0, y0, w, h)) = lit_bounds(&map) else {
        return Ok(None);
    };

    let alpha = color.a as f32 / 255.0;
    Ok(Some(RgbaImage::from_fn(w, h, |x, y| {
        let c = map.get_pixel(x0 + x, y0 + y)[0] as f32;
        Rgba([color.r, color.g, color.b, (c * alpha).round() as u8])
    })))
}
