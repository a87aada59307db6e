//! Overlay compositing: image watermarks and text.
//!
//! Both overlays composite in RGBA with the "over" operator. A base without
//! an alpha channel is flattened afterwards, so compositing never introduces
//! transparency. Text keeps the base's mode exactly; a watermark on a
//! grayscale base is flattened to RGB so a colored mark survives.

use super::calculations::overlay_origins;
use super::params::{OverlaySource, Position, TextParams, WatermarkParams};
use super::resize::FILTER;
use super::text::render_text;
use crate::buffer::{ColorMode, PixelBuffer};
use crate::error::OperationError;
use image::{DynamicImage, RgbaImage, imageops};
use tracing::trace;

type Result<T> = std::result::Result<T, OperationError>;

fn check_opacity(opacity: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(OperationError::InvalidParameter(format!(
            "opacity must be within 0..=1, got {opacity}"
        )));
    }
    Ok(())
}

fn load_overlay(source: &OverlaySource) -> Result<RgbaImage> {
    match source {
        OverlaySource::Buffer(buffer) => Ok(buffer.to_rgba()),
        OverlaySource::Path(path) => image::open(path)
            .map(|img| img.to_rgba8())
            .map_err(|source| OperationError::Overlay {
                path: path.clone(),
                source,
            }),
    }
}

/// Stamp `layer` onto `base` at every origin `position` resolves to, then
/// flatten to `target`.
fn stamp(
    buffer: PixelBuffer,
    layer: &RgbaImage,
    position: Position,
    margin: u32,
    target: ColorMode,
) -> PixelBuffer {
    let mut base = buffer.into_rgba();
    for (x, y) in overlay_origins(base.dimensions(), layer.dimensions(), position, margin) {
        imageops::overlay(&mut base, layer, x, y);
    }
    let image = DynamicImage::ImageRgba8(base);
    match target {
        ColorMode::Rgba => PixelBuffer::new(image),
        ColorMode::Rgb => PixelBuffer::from_rgb(image.to_rgb8()),
        ColorMode::Grayscale => PixelBuffer::from_gray(image.to_luma8()),
    }
}

pub fn watermark(buffer: PixelBuffer, params: &WatermarkParams) -> Result<PixelBuffer> {
    check_opacity(params.opacity)?;
    let mut overlay = load_overlay(&params.source)?;

    if let Some(scale) = params.scale {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(OperationError::InvalidParameter(format!(
                "watermark scale must be positive, got {scale}"
            )));
        }
        let new_w = ((buffer.width() as f32 * scale).round() as u32).max(1);
        let ratio = new_w as f32 / overlay.width() as f32;
        let new_h = ((overlay.height() as f32 * ratio).round() as u32).max(1);
        overlay = imageops::resize(&overlay, new_w, new_h, FILTER);
    }

    if params.opacity < 1.0 {
        for p in overlay.pixels_mut() {
            p[3] = (p[3] as f32 * params.opacity).round() as u8;
        }
    }

    trace!(
        overlay_w = overlay.width(),
        overlay_h = overlay.height(),
        position = %params.position,
        "watermark"
    );
    let target = match buffer.mode() {
        ColorMode::Rgba => ColorMode::Rgba,
        ColorMode::Rgb | ColorMode::Grayscale => ColorMode::Rgb,
    };
    Ok(stamp(buffer, &overlay, params.position, params.margin, target))
}

pub fn text_overlay(buffer: PixelBuffer, params: &TextParams) -> Result<PixelBuffer> {
    check_opacity(params.opacity)?;
    let color = params.color.with_opacity(params.opacity);
    if color.a == 0 {
        return Ok(buffer);
    }
    let Some(layer) = render_text(&params.text, params.size, color, &params.font)? else {
        return Ok(buffer);
    };
    trace!(text_w = layer.width(), text_h = layer.height(), position = %params.position, "text overlay");
    let target = buffer.mode();
    Ok(stamp(buffer, &layer, params.position, params.margin, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::imaging::params::Anchor;
    use crate::test_helpers::*;
    use std::sync::Arc;

    fn red_square(size: u32) -> OverlaySource {
        OverlaySource::Buffer(Arc::new(solid_rgb(size, size, [255, 0, 0])))
    }

    // =========================================================================
    // watermark
    // =========================================================================

    #[test]
    fn opaque_watermark_lands_bottom_right() {
        let params = WatermarkParams {
            opacity: 1.0,
            ..WatermarkParams::new(red_square(10))
        };
        let out = watermark(solid_rgb(100, 50, [0, 0, 0]), &params).unwrap();
        let rgb = out.to_rgb();
        assert_eq!(out.mode(), ColorMode::Rgb);
        // Placed at (80, 30)..(90, 40)
        assert_eq!(rgb.get_pixel(85, 35).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(95, 45).0, [0, 0, 0]);
        assert_eq!(rgb.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn watermark_opacity_blends() {
        let params = WatermarkParams {
            opacity: 0.5,
            position: Position::At(Anchor::Center),
            ..WatermarkParams::new(red_square(10))
        };
        let out = watermark(solid_rgb(20, 20, [0, 0, 0]), &params).unwrap();
        let red = out.to_rgb().get_pixel(10, 10)[0];
        assert!((120..=135).contains(&red), "got {red}");
    }

    #[test]
    fn watermark_scale_follows_base_width() {
        // 0.5 of a 40px base → 20px overlay, centered: covers 10..30
        let params = WatermarkParams {
            opacity: 1.0,
            scale: Some(0.5),
            position: Position::At(Anchor::Center),
            ..WatermarkParams::new(red_square(4))
        };
        let out = watermark(solid_rgb(40, 40, [0, 0, 0]), &params).unwrap();
        let rgb = out.to_rgb();
        assert_eq!(rgb.get_pixel(11, 11).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(28, 28).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(5, 5).0, [0, 0, 0]);
    }

    #[test]
    fn tiled_watermark_repeats() {
        let params = WatermarkParams {
            opacity: 1.0,
            position: Position::Tiled,
            margin: 2,
            ..WatermarkParams::new(red_square(4))
        };
        let out = watermark(solid_rgb(20, 20, [0, 0, 0]), &params).unwrap();
        let rgb = out.to_rgb();
        for (x, y) in [(0, 0), (6, 0), (12, 6), (18, 18)] {
            assert_eq!(rgb.get_pixel(x, y).0, [255, 0, 0], "tile at ({x},{y})");
        }
        assert_eq!(rgb.get_pixel(4, 4).0, [0, 0, 0]);
    }

    #[test]
    fn watermark_on_rgba_stays_rgba() {
        let params = WatermarkParams::new(red_square(2));
        let out = watermark(half_transparent(20, 20), &params).unwrap();
        assert_eq!(out.mode(), ColorMode::Rgba);
    }

    #[test]
    fn missing_overlay_file_reports_path() {
        let params = WatermarkParams::new(OverlaySource::Path("/nonexistent/logo.png".into()));
        match watermark(solid_rgb(4, 4, [0, 0, 0]), &params) {
            Err(OperationError::Overlay { path, .. }) => {
                assert_eq!(path, std::path::PathBuf::from("/nonexistent/logo.png"))
            }
            other => panic!("expected overlay error, got {other:?}"),
        }
    }

    #[test]
    fn opacity_out_of_range_is_invalid() {
        let params = WatermarkParams {
            opacity: 1.5,
            ..WatermarkParams::new(red_square(2))
        };
        assert!(matches!(
            watermark(solid_rgb(4, 4, [0, 0, 0]), &params),
            Err(OperationError::InvalidParameter(_))
        ));
    }

    // =========================================================================
    // text overlay
    // =========================================================================

    #[test]
    fn text_draws_into_requested_corner() {
        let params = TextParams {
            position: Position::At(Anchor::TopLeft),
            color: Color::rgb(255, 255, 0),
            size: 16,
            margin: 0,
            ..TextParams::new("H")
        };
        let out = text_overlay(solid_rgb(64, 64, [0, 0, 0]), &params).unwrap();
        let rgb = out.to_rgb();
        assert_eq!(out.mode(), ColorMode::Rgb);
        assert!(rgb.pixels().any(|p| p.0 == [255, 255, 0]));
        // Nothing is drawn in the far corner
        assert_eq!(rgb.get_pixel(63, 63).0, [0, 0, 0]);
    }

    #[test]
    fn text_keeps_grayscale_mode() {
        let params = TextParams {
            position: Position::At(Anchor::TopLeft),
            color: Color::WHITE,
            size: 16,
            margin: 0,
            ..TextParams::new("H")
        };
        let out = text_overlay(solid_gray(64, 64, 10), &params).unwrap();
        assert_eq!(out.mode(), ColorMode::Grayscale);
        let gray = out.as_dynamic().to_luma8();
        assert!(gray.pixels().any(|p| p[0] == 255));
        assert_eq!(gray.get_pixel(63, 63)[0], 10);
    }

    #[test]
    fn watermark_on_grayscale_flattens_to_rgb() {
        let params = WatermarkParams {
            opacity: 1.0,
            position: Position::At(Anchor::Center),
            ..WatermarkParams::new(red_square(4))
        };
        let out = watermark(solid_gray(16, 16, 0), &params).unwrap();
        assert_eq!(out.mode(), ColorMode::Rgb);
        assert_eq!(out.to_rgb().get_pixel(8, 8).0, [255, 0, 0]);
    }

    #[test]
    fn transparent_text_is_a_noop() {
        let src = solid_rgb(32, 32, [9, 9, 9]);
        let params = TextParams {
            opacity: 0.0,
            ..TextParams::new("hello")
        };
        assert_eq!(text_overlay(src.clone(), &params).unwrap(), src);
    }
}
