//! Orientation and channel transforms: rotate, flip, mirror, grayscale.

use super::params::RotateParams;
use crate::buffer::{ColorMode, PixelBuffer};
use crate::color::Color;
use crate::error::OperationError;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::trace;

type Result<T> = std::result::Result<T, OperationError>;

/// Rotate counter-clockwise by `params.degrees`.
///
/// Quarter turns on an expanded (or square) canvas are exact pixel
/// transposes. Any other angle is resampled bicubically through
/// `imageproc`; uncovered canvas is painted with `params.fill`.
pub fn rotate(buffer: PixelBuffer, params: &RotateParams) -> Result<PixelBuffer> {
    if !params.degrees.is_finite() {
        return Err(OperationError::InvalidParameter(format!(
            "rotation angle must be finite, got {}",
            params.degrees
        )));
    }
    let degrees = params.degrees.rem_euclid(360.0);
    if degrees == 0.0 {
        return Ok(buffer);
    }

    let square = buffer.width() == buffer.height();
    if degrees == 180.0 || ((degrees == 90.0 || degrees == 270.0) && (params.expand || square)) {
        let image = buffer.as_dynamic();
        let turned = match degrees as u32 {
            90 => image.rotate270(),
            180 => image.rotate180(),
            _ => image.rotate90(),
        };
        return Ok(PixelBuffer::new(turned));
    }

    trace!(degrees, expand = params.expand, "bicubic rotate");
    let mode = buffer.mode();
    let rotated = rotate_bicubic(&buffer.to_rgba(), degrees, params.expand, params.fill);
    Ok(restore_mode(rotated, mode))
}

fn restore_mode(rgba: RgbaImage, mode: ColorMode) -> PixelBuffer {
    let image = DynamicImage::ImageRgba8(rgba);
    match mode {
        ColorMode::Rgba => PixelBuffer::new(image),
        ColorMode::Rgb => PixelBuffer::from_rgb(image.to_rgb8()),
        ColorMode::Grayscale => PixelBuffer::from_gray(image.to_luma8()),
    }
}

/// Rotate onto an expanded (or original-size) canvas about the centers of
/// source and destination.
fn rotate_bicubic(image: &RgbaImage, degrees: f32, expand: bool, fill: Color) -> RgbaImage {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (src_w, src_h) = (image.width() as f32, image.height() as f32);

    let (dst_w, dst_h) = if expand {
        let w = (src_w * cos.abs() + src_h * sin.abs()).round().max(1.0) as u32;
        let h = (src_w * sin.abs() + src_h * cos.abs()).round().max(1.0) as u32;
        (w, h)
    } else {
        image.dimensions()
    };

    // `Projection::rotate` turns clockwise in y-down coordinates
    let projection = Projection::translate(dst_w as f32 / 2.0, dst_h as f32 / 2.0)
        * Projection::rotate(-degrees.to_radians())
        * Projection::translate(-src_w / 2.0, -src_h / 2.0);

    let mut out = RgbaImage::new(dst_w, dst_h);
    warp_into(image, &projection, Interpolation::Bicubic, fill.to_rgba(), &mut out);
    out
}

/// Top-to-bottom flip.
pub fn flip(buffer: PixelBuffer) -> Result<PixelBuffer> {
    Ok(PixelBuffer::new(buffer.as_dynamic().flipv()))
}

/// Left-to-right mirror.
pub fn mirror(buffer: PixelBuffer) -> Result<PixelBuffer> {
    Ok(PixelBuffer::new(buffer.as_dynamic().fliph()))
}

/// ITU-R 601-2 luma in 16.16 fixed point.
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16) as u8
}

/// Desaturate to luma, written back as RGB.
///
/// Alpha is preserved: an RGBA input stays RGBA with its alpha untouched.
pub fn grayscale(buffer: PixelBuffer) -> Result<PixelBuffer> {
    match buffer.mode() {
        ColorMode::Rgba => {
            let mut rgba = buffer.into_rgba();
            for p in rgba.pixels_mut() {
                let l = luma(p[0], p[1], p[2]);
                *p = Rgba([l, l, l, p[3]]);
            }
            Ok(PixelBuffer::from_rgba(rgba))
        }
        ColorMode::Rgb | ColorMode::Grayscale => {
            let mut rgb = buffer.into_rgb();
            for p in rgb.pixels_mut() {
                let l = luma(p[0], p[1], p[2]);
                p.0 = [l, l, l];
            }
            Ok(PixelBuffer::from_rgb(rgb))
        }
    }
}

/// Decoded buffers carry no metadata and encoders never write any, so this
/// re-materializes the pixels and nothing else.
pub fn strip_metadata(buffer: PixelBuffer) -> Result<PixelBuffer> {
    let (w, h, mode) = (buffer.width(), buffer.height(), buffer.mode());
    PixelBuffer::from_raw(w, h, mode, buffer.into_dynamic().into_bytes())
        .ok_or_else(|| OperationError::InvalidParameter("buffer size mismatch".into()))
}
