//! Tone adjustments as linear blends against a degenerate image.
//!
//! `out = degenerate + (pixel - degenerate) * factor`, so a factor of 1.0 is
//! the identity, 0.0 yields the degenerate image and values above 1.0
//! extrapolate away from it. Alpha never participates.
//!
//! | Adjustment | Degenerate image |
//! |---|---|
//! | brightness | black |
//! | contrast | flat gray at the mean luma |
//! | saturation | per-pixel luma |
//! | sharpen | 3x3 smoothing (center weight 5 of 13), borders untouched |

use super::transform::luma;
use crate::buffer::{ColorMode, PixelBuffer};
use crate::error::OperationError;

type Result<T> = std::result::Result<T, OperationError>;

fn check_factor(name: &str, factor: f32) -> Result<()> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(OperationError::InvalidParameter(format!(
            "{name} factor must be a non-negative number, got {factor}"
        )));
    }
    Ok(())
}

fn color_channels(mode: ColorMode) -> usize {
    mode.channels().min(3)
}

/// Blend every color sample against the same-layout `degenerate` bytes.
fn blend(buffer: &PixelBuffer, degenerate: &[u8], factor: f32) -> Result<PixelBuffer> {
    let mode = buffer.mode();
    let stride = mode.channels();
    let colors = color_channels(mode);
    let mut data = buffer.as_bytes().to_vec();

    for (px, base) in data.chunks_exact_mut(stride).zip(degenerate.chunks_exact(stride)) {
        for c in 0..colors {
            let d = base[c] as f32;
            px[c] = (d + (px[c] as f32 - d) * factor).round().clamp(0.0, 255.0) as u8;
        }
    }
    PixelBuffer::from_raw(buffer.width(), buffer.height(), mode, data)
        .ok_or_else(|| OperationError::InvalidParameter("buffer size mismatch".into()))
}

fn pixel_luma(px: &[u8], mode: ColorMode) -> u8 {
    match mode {
        ColorMode::Grayscale => px[0],
        ColorMode::Rgb | ColorMode::Rgba => luma(px[0], px[1], px[2]),
    }
}

pub fn brightness(buffer: PixelBuffer, factor: f32) -> Result<PixelBuffer> {
    check_factor("brightness", factor)?;
    if factor == 1.0 {
        return Ok(buffer);
    }
    let black = vec![0u8; buffer.as_bytes().len()];
    blend(&buffer, &black, factor)
}

pub fn contrast(buffer: PixelBuffer, factor: f32) -> Result<PixelBuffer> {
    check_factor("contrast", factor)?;
    if factor == 1.0 {
        return Ok(buffer);
    }
    let mode = buffer.mode();
    let stride = mode.channels();
    let bytes = buffer.as_bytes();
    let count = (bytes.len() / stride).max(1) as f64;
    let sum: u64 = bytes
        .chunks_exact(stride)
        .map(|px| pixel_luma(px, mode) as u64)
        .sum();
    let mean = (sum as f64 / count + 0.5) as u8;

    let gray = vec![mean; bytes.len()];
    blend(&buffer, &gray, factor)
}

pub fn saturation(buffer: PixelBuffer, factor: f32) -> Result<PixelBuffer> {
    check_factor("saturation", factor)?;
    if factor == 1.0 || buffer.mode() == ColorMode::Grayscale {
        return Ok(buffer);
    }
    let mode = buffer.mode();
    let stride = mode.channels();
    let mut gray = buffer.as_bytes().to_vec();
    for px in gray.chunks_exact_mut(stride) {
        let l = luma(px[0], px[1], px[2]);
        px[..3].fill(l);
    }
    blend(&buffer, &gray, factor)
}

/// Same-layout copy smoothed by the kernel `[1 1 1; 1 5 1; 1 1 1] / 13`.
fn smoothed(buffer: &PixelBuffer) -> Vec<u8> {
    let (w, h) = (buffer.width() as usize, buffer.height() as usize);
    let stride = buffer.mode().channels();
    let colors = color_channels(buffer.mode());
    let src = buffer.as_bytes();
    let mut out = src.to_vec();
    if w < 3 || h < 3 {
        return out;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            for c in 0..colors {
                let mut acc = 0u32;
                for dy in 0..3 {
                    for dx in 0..3 {
                        let i = ((y + dy - 1) * w + (x + dx - 1)) * stride + c;
                        let weight = if dx == 1 && dy == 1 { 5 } else { 1 };
                        acc += src[i] as u32 * weight;
                    }
                }
                out[(y * w + x) * stride + c] = ((acc as f32 / 13.0).round()) as u8;
            }
        }
    }
    out
}

pub fn sharpen(buffer: PixelBuffer, factor: f32) -> Result<PixelBuffer> {
    check_factor("sharpen", factor)?;
    if factor == 1.0 {
        return Ok(buffer);
    }
    let smooth = smoothed(&buffer);
    blend(&buffer, &smooth, factor)
}

/// Gaussian blur; `radius` is the kernel's standard deviation.
pub fn blur(buffer: PixelBuffer, radius: f32) -> Result<PixelBuffer> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(OperationError::InvalidParameter(format!(
            "blur radius must be a non-negative number, got {radius}"
        )));
    }
    if radius == 0.0 {
        return Ok(buffer);
    }
    Ok(PixelBuffer::new(buffer.as_dynamic().blur(radius)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn unit_factor_is_identity() {
        let src = gradient_rgb(16, 16);
        assert_eq!(brightness(src.clone(), 1.0).unwrap(), src);
        assert_eq!(contrast(src.clone(), 1.0).unwrap(), src);
        assert_eq!(saturation(src.clone(), 1.0).unwrap(), src);
        assert_eq!(sharpen(src.clone(), 1.0).unwrap(), src);
    }

    #[test]
    fn brightness_scales_toward_black() {
        let out = brightness(solid_rgb(2, 2, [200, 100, 50]), 0.5).unwrap();
        assert_eq!(out.to_rgb().get_pixel(0, 0).0, [100, 50, 25]);
    }

    #[test]
    fn brightness_clamps_at_white() {
        let out = brightness(solid_rgb(2, 2, [200, 100, 50]), 2.0).unwrap();
        assert_eq!(out.to_rgb().get_pixel(0, 0).0, [255, 200, 100]);
    }

    #[test]
    fn brightness_leaves_alpha_alone() {
        let out = brightness(solid_rgba(2, 2, [200, 200, 200, 90]), 0.0).unwrap();
        assert_eq!(out.to_rgba().get_pixel(1, 1).0, [0, 0, 0, 90]);
    }

    #[test]
    fn zero_contrast_flattens_to_mean() {
        let out = contrast(gradient_rgb(32, 32), 0.0).unwrap();
        let rgb = out.to_rgb();
        let first = *rgb.get_pixel(0, 0);
        assert!(rgb.pixels().all(|p| *p == first));
        assert_eq!(first[0], first[1]);
    }

    #[test]
    fn zero_saturation_is_grayscale() {
        let out = saturation(solid_rgb(3, 3, [255, 0, 0]), 0.0).unwrap();
        assert_eq!(out.to_rgb().get_pixel(1, 1).0, [76, 76, 76]);
    }

    #[test]
    fn saturation_on_grayscale_is_noop() {
        let src = solid_gray(4, 4, 99);
        assert_eq!(saturation(src.clone(), 3.0).unwrap(), src);
    }

    #[test]
    fn sharpen_flat_image_is_unchanged() {
        let src = solid_rgb(8, 8, [120, 40, 200]);
        assert_eq!(sharpen(src.clone(), 2.0).unwrap(), src);
    }

    #[test]
    fn sharpen_amplifies_a_spike() {
        let mut img = image::RgbImage::from_pixel(5, 5, image::Rgb([100, 100, 100]));
        img.put_pixel(2, 2, image::Rgb([150, 150, 150]));
        let out = sharpen(PixelBuffer::from_rgb(img), 2.0).unwrap();
        assert!(out.to_rgb().get_pixel(2, 2)[0] > 150);
    }

    #[test]
    fn negative_factors_are_rejected() {
        assert!(brightness(solid_rgb(1, 1, [0, 0, 0]), -1.0).is_err());
        assert!(blur(solid_rgb(1, 1, [0, 0, 0]), f32::INFINITY).is_err());
    }

    #[test]
    fn blur_keeps_dimensions_and_softens_edges() {
        let mut img = image::RgbImage::from_pixel(20, 20, image::Rgb([0, 0, 0]));
        for y in 0..20 {
            for x in 10..20 {
                img.put_pixel(x, y, image::Rgb([255, 255, 255]));
            }
        }
        let out = blur(PixelBuffer::from_rgb(img), 2.0).unwrap();
        assert_eq!(out.dimensions(), (20, 20));
        let edge = out.to_rgb().get_pixel(10, 10)[0];
        assert!(edge > 0 && edge < 255);
    }
}
