//! Shared test utilities for the imgchain test suite.
//!
//! Synthetic buffers with known pixel content, so transforms can be
//! asserted pixel-by-pixel without fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let red = solid_rgb(10, 10, [255, 0, 0]);
//! let faded = half_transparent(64, 32);
//! let jpeg = encoded(&gradient_rgb(80, 60), image::ImageFormat::Jpeg);
//! ```

use crate::buffer::PixelBuffer;
use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

// =========================================================================
// Buffers
// =========================================================================

pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> PixelBuffer {
    PixelBuffer::from_rgb(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

pub fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> PixelBuffer {
    PixelBuffer::from_rgba(RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

pub fn solid_gray(width: u32, height: u32, value: u8) -> PixelBuffer {
    PixelBuffer::from_gray(GrayImage::from_pixel(width, height, Luma([value])))
}

/// Red ramps along x, green along y, blue is a diagonal checker of both.
pub fn gradient_rgb(width: u32, height: u32) -> PixelBuffer {
    let span = |v: u32, n: u32| (v * 255 / n.saturating_sub(1).max(1)) as u8;
    PixelBuffer::from_rgb(RgbImage::from_fn(width, height, |x, y| {
        Rgb([span(x, width), span(y, height), ((x + y) % 256) as u8])
    }))
}

/// Opaque blue on the left half, alpha 0 on the right half.
pub fn half_transparent(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_rgba(RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([0, 0, 255, 255])
        } else {
            Rgba([0, 0, 255, 0])
        }
    }))
}

// =========================================================================
// Encoded fixtures
// =========================================================================

/// Encode `buffer` with the `image` crate defaults.
pub fn encoded(buffer: &PixelBuffer, format: image::ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    let image = match format {
        image::ImageFormat::Jpeg => image::DynamicImage::ImageRgb8(buffer.to_rgb()),
        _ => buffer.as_dynamic().clone(),
    };
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

/// Write `buffer` as `name` (format from the extension) under `dir`.
pub fn write_fixture(dir: &Path, name: &str, buffer: &PixelBuffer) -> PathBuf {
    let path = dir.join(name);
    let format = image::ImageFormat::from_path(&path).unwrap();
    std::fs::write(&path, encoded(buffer, format)).unwrap();
    path
}

/// Splice a minimal little-endian EXIF APP1 segment holding only the
/// Orientation tag right after the JPEG SOI marker.
pub fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let mut tiff = vec![b'I', b'I', 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    tiff.extend_from_slice(&1u16.to_le_bytes());
    tiff.extend_from_slice(&0x0112u16.to_le_bytes());
    tiff.extend_from_slice(&3u16.to_le_bytes());
    tiff.extend_from_slice(&1u32.to_le_bytes());
    tiff.extend_from_slice(&orientation.to_le_bytes());
    tiff.extend_from_slice(&[0, 0]);
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);
    let length = (payload.len() + 2) as u16;

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}
