//! Visual effects: sepia toning and alpha masks.

use crate::buffer::{ColorMode, PixelBuffer};
use crate::error::OperationError;
use image::{GrayImage, Luma, Rgb, Rgba, imageops};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_ellipse_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

type Result<T> = std::result::Result<T, OperationError>;

const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

fn tone(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    SEPIA.map(|[kr, kg, kb]| (kr * r + kg * g + kb * b).min(255.0) as u8)
}

/// Fixed sepia matrix per pixel, truncating each channel. Alpha is kept.
pub fn sepia(buffer: PixelBuffer) -> Result<PixelBuffer> {
    match buffer.mode() {
        ColorMode::Rgba => {
            let mut rgba = buffer.into_rgba();
            for p in rgba.pixels_mut() {
                let [r, g, b] = tone(p[0], p[1], p[2]);
                *p = Rgba([r, g, b, p[3]]);
            }
            Ok(PixelBuffer::from_rgba(rgba))
        }
        ColorMode::Rgb | ColorMode::Grayscale => {
            let mut rgb = buffer.into_rgb();
            for p in rgb.pixels_mut() {
                *p = Rgb(tone(p[0], p[1], p[2]));
            }
            Ok(PixelBuffer::from_rgb(rgb))
        }
    }
}

/// Replace the alpha channel with `mask`, converting to RGBA.
pub(crate) fn put_alpha(buffer: PixelBuffer, mask: &GrayImage) -> PixelBuffer {
    let mut rgba = buffer.into_rgba();
    for (p, m) in rgba.pixels_mut().zip(mask.pixels()) {
        p[3] = m[0];
    }
    PixelBuffer::from_rgba(rgba)
}

/// Corner mask: opaque except outside a quarter circle of `radius` in each
/// corner square. The radius is clamped to half the shorter side.
///
/// One top-left tile is drawn (black square, white quarter disc centered on
/// its inner corner) and mirrored into the other three corners, so each
/// quarter disc stays inside its own square.
pub fn rounded_corner_mask(width: u32, height: u32, radius: u32) -> GrayImage {
    let r = radius.min(width / 2).min(height / 2);
    let mut mask = GrayImage::from_pixel(width, height, Luma([255]));
    if r == 0 {
        return mask;
    }

    let mut tile = GrayImage::new(r, r);
    draw_filled_rect_mut(&mut tile, Rect::at(0, 0).of_size(r, r), Luma([0]));
    draw_filled_circle_mut(&mut tile, (r as i32, r as i32), r as i32, Luma([255]));

    let (right, bottom) = ((width - r) as i64, (height - r) as i64);
    imageops::replace(&mut mask, &tile, 0, 0);
    imageops::replace(&mut mask, &imageops::flip_horizontal(&tile), right, 0);
    imageops::replace(&mut mask, &imageops::flip_vertical(&tile), 0, bottom);
    imageops::replace(&mut mask, &imageops::rotate180(&tile), right, bottom);
    mask
}

pub fn rounded_corners(buffer: PixelBuffer, radius: u32) -> Result<PixelBuffer> {
    let mask = rounded_corner_mask(buffer.width(), buffer.height(), radius);
    Ok(put_alpha(buffer, &mask))
}

/// Ellipse inscribed in the full canvas; a circle for square buffers.
pub fn ellipse_mask(width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let (rx, ry) = ((width / 2) as i32, (height / 2) as i32);
    draw_filled_ellipse_mut(&mut mask, (rx, ry), rx, ry, Luma([255]));
    mask
}

pub fn circle_mask(buffer: PixelBuffer) -> PixelBuffer {
    let mask = ellipse_mask(buffer.width(), buffer.height());
    put_alpha(buffer, &mask)
}
