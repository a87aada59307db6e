//! Resize-family transforms: fit, thumbnail, cover, contain, crop.
//!
//! Every transform takes the buffer by value so a no-op can hand it straight
//! back. Resampling always uses Lanczos3.

use super::calculations::{
    CoverPlan, center_offset, contain_layout, cover_plan, crop_box, fit_dimensions,
    thumbnail_dimensions,
};
use super::params::{BoxParams, ContainParams, CropParams, FitParams};
use crate::buffer::{ColorMode, PixelBuffer};
use crate::error::OperationError;
use image::imageops::{self, FilterType};
use image::{RgbImage, RgbaImage};
use tracing::trace;

type Result<T> = std::result::Result<T, OperationError>;

pub(crate) const FILTER: FilterType = FilterType::Lanczos3;

fn require_box(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(OperationError::InvalidParameter(format!(
            "box dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Lanczos3 resample to exactly `width x height`, keeping the color mode.
pub(crate) fn resample(buffer: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    if buffer.dimensions() == (width, height) {
        return buffer.clone();
    }
    trace!(from_w = buffer.width(), from_h = buffer.height(), width, height, "resample");
    PixelBuffer::new(buffer.as_dynamic().resize_exact(width, height, FILTER))
}

fn crop_region(buffer: &PixelBuffer, left: u32, top: u32, width: u32, height: u32) -> PixelBuffer {
    if (left, top) == (0, 0) && buffer.dimensions() == (width, height) {
        return buffer.clone();
    }
    PixelBuffer::new(buffer.as_dynamic().crop_imm(left, top, width, height))
}

fn center_crop(buffer: &PixelBuffer, width: u32, height: u32) -> PixelBuffer {
    let (left, top) = center_offset(buffer.dimensions(), (width, height));
    crop_region(buffer, left, top, width, height)
}

pub fn fit(buffer: PixelBuffer, params: &FitParams) -> Result<PixelBuffer> {
    match fit_dimensions(
        buffer.dimensions(),
        params.width,
        params.height,
        params.allow_upscale,
    ) {
        Some((w, h)) => Ok(resample(&buffer, w, h)),
        None => Ok(buffer),
    }
}

pub fn thumbnail(buffer: PixelBuffer, params: &BoxParams) -> Result<PixelBuffer> {
    require_box(params.width, params.height)?;
    match thumbnail_dimensions(
        buffer.dimensions(),
        (params.width, params.height),
        params.allow_upscale,
    ) {
        Some((w, h)) => Ok(resample(&buffer, w, h)),
        None => Ok(buffer),
    }
}

pub fn cover(buffer: PixelBuffer, params: &BoxParams) -> Result<PixelBuffer> {
    require_box(params.width, params.height)?;
    match cover_plan(
        buffer.dimensions(),
        (params.width, params.height),
        params.allow_upscale,
    ) {
        CoverPlan::ResizeThenCrop { resize, crop } => {
            let resized = resample(&buffer, resize.0, resize.1);
            Ok(center_crop(&resized, crop.0, crop.1))
        }
        CoverPlan::CropOnly { crop } => Ok(center_crop(&buffer, crop.0, crop.1)),
    }
}

/// Letterbox onto a canvas of exactly the requested size.
///
/// The canvas is RGBA only when the input is; grayscale inputs land on an
/// RGB canvas so a colored background survives.
pub fn contain(buffer: PixelBuffer, params: &ContainParams) -> Result<PixelBuffer> {
    require_box(params.width, params.height)?;
    let ((w, h), (x, y)) = contain_layout(
        buffer.dimensions(),
        (params.width, params.height),
        params.allow_upscale,
    );
    let resized = resample(&buffer, w, h);

    match buffer.mode() {
        ColorMode::Rgba => {
            let mut canvas =
                RgbaImage::from_pixel(params.width, params.height, params.background.to_rgba());
            imageops::overlay(&mut canvas, &resized.into_rgba(), x as i64, y as i64);
            Ok(PixelBuffer::from_rgba(canvas))
        }
        ColorMode::Rgb | ColorMode::Grayscale => {
            let mut canvas =
                RgbImage::from_pixel(params.width, params.height, params.background.to_rgb());
            imageops::replace(&mut canvas, &resized.into_rgb(), x as i64, y as i64);
            Ok(PixelBuffer::from_rgb(canvas))
        }
    }
}

pub fn crop(buffer: PixelBuffer, params: &CropParams) -> Result<PixelBuffer> {
    require_box(params.width, params.height)?;
    let (left, top, w, h) = crop_box(
        buffer.dimensions(),
        (params.width, params.height),
        params.anchor,
    );
    Ok(crop_region(&buffer, left, top, w, h))
}
