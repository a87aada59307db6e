//! Decoded pixel storage.
//!
//! [`PixelBuffer`] wraps an `image::DynamicImage` but narrows it to the three
//! 8-bit layouts the pipeline works in: grayscale, RGB and RGBA. Anything the
//! decoder hands back (16-bit, float, luma+alpha) is normalized on entry, so
//! every transform can match on [`ColorMode`] exhaustively.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Grayscale,
    Rgb,
    Rgba,
}

impl ColorMode {
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Grayscale => 1,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColorMode::Grayscale => "L",
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    image: DynamicImage,
}

impl PixelBuffer {
    /// Wrap a decoded image, converting exotic layouts to 8-bit L/RGB/RGBA.
    pub fn new(image: DynamicImage) -> Self {
        let image = match image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => {
                image
            }
            DynamicImage::ImageLuma16(_) => DynamicImage::ImageLuma8(image.to_luma8()),
            other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };
        Self { image }
    }

    /// Build from raw interleaved samples. Returns `None` when `data` does not
    /// match `width * height * channels`.
    pub fn from_raw(width: u32, height: u32, mode: ColorMode, data: Vec<u8>) -> Option<Self> {
        let image = match mode {
            ColorMode::Grayscale => DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, data)?),
            ColorMode::Rgb => DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, data)?),
            ColorMode::Rgba => DynamicImage::ImageRgba8(RgbaImage::from_raw(width, height, data)?),
        };
        Some(Self { image })
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        Self {
            image: DynamicImage::ImageRgb8(image),
        }
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(image),
        }
    }

    pub fn from_gray(image: GrayImage) -> Self {
        Self {
            image: DynamicImage::ImageLuma8(image),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn mode(&self) -> ColorMode {
        match self.image {
            DynamicImage::ImageLuma8(_) => ColorMode::Grayscale,
            DynamicImage::ImageRgba8(_) => ColorMode::Rgba,
            _ => ColorMode::Rgb,
        }
    }

    pub fn has_alpha(&self) -> bool {
        self.mode() == ColorMode::Rgba
    }

    /// True when an alpha channel exists and at least one pixel is not fully opaque.
    pub fn uses_transparency(&self) -> bool {
        match &self.image {
            DynamicImage::ImageRgba8(rgba) => rgba.pixels().any(|p| p[3] != u8::MAX),
            _ => false,
        }
    }

    /// Raw interleaved samples in [`mode`](Self::mode) order.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_bytes()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    pub fn to_rgb(&self) -> RgbImage {
        self.image.to_rgb8()
    }

    pub fn to_rgba(&self) -> RgbaImage {
        self.image.to_rgba8()
    }

    /// Consume into RGBA without copying when already RGBA.
    pub fn into_rgba(self) -> RgbaImage {
        match self.image {
            DynamicImage::ImageRgba8(rgba) => rgba,
            other => other.to_rgba8(),
        }
    }

    /// Consume into RGB, dropping any alpha channel.
    pub fn into_rgb(self) -> RgbImage {
        match self.image {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        }
    }

    /// Split off the alpha channel of an RGBA buffer.
    pub fn alpha(&self) -> Option<GrayImage> {
        match &self.image {
            DynamicImage::ImageRgba8(rgba) => Some(GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                image::Luma([rgba.get_pixel(x, y)[3]])
            })),
            _ => None,
        }
    }
}

impl From<DynamicImage> for PixelBuffer {
    fn from(image: DynamicImage) -> Self {
        Self::new(image)
    }
}
