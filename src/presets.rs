//! One-call recipes for common web image jobs.
//!
//! | Preset | Defaults | Steps |
//! |---|---|---|
//! | [`thumbnail`] | 200x200, WEBP | fit, strip metadata |
//! | [`avatar`] | 128, PNG | cover (upscaling), circular alpha mask |
//! | [`avatar_placeholder`] | 128, `#4A90D9` on white text, PNG | disc with centered initials |
//! | [`og_image`] | 1200x630, JPEG 85 | cover (upscaling), strip metadata |
//! | [`banner`] | 1920x400, JPEG 85 | cover (upscaling), strip metadata |
//! | [`responsive`] | 320/640/1024/1920, WEBP | strip metadata, responsive set on disk |

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::config::Config;
use crate::encode::encode;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::image::Image;
use crate::imaging::effects::circle_mask;
use crate::imaging::text::render_text;
use crate::imaging::{FontSource, center_offset};
use crate::pipeline::OperationKind;
use crate::responsive::ResponsiveOptions;
use image::{RgbaImage, imageops};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const THUMBNAIL_SIZE: (u32, u32) = (200, 200);
pub const AVATAR_SIZE: u32 = 128;
pub const AVATAR_BACKGROUND: Color = Color::rgb(0x4a, 0x90, 0xd9);
pub const OG_IMAGE_SIZE: (u32, u32) = (1200, 630);
pub const BANNER_SIZE: (u32, u32) = (1920, 400);
pub const SOCIAL_QUALITY: u8 = 85;

/// Input accepted by presets.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(path: &'a Path) -> Self {
        Source::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for Source<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Source::Path(path)
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Source::Bytes(bytes)
    }
}

impl Source<'_> {
    fn load(self, config: &Config) -> Result<Image> {
        match self {
            Source::Path(path) => Image::open_with_config(path, config.clone()),
            Source::Bytes(bytes) => Image::from_bytes_with_config(bytes, config.clone()),
        }
    }
}

/// Fit inside `width` x `height` (never enlarging unless the config allows it).
pub fn thumbnail<'a>(
    source: impl Into<Source<'a>>,
    (width, height): (u32, u32),
    format: Format,
    config: &Config,
) -> Result<Vec<u8>> {
    source
        .into()
        .load(config)?
        .resize(width, height)
        .strip_metadata()
        .format(format, None)
        .to_bytes()
}

/// Square, circle-masked avatar.
pub fn avatar<'a>(
    source: impl Into<Source<'a>>,
    size: u32,
    format: Format,
    config: &Config,
) -> Result<Vec<u8>> {
    let image = source
        .into()
        .load(config)?
        .allow_upscale(true)
        .cover(size, size);
    let masked = circle_mask(image.execute()?);
    encode(&masked, format, None, config)
}

/// Solid disc with initials, for users without a photo.
///
/// Initials are upper-cased and drawn with the builtin font at half the
/// avatar size, centered on their inked bounds.
pub fn avatar_placeholder(
    initials: &str,
    size: u32,
    background: Color,
    text_color: Color,
    config: &Config,
) -> Result<Vec<u8>> {
    let mut canvas = circle_mask(PixelBuffer::from_rgba(RgbaImage::from_pixel(
        size,
        size,
        background.to_rgba(),
    )))
    .into_rgba();

    let text = initials.to_uppercase();
    let layer = render_text(&text, (size / 2).max(1), text_color, &FontSource::Builtin).map_err(
        |source| Error::Processing {
            kind: OperationKind::TextOverlay,
            source,
        },
    )?;
    if let Some(layer) = layer {
        let (x, y) = center_offset((size, size), layer.dimensions());
        imageops::overlay(&mut canvas, &layer, x as i64, y as i64);
    }
    encode(&PixelBuffer::from_rgba(canvas), Format::Png, None, config)
}

fn social<'a>(
    source: impl Into<Source<'a>>,
    (width, height): (u32, u32),
    format: Format,
    quality: Option<u8>,
    config: &Config,
) -> Result<Vec<u8>> {
    source
        .into()
        .load(config)?
        .allow_upscale(true)
        .cover(width, height)
        .strip_metadata()
        .format(format, quality.or(Some(SOCIAL_QUALITY)))
        .to_bytes()
}

/// Open Graph card, 1200x630 by default.
pub fn og_image<'a>(
    source: impl Into<Source<'a>>,
    size: (u32, u32),
    quality: Option<u8>,
    config: &Config,
) -> Result<Vec<u8>> {
    social(source, size, Format::Jpeg, quality, config)
}

/// Wide hero crop, 1920x400 by default.
pub fn banner<'a>(
    source: impl Into<Source<'a>>,
    size: (u32, u32),
    quality: Option<u8>,
    config: &Config,
) -> Result<Vec<u8>> {
    social(source, size, Format::Jpeg, quality, config)
}

/// Metadata-free responsive set written to `dir` as `{name}_{width}{ext}`.
pub fn responsive<'a>(
    source: impl Into<Source<'a>>,
    widths: &[u32],
    dir: &Path,
    name: &str,
    format: Format,
    config: &Config,
) -> Result<BTreeMap<u32, PathBuf>> {
    source.into().load(config)?.strip_metadata().save_responsive(
        dir,
        widths,
        Some(name),
        ResponsiveOptions {
            format: Some(format),
            ..Default::default()
        },
    )
}
