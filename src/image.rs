//! The chainable [`Image`] entity.
//!
//! An `Image` owns its decoded original, an append-only [`Pipeline`] and the
//! output settings. Appending operations or picking a format never touches
//! pixels; every output call runs the pipeline over a fresh copy of the
//! original, so outputs can be requested any number of times.
//!
//! ```no_run
//! use imgchain::{Anchor, Image};
//!
//! # fn main() -> imgchain::Result<()> {
//! Image::open("photo.jpg")?
//!     .resize(400, None)
//!     .crop(200, 200, Anchor::TopLeft)
//!     .jpeg(Some(85))
//!     .save("out/avatar.jpg")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Output format resolution
//!
//! 1. `auto_format()` when no explicit format is set
//! 2. the explicit format from `jpeg()`, `png()`, `webp()`, `gif()`, `format()`
//! 3. the extension of the save path
//! 4. the source format
//!
//! If none applies the call fails with [`Error::Format`] before anything is
//! encoded.

use crate::buffer::{ColorMode, PixelBuffer};
use crate::color::Color;
use crate::config::Config;
use crate::encode::export::{self, Response};
use crate::encode::optimize::{self, Optimized};
use crate::encode::encode;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::imaging::{
    Anchor, BoxParams, ContainParams, CropParams, FitParams, OverlaySource, RotateParams,
    TextParams, WatermarkParams,
};
use crate::loader::{self, Loaded};
use crate::naming::source_stem;
use crate::pipeline::{Operation, Pipeline};
use crate::placeholder;
use crate::responsive::{self, ResponsiveOptions};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Summary returned by [`Image::info`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub mode: String,
    pub format: Option<Format>,
    /// EXIF tags of the source, empty for buffers and inputs without EXIF.
    pub exif: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Image {
    original: PixelBuffer,
    source_format: Option<Format>,
    source_path: Option<PathBuf>,
    exif: BTreeMap<String, String>,
    pipeline: Pipeline,
    output_format: Option<Format>,
    output_quality: Option<u8>,
    auto_format: bool,
    allow_upscale: bool,
    config: Config,
}

impl Image {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    fn from_loaded(loaded: Loaded, source_path: Option<PathBuf>, config: Config) -> Self {
        Self {
            original: loaded.buffer,
            source_format: loaded.format,
            source_path,
            exif: loaded.exif,
            pipeline: Pipeline::new(),
            output_format: None,
            output_quality: None,
            auto_format: false,
            allow_upscale: config.resize.allow_upscale,
            config,
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, Config::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        let path = path.as_ref();
        let loaded = loader::load_path(path, &config)?;
        Ok(Self::from_loaded(loaded, Some(path.to_path_buf()), config))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_config(bytes, Config::default())
    }

    pub fn from_bytes_with_config(bytes: &[u8], config: Config) -> Result<Self> {
        let loaded = loader::load_bytes(bytes, &config)?;
        Ok(Self::from_loaded(loaded, None, config))
    }

    /// Accepts raw base64 or a `data:` URI.
    pub fn from_base64(data: &str) -> Result<Self> {
        Self::from_base64_with_config(data, Config::default())
    }

    pub fn from_base64_with_config(data: &str, config: Config) -> Result<Self> {
        let loaded = loader::load_base64(data, &config)?;
        Ok(Self::from_loaded(loaded, None, config))
    }

    pub fn from_buffer(buffer: PixelBuffer, format: Option<Format>) -> Self {
        Self::from_buffer_with_config(buffer, format, Config::default())
    }

    pub fn from_buffer_with_config(
        buffer: PixelBuffer,
        format: Option<Format>,
        config: Config,
    ) -> Self {
        let loaded = Loaded {
            buffer,
            format,
            exif: BTreeMap::new(),
        };
        Self::from_loaded(loaded, None, config)
    }

    // -------------------------------------------------------------------------
    // Operations (appended, never executed here)
    // -------------------------------------------------------------------------

    /// Append an already-built operation.
    pub fn then(mut self, operation: Operation) -> Self {
        self.pipeline.add(operation);
        self
    }

    /// Upscale policy for resize-family operations appended after this call.
    pub fn allow_upscale(mut self, allow: bool) -> Self {
        self.allow_upscale = allow;
        self
    }

    /// Fit inside `width` x `height`; pass `None` to derive a side from the
    /// aspect ratio.
    pub fn resize(self, width: impl Into<Option<u32>>, height: impl Into<Option<u32>>) -> Self {
        let params = FitParams {
            width: width.into(),
            height: height.into(),
            allow_upscale: self.allow_upscale,
        };
        self.then(Operation::Resize(params))
    }

    pub fn thumbnail(self, width: u32, height: u32) -> Self {
        let params = self.box_params(width, height);
        self.then(Operation::Thumbnail(params))
    }

    pub fn cover(self, width: u32, height: u32) -> Self {
        let params = self.box_params(width, height);
        self.then(Operation::Cover(params))
    }

    pub fn contain(self, width: u32, height: u32, background: Color) -> Self {
        let params = ContainParams {
            width,
            height,
            background,
            allow_upscale: self.allow_upscale,
        };
        self.then(Operation::Contain(params))
    }

    pub fn crop(self, width: u32, height: u32, anchor: Anchor) -> Self {
        self.then(Operation::Crop(CropParams {
            width,
            height,
            anchor,
        }))
    }

    /// Counter-clockwise, expanding the canvas, white fill.
    pub fn rotate(self, degrees: f32) -> Self {
        self.rotate_with(RotateParams::new(degrees))
    }

    pub fn rotate_with(self, params: RotateParams) -> Self {
        self.then(Operation::Rotate(params))
    }

    pub fn flip(self) -> Self {
        self.then(Operation::Flip)
    }

    pub fn mirror(self) -> Self {
        self.then(Operation::Mirror)
    }

    pub fn grayscale(self) -> Self {
        self.then(Operation::Grayscale)
    }

    pub fn strip_metadata(self) -> Self {
        self.then(Operation::StripMetadata)
    }

    /// Watermark from a file with default placement (bottom-right, 30%).
    pub fn watermark(self, path: impl Into<PathBuf>) -> Self {
        self.watermark_with(WatermarkParams::new(OverlaySource::Path(path.into())))
    }

    pub fn watermark_with(self, params: WatermarkParams) -> Self {
        self.then(Operation::Watermark(params))
    }

    pub fn text_overlay(self, text: impl Into<String>) -> Self {
        self.text_overlay_with(TextParams::new(text))
    }

    pub fn text_overlay_with(self, params: TextParams) -> Self {
        self.then(Operation::TextOverlay(params))
    }

    pub fn brightness(self, factor: f32) -> Self {
        self.then(Operation::Brightness(factor))
    }

    pub fn contrast(self, factor: f32) -> Self {
        self.then(Operation::Contrast(factor))
    }

    pub fn saturation(self, factor: f32) -> Self {
        self.then(Operation::Saturation(factor))
    }

    pub fn sharpen(self, factor: f32) -> Self {
        self.then(Operation::Sharpen(factor))
    }

    pub fn blur(self, radius: f32) -> Self {
        self.then(Operation::Blur(radius))
    }

    pub fn sepia(self) -> Self {
        self.then(Operation::Sepia)
    }

    pub fn rounded_corners(self, radius: u32) -> Self {
        self.then(Operation::RoundedCorners(radius))
    }

    fn box_params(&self, width: u32, height: u32) -> BoxParams {
        BoxParams {
            width,
            height,
            allow_upscale: self.allow_upscale,
        }
    }

    // -------------------------------------------------------------------------
    // Output format
    // -------------------------------------------------------------------------

    pub fn jpeg(self, quality: Option<u8>) -> Self {
        self.format(Format::Jpeg, quality)
    }

    pub fn png(self) -> Self {
        self.format(Format::Png, None)
    }

    pub fn webp(self, quality: Option<u8>) -> Self {
        self.format(Format::Webp, quality)
    }

    pub fn gif(self) -> Self {
        self.format(Format::Gif, None)
    }

    /// Set the output format. A `None` quality keeps any earlier quality.
    pub fn format(mut self, format: Format, quality: Option<u8>) -> Self {
        self.output_format = Some(format);
        if quality.is_some() {
            self.output_quality = quality;
        }
        self
    }

    /// Pick PNG, WEBP or JPEG from the executed content at output time.
    /// An explicit format set with `format()` and friends takes precedence.
    pub fn auto_format(mut self) -> Self {
        self.auto_format = true;
        self
    }

    // -------------------------------------------------------------------------
    // Execution and outputs
    // -------------------------------------------------------------------------

    /// Run the pipeline against a copy of the original.
    ///
    /// Fails with [`Error::Size`] when the result exceeds
    /// `limits.max_output_dimension` on either axis.
    pub fn execute(&self) -> Result<PixelBuffer> {
        let buffer = self.pipeline.execute(&self.original)?;
        let limit = self.config.limits.max_output_dimension;
        let longest = buffer.width().max(buffer.height());
        if longest > limit {
            return Err(Error::Size {
                what: "output dimension (px)",
                actual: longest as u64,
                limit: limit as u64,
            });
        }
        Ok(buffer)
    }

    fn resolve_format(&self, path: Option<&Path>) -> Result<Format> {
        self.output_format
            .or_else(|| path.and_then(Format::from_path))
            .or(self.source_format)
            .ok_or_else(|| {
                Error::Format(
                    "cannot determine output format: call jpeg(), png(), webp() or format(), \
                     or save to a path with a recognized extension"
                        .to_string(),
                )
            })
    }

    fn encoded(&self, path: Option<&Path>) -> Result<(Vec<u8>, Format)> {
        if self.auto_format && self.output_format.is_none() {
            let buffer = self.execute()?;
            return optimize::auto_format(&buffer, self.output_quality, &self.config);
        }
        let format = self.resolve_format(path)?;
        let buffer = self.execute()?;
        let bytes = encode(&buffer, format, self.output_quality, &self.config)?;
        Ok((bytes, format))
    }

    /// Encode and write to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let (bytes, _) = self.encoded(Some(path))?;
        export::write(path, &bytes)?;
        Ok(path.to_path_buf())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.encoded(None).map(|(bytes, _)| bytes)
    }

    pub fn to_base64(&self) -> Result<String> {
        self.encoded(None).map(|(bytes, _)| export::to_base64(&bytes))
    }

    pub fn to_data_uri(&self) -> Result<String> {
        self.encoded(None)
            .map(|(bytes, format)| export::data_uri(&bytes, format))
    }

    pub fn to_response(&self) -> Result<Response> {
        self.encoded(None)
            .map(|(bytes, format)| Response::new(bytes, format))
    }

    // -------------------------------------------------------------------------
    // Derived outputs
    // -------------------------------------------------------------------------

    fn responsive_format(&self, options: &ResponsiveOptions) -> Format {
        options
            .format
            .or(self.output_format)
            .or(self.source_format)
            .unwrap_or(Format::Webp)
    }

    /// Execute once, then encode one variant per resolved width.
    pub fn responsive(
        &self,
        widths: &[u32],
        options: ResponsiveOptions,
    ) -> Result<BTreeMap<u32, Vec<u8>>> {
        let buffer = self.execute()?;
        responsive::generate_responsive(
            &buffer,
            widths,
            self.responsive_format(&options),
            options.quality.or(self.output_quality),
            options.allow_upscale,
            &self.config,
        )
    }

    /// Like [`responsive`](Self::responsive), written as
    /// `dir/{name}_{width}{ext}`. `name` defaults to the source file stem.
    pub fn save_responsive(
        &self,
        dir: impl AsRef<Path>,
        widths: &[u32],
        name: Option<&str>,
        options: ResponsiveOptions,
    ) -> Result<BTreeMap<u32, PathBuf>> {
        let set = self.responsive(widths, options)?;
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| source_stem(self.source_path.as_deref()));
        responsive::save_responsive(&set, dir.as_ref(), &name, self.responsive_format(&options))
    }

    /// Re-encode at the highest quality that fits `target_kb`.
    pub fn optimize(&self, target_kb: u64, min_quality: u8, max_quality: u8) -> Result<Optimized> {
        let format = self.resolve_format(None)?;
        let buffer = self.execute()?;
        optimize::optimize(&buffer, format, target_kb, min_quality, max_quality, &self.config)
    }

    pub fn lqip(&self, width: u32) -> Result<String> {
        placeholder::lqip(&self.execute()?, width, &self.config)
    }

    pub fn dominant_color(&self) -> Result<String> {
        Ok(placeholder::dominant_color(&self.execute()?))
    }

    pub fn color_palette(&self, count: usize) -> Result<Vec<String>> {
        Ok(placeholder::color_palette(&self.execute()?, count))
    }

    pub fn svg_placeholder(&self, width: Option<u32>, height: Option<u32>) -> Result<String> {
        Ok(placeholder::svg_placeholder(&self.execute()?, width, height))
    }

    // -------------------------------------------------------------------------
    // Info
    // -------------------------------------------------------------------------

    /// Width of the original, before any queued operation.
    pub fn width(&self) -> u32 {
        self.original.width()
    }

    pub fn height(&self) -> u32 {
        self.original.height()
    }

    pub fn mode(&self) -> ColorMode {
        self.original.mode()
    }

    pub fn source_format(&self) -> Option<Format> {
        self.source_format
    }

    /// EXIF tags read from the source bytes, by tag name.
    pub fn exif(&self) -> &BTreeMap<String, String> {
        &self.exif
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn info(&self) -> ImageInfo {
        ImageInfo {
            width: self.width(),
            height: self.height(),
            mode: self.mode().to_string(),
            format: self.source_format,
            exif: self.exif.clone(),
        }
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self
            .source_path
            .as_deref()
            .map_or_else(|| "bytes".to_string(), |p| p.display().to_string());
        write!(
            f,
            "Image({source}, {}x{}, {})",
            self.width(),
            self.height(),
            self.pipeline
        )
    }
}
