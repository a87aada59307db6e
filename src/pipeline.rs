//! Deferred operation queue.
//!
//! A [`Pipeline`] is an append-only list of [`Operation`]s. Nothing runs when
//! an operation is added; [`Pipeline::execute`] applies them in order to a
//! copy of the buffer it is given. Execution borrows the pipeline immutably,
//! so the same pipeline can run any number of times against the same
//! original and always yields the same result.
//!
//! Each operation is a tagged variant carrying its parameter struct and is
//! dispatched through [`Operation::apply`] to one transform function in
//! [`imaging`](crate::imaging). The first failure stops execution; it is
//! wrapped in [`Error::Processing`] with the failing [`OperationKind`] and
//! the partial buffer is dropped.

use crate::buffer::PixelBuffer;
use crate::error::{Error, OperationError, Result};
use crate::imaging::{
    BoxParams, ContainParams, CropParams, FitParams, RotateParams, TextParams, WatermarkParams,
    adjust, composite, effects, resize, transform,
};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Resize,
    Thumbnail,
    Cover,
    Contain,
    Crop,
    Rotate,
    Flip,
    Mirror,
    Grayscale,
    StripMetadata,
    Watermark,
    TextOverlay,
    Brightness,
    Contrast,
    Saturation,
    Sharpen,
    Blur,
    Sepia,
    RoundedCorners,
}

impl OperationKind {
    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Resize => "resize",
            OperationKind::Thumbnail => "thumbnail",
            OperationKind::Cover => "cover",
            OperationKind::Contain => "contain",
            OperationKind::Crop => "crop",
            OperationKind::Rotate => "rotate",
            OperationKind::Flip => "flip",
            OperationKind::Mirror => "mirror",
            OperationKind::Grayscale => "grayscale",
            OperationKind::StripMetadata => "strip_metadata",
            OperationKind::Watermark => "watermark",
            OperationKind::TextOverlay => "text_overlay",
            OperationKind::Brightness => "brightness",
            OperationKind::Contrast => "contrast",
            OperationKind::Saturation => "saturation",
            OperationKind::Sharpen => "sharpen",
            OperationKind::Blur => "blur",
            OperationKind::Sepia => "sepia",
            OperationKind::RoundedCorners => "rounded_corners",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One queued transform. Immutable once appended.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Resize(FitParams),
    Thumbnail(BoxParams),
    Cover(BoxParams),
    Contain(ContainParams),
    Crop(CropParams),
    Rotate(RotateParams),
    Flip,
    Mirror,
    Grayscale,
    StripMetadata,
    Watermark(WatermarkParams),
    TextOverlay(TextParams),
    Brightness(f32),
    Contrast(f32),
    Saturation(f32),
    Sharpen(f32),
    Blur(f32),
    Sepia,
    RoundedCorners(u32),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Resize(_) => OperationKind::Resize,
            Operation::Thumbnail(_) => OperationKind::Thumbnail,
            Operation::Cover(_) => OperationKind::Cover,
            Operation::Contain(_) => OperationKind::Contain,
            Operation::Crop(_) => OperationKind::Crop,
            Operation::Rotate(_) => OperationKind::Rotate,
            Operation::Flip => OperationKind::Flip,
            Operation::Mirror => OperationKind::Mirror,
            Operation::Grayscale => OperationKind::Grayscale,
            Operation::StripMetadata => OperationKind::StripMetadata,
            Operation::Watermark(_) => OperationKind::Watermark,
            Operation::TextOverlay(_) => OperationKind::TextOverlay,
            Operation::Brightness(_) => OperationKind::Brightness,
            Operation::Contrast(_) => OperationKind::Contrast,
            Operation::Saturation(_) => OperationKind::Saturation,
            Operation::Sharpen(_) => OperationKind::Sharpen,
            Operation::Blur(_) => OperationKind::Blur,
            Operation::Sepia => OperationKind::Sepia,
            Operation::RoundedCorners(_) => OperationKind::RoundedCorners,
        }
    }

    /// Run this operation's transform.
    pub fn apply(&self, buffer: PixelBuffer) -> std::result::Result<PixelBuffer, OperationError> {
        match self {
            Operation::Resize(p) => resize::fit(buffer, p),
            Operation::Thumbnail(p) => resize::thumbnail(buffer, p),
            Operation::Cover(p) => resize::cover(buffer, p),
            Operation::Contain(p) => resize::contain(buffer, p),
            Operation::Crop(p) => resize::crop(buffer, p),
            Operation::Rotate(p) => transform::rotate(buffer, p),
            Operation::Flip => transform::flip(buffer),
            Operation::Mirror => transform::mirror(buffer),
            Operation::Grayscale => transform::grayscale(buffer),
            Operation::StripMetadata => transform::strip_metadata(buffer),
            Operation::Watermark(p) => composite::watermark(buffer, p),
            Operation::TextOverlay(p) => composite::text_overlay(buffer, p),
            Operation::Brightness(f) => adjust::brightness(buffer, *f),
            Operation::Contrast(f) => adjust::contrast(buffer, *f),
            Operation::Saturation(f) => adjust::saturation(buffer, *f),
            Operation::Sharpen(f) => adjust::sharpen(buffer, *f),
            Operation::Blur(r) => adjust::blur(buffer, *r),
            Operation::Sepia => effects::sepia(buffer),
            Operation::RoundedCorners(r) => effects::rounded_corners(buffer, *r),
        }
    }
}

fn side(v: Option<u32>) -> String {
    v.map_or_else(|| "?".to_string(), |v| v.to_string())
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            Operation::Resize(p) => write!(f, "{kind}({}x{})", side(p.width), side(p.height)),
            Operation::Thumbnail(p) | Operation::Cover(p) => {
                write!(f, "{kind}({}x{})", p.width, p.height)
            }
            Operation::Contain(p) => write!(f, "{kind}({}x{}, {})", p.width, p.height, p.background),
            Operation::Crop(p) => write!(f, "{kind}({}x{}, {})", p.width, p.height, p.anchor),
            Operation::Rotate(p) => write!(f, "{kind}({})", p.degrees),
            Operation::Watermark(p) => write!(f, "{kind}({}, {})", p.source, p.position),
            Operation::TextOverlay(p) => write!(f, "{kind}({:?}, {})", p.text, p.position),
            Operation::Brightness(v)
            | Operation::Contrast(v)
            | Operation::Saturation(v)
            | Operation::Sharpen(v)
            | Operation::Blur(v) => write!(f, "{kind}({v})"),
            Operation::RoundedCorners(r) => write!(f, "{kind}({r})"),
            Operation::Flip
            | Operation::Mirror
            | Operation::Grayscale
            | Operation::StripMetadata
            | Operation::Sepia => write!(f, "{kind}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    operations: Vec<Operation>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an operation. Nothing executes until [`execute`](Self::execute).
    pub fn add(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter()
    }

    pub fn kinds(&self) -> Vec<OperationKind> {
        self.operations.iter().map(Operation::kind).collect()
    }

    /// Apply every operation in order to a copy of `original`.
    pub fn execute(&self, original: &PixelBuffer) -> Result<PixelBuffer> {
        let mut buffer = original.clone();
        for (index, op) in self.operations.iter().enumerate() {
            let started = Instant::now();
            let kind = op.kind();
            buffer = op
                .apply(buffer)
                .map_err(|source| Error::Processing { kind, source })?;
            debug!(
                index,
                op = %kind,
                width = buffer.width(),
                height = buffer.height(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "applied operation"
            );
        }
        Ok(buffer)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops: Vec<String> = self.operations.iter().map(|op| op.to_string()).collect();
        write!(f, "Pipeline([{}])", ops.join(", "))
    }
}

impl Extend<Operation> for Pipeline {
    fn extend<I: IntoIterator<Item = Operation>>(&mut self, iter: I) {
        self.operations.extend(iter);
    }
}

impl FromIterator<Operation> for Pipeline {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}
