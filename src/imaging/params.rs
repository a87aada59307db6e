//! Parameter types for pipeline operations.
//!
//! These structs describe *what* an operation does, never *how*. A
//! [`Pipeline`](crate::pipeline::Pipeline) stores them inside
//! [`Operation`](crate::pipeline::Operation) variants and hands them to the
//! transform functions in the sibling modules at execution time.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1–100). Clamped on construction.
//! - [`Anchor`]: the nine named fractional reference points used by crop and overlays.
//! - [`Position`]: an [`Anchor`] or `tiled`, for overlays only.
//! - One `*Params` struct per parameterized operation.

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::error::OperationError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Quality(u8);

impl Quality {
    pub const MIN: Quality = Quality(1);
    pub const MAX: Quality = Quality(100);

    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! named_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    Center,
    TopLeft,
    Top,
    TopRight,
    Left,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

named_enum!(Anchor {
    Center => "center",
    TopLeft => "top-left",
    Top => "top",
    TopRight => "top-right",
    Left => "left",
    Right => "right",
    BottomLeft => "bottom-left",
    Bottom => "bottom",
    BottomRight => "bottom-right",
});

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::Center,
        Anchor::TopLeft,
        Anchor::Top,
        Anchor::TopRight,
        Anchor::Left,
        Anchor::Right,
        Anchor::BottomLeft,
        Anchor::Bottom,
        Anchor::BottomRight,
    ];

    /// Horizontal and vertical fraction of the free space before the window.
    pub fn fractions(self) -> (f64, f64) {
        match self {
            Anchor::Center => (0.5, 0.5),
            Anchor::TopLeft => (0.0, 0.0),
            Anchor::Top => (0.5, 0.0),
            Anchor::TopRight => (1.0, 0.0),
            Anchor::Left => (0.0, 0.5),
            Anchor::Right => (1.0, 0.5),
            Anchor::BottomLeft => (0.0, 1.0),
            Anchor::Bottom => (0.5, 1.0),
            Anchor::BottomRight => (1.0, 1.0),
        }
    }
}

impl FromStr for Anchor {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        Anchor::ALL
            .into_iter()
            .find(|a| a.name() == key)
            .ok_or_else(|| OperationError::InvalidParameter(format!("unknown anchor '{s}'")))
    }
}

/// Overlay placement: a fixed anchor with margin, or a repeating grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    At(Anchor),
    Tiled,
}

impl Default for Position {
    fn default() -> Self {
        Position::At(Anchor::BottomRight)
    }
}

impl From<Anchor> for Position {
    fn from(anchor: Anchor) -> Self {
        Position::At(anchor)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::At(anchor) => anchor.fmt(f),
            Position::Tiled => f.write_str("tiled"),
        }
    }
}

impl FromStr for Position {
    type Err = OperationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("tiled") {
            Ok(Position::Tiled)
        } else {
            s.parse().map(Position::At)
        }
    }
}

/// Fit inside a box. A missing side is derived from the source aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub allow_upscale: bool,
}

/// A box with an upscale policy, shared by thumbnail and cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxParams {
    pub width: u32,
    pub height: u32,
    pub allow_upscale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainParams {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub allow_upscale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropParams {
    pub width: u32,
    pub height: u32,
    pub anchor: Anchor,
}

/// Counter-clockwise rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotateParams {
    pub degrees: f32,
    pub expand: bool,
    pub fill: Color,
}

impl RotateParams {
    pub fn new(degrees: f32) -> Self {
        Self {
            degrees,
            expand: true,
            fill: Color::WHITE,
        }
    }
}

/// Where a watermark comes from. Buffers are shared, never copied per run.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlaySource {
    Path(PathBuf),
    Buffer(Arc<PixelBuffer>),
}

impl fmt::Display for OverlaySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlaySource::Path(path) => write!(f, "{}", path.display()),
            OverlaySource::Buffer(buffer) => write!(f, "<{}x{}>", buffer.width(), buffer.height()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkParams {
    pub source: OverlaySource,
    pub position: Position,
    pub opacity: f32,
    /// Overlay width as a fraction of the base width.
    pub scale: Option<f32>,
    pub margin: u32,
}

impl WatermarkParams {
    pub fn new(source: OverlaySource) -> Self {
        Self {
            source,
            position: Position::default(),
            opacity: 0.3,
            scale: None,
            margin: 10,
        }
    }
}

/// Glyph source for text overlays.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FontSource {
    /// 8x8 bitmap font scaled by whole multiples of the size.
    #[default]
    Builtin,
    File(PathBuf),
    Bytes(Arc<Vec<u8>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    pub text: String,
    pub position: Position,
    pub font: FontSource,
    pub size: u32,
    pub color: Color,
    pub opacity: f32,
    pub margin: u32,
}

impl TextParams {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            position: Position::default(),
            font: FontSource::Builtin,
            size: 24,
            color: Color::WHITE,
            opacity: 1.0,
            margin: 10,
        }
    }
}
