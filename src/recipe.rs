//! Text syntax for operations, used by the CLI `--op` flag.
//!
//! A recipe is `name` or `name:arg,arg,...`:
//!
//! | Recipe | Operation |
//! |---|---|
//! | `resize:400`, `resize:x300`, `resize:400x300` | fit by width, height or box |
//! | `thumbnail:WxH`, `cover:WxH` | box resizes |
//! | `contain:WxH[,color]` | letterbox, white by default |
//! | `crop:WxH[,anchor]` | anchored crop, centered by default |
//! | `rotate:DEG` | counter-clockwise rotation |
//! | `flip`, `mirror`, `grayscale`, `strip`, `sepia` | no arguments |
//! | `brightness:F`, `contrast:F`, `saturation:F`, `sharpen:F` | enhancement factor |
//! | `blur:R` | Gaussian radius |
//! | `rounded:R` | corner radius |
//! | `watermark:PATH[,position[,opacity[,scale[,margin]]]]` | image overlay |
//! | `text:TEXT[,position[,size[,color[,opacity]]]]` | builtin-font text |

use crate::color::Color;
use crate::imaging::{
    Anchor, BoxParams, ContainParams, CropParams, FitParams, OverlaySource, Position,
    RotateParams, TextParams, WatermarkParams,
};
use crate::pipeline::Operation;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecipeError {
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
    #[error("'{op}' needs {what}")]
    MissingArgument { op: String, what: &'static str },
    #[error("'{op}': invalid value '{value}': {reason}")]
    InvalidArgument {
        op: String,
        value: String,
        reason: String,
    },
    #[error("'{op}' takes at most {max} arguments")]
    TooManyArguments { op: String, max: usize },
}

struct Args<'a> {
    op: &'a str,
    values: Vec<&'a str>,
}

impl<'a> Args<'a> {
    fn new(op: &'a str, raw: Option<&'a str>, max: usize) -> Result<Self, RecipeError> {
        let values: Vec<&str> = match raw {
            Some(raw) if !raw.is_empty() => raw.split(',').map(str::trim).collect(),
            _ => Vec::new(),
        };
        if values.len() > max {
            return Err(RecipeError::TooManyArguments {
                op: op.to_string(),
                max,
            });
        }
        Ok(Self { op, values })
    }

    fn invalid(&self, value: &str, reason: impl ToString) -> RecipeError {
        RecipeError::InvalidArgument {
            op: self.op.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn raw(&self, index: usize, what: &'static str) -> Result<&'a str, RecipeError> {
        self.values
            .get(index)
            .copied()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| RecipeError::MissingArgument {
                op: self.op.to_string(),
                what,
            })
    }

    fn optional(&self, index: usize) -> Option<&'a str> {
        self.values.get(index).copied().filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, value: &str) -> Result<T, RecipeError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        value.parse().map_err(|e: T::Err| self.invalid(value, e))
    }

    fn required<T>(&self, index: usize, what: &'static str) -> Result<T, RecipeError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        self.parse(self.raw(index, what)?)
    }

    fn or<T>(&self, index: usize, default: T) -> Result<T, RecipeError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        self.optional(index).map_or(Ok(default), |v| self.parse(v))
    }

    /// `W`, `xH` or `WxH`.
    fn sides(&self, index: usize) -> Result<(Option<u32>, Option<u32>), RecipeError> {
        let raw = self.raw(index, "a size like 400, x300 or 400x300")?;
        let side = |s: &str| -> Result<Option<u32>, RecipeError> {
            if s.is_empty() {
                Ok(None)
            } else {
                self.parse(s).map(Some)
            }
        };
        let (w, h) = match raw.split_once(['x', 'X']) {
            Some((w, h)) => (side(w)?, side(h)?),
            None => (side(raw)?, None),
        };
        if w.is_none() && h.is_none() {
            return Err(self.invalid(raw, "at least one side is required"));
        }
        Ok((w, h))
    }

    /// Exactly `WxH`.
    fn size(&self, index: usize) -> Result<(u32, u32), RecipeError> {
        match self.sides(index)? {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(self.invalid(self.values[index], "expected WIDTHxHEIGHT")),
        }
    }
}

/// Build an [`Operation`] from recipe text.
///
/// `allow_upscale` is baked into resize-family operations.
pub fn parse_operation(recipe: &str, allow_upscale: bool) -> Result<Operation, RecipeError> {
    let recipe = recipe.trim();
    let (name, raw) = match recipe.split_once(':') {
        Some((name, raw)) => (name.trim(), Some(raw)),
        None => (recipe, None),
    };
    let args = |max| Args::new(name, raw, max);
    let box_params = |a: &Args| -> Result<BoxParams, RecipeError> {
        let (width, height) = a.size(0)?;
        Ok(BoxParams {
            width,
            height,
            allow_upscale,
        })
    };

    let op = match name.to_ascii_lowercase().as_str() {
        "resize" => {
            let a = args(1)?;
            let (width, height) = a.sides(0)?;
            Operation::Resize(FitParams {
                width,
                height,
                allow_upscale,
            })
        }
        "thumbnail" => Operation::Thumbnail(box_params(&args(1)?)?),
        "cover" => Operation::Cover(box_params(&args(1)?)?),
        "contain" => {
            let a = args(2)?;
            let (width, height) = a.size(0)?;
            Operation::Contain(ContainParams {
                width,
                height,
                background: a.or(1, Color::WHITE)?,
                allow_upscale,
            })
        }
        "crop" => {
            let a = args(2)?;
            let (width, height) = a.size(0)?;
            Operation::Crop(CropParams {
                width,
                height,
                anchor: a.or(1, Anchor::Center)?,
            })
        }
        "rotate" => Operation::Rotate(RotateParams::new(args(1)?.required(0, "an angle")?)),
        "flip" => {
            args(0)?;
            Operation::Flip
        }
        "mirror" => {
            args(0)?;
            Operation::Mirror
        }
        "grayscale" | "greyscale" => {
            args(0)?;
            Operation::Grayscale
        }
        "strip" | "strip_metadata" => {
            args(0)?;
            Operation::StripMetadata
        }
        "sepia" => {
            args(0)?;
            Operation::Sepia
        }
        "brightness" => Operation::Brightness(args(1)?.required(0, "a factor")?),
        "contrast" => Operation::Contrast(args(1)?.required(0, "a factor")?),
        "saturation" => Operation::Saturation(args(1)?.required(0, "a factor")?),
        "sharpen" => Operation::Sharpen(args(1)?.or(0, 2.0)?),
        "blur" => Operation::Blur(args(1)?.or(0, 2.0)?),
        "rounded" | "rounded_corners" => {
            Operation::RoundedCorners(args(1)?.required(0, "a radius")?)
        }
        "watermark" => {
            let a = args(5)?;
            let path = PathBuf::from(a.raw(0, "an overlay path")?);
            let defaults = WatermarkParams::new(OverlaySource::Path(path));
            Operation::Watermark(WatermarkParams {
                position: a.or::<Position>(1, defaults.position)?,
                opacity: a.or(2, defaults.opacity)?,
                scale: a.optional(3).map(|v| a.parse(v)).transpose()?,
                margin: a.or(4, defaults.margin)?,
                ..defaults
            })
        }
        "text" => {
            let a = args(5)?;
            let defaults = TextParams::new(a.raw(0, "the text to draw")?);
            Operation::TextOverlay(TextParams {
                position: a.or::<Position>(1, defaults.position)?,
                size: a.or(2, defaults.size)?,
                color: a.or(3, defaults.color)?,
                opacity: a.or(4, defaults.opacity)?,
                ..defaults
            })
        }
        _ => return Err(RecipeError::UnknownOperation(name.to_string())),
    };
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Operation {
        parse_operation(s, false).unwrap()
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    #[test]
    fn resize_forms() {
        let fit = |w, h| {
            Operation::Resize(FitParams {
                width: w,
                height: h,
                allow_upscale: false,
            })
        };
        assert_eq!(parse("resize:400"), fit(Some(400), None));
        assert_eq!(parse("resize:x300"), fit(None, Some(300)));
        assert_eq!(parse("resize:400x300"), fit(Some(400), Some(300)));
    }

    #[test]
    fn box_operations_need_both_sides() {
        assert!(matches!(
            parse_operation("cover:200", false),
            Err(RecipeError::InvalidArgument { .. })
        ));
        assert_eq!(
            parse_operation("thumbnail:20x10", true).unwrap(),
            Operation::Thumbnail(BoxParams {
                width: 20,
                height: 10,
                allow_upscale: true,
            })
        );
    }

    #[test]
    fn contain_and_crop_defaults() {
        match parse("contain:100x50") {
            Operation::Contain(p) => assert_eq!(p.background, Color::WHITE),
            other => panic!("unexpected {other:?}"),
        }
        match parse("contain:100x50,#000") {
            Operation::Contain(p) => assert_eq!(p.background, Color::BLACK),
            other => panic!("unexpected {other:?}"),
        }
        match parse("crop:200x200,top-left") {
            Operation::Crop(p) => assert_eq!(p.anchor, Anchor::TopLeft),
            other => panic!("unexpected {other:?}"),
        }
        match parse("crop:200x200") {
            Operation::Crop(p) => assert_eq!(p.anchor, Anchor::Center),
            other => panic!("unexpected {other:?}"),
        }
    }

    // =========================================================================
    // Simple operations
    // =========================================================================

    #[test]
    fn argument_free_operations() {
        assert_eq!(parse("flip"), Operation::Flip);
        assert_eq!(parse("MIRROR"), Operation::Mirror);
        assert_eq!(parse("strip"), Operation::StripMetadata);
        assert_eq!(parse("sepia"), Operation::Sepia);
        assert!(matches!(
            parse_operation("flip:1", false),
            Err(RecipeError::TooManyArguments { max: 0, .. })
        ));
    }

    #[test]
    fn factors_and_radii() {
        assert_eq!(parse("brightness:1.2"), Operation::Brightness(1.2));
        assert_eq!(parse("blur"), Operation::Blur(2.0));
        assert_eq!(parse("blur:5"), Operation::Blur(5.0));
        assert_eq!(parse("rounded:16"), Operation::RoundedCorners(16));
        assert_eq!(parse("rotate:45"), Operation::Rotate(RotateParams::new(45.0)));
    }

    // =========================================================================
    // Overlays
    // =========================================================================

    #[test]
    fn watermark_arguments() {
        match parse("watermark:logo.png,tiled,0.5,0.2,4") {
            Operation::Watermark(p) => {
                assert_eq!(p.source, OverlaySource::Path("logo.png".into()));
                assert_eq!(p.position, Position::Tiled);
                assert_eq!(p.opacity, 0.5);
                assert_eq!(p.scale, Some(0.2));
                assert_eq!(p.margin, 4);
            }
            other => panic!("unexpected {other:?}"),
        }
        match parse("watermark:logo.png") {
            Operation::Watermark(p) => {
                assert_eq!(p.position, Position::At(Anchor::BottomRight));
                assert_eq!(p.scale, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn text_arguments() {
        match parse("text:Hello,top-left,32,red,0.5") {
            Operation::TextOverlay(p) => {
                assert_eq!(p.text, "Hello");
                assert_eq!(p.position, Position::At(Anchor::TopLeft));
                assert_eq!(p.size, 32);
                assert_eq!(p.color, Color::rgb(255, 0, 0));
                assert_eq!(p.opacity, 0.5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn errors_name_the_offending_token() {
        assert_eq!(
            parse_operation("explode", false).unwrap_err().to_string(),
            "unknown operation 'explode'"
        );
        assert_eq!(
            parse_operation("rotate", false).unwrap_err(),
            RecipeError::MissingArgument {
                op: "rotate".into(),
                what: "an angle"
            }
        );
        let err = parse_operation("crop:200x200,middle", false).unwrap_err();
        assert!(err.to_string().contains("'middle'"));
        let err = parse_operation("resize:abc", false).unwrap_err();
        assert!(err.to_string().contains("'abc'"));
    }
}
