//! Pixel-level transforms, pure Rust on top of the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Resize family** | `DynamicImage::resize_exact` with `Lanczos3` |
//! | **Crop** | `DynamicImage::crop_imm` |
//! | **Rotate** | exact `rotate90/180/270`, else bicubic inverse mapping |
//! | **Blur** | `DynamicImage::blur` (Gaussian) |
//! | **Overlays** | `imageops::overlay`, text via `ab_glyph` or `font8x8` |
//! | **Tone, sepia, masks** | per-pixel math in this module |
//!
//! The module is split into:
//! - **Calculations**: pure functions for dimension and placement math (unit testable)
//! - **Parameters**: data structures describing each operation
//! - **Transforms**: `resize`, `transform`, `adjust`, `effects`, `composite`,
//!   each a set of `fn(PixelBuffer, &Params) -> Result<PixelBuffer, OperationError>`
//! - **Quantize**: color bucketing for dominant color and palettes

pub mod adjust;
mod calculations;
pub mod composite;
pub mod effects;
mod params;
pub mod quantize;
pub mod resize;
pub mod text;
pub mod transform;

pub use calculations::{
    CoverPlan, ResponsiveSize, center_offset, contain_layout, cover_plan, crop_box, fit_dimensions,
    overlay_origins, overlay_position, responsive_sizes, scale_dimensions, thumbnail_dimensions,
};
pub use params::{
    Anchor, BoxParams, ContainParams, CropParams, FitParams, FontSource, OverlaySource, Position,
    Quality, RotateParams, TextParams, WatermarkParams,
};
