//! # imgchain
//!
//! Chainable, lazily-executed image pipelines for the web: resize, crop,
//! rotate, adjust colors, composite watermarks and text, then encode to any
//! common raster format or derive responsive sets, placeholders and
//! size-targeted encodings from the same chain.
//!
//! ```no_run
//! use imgchain::{Anchor, Image, ResponsiveOptions};
//!
//! # fn main() -> imgchain::Result<()> {
//! let hero = Image::open("hero.jpg")?.sharpen(1.3).strip_metadata();
//!
//! hero.clone().cover(1200, 630).jpeg(Some(85)).save("out/og.jpg")?;
//! hero.save_responsive("out", &[320, 640, 1280], None, ResponsiveOptions::default())?;
//! let placeholder = hero.lqip(20)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture: Deferred Pipeline
//!
//! ```text
//! load ──► Image { original, Pipeline } ──► execute(copy) ──► encode ──► bytes / file
//!                                                 │
//!                                                 ├──► responsive set
//!                                                 ├──► placeholders
//!                                                 └──► optimize (quality search)
//! ```
//!
//! Appending operations never touches pixels. Every output call runs the
//! pipeline over a fresh copy of the original, so an `Image` can produce any
//! number of outputs and execution is repeatable.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`image`](crate::image) | The chainable [`Image`] entity and output format resolution |
//! | [`pipeline`] | Append-only operation queue with per-operation error context |
//! | [`imaging`] | Pixel transforms: geometry, color, effects, compositing, quantization |
//! | [`encode`] | Format-aware encoding, size-targeted optimization, export helpers |
//! | [`responsive`] | Capped, deduplicated multi-width sets |
//! | [`placeholder`] | LQIP, dominant color, palette and SVG placeholders |
//! | [`presets`] | One-call thumbnail, avatar, Open Graph and banner recipes |
//! | [`batch`] | One recorded pipeline over many files, optionally parallel |
//! | [`recipe`] | Text syntax for operations (`resize:400`, `crop:200x200,top-left`) |
//! | [`loader`] | File, byte and base64 input with size limits |
//! | [`config`] | `imgchain.toml` loading, merging and validation |
//! | [`buffer`], [`color`], [`format`] | Core value types |
//! | [`output`] | CLI output formatting |
//! | [`naming`] | Output file naming for responsive sets and batches |
//!
//! # Design Decisions
//!
//! ## Tagged Operations, Not Closures
//!
//! Each queued operation is an [`Operation`] variant carrying its parameter
//! struct. A pipeline is therefore plain data: it can be cloned, compared,
//! printed, and replayed across threads in a batch without sharing state.
//!
//! ## Explicit Configuration
//!
//! There is no process-wide settings object. An [`Image`] carries the
//! [`Config`] it was created with and hands it to the loaders and encoders.
//! Defaults are resolved where they are used.
//!
//! ## Pure-Rust Codecs
//!
//! Decoding and encoding go through the `image` crate with only pure-Rust
//! codecs enabled. WebP output uses its lossless encoder; lower quality
//! settings posterize color channels first so the file shrinks the way a
//! lossy encoder would.

pub mod batch;
pub mod buffer;
pub mod color;
pub mod config;
pub mod encode;
pub mod error;
pub mod format;
pub mod image;
pub mod imaging;
pub mod loader;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod placeholder;
pub mod presets;
pub mod recipe;
pub mod responsive;

pub use batch::{Batch, BatchEvent, BatchOptions};
pub use buffer::{ColorMode, PixelBuffer};
pub use color::Color;
pub use config::Config;
pub use encode::export::Response;
pub use encode::optimize::Optimized;
pub use error::{Error, OperationError, Result};
pub use format::Format;
pub use self::image::{Image, ImageInfo};
pub use imaging::{Anchor, Position};
pub use pipeline::{Operation, OperationKind, Pipeline};
pub use responsive::ResponsiveOptions;

#[cfg(test)]
pub(crate) mod test_helpers;
