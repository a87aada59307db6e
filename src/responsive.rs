//! Responsive size sets: one encoding per resolved width.
//!
//! Widths are resolved by [`responsive_sizes`]: ascending, capped to the
//! source width when upscaling is off, and deduplicated. The result maps
//! resolved width to bytes (or to the written path), iterating in
//! ascending width order.

use crate::buffer::PixelBuffer;
use crate::config::Config;
use crate::encode::{encode, export};
use crate::error::Result;
use crate::format::Format;
use crate::imaging::resize::resample;
use crate::imaging::responsive_sizes;
use crate::naming::responsive_file_name;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_WIDTHS: [u32; 4] = [320, 640, 1024, 1920];

/// Output settings for a responsive set.
///
/// `format: None` defers to the image's output format, then its source
/// format, then WEBP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponsiveOptions {
    pub format: Option<Format>,
    pub quality: Option<u8>,
    pub allow_upscale: bool,
}

/// Resize and encode `buffer` at each resolved width.
pub fn generate_responsive(
    buffer: &PixelBuffer,
    widths: &[u32],
    format: Format,
    quality: Option<u8>,
    allow_upscale: bool,
    config: &Config,
) -> Result<BTreeMap<u32, Vec<u8>>> {
    let mut set = BTreeMap::new();
    for size in responsive_sizes(buffer.dimensions(), widths, allow_upscale) {
        let resized = if (size.width, size.height) == buffer.dimensions() {
            buffer.clone()
        } else {
            resample(buffer, size.width, size.height)
        };
        let bytes = encode(&resized, format, quality, config)?;
        debug!(
            requested = size.requested,
            width = size.width,
            height = size.height,
            %format,
            bytes = bytes.len(),
            "responsive size"
        );
        set.insert(size.width, bytes);
    }
    Ok(set)
}

/// Write a generated set under `dir` as `{name}_{width}{ext}`.
pub fn save_responsive(
    set: &BTreeMap<u32, Vec<u8>>,
    dir: &Path,
    name: &str,
    format: Format,
) -> Result<BTreeMap<u32, PathBuf>> {
    let mut paths = BTreeMap::new();
    for (&width, bytes) in set {
        let path = dir.join(responsive_file_name(name, width, format));
        export::write(&path, bytes)?;
        paths.insert(width, path);
    }
    Ok(paths)
}
