//! Output naming for derived artifacts.
//!
//! Responsive sets are written as `{name}_{width}{ext}` and batch outputs
//! substitute `{name}` in a caller pattern with each source's file stem:
//! - `photo.jpg`, width 640, WEBP → `photo_640.webp`
//! - pattern `out/{name}_thumb.png`, source `a/cat.jpg` → `out/cat_thumb.png`

use crate::format::Format;
use std::path::{Path, PathBuf};

/// Stem used when an image has no source path (bytes, base64, buffers).
pub const FALLBACK_STEM: &str = "image";

/// File stem of `path`, or [`FALLBACK_STEM`].
pub fn source_stem(path: Option<&Path>) -> String {
    path.and_then(Path::file_stem)
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string())
}

pub fn responsive_file_name(name: &str, width: u32, format: Format) -> String {
    format!("{name}_{width}{}", format.extension())
}

/// Expand a batch output pattern for one source.
///
/// Every `{name}` occurrence is replaced. A pattern without the placeholder
/// is returned unchanged, so every source writes the same path.
pub fn expand_pattern(pattern: &str, source: &Path) -> PathBuf {
    PathBuf::from(pattern.replace("{name}", &source_stem(Some(source))))
}
