//! Output/source format table.
//!
//! Every [`Format`] maps to exactly one MIME type and one canonical file
//! extension. Extension parsing accepts the common aliases (`.jpeg`, `.tif`).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Jpeg,
    Png,
    Webp,
    Gif,
    Bmp,
    Tiff,
}

/// Extension → format. The first entry for a format is its canonical extension.
const EXTENSIONS: &[(&str, Format)] = &[
    ("jpg", Format::Jpeg),
    ("jpeg", Format::Jpeg),
    ("png", Format::Png),
    ("webp", Format::Webp),
    ("gif", Format::Gif),
    ("bmp", Format::Bmp),
    ("tiff", Format::Tiff),
    ("tif", Format::Tiff),
];

impl Format {
    pub const ALL: [Format; 6] = [
        Format::Jpeg,
        Format::Png,
        Format::Webp,
        Format::Gif,
        Format::Bmp,
        Format::Tiff,
    ];

    pub fn mime_type(self) -> &'static str {
        match self {
            Format::Jpeg => "image/jpeg",
            Format::Png => "image/png",
            Format::Webp => "image/webp",
            Format::Gif => "image/gif",
            Format::Bmp => "image/bmp",
            Format::Tiff => "image/tiff",
        }
    }

    /// Canonical extension including the leading dot, e.g. `".jpg"`.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Jpeg => ".jpg",
            Format::Png => ".png",
            Format::Webp => ".webp",
            Format::Gif => ".gif",
            Format::Bmp => ".bmp",
            Format::Tiff => ".tiff",
        }
    }

    /// Whether the encoder exposes a meaningful 1–100 quality knob.
    pub fn has_quality(self) -> bool {
        matches!(self, Format::Jpeg | Format::Webp)
    }

    /// Resolve a format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, f)| *f)
    }

    /// Map a format detected by the decoder. Unsupported containers yield `None`.
    pub fn from_image_format(format: image::ImageFormat) -> Option<Format> {
        match format {
            image::ImageFormat::Jpeg => Some(Format::Jpeg),
            image::ImageFormat::Png => Some(Format::Png),
            image::ImageFormat::WebP => Some(Format::Webp),
            image::ImageFormat::Gif => Some(Format::Gif),
            image::ImageFormat::Bmp => Some(Format::Bmp),
            image::ImageFormat::Tiff => Some(Format::Tiff),
            _ => None,
        }
    }

    pub(crate) fn as_image_format(self) -> image::ImageFormat {
        match self {
            Format::Jpeg => image::ImageFormat::Jpeg,
            Format::Png => image::ImageFormat::Png,
            Format::Webp => image::ImageFormat::WebP,
            Format::Gif => image::ImageFormat::Gif,
            Format::Bmp => image::ImageFormat::Bmp,
            Format::Tiff => image::ImageFormat::Tiff,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Jpeg => "JPEG",
            Format::Png => "PNG",
            Format::Webp => "WEBP",
            Format::Gif => "GIF",
            Format::Bmp => "BMP",
            Format::Tiff => "TIFF",
        }
    }
}

/// True when the path has an extension one of the decoders understands.
pub fn is_supported_path(path: &Path) -> bool {
    Format::from_path(path).is_some()
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = Error;

    /// Accepts format names and extensions, with or without a dot: `"jpeg"`, `"JPG"`, `".tif"`.
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().trim_start_matches('.').to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(e, _)| *e == key)
            .map(|(_, f)| *f)
            .ok_or_else(|| Error::Format(format!("unknown image format '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_roundtrips_through_path_lookup() {
        for format in Format::ALL {
            let path = format!("image{}", format.extension());
            assert_eq!(Format::from_path(Path::new(&path)), Some(format));
        }
    }

    #[test]
    fn aliases_resolve() {
        assert_eq!(Format::from_path(Path::new("a.JPEG")), Some(Format::Jpeg));
        assert_eq!(Format::from_path(Path::new("a.tif")), Some(Format::Tiff));
        assert_eq!(Format::from_path(Path::new("a.avif")), None);
        assert_eq!(Format::from_path(Path::new("noext")), None);
    }

    #[test]
    fn mime_types_are_distinct() {
        let mut mimes: Vec<_> = Format::ALL.iter().map(|f| f.mime_type()).collect();
        mimes.sort();
        mimes.dedup();
        assert_eq!(mimes.len(), Format::ALL.len());
    }

    #[test]
    fn parse_names() {
        assert_eq!("jpeg".parse::<Format>().unwrap(), Format::Jpeg);
        assert_eq!("WEBP".parse::<Format>().unwrap(), Format::Webp);
        assert_eq!(".png".parse::<Format>().unwrap(), Format::Png);
        assert!(matches!("heic".parse::<Format>(), Err(Error::Format(_))));
    }

    #[test]
    fn only_lossy_formats_have_quality() {
        assert!(Format::Jpeg.has_quality());
        assert!(Format::Webp.has_quality());
        assert!(!Format::Png.has_quality());
        assert!(!Format::Gif.has_quality());
    }
}
