//! Input loading: files, in-memory bytes and base64 strings.
//!
//! Every loader enforces `limits.max_input_bytes` before decoding, sniffs the
//! container from magic bytes and reports the detected [`Format`] and any
//! EXIF tags alongside the normalized [`PixelBuffer`].

use crate::buffer::PixelBuffer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::Format;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageReader;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// A decoded input and the container it was decoded from.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub buffer: PixelBuffer,
    pub format: Option<Format>,
    /// Primary-IFD EXIF tags by name; empty when the input has none.
    pub exif: BTreeMap<String, String>,
}

/// EXIF tags of the primary image, keyed by tag name with display values.
///
/// Unreadable or absent EXIF yields an empty map; it never fails a load.
pub fn read_exif(bytes: &[u8]) -> BTreeMap<String, String> {
    let mut cursor = Cursor::new(bytes);
    let Ok(parsed) = exif::Reader::new().read_from_container(&mut cursor) else {
        return BTreeMap::new();
    };
    parsed
        .fields()
        .filter(|field| field.ifd_num == exif::In::PRIMARY)
        .map(|field| {
            (
                field.tag.to_string(),
                field.display_value().with_unit(&parsed).to_string(),
            )
        })
        .collect()
}

fn check_size(actual: u64, config: &Config) -> Result<()> {
    let limit = config.limits.max_input_bytes;
    if actual > limit {
        return Err(Error::Size {
            what: "input size (bytes)",
            actual,
            limit,
        });
    }
    Ok(())
}

fn decode(bytes: &[u8], origin: &str) -> Result<Loaded> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::load(origin, e))?;
    let format = reader.format().and_then(Format::from_image_format);
    let image = reader.decode().map_err(|e| Error::load(origin, e))?;
    let buffer = PixelBuffer::new(image);
    debug!(
        origin,
        width = buffer.width(),
        height = buffer.height(),
        mode = %buffer.mode(),
        format = ?format,
        "decoded input"
    );
    Ok(Loaded {
        buffer,
        format,
        exif: read_exif(bytes),
    })
}

pub fn load_path(path: &Path, config: &Config) -> Result<Loaded> {
    let origin = path.display().to_string();
    let meta = std::fs::metadata(path).map_err(|e| Error::load(&origin, e))?;
    if !meta.is_file() {
        return Err(Error::load(origin, "not a regular file"));
    }
    check_size(meta.len(), config)?;
    let bytes = std::fs::read(path).map_err(|e| Error::load(&origin, e))?;
    let mut loaded = decode(&bytes, &origin)?;
    // Magic bytes win; the extension is only a fallback for sniff failures.
    if loaded.format.is_none() {
        loaded.format = Format::from_path(path);
    }
    Ok(loaded)
}

pub fn load_bytes(bytes: &[u8], config: &Config) -> Result<Loaded> {
    check_size(bytes.len() as u64, config)?;
    decode(bytes, "bytes")
}

/// Decode base64, with or without a `data:<mime>;base64,` prefix.
pub fn load_base64(data: &str, config: &Config) -> Result<Loaded> {
    let data = data.trim();
    let payload = match data.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, payload)| payload)
            .ok_or_else(|| Error::load("base64", "data URI has no payload"))?,
        None => data,
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::load("base64", e))?;
    load_bytes(&bytes, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn load_bytes_detects_png() {
        let png = encoded(&gradient_rgb(12, 8), image::ImageFormat::Png);
        let loaded = load_bytes(&png, &Config::default()).unwrap();
        assert_eq!(loaded.format, Some(Format::Png));
        assert_eq!(loaded.buffer.dimensions(), (12, 8));
    }

    #[test]
    fn load_path_reads_jpeg() {
        let tmp = TempDir::new().unwrap();
        let path = write_fixture(tmp.path(), "photo.jpg", &gradient_rgb(30, 20));
        let loaded = load_path(&path, &Config::default()).unwrap();
        assert_eq!(loaded.format, Some(Format::Jpeg));
        assert_eq!(loaded.buffer.dimensions(), (30, 20));
    }

    #[test]
    fn exif_tags_are_read_by_name() {
        let jpeg = with_exif_orientation(&encoded(&gradient_rgb(16, 8), image::ImageFormat::Jpeg), 6);
        let loaded = load_bytes(&jpeg, &Config::default()).unwrap();
        assert_eq!(loaded.buffer.dimensions(), (16, 8));
        assert!(loaded.exif.contains_key("Orientation"), "got {:?}", loaded.exif);
    }

    #[test]
    fn missing_exif_is_an_empty_map() {
        let png = encoded(&gradient_rgb(4, 4), image::ImageFormat::Png);
        assert!(load_bytes(&png, &Config::default()).unwrap().exif.is_empty());
        assert!(read_exif(b"not an image").is_empty());
    }

    #[test]
    fn missing_file_is_load_error() {
        let err = load_path(Path::new("/nonexistent/x.png"), &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[test]
    fn garbage_bytes_are_load_error() {
        let err = load_bytes(b"definitely not an image", &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[test]
    fn oversized_input_is_size_error() {
        let mut config = Config::default();
        config.limits.max_input_bytes = 10;
        let png = encoded(&gradient_rgb(12, 8), image::ImageFormat::Png);
        match load_bytes(&png, &config) {
            Err(Error::Size { limit, .. }) => assert_eq!(limit, 10),
            other => panic!("expected size error, got {other:?}"),
        }
    }

    #[test]
    fn base64_with_and_without_data_uri_prefix() {
        let png = encoded(&solid_rgb(3, 3, [1, 2, 3]), image::ImageFormat::Png);
        let raw = STANDARD.encode(&png);
        let uri = format!("data:image/png;base64,{raw}");
        for input in [raw.as_str(), uri.as_str()] {
            let loaded = load_base64(input, &Config::default()).unwrap();
            assert_eq!(loaded.buffer.dimensions(), (3, 3));
        }
    }

    #[test]
    fn invalid_base64_is_load_error() {
        let err = load_base64("***", &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }
}
