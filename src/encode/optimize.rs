//! Size-targeted re-encoding and content-aware format choice.

use super::encode;
use crate::buffer::PixelBuffer;
use crate::config::Config;
use crate::error::Result;
use crate::format::Format;
use tracing::debug;

pub const DEFAULT_MIN_QUALITY: u8 = 10;
pub const DEFAULT_MAX_QUALITY: u8 = 95;

/// Result of [`optimize`].
#[derive(Debug, Clone)]
pub struct Optimized {
    pub bytes: Vec<u8>,
    /// Quality the bytes were encoded at; `None` for formats without a quality knob.
    pub quality: Option<u8>,
    /// False when even `min_quality` overshoots the target.
    pub target_met: bool,
}

/// Highest quality in `[min_quality, max_quality]` whose encoding fits in
/// `target_kb` kibibytes.
///
/// Tries `max_quality` first and returns straight away if it fits. Formats
/// without a quality knob are encoded once and returned as is. Missing the
/// target is not an error: the `min_quality` encoding is returned with
/// `target_met == false`.
pub fn optimize(
    buffer: &PixelBuffer,
    format: Format,
    target_kb: u64,
    min_quality: u8,
    max_quality: u8,
    config: &Config,
) -> Result<Optimized> {
    let target = target_kb.saturating_mul(1024);

    if !format.has_quality() {
        let bytes = encode(buffer, format, None, config)?;
        let target_met = bytes.len() as u64 <= target;
        return Ok(Optimized {
            bytes,
            quality: None,
            target_met,
        });
    }

    let (min_quality, max_quality) = (min_quality.max(1), max_quality.min(100));
    let (min_quality, max_quality) = (min_quality.min(max_quality), max_quality);
    let fits = |bytes: &[u8]| bytes.len() as u64 <= target;

    let bytes = encode(buffer, format, Some(max_quality), config)?;
    debug!(%format, quality = max_quality, size = bytes.len(), target, "optimize probe");
    if fits(&bytes) {
        return Ok(Optimized {
            bytes,
            quality: Some(max_quality),
            target_met: true,
        });
    }

    let mut lo = min_quality as i32;
    let mut hi = max_quality as i32 - 1;
    let mut best: Option<(Vec<u8>, u8)> = None;
    while lo <= hi {
        let mid = (lo + hi) / 2;
        let bytes = encode(buffer, format, Some(mid as u8), config)?;
        debug!(%format, quality = mid, size = bytes.len(), target, "optimize probe");
        if fits(&bytes) {
            best = Some((bytes, mid as u8));
            lo = mid + 1;
        } else {
            hi = mid - 1;
        }
    }

    if let Some((bytes, quality)) = best {
        return Ok(Optimized {
            bytes,
            quality: Some(quality),
            target_met: true,
        });
    }

    let bytes = encode(buffer, format, Some(min_quality), config)?;
    debug!(%format, quality = min_quality, size = bytes.len(), target, "optimize target missed");
    Ok(Optimized {
        target_met: fits(&bytes),
        bytes,
        quality: Some(min_quality),
    })
}

/// PNG when alpha is actually used; otherwise the smaller of WEBP and JPEG
/// at the same quality, ties going to WEBP.
///
/// `quality: None` encodes each candidate at its configured default.
pub fn auto_format(
    buffer: &PixelBuffer,
    quality: Option<u8>,
    config: &Config,
) -> Result<(Vec<u8>, Format)> {
    if buffer.uses_transparency() {
        debug!("auto format: alpha in use, choosing PNG");
        return Ok((encode(buffer, Format::Png, None, config)?, Format::Png));
    }
    let webp = encode(buffer, Format::Webp, quality, config)?;
    let jpeg = encode(buffer, Format::Jpeg, quality, config)?;
    debug!(webp = webp.len(), jpeg = jpeg.len(), "auto format candidates");
    if webp.len() <= jpeg.len() {
        Ok((webp, Format::Webp))
    } else {
        Ok((jpeg, Format::Jpeg))
    }
}
