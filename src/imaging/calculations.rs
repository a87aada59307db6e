//! Pure calculation functions for image geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Dimensions round to nearest with a floor of 1; offsets use integer
//! division (or truncation for anchor fractions) so placement is stable.

use super::params::{Anchor, Position};

/// Scale `(w, h)` by `ratio`, rounding each side and never going below 1.
pub fn scale_dimensions(source: (u32, u32), ratio: f64) -> (u32, u32) {
    let (w, h) = source;
    (
        ((w as f64 * ratio).round() as u32).max(1),
        ((h as f64 * ratio).round() as u32).max(1),
    )
}

/// Target dimensions for a fit-inside-box resize.
///
/// Returns `None` when the buffer should pass through unchanged: no side
/// requested, or the fit would enlarge while upscaling is disallowed.
///
/// ```
/// # use imgchain::imaging::fit_dimensions;
/// // 800x600 fit to width 400 → 400x300
/// assert_eq!(fit_dimensions((800, 600), Some(400), None, false), Some((400, 300)));
/// // Box is larger than the source and upscaling is off → unchanged
/// assert_eq!(fit_dimensions((800, 600), Some(1600), Some(1200), false), None);
/// ```
pub fn fit_dimensions(
    source: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
    allow_upscale: bool,
) -> Option<(u32, u32)> {
    let (src_w, src_h) = source;
    let ratio_w = width.map(|w| w as f64 / src_w as f64);
    let ratio_h = height.map(|h| h as f64 / src_h as f64);

    let ratio = match (ratio_w, ratio_h) {
        (None, None) => return None,
        (Some(rw), Some(rh)) => rw.min(rh),
        (Some(r), None) | (None, Some(r)) => r,
    };

    if !allow_upscale && ratio > 1.0 {
        return None;
    }
    Some(scale_dimensions(source, ratio))
}

/// Target dimensions for a thumbnail, or `None` when it already fits.
///
/// The box is a hard ceiling: a thumbnail never enlarges, and neither side
/// exceeds the box after rounding.
pub fn thumbnail_dimensions(
    source: (u32, u32),
    bounds: (u32, u32),
    allow_upscale: bool,
) -> Option<(u32, u32)> {
    let (src_w, src_h) = source;
    let (box_w, box_h) = bounds;
    let fits = src_w <= box_w && src_h <= box_h;

    if fits && !allow_upscale {
        return None;
    }
    let ratio = (box_w as f64 / src_w as f64)
        .min(box_h as f64 / src_h as f64)
        .min(1.0);
    let (w, h) = scale_dimensions(source, ratio);
    let target = (w.min(box_w), h.min(box_h));
    (target != source).then_some(target)
}

/// How a cover resize reaches its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverPlan {
    /// Resize to `resize`, then center-crop to `crop`.
    ResizeThenCrop { resize: (u32, u32), crop: (u32, u32) },
    /// Covering would enlarge and upscaling is off: center-crop at
    /// `min(requested, source)` per axis. The result may be smaller than the box.
    CropOnly { crop: (u32, u32) },
}

/// Plan a cover resize: scale by the larger ratio so the box is filled.
///
/// ```
/// # use imgchain::imaging::{cover_plan, CoverPlan};
/// // 800x600 → 200x200: scale by 1/3 to 267x200, crop the overflow
/// assert_eq!(
///     cover_plan((800, 600), (200, 200), false),
///     CoverPlan::ResizeThenCrop { resize: (267, 200), crop: (200, 200) }
/// );
/// ```
pub fn cover_plan(source: (u32, u32), target: (u32, u32), allow_upscale: bool) -> CoverPlan {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;
    let ratio = (tgt_w as f64 / src_w as f64).max(tgt_h as f64 / src_h as f64);

    if !allow_upscale && ratio > 1.0 {
        return CoverPlan::CropOnly {
            crop: (tgt_w.min(src_w), tgt_h.min(src_h)),
        };
    }
    let resize = scale_dimensions(source, ratio);
    CoverPlan::ResizeThenCrop {
        resize,
        crop: (tgt_w.min(resize.0), tgt_h.min(resize.1)),
    }
}

/// Resized dimensions and paste offset for a contain onto a `target` canvas.
pub fn contain_layout(
    source: (u32, u32),
    target: (u32, u32),
    allow_upscale: bool,
) -> ((u32, u32), (u32, u32)) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;
    let mut ratio = (tgt_w as f64 / src_w as f64).min(tgt_h as f64 / src_h as f64);
    if !allow_upscale && ratio > 1.0 {
        ratio = 1.0;
    }
    let (w, h) = scale_dimensions(source, ratio);
    let (w, h) = (w.min(tgt_w), h.min(tgt_h));
    ((w, h), ((tgt_w - w) / 2, (tgt_h - h) / 2))
}

/// Offset of a centered window of `window` inside `outer`.
pub fn center_offset(outer: (u32, u32), window: (u32, u32)) -> (u32, u32) {
    (
        outer.0.saturating_sub(window.0) / 2,
        outer.1.saturating_sub(window.1) / 2,
    )
}

/// Crop rectangle as `(left, top, width, height)`, clamped to the source.
///
/// ```
/// # use imgchain::imaging::{crop_box, Anchor};
/// assert_eq!(crop_box((800, 600), (200, 200), Anchor::BottomRight), (600, 400, 200, 200));
/// assert_eq!(crop_box((100, 50), (300, 300), Anchor::Center), (0, 0, 100, 50));
/// ```
pub fn crop_box(source: (u32, u32), size: (u32, u32), anchor: Anchor) -> (u32, u32, u32, u32) {
    let (src_w, src_h) = source;
    let crop_w = size.0.min(src_w);
    let crop_h = size.1.min(src_h);
    let (ax, ay) = anchor.fractions();
    let left = ((src_w - crop_w) as f64 * ax) as u32;
    let top = ((src_h - crop_h) as f64 * ay) as u32;
    (left, top, crop_w, crop_h)
}

/// Top-left placement of an overlay anchored on a base with `margin`.
///
/// Coordinates are signed: an overlay wider than the base lands partly
/// off-canvas and is clipped by the compositor.
pub fn overlay_position(
    base: (u32, u32),
    overlay: (u32, u32),
    anchor: Anchor,
    margin: u32,
) -> (i64, i64) {
    let (bw, bh) = (base.0 as i64, base.1 as i64);
    let (ow, oh) = (overlay.0 as i64, overlay.1 as i64);
    let m = margin as i64;

    let center_x = (bw - ow).div_euclid(2);
    let center_y = (bh - oh).div_euclid(2);
    let right = bw - ow - m;
    let bottom = bh - oh - m;

    match anchor {
        Anchor::Center => (center_x, center_y),
        Anchor::TopLeft => (m, m),
        Anchor::TopRight => (right, m),
        Anchor::BottomLeft => (m, bottom),
        Anchor::BottomRight => (right, bottom),
        Anchor::Top => (center_x, m),
        Anchor::Bottom => (center_x, bottom),
        Anchor::Left => (m, center_y),
        Anchor::Right => (right, center_y),
    }
}

/// Every top-left origin at which an overlay is stamped for `position`.
///
/// `Tiled` walks a `(overlay + margin)` grid from the origin until the base
/// is covered.
pub fn overlay_origins(
    base: (u32, u32),
    overlay: (u32, u32),
    position: Position,
    margin: u32,
) -> Vec<(i64, i64)> {
    match position {
        Position::At(anchor) => vec![overlay_position(base, overlay, anchor, margin)],
        Position::Tiled => {
            let step_x = (overlay.0 + margin).max(1) as usize;
            let step_y = (overlay.1 + margin).max(1) as usize;
            (0..base.1)
                .step_by(step_y)
                .flat_map(|y| {
                    (0..base.0)
                        .step_by(step_x)
                        .map(move |x| (x as i64, y as i64))
                })
                .collect()
        }
    }
}

/// A single responsive width with its aspect-preserving height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsiveSize {
    /// Width as requested by the caller.
    pub requested: u32,
    /// Width after capping to the source.
    pub width: u32,
    pub height: u32,
}

/// Resolve requested widths against the source, ascending and deduplicated.
///
/// When upscaling is disallowed, widths larger than the source cap to the
/// source width, so several requests may collapse into one entry. The first
/// (smallest) request that resolves to a width wins.
pub fn responsive_sizes(
    original: (u32, u32),
    widths: &[u32],
    allow_upscale: bool,
) -> Vec<ResponsiveSize> {
    let (orig_w, orig_h) = original;
    let mut sorted = widths.to_vec();
    sorted.sort_unstable();

    let mut sizes: Vec<ResponsiveSize> = Vec::with_capacity(sorted.len());
    for requested in sorted {
        let ratio = if !allow_upscale && requested > orig_w {
            1.0
        } else {
            requested as f64 / orig_w as f64
        };
        let width = ((orig_w as f64 * ratio).round() as u32).max(1);
        let height = ((orig_h as f64 * ratio).round() as u32).max(1);
        if sizes.last().is_some_and(|s| s.width == width) {
            continue;
        }
        sizes.push(ResponsiveSize {
            requested,
            width,
            height,
        });
    }
    sizes
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // fit_dimensions tests
    // =========================================================================

    #[test]
    fn fit_width_only_derives_height() {
        assert_eq!(fit_dimensions((800, 600), Some(400), None, false), Some((400, 300)));
    }

    #[test]
    fn fit_height_only_derives_width() {
        assert_eq!(fit_dimensions((800, 600), None, Some(300), false), Some((400, 300)));
    }

    #[test]
    fn fit_both_takes_smaller_ratio() {
        // ratios 0.5 and 0.25 → 0.25
        assert_eq!(fit_dimensions((800, 600), Some(400), Some(150), false), Some((200, 150)));
    }

    #[test]
    fn fit_without_sides_is_identity() {
        assert_eq!(fit_dimensions((800, 600), None, None, true), None);
    }

    #[test]
    fn fit_refuses_to_upscale_by_default() {
        assert_eq!(fit_dimensions((800, 600), Some(1600), None, false), None);
        assert_eq!(fit_dimensions((800, 600), Some(1600), None, true), Some((1600, 1200)));
    }

    #[test]
    fn fit_floors_at_one_pixel() {
        assert_eq!(fit_dimensions((1000, 10), Some(10), None, false), Some((10, 1)));
    }

    // =========================================================================
    // thumbnail_dimensions tests
    // =========================================================================

    #[test]
    fn thumbnail_shrinks_into_box() {
        assert_eq!(thumbnail_dimensions((800, 600), (200, 200), false), Some((200, 150)));
    }

    #[test]
    fn thumbnail_already_fitting_is_unchanged() {
        assert_eq!(thumbnail_dimensions((100, 80), (200, 200), false), None);
    }

    #[test]
    fn thumbnail_never_enlarges_even_with_upscale() {
        assert_eq!(thumbnail_dimensions((100, 80), (200, 200), true), None);
    }

    #[test]
    fn thumbnail_respects_box_as_ceiling() {
        let (w, h) = thumbnail_dimensions((999, 333), (100, 33), false).unwrap();
        assert!(w <= 100 && h <= 33);
    }

    // =========================================================================
    // cover_plan tests
    // =========================================================================

    #[test]
    fn cover_landscape_to_square() {
        assert_eq!(
            cover_plan((800, 600), (200, 200), false),
            CoverPlan::ResizeThenCrop {
                resize: (267, 200),
                crop: (200, 200)
            }
        );
    }

    #[test]
    fn cover_with_upscale_hits_box_exactly() {
        match cover_plan((100, 50), (300, 300), true) {
            CoverPlan::ResizeThenCrop { resize, crop } => {
                assert_eq!(resize, (600, 300));
                assert_eq!(crop, (300, 300));
            }
            other => panic!("expected resize, got {other:?}"),
        }
    }

    #[test]
    fn cover_without_upscale_falls_back_to_center_crop() {
        // Box taller than the source: result is clamped, smaller than requested
        assert_eq!(
            cover_plan((400, 100), (200, 300), false),
            CoverPlan::CropOnly { crop: (200, 100) }
        );
    }

    // =========================================================================
    // contain_layout tests
    // =========================================================================

    #[test]
    fn contain_letterboxes_wide_source() {
        // 800x400 into 200x200 → 200x100 pasted at y=50
        assert_eq!(contain_layout((800, 400), (200, 200), false), ((200, 100), (0, 50)));
    }

    #[test]
    fn contain_clamps_ratio_without_upscale() {
        assert_eq!(contain_layout((50, 40), (200, 200), false), ((50, 40), (75, 80)));
        assert_eq!(contain_layout((50, 40), (200, 200), true), ((200, 160), (0, 20)));
    }

    // =========================================================================
    // crop_box tests
    // =========================================================================

    #[test]
    fn crop_every_anchor_stays_in_bounds() {
        for anchor in Anchor::ALL {
            let (l, t, w, h) = crop_box((801, 601), (200, 200), anchor);
            assert!(l + w <= 801 && t + h <= 601, "{anchor} out of bounds");
        }
    }

    #[test]
    fn crop_center_truncates_odd_space() {
        // (801 - 200) * 0.5 = 300.5 → 300
        assert_eq!(crop_box((801, 600), (200, 200), Anchor::Center), (300, 200, 200, 200));
    }

    #[test]
    fn crop_larger_than_source_clamps() {
        assert_eq!(crop_box((100, 50), (300, 300), Anchor::BottomRight), (0, 0, 100, 50));
    }

    // =========================================================================
    // overlay placement tests
    // =========================================================================

    #[test]
    fn overlay_edges_respect_margin() {
        let base = (400, 300);
        let over = (100, 50);
        assert_eq!(overlay_position(base, over, Anchor::TopLeft, 10), (10, 10));
        assert_eq!(overlay_position(base, over, Anchor::BottomRight, 10), (290, 240));
        assert_eq!(overlay_position(base, over, Anchor::Top, 10), (150, 10));
        assert_eq!(overlay_position(base, over, Anchor::Right, 10), (290, 125));
    }

    #[test]
    fn overlay_center_ignores_margin() {
        assert_eq!(overlay_position((400, 300), (100, 50), Anchor::Center, 99), (150, 125));
    }

    #[test]
    fn overlay_larger_than_base_goes_negative() {
        assert_eq!(overlay_position((50, 50), (101, 101), Anchor::Center, 0), (-26, -26));
    }

    #[test]
    fn tiled_grid_covers_base() {
        let origins = overlay_origins((100, 50), (30, 20), Position::Tiled, 10);
        // x: 0, 40, 80; y: 0, 30
        assert_eq!(origins.len(), 6);
        assert_eq!(origins[0], (0, 0));
        assert_eq!(origins[5], (80, 30));
    }

    // =========================================================================
    // responsive_sizes tests
    // =========================================================================

    #[test]
    fn responsive_caps_and_collapses() {
        let sizes = responsive_sizes((800, 600), &[1600, 400, 800], false);
        let widths: Vec<u32> = sizes.iter().map(|s| s.width).collect();
        assert_eq!(widths, vec![400, 800]);
        assert_eq!(sizes[0].height, 300);
    }

    #[test]
    fn responsive_allows_upscale_when_asked() {
        let sizes = responsive_sizes((800, 600), &[1600], true);
        assert_eq!((sizes[0].width, sizes[0].height), (1600, 1200));
    }

    #[test]
    fn responsive_empty_request_is_empty() {
        assert!(responsive_sizes((800, 600), &[], false).is_empty());
    }
}
