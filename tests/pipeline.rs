//! End-to-end checks through the public API: build a chain, execute it,
//! encode, and decode the result again.

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use imgchain::encode::optimize::auto_format;
use imgchain::recipe::parse_operation;
use imgchain::{
    Anchor, Batch, BatchEvent, BatchOptions, Color, Config, Error, Format, Image, OperationKind,
    PixelBuffer, ResponsiveOptions,
};
use std::path::Path;
use tempfile::TempDir;

fn gradient(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_rgb(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    }))
}

fn photo(width: u32, height: u32) -> Image {
    Image::from_buffer(gradient(width, height), Some(Format::Jpeg))
}

fn decode(bytes: &[u8]) -> image::DynamicImage {
    image::load_from_memory(bytes).unwrap()
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
    let buffer = gradient(width, height);
    buffer.as_dynamic().save(dir.join(name)).unwrap();
}

// =========================================================================
// Chains
// =========================================================================

#[test]
fn resize_then_crop_encodes_exact_size() {
    let bytes = photo(800, 600)
        .resize(400, None)
        .crop(200, 200, Anchor::TopLeft)
        .jpeg(Some(80))
        .to_bytes()
        .unwrap();
    let decoded = decode(&bytes);
    assert_eq!((decoded.width(), decoded.height()), (200, 200));
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
}

#[test]
fn cover_and_contain_fill_the_box() {
    let covered = photo(800, 600).cover(200, 200).execute().unwrap();
    assert_eq!(covered.dimensions(), (200, 200));

    let contained = photo(800, 600)
        .contain(300, 300, Color::BLACK)
        .execute()
        .unwrap();
    assert_eq!(contained.dimensions(), (300, 300));
}

#[test]
fn oversized_crop_is_clamped() {
    let cropped = photo(100, 80)
        .crop(500, 500, Anchor::Center)
        .execute()
        .unwrap();
    assert_eq!(cropped.dimensions(), (100, 80));
}

#[test]
fn resize_never_enlarges_by_default() {
    for (w, h) in [(50, 40), (100, 10), (7, 300)] {
        let out = photo(w, h).resize(1000, 1000).execute().unwrap();
        assert!(out.width() <= w && out.height() <= h);
    }
    let enlarged = photo(50, 40)
        .allow_upscale(true)
        .resize(100, None)
        .execute()
        .unwrap();
    assert_eq!(enlarged.dimensions(), (100, 80));
}

#[test]
fn chain_is_repeatable_and_leaves_original_alone() {
    let image = photo(120, 90).rotate(90.0).grayscale();
    let first = image.execute().unwrap();
    let second = image.execute().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.dimensions(), (90, 120));
    assert_eq!((image.width(), image.height()), (120, 90));
}

#[test]
fn recipes_build_the_same_pipeline() {
    let mut image = photo(640, 480);
    for recipe in ["resize:320", "crop:100x100,top-left", "sharpen", "flip"] {
        image = image.then(parse_operation(recipe, false).unwrap());
    }
    assert_eq!(
        image.pipeline().kinds(),
        vec![
            OperationKind::Resize,
            OperationKind::Crop,
            OperationKind::Sharpen,
            OperationKind::Flip,
        ]
    );
    assert_eq!(image.execute().unwrap().dimensions(), (100, 100));
}

#[test]
fn output_dimension_limit_is_enforced() {
    let mut config = Config::default();
    config.limits.max_output_dimension = 64;
    let image = Image::from_buffer_with_config(gradient(32, 32), Some(Format::Png), config);
    let err = image.allow_upscale(true).resize(128, None).execute().unwrap_err();
    assert!(matches!(err, Error::Size { .. }));
}

// =========================================================================
// Outputs
// =========================================================================

#[test]
fn save_picks_format_from_extension() {
    let tmp = TempDir::new().unwrap();
    let path = photo(64, 48).save(tmp.path().join("nested/out.png")).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
}

#[test]
fn data_uri_names_the_mime_type() {
    let uri = photo(16, 16).webp(Some(80)).to_data_uri().unwrap();
    assert!(uri.starts_with("data:image/webp;base64,"));
}

#[test]
fn responsive_set_caps_at_source_width() {
    let set = photo(800, 600)
        .responsive(&[400, 800, 1600], ResponsiveOptions::default())
        .unwrap();
    assert_eq!(set.keys().copied().collect::<Vec<_>>(), vec![400, 800]);
    assert_eq!(decode(&set[&400]).width(), 400);
}

#[test]
fn dominant_color_of_uniform_red() {
    let red = PixelBuffer::from_rgb(RgbImage::from_pixel(50, 50, Rgb([255, 0, 0])));
    let image = Image::from_buffer(red, None);
    assert_eq!(image.dominant_color().unwrap(), "#f00000");
}

#[test]
fn lqip_is_an_inline_webp() {
    let uri = photo(400, 200).lqip(20).unwrap();
    assert!(uri.starts_with("data:image/webp;base64,"));
}

#[test]
fn auto_format_follows_transparency() {
    let config = Config::default();
    let clear = PixelBuffer::from_rgba(RgbaImage::from_pixel(32, 32, Rgba([10, 20, 30, 100])));
    let (_, format) = auto_format(&clear, None, &config).unwrap();
    assert_eq!(format, Format::Png);

    let (_, format) = auto_format(&gradient(64, 64), None, &config).unwrap();
    assert!(matches!(format, Format::Webp | Format::Jpeg));
}

#[test]
fn optimize_meets_a_reachable_target() {
    let result = photo(256, 256).jpeg(None).optimize(50, 10, 95).unwrap();
    assert!(result.target_met);
    assert!(result.bytes.len() as u64 <= 50 * 1024);
    assert!(result.quality.is_some());
}

// =========================================================================
// Batch
// =========================================================================

#[test]
fn batch_writes_every_input() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in");
    std::fs::create_dir_all(&input).unwrap();
    write_png(&input, "a.png", 200, 100);
    write_png(&input, "b.png", 100, 200);

    let pattern = tmp.path().join("out/{name}.jpg");
    let (tx, rx) = std::sync::mpsc::channel();
    let written = Batch::from_dir(&input)
        .unwrap()
        .thumbnail(50, 50)
        .jpeg(Some(70))
        .save(
            pattern.to_str().unwrap(),
            BatchOptions {
                parallel: true,
                max_workers: Some(2),
                events: Some(tx),
            },
        )
        .unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(written[0], tmp.path().join("out/a.jpg"));
    for path in &written {
        let img = image::open(path).unwrap();
        assert!(img.width() <= 50 && img.height() <= 50);
    }
    let finished = rx
        .try_iter()
        .filter(|e| matches!(e, BatchEvent::Finished { .. }))
        .count();
    assert_eq!(finished, 2);
}
