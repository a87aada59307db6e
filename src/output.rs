//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Process
//!
//! ```text
//! photo.jpg → out/photo.webp
//!     640x480 → 320x240, WEBP, 18.2 KiB
//!     Pipeline: resize(320x?), sharpen(1.5)
//! ```
//!
//! With `--target-kb` the quality line is appended:
//!
//! ```text
//!     Quality: 62 (target 20 KiB met)
//! ```
//!
//! ## Responsive
//!
//! ```text
//! hero.jpg (1920x1080)
//!     320px → out/hero_320.webp (9.1 KiB)
//!     640px → out/hero_640.webp (24.6 KiB)
//! ```
//!
//! ## Batch
//!
//! ```text
//! 001 a.jpg → out/a.webp
//! 002 b.png FAILED: cannot load image from b.png: ...
//! ```
//!
//! ## Info
//!
//! ```text
//! photo.jpg
//!     Format: JPEG
//!     Size: 640x480
//!     Mode: RGB
//!     Dominant: #f0a030
//!     EXIF:
//!         Make: "Canon"
//!         Orientation: row 0 at top and column 0 at left
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::batch::BatchEvent;
use crate::encode::optimize::Optimized;
use crate::image::ImageInfo;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ============================================================================
// Shared helpers
// ============================================================================

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count: bytes below 1 KiB, otherwise one decimal.
pub fn human_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// process
// ============================================================================

/// What a `process` run produced, for display.
pub struct ProcessReport<'a> {
    pub source: &'a Path,
    pub output: &'a Path,
    pub before: (u32, u32),
    pub after: (u32, u32),
    pub format: &'a str,
    pub bytes: u64,
    pub pipeline: &'a str,
}

pub fn format_process_output(report: &ProcessReport<'_>, optimized: Option<(&Optimized, u64)>) -> Vec<String> {
    let mut lines = vec![format!(
        "{} \u{2192} {}",
        file_label(report.source),
        report.output.display()
    )];
    lines.push(format!(
        "{}{}x{} \u{2192} {}x{}, {}, {}",
        indent(1),
        report.before.0,
        report.before.1,
        report.after.0,
        report.after.1,
        report.format,
        human_size(report.bytes)
    ));
    if !report.pipeline.is_empty() {
        lines.push(format!("{}Pipeline: {}", indent(1), report.pipeline));
    }
    if let Some((result, target_kb)) = optimized {
        let verdict = if result.target_met { "met" } else { "missed" };
        let quality = result
            .quality
            .map_or_else(|| "n/a".to_string(), |q| q.to_string());
        lines.push(format!(
            "{}Quality: {} (target {} KiB {})",
            indent(1),
            quality,
            target_kb,
            verdict
        ));
    }
    lines
}

pub fn print_process_output(report: &ProcessReport<'_>, optimized: Option<(&Optimized, u64)>) {
    print_lines(format_process_output(report, optimized));
}

// ============================================================================
// responsive
// ============================================================================

/// One line per written width, ascending.
pub fn format_responsive_output(
    source: &Path,
    dimensions: (u32, u32),
    written: &BTreeMap<u32, (PathBuf, u64)>,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}x{})",
        file_label(source),
        dimensions.0,
        dimensions.1
    )];
    for (width, (path, bytes)) in written {
        lines.push(format!(
            "{}{}px \u{2192} {} ({})",
            indent(1),
            width,
            path.display(),
            human_size(*bytes)
        ));
    }
    lines
}

pub fn print_responsive_output(
    source: &Path,
    dimensions: (u32, u32),
    written: &BTreeMap<u32, (PathBuf, u64)>,
) {
    print_lines(format_responsive_output(source, dimensions, written));
}

// ============================================================================
// batch
// ============================================================================

/// Format a single batch progress event.
///
/// Start events print nothing; only outcomes are shown, each led by the
/// 1-based input position.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { .. } => Vec::new(),
        BatchEvent::Finished {
            index,
            source,
            output,
        } => vec![format!(
            "{:03} {} \u{2192} {}",
            index + 1,
            file_label(source),
            output.display()
        )],
        BatchEvent::Failed {
            index,
            source,
            error,
        } => vec![format!("{:03} {} FAILED: {}", index + 1, file_label(source), error)],
    }
}

pub fn format_batch_summary(count: usize) -> Vec<String> {
    let noun = if count == 1 { "image" } else { "images" };
    vec![format!("Processed {count} {noun}")]
}

// ============================================================================
// info / placeholder
// ============================================================================

pub fn format_info(source: &Path, info: &ImageInfo, dominant: &str) -> Vec<String> {
    let format = info.format.map_or("unknown", |f| f.name());
    let mut lines = vec![
        source.display().to_string(),
        format!("{}Format: {}", indent(1), format),
        format!("{}Size: {}x{}", indent(1), info.width, info.height),
        format!("{}Mode: {}", indent(1), info.mode),
        format!("{}Dominant: {}", indent(1), dominant),
    ];
    if !info.exif.is_empty() {
        lines.push(format!("{}EXIF:", indent(1)));
        for (tag, value) in &info.exif {
            lines.push(format!("{}{}: {}", indent(2), tag, value));
        }
    }
    lines
}

pub fn print_info(source: &Path, info: &ImageInfo, dominant: &str) {
    print_lines(format_info(source, info, dominant));
}

/// Palette as one swatch per line, most frequent first.
pub fn format_palette(colors: &[String]) -> Vec<String> {
    colors
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:03} {}", i + 1, c))
        .collect()
}

pub fn print_palette(colors: &[String]) {
    print_lines(format_palette(colors));
}
