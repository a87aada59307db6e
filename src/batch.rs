//! Apply one recorded pipeline to many files.
//!
//! A [`Batch`] records operations and output settings once, then replays
//! them per input. Each task opens its own [`Image`], so no buffer or
//! pipeline is shared between workers.
//!
//! Parallel runs use a dedicated, bounded rayon pool rather than the global
//! one:
//!
//! | Setting | Workers |
//! |---|---|
//! | `max_workers: Some(n)` | `n` |
//! | `max_workers: None` | `min(inputs, 8)` |
//!
//! Either way the count is capped by `processing.max_workers` and the
//! available cores. Outputs are returned in input order regardless of
//! completion order.
//!
//! Progress is reported as [`BatchEvent`]s over an optional `mpsc` channel.

use crate::color::Color;
use crate::config::{Config, effective_workers};
use crate::error::{Error, Result};
use crate::format::{Format, is_supported_path};
use crate::image::Image;
use crate::imaging::{
    Anchor, BoxParams, ContainParams, CropParams, FitParams, RotateParams, TextParams,
    WatermarkParams,
};
use crate::naming::expand_pattern;
use crate::pipeline::Operation;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Progress of one batch input.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        index: usize,
        source: PathBuf,
    },
    Finished {
        index: usize,
        source: PathBuf,
        output: PathBuf,
    },
    Failed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub parallel: bool,
    pub max_workers: Option<usize>,
    pub events: Option<Sender<BatchEvent>>,
}

#[derive(Debug, Clone)]
pub struct Batch {
    paths: Vec<PathBuf>,
    operations: Vec<Operation>,
    output_format: Option<Format>,
    output_quality: Option<u8>,
    allow_upscale: bool,
    config: Config,
}

impl Batch {
    pub fn from_paths(paths: Vec<PathBuf>) -> Result<Self> {
        Self::from_paths_with_config(paths, Config::default())
    }

    pub fn from_paths_with_config(paths: Vec<PathBuf>, config: Config) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::load("batch", "no input files"));
        }
        Ok(Self {
            paths,
            operations: Vec::new(),
            output_format: None,
            output_quality: None,
            allow_upscale: config.resize.allow_upscale,
            config,
        })
    }

    pub fn from_dir(dir: &Path) -> Result<Self> {
        Self::from_dir_with_config(dir, Config::default())
    }

    /// Every supported image under `dir`, recursively, in path order.
    pub fn from_dir_with_config(dir: &Path, config: Config) -> Result<Self> {
        let origin = dir.display().to_string();
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|e| Error::load(&origin, e))?;
            if entry.file_type().is_file() && is_supported_path(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        paths.sort();
        if paths.is_empty() {
            return Err(Error::load(origin, "no supported images found"));
        }
        Self::from_paths_with_config(paths, config)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    // -------------------------------------------------------------------------
    // Recording
    // -------------------------------------------------------------------------

    pub fn then(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn allow_upscale(mut self, allow: bool) -> Self {
        self.allow_upscale = allow;
        self
    }

    pub fn resize(self, width: impl Into<Option<u32>>, height: impl Into<Option<u32>>) -> Self {
        let params = FitParams {
            width: width.into(),
            height: height.into(),
            allow_upscale: self.allow_upscale,
        };
        self.then(Operation::Resize(params))
    }

    pub fn thumbnail(self, width: u32, height: u32) -> Self {
        let params = self.box_params(width, height);
        self.then(Operation::Thumbnail(params))
    }

    pub fn cover(self, width: u32, height: u32) -> Self {
        let params = self.box_params(width, height);
        self.then(Operation::Cover(params))
    }

    pub fn contain(self, width: u32, height: u32, background: Color) -> Self {
        let allow_upscale = self.allow_upscale;
        self.then(Operation::Contain(ContainParams {
            width,
            height,
            background,
            allow_upscale,
        }))
    }

    pub fn crop(self, width: u32, height: u32, anchor: Anchor) -> Self {
        self.then(Operation::Crop(CropParams {
            width,
            height,
            anchor,
        }))
    }

    pub fn rotate(self, degrees: f32) -> Self {
        self.then(Operation::Rotate(RotateParams::new(degrees)))
    }

    pub fn flip(self) -> Self {
        self.then(Operation::Flip)
    }

    pub fn mirror(self) -> Self {
        self.then(Operation::Mirror)
    }

    pub fn grayscale(self) -> Self {
        self.then(Operation::Grayscale)
    }

    pub fn strip_metadata(self) -> Self {
        self.then(Operation::StripMetadata)
    }

    pub fn watermark_with(self, params: WatermarkParams) -> Self {
        self.then(Operation::Watermark(params))
    }

    pub fn text_overlay_with(self, params: TextParams) -> Self {
        self.then(Operation::TextOverlay(params))
    }

    pub fn brightness(self, factor: f32) -> Self {
        self.then(Operation::Brightness(factor))
    }

    pub fn contrast(self, factor: f32) -> Self {
        self.then(Operation::Contrast(factor))
    }

    pub fn saturation(self, factor: f32) -> Self {
        self.then(Operation::Saturation(factor))
    }

    pub fn sharpen(self, factor: f32) -> Self {
        self.then(Operation::Sharpen(factor))
    }

    pub fn blur(self, radius: f32) -> Self {
        self.then(Operation::Blur(radius))
    }

    pub fn sepia(self) -> Self {
        self.then(Operation::Sepia)
    }

    pub fn rounded_corners(self, radius: u32) -> Self {
        self.then(Operation::RoundedCorners(radius))
    }

    pub fn jpeg(self, quality: Option<u8>) -> Self {
        self.format(Format::Jpeg, quality)
    }

    pub fn png(self) -> Self {
        self.format(Format::Png, None)
    }

    pub fn webp(self, quality: Option<u8>) -> Self {
        self.format(Format::Webp, quality)
    }

    pub fn format(mut self, format: Format, quality: Option<u8>) -> Self {
        self.output_format = Some(format);
        if quality.is_some() {
            self.output_quality = quality;
        }
        self
    }

    fn box_params(&self, width: u32, height: u32) -> BoxParams {
        BoxParams {
            width,
            height,
            allow_upscale: self.allow_upscale,
        }
    }

    // -------------------------------------------------------------------------
    // Execution
    // -------------------------------------------------------------------------

    fn worker_count(&self, requested: Option<usize>) -> usize {
        let wanted = requested.unwrap_or_else(|| self.paths.len().min(DEFAULT_MAX_WORKERS));
        wanted.min(effective_workers(&self.config.processing)).max(1)
    }

    fn process_one(&self, source: &Path, pattern: &str) -> Result<PathBuf> {
        let mut image = Image::open_with_config(source, self.config.clone())?;
        for op in &self.operations {
            image = image.then(op.clone());
        }
        if let Some(format) = self.output_format {
            image = image.format(format, self.output_quality);
        }
        image.save(expand_pattern(pattern, source))
    }

    fn run_one(
        &self,
        index: usize,
        source: &Path,
        pattern: &str,
        events: Option<&Sender<BatchEvent>>,
    ) -> Result<PathBuf> {
        // A closed receiver only means nobody is listening.
        let emit = |event| {
            if let Some(tx) = events {
                tx.send(event).ok();
            }
        };
        emit(BatchEvent::Started {
            index,
            source: source.to_path_buf(),
        });
        let result = self.process_one(source, pattern);
        match &result {
            Ok(output) => {
                debug!(index, source = %source.display(), output = %output.display(), "batch item done");
                emit(BatchEvent::Finished {
                    index,
                    source: source.to_path_buf(),
                    output: output.clone(),
                });
            }
            Err(e) => emit(BatchEvent::Failed {
                index,
                source: source.to_path_buf(),
                error: e.to_string(),
            }),
        }
        result
    }

    /// Process every input and write it to `pattern` with `{name}` replaced
    /// by the source stem. Returns output paths in input order.
    pub fn save(&self, pattern: &str, options: BatchOptions) -> Result<Vec<PathBuf>> {
        let events = options.events.as_ref();
        let sequential = || -> Result<Vec<PathBuf>> {
            self.paths
                .iter()
                .enumerate()
                .map(|(i, p)| self.run_one(i, p, pattern, events))
                .collect()
        };
        if !options.parallel {
            return sequential();
        }

        let workers = self.worker_count(options.max_workers);
        debug!(workers, inputs = self.paths.len(), "starting parallel batch");
        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(|| {
                self.paths
                    .par_iter()
                    .enumerate()
                    .map(|(i, p)| self.run_one(i, p, pattern, events))
                    .collect()
            }),
            Err(e) => {
                warn!(error = %e, "cannot build worker pool, running sequentially");
                sequential()
            }
        }
    }
}
