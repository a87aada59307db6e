//! Runtime configuration.
//!
//! Handles loading, validating, and merging `imgchain.toml` files. There is
//! no global configuration: a [`Config`] value is passed explicitly to the
//! loaders, encoders and generators that need it, and defaults are resolved
//! at the call site.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [limits]
//! max_input_bytes = 50000000   # Reject larger inputs before decoding
//! max_output_dimension = 10000 # Reject results wider or taller than this
//!
//! [quality]
//! jpeg = 85                    # Default JPEG quality (1-100)
//! webp = 80                    # Default WebP quality (1-100)
//! png_compression = 6          # PNG compression level (0-9)
//!
//! [resize]
//! allow_upscale = false        # Default upscale policy for resize operations
//!
//! [processing]
//! max_workers = 4              # Max parallel batch workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [quality]
//! jpeg = 70
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "imgchain.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Input and output size limits.
    pub limits: LimitsConfig,
    /// Default encoder parameters.
    pub quality: QualityConfig,
    /// Default resize policy.
    pub resize: ResizeConfig,
    /// Parallel batch settings.
    pub processing: ProcessingConfig,
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("quality.jpeg", self.quality.jpeg), ("quality.webp", self.quality.webp)] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::Validation(format!("{name} must be 1-100")));
            }
        }
        if self.quality.png_compression > 9 {
            return Err(ConfigError::Validation(
                "quality.png_compression must be 0-9".into(),
            ));
        }
        if self.limits.max_output_dimension == 0 {
            return Err(ConfigError::Validation(
                "limits.max_output_dimension must be non-zero".into(),
            ));
        }
        if self.limits.max_input_bytes == 0 {
            return Err(ConfigError::Validation(
                "limits.max_input_bytes must be non-zero".into(),
            ));
        }
        if self.processing.max_workers == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_workers must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_input_bytes: u64,
    /// Enforced on the executed buffer before any encode.
    pub max_output_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 50_000_000,
            max_output_dimension: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    pub jpeg: u8,
    pub webp: u8,
    pub png_compression: u8,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            jpeg: 85,
            webp: 80,
            png_compression: 6,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    pub allow_upscale: bool,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<Config, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, `imgchain.toml` in the
/// working directory is used when present, otherwise stock defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let overlay = match path {
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let implicit = Path::new(DEFAULT_CONFIG_FILE);
            if implicit.exists() {
                Some(load_raw_config(implicit)?)
            } else {
                None
            }
        }
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `imgchain.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# imgchain configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Looked up as ./imgchain.toml, or pass --config <file>.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Limits
# ---------------------------------------------------------------------------
[limits]
# Inputs larger than this many bytes are rejected before decoding.
max_input_bytes = 50000000

# Results wider or taller than this are rejected before encoding.
max_output_dimension = 10000

# ---------------------------------------------------------------------------
# Encoder defaults
# ---------------------------------------------------------------------------
[quality]
# JPEG quality (1 = worst, 100 = best).
jpeg = 85

# WebP quality (1 = worst, 100 = lossless).
webp = 80

# PNG compression level (0 = fastest, 9 = smallest).
png_compression = 6

# ---------------------------------------------------------------------------
# Resize
# ---------------------------------------------------------------------------
[resize]
# Let resize, thumbnail, cover, contain and responsive enlarge images.
allow_upscale = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel batch workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_workers = 4
"##
}
