//! Run configuration.
//!
//! Settings come from three layers, each overriding the one before:
//!
//! ```text
//! stock defaults  ←  --config autocrop.toml  ←  command-line flags (-t, -w)
//! ```
//!
//! Layers are merged as TOML values and deserialized once, so a config file
//! only needs the keys it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! threshold = 60            # Border cutoff (0-255); rows/columns with a mean
//!                           # intensity above this are content
//!
//! [processing]
//! workers = 4               # Concurrent images per batch (omit for auto = CPU cores)
//!
//! [output]
//! jpeg_quality = 95         # Quality for .jpg/.jpeg output (1-100)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, Threshold};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration for a whole run.
///
/// All fields have defaults; config files need only specify the values they
/// want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutocropConfig {
    /// Border cutoff. A mean intensity exactly equal to it counts as border.
    pub threshold: u8,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Output encoding settings.
    pub output: OutputConfig,
}

impl Default for AutocropConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::default().value(),
            processing: ProcessingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl AutocropConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.workers == Some(0) {
            return Err(ConfigError::Validation(
                "processing.workers must be at least 1".into(),
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    pub fn threshold(&self) -> Threshold {
        Threshold::new(self.threshold)
    }

    pub fn jpeg_quality(&self) -> Quality {
        Quality::new(self.output.jpeg_quality)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Number of images cropped concurrently within a batch.
    /// When absent, defaults to the number of CPU cores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

/// Resolve the worker count for a run.
///
/// - `None` → available parallelism of the host (at least 1)
/// - `Some(n)` → exactly `n`
pub fn effective_workers(config: &ProcessingConfig) -> usize {
    config.workers.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}

/// Output encoding settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub jpeg_quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: Quality::default().value(),
        }
    }
}

/// Values given on the command line, applied as the last layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub threshold: Option<u8>,
    pub workers: Option<usize>,
}

impl CliOverrides {
    /// The overrides as a sparse TOML table, ready for [`merge_toml`].
    pub fn to_toml(self) -> toml::Value {
        let mut root = toml::Table::new();
        if let Some(threshold) = self.threshold {
            root.insert("threshold".into(), toml::Value::Integer(threshold.into()));
        }
        if let Some(workers) = self.workers {
            let mut processing = toml::Table::new();
            processing.insert(
                "workers".into(),
                toml::Value::Integer(i64::try_from(workers).unwrap_or(i64::MAX)),
            );
            root.insert("processing".into(), toml::Value::Table(processing));
        }
        toml::Value::Table(root)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AutocropConfig::default())?)
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

/// Merge every overlay onto `base` in order, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<AutocropConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: AutocropConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration for a run.
///
/// Starts from stock defaults, applies `config_file` when given, then the
/// command-line overrides.
pub fn load_config(
    config_file: Option<&Path>,
    overrides: CliOverrides,
) -> Result<AutocropConfig, ConfigError> {
    let mut overlays = Vec::new();
    if let Some(path) = config_file {
        overlays.push(load_raw_config(path)?);
    }
    overlays.push(overrides.to_toml());
    resolve_config(stock_defaults_value()?, overlays)
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Printed by `--gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# autocrop configuration
# ======================
#
# All options are optional. Values shown are the defaults.
# Pass this file with --config; -t and -w on the command line win over it.

# Border cutoff on a 0-255 scale. A row or column whose mean intensity
# (averaged over all pixels and all three channels) is strictly greater
# than this value is content; everything else at the edges is cropped.
threshold = 60

[processing]
# Number of images cropped concurrently within one batch.
# Omit to use one worker per CPU core.
# workers = 4

[output]
# Encoding quality for .jpg/.jpeg output (1-100).
jpeg_quality = 95
"##
}
