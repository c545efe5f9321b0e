//! TOML configuration file support.
//!
//! Instead of passing tuning flags on every invocation, users can keep them
//! in a config file:
//!
//! ```toml
//! # sessionpack.toml
//! [conversion]
//! compression_level = 15
//! row_group_size = 200000
//! ```
//!
//! Explicit CLI flags always win over config file values.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use sessionpack::writer::WriterConfig;

/// Root configuration structure for sessionpack.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Conversion-specific settings.
    #[serde(default)]
    pub conversion: ConversionConfig,
}

/// Configuration for the convert and batch commands.
#[derive(Debug, Default, Deserialize)]
pub struct ConversionConfig {
    /// ZSTD compression level (1-22).
    pub compression_level: Option<i32>,

    /// Number of rows per Parquet row group.
    pub row_group_size: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

/// Resolve the effective writer configuration: flag > config file > default.
pub fn resolve_writer_config(
    config_path: Option<&Path>,
    compression_level: Option<i32>,
    row_group_size: Option<usize>,
) -> Result<WriterConfig> {
    let file = match config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let mut writer = WriterConfig::default();
    if let Some(level) = compression_level.or(file.conversion.compression_level) {
        writer.compression_level = level;
    }
    if let Some(size) = row_group_size.or(file.conversion.row_group_size) {
        writer.row_group_size = size;
    }
    Ok(writer)
}
