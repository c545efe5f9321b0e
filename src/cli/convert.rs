use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use sessionpack::container::JsonLoader;
use sessionpack::convert::{convert_file, ConvertOptions};

use super::config::resolve_writer_config;

/// Convert one container file into its artifacts
pub fn run(
    input: PathBuf,
    dest: Option<PathBuf>,
    config: Option<PathBuf>,
    compression_level: Option<i32>,
    row_group_size: Option<usize>,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let writer = resolve_writer_config(config.as_deref(), compression_level, row_group_size)?;
    info!("Input:  {}", input.display());
    info!("Compression level: {}", writer.compression_level);

    let options = ConvertOptions { dest, writer };
    let stats = convert_file(&JsonLoader, &input, &options)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    println!("{}", stats);
    println!("  snapshot: {}", stats.writer.snapshot_path.display());
    match &stats.writer.columnar_path {
        Some(path) => println!("  columnar: {}", path.display()),
        None => println!("  columnar: (no time-series data)"),
    }

    Ok(())
}
