use anyhow::{Context, Result};
use std::path::PathBuf;

use sessionpack::batch::convert_dir;
use sessionpack::container::JsonLoader;
use sessionpack::convert::ConvertOptions;

use super::config::resolve_writer_config;

/// Convert every matching container file in a directory
pub fn run(
    dir: PathBuf,
    config: Option<PathBuf>,
    compression_level: Option<i32>,
    row_group_size: Option<usize>,
) -> Result<()> {
    let writer = resolve_writer_config(config.as_deref(), compression_level, row_group_size)?;
    let options = ConvertOptions { dest: None, writer };

    let summary = convert_dir(&JsonLoader, &dir, &options)
        .with_context(|| format!("Failed to enumerate {}", dir.display()))?;

    println!("{}", summary);
    for (path, err) in &summary.failed {
        println!("  failed {}: {}", path.display(), err);
    }

    if !summary.all_succeeded() {
        anyhow::bail!("{} file(s) failed to convert", summary.failed.len());
    }
    Ok(())
}
