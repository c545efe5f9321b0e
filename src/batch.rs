//! # Batch Dispatcher
//!
//! Runs the single-file pipeline once per matching file in a directory. This
//! is a plain in-process loop: per-file conversions share no state, so a
//! failing file is logged and skipped while its siblings proceed. Ordering
//! between files carries no semantic guarantee; enumeration is sorted only so
//! logs are deterministic.
//!
//! Enumeration is non-recursive and matches the loader's declared source
//! extension.

use std::path::{Path, PathBuf};

use log::{error, info};

use crate::container::ContainerLoader;
use crate::convert::{convert_file, ConvertError, ConvertOptions, ConvertStats};

/// Errors from batch enumeration itself (per-file failures are collected in
/// the summary, not raised)
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The given path is not a directory
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    /// Enumerating the directory failed
    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        /// The directory that could not be enumerated
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },
}

/// Outcome of one batch run
#[derive(Debug)]
pub struct BatchSummary {
    /// Stats for every file converted successfully
    pub converted: Vec<ConvertStats>,
    /// Files that failed, with the error that stopped each one
    pub failed: Vec<(PathBuf, ConvertError)>,
}

impl BatchSummary {
    /// Whether every enumerated file converted successfully.
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} converted, {} failed",
            self.converted.len(),
            self.failed.len()
        )
    }
}

/// Convert every matching file in `dir`, isolating per-file failures.
pub fn convert_dir(
    loader: &dyn ContainerLoader,
    dir: &Path,
    options: &ConvertOptions,
) -> Result<BatchSummary, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::NotADirectory(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| BatchError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut sources: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map_or(false, |ext| ext == loader.source_extension())
        })
        .collect();
    sources.sort();

    info!(
        "batch: {} {} file(s) in {}",
        sources.len(),
        loader.source_extension(),
        dir.display()
    );

    let mut summary = BatchSummary {
        converted: Vec::new(),
        failed: Vec::new(),
    };

    for source in sources {
        match convert_file(loader, &source, options) {
            Ok(stats) => summary.converted.push(stats),
            Err(err) => {
                error!("{}: {}", source.display(), err);
                summary.failed.push((source, err));
            }
        }
    }

    Ok(summary)
}
