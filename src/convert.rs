//! # Single-File Conversion Pipeline
//!
//! Orchestrates one conversion run: load the container, flatten every domain
//! struct, build tables, compose the session bundle, write both artifacts.
//! Each stage returns a fresh value; nothing aliases or mutates the loader's
//! output.
//!
//! All errors propagate to the caller. Conversion is deterministic, so there
//! are no retries; a failing file reports the offending struct or column by
//! name and leaves no partial artifact behind.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::container::{ContainerLoader, LoadError};
use crate::flatten::{flatten_struct, FlattenError};
use crate::session::{compose, ComposeError};
use crate::table::Table;
use crate::writer::{write_bundle, WriterConfig, WriterError, WriterStats};

/// Errors from any stage of the conversion pipeline
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Loading the source container failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Flattening a struct failed
    #[error(transparent)]
    Flatten(#[from] FlattenError),

    /// Composing the session bundle failed
    #[error(transparent)]
    Compose(#[from] ComposeError),

    /// Writing the artifacts failed
    #[error(transparent)]
    Write(#[from] WriterError),

    /// The source path has no usable file name
    #[error("source path has no file name: {0}")]
    InvalidSource(PathBuf),
}

/// Options for one conversion run
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Destination directory override. When unset, a subdirectory named after
    /// the source basename is created next to the source file.
    pub dest: Option<PathBuf>,

    /// Columnar encoder configuration
    pub writer: WriterConfig,
}

/// Statistics from one completed conversion
#[derive(Debug, Clone)]
pub struct ConvertStats {
    /// The converted source file
    pub source: PathBuf,
    /// Number of tables built from the container
    pub tables_built: usize,
    /// Writer-side statistics and artifact paths
    pub writer: WriterStats,
}

impl std::fmt::Display for ConvertStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} tables, {}",
            self.source.display(),
            self.tables_built,
            self.writer
        )
    }
}

/// Convert exactly one container file into its two artifacts.
pub fn convert_file(
    loader: &dyn ContainerLoader,
    source: &Path,
    options: &ConvertOptions,
) -> Result<ConvertStats, ConvertError> {
    let basename = source
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| ConvertError::InvalidSource(source.to_path_buf()))?;

    let dest = options.dest.clone().unwrap_or_else(|| {
        source
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&basename)
    });

    info!("converting {}", source.display());
    let container = loader.load(source)?;
    debug!("{} domain structs after stripping", container.len());

    let names: Vec<String> = container.struct_names().map(String::from).collect();
    let tables = names
        .iter()
        .map(|name| {
            let flat = flatten_struct(&container, name)?;
            debug!("flattened {} ({} fields)", name, flat.fields.len());
            Ok(Table::from_flat(name.clone(), flat))
        })
        .collect::<Result<Vec<_>, FlattenError>>()?;
    let tables_built = tables.len();

    let bundle = compose(tables)?;
    let writer = write_bundle(&bundle, &dest, &basename, &options.writer)?;
    info!("{}", writer);

    Ok(ConvertStats {
        source: source.to_path_buf(),
        tables_built,
        writer,
    })
}
