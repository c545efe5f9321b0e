//! # Output Writer
//!
//! Persists one composed session bundle as exactly two artifacts next to each
//! other under the destination directory:
//!
//! - `<basename>.snapshot`: bincode serialization of the
//!   `{session record, trial table}` pair, reconstructed with a single
//!   deserialization call.
//! - `<basename>.columnar`: the time-series table as Parquet with ZSTD
//!   compression (skipped when the source carries no time-series columns).
//!
//! ## Atomicity
//!
//! Both artifacts are staged through a temporary file in the destination
//! directory and moved into place by rename. A failed write never leaves a
//! half-written file at the destination path and never clobbers a prior valid
//! artifact.
//!
//! ## Footer Metadata
//!
//! The Parquet footer carries key-value metadata (format version, source
//! basename, struct name). No timestamps are embedded, so repeated
//! conversions of the same source are byte-identical.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use tempfile::NamedTempFile;

use crate::container::Cell;
use crate::schema::{
    self, ColumnTypeError, COLUMNAR_EXTENSION, FORMAT_VERSION, KEY_FORMAT_VERSION,
    KEY_SOURCE_BASENAME, KEY_STRUCT_NAME, SNAPSHOT_EXTENSION,
};
use crate::session::{SessionBundle, Snapshot};
use crate::table::Table;

/// Errors that can occur during artifact writing
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// The destination directory does not exist and cannot be created
    #[error("destination {path} is not writable: {source}")]
    DestinationUnwritable {
        /// The destination directory
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A column's cells are not representable by the columnar format
    #[error(transparent)]
    EncodingError(#[from] ColumnTypeError),

    /// I/O failure while staging or persisting an artifact
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow failure while assembling the record batch
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet failure while encoding the columnar artifact
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Snapshot serialization failure
    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),
}

/// Configuration for the columnar artifact encoder
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// ZSTD compression level (1-22)
    pub compression_level: i32,

    /// Target row group size (number of rows per group)
    pub row_group_size: usize,

    /// Whether to write per-chunk column statistics
    pub write_statistics: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            // ZSTD level 9: archival storage favors ratio over write speed
            compression_level: 9,
            row_group_size: 100_000,
            write_statistics: true,
        }
    }
}

impl WriterConfig {
    /// Create Parquet writer properties from this configuration.
    fn to_writer_properties(&self, metadata: &BTreeMap<String, String>) -> WriterProperties {
        let compression = Compression::ZSTD(
            ZstdLevel::try_new(self.compression_level).unwrap_or_else(|_| ZstdLevel::default()),
        );

        let statistics = if self.write_statistics {
            EnabledStatistics::Chunk
        } else {
            EnabledStatistics::None
        };

        let kv_metadata: Vec<KeyValue> = metadata
            .iter()
            .map(|(k, v)| KeyValue {
                key: k.clone(),
                value: Some(v.clone()),
            })
            .collect();

        WriterProperties::builder()
            .set_compression(compression)
            .set_statistics_enabled(statistics)
            .set_max_row_group_size(self.row_group_size)
            .set_key_value_metadata(Some(kv_metadata))
            .build()
    }
}

/// Statistics from a completed bundle write
#[derive(Debug, Clone)]
pub struct WriterStats {
    /// Path of the snapshot artifact
    pub snapshot_path: PathBuf,
    /// Path of the columnar artifact, if one was written
    pub columnar_path: Option<PathBuf>,
    /// Number of session record entries persisted
    pub session_keys: usize,
    /// Rows in the trial table, if present
    pub trial_rows: usize,
    /// Rows in the time-series table, if present
    pub time_series_rows: usize,
}

impl std::fmt::Display for WriterStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "wrote {} session keys, {} trial rows, {} time-series rows",
            self.session_keys, self.trial_rows, self.time_series_rows
        )
    }
}

/// Write the snapshot and columnar artifacts for one session bundle.
///
/// `dest` is created if absent; `basename` is the source filename with its
/// extension stripped.
pub fn write_bundle(
    bundle: &SessionBundle,
    dest: &Path,
    basename: &str,
    config: &WriterConfig,
) -> Result<WriterStats, WriterError> {
    fs::create_dir_all(dest).map_err(|source| WriterError::DestinationUnwritable {
        path: dest.to_path_buf(),
        source,
    })?;

    let snapshot_path = dest.join(format!("{basename}.{SNAPSHOT_EXTENSION}"));
    write_snapshot(bundle, dest, &snapshot_path)?;
    debug!("snapshot artifact: {}", snapshot_path.display());

    let columnar_path = match &bundle.time_series {
        Some(table) if !table.is_empty() => {
            let path = dest.join(format!("{basename}.{COLUMNAR_EXTENSION}"));
            write_columnar(table, dest, &path, basename, config)?;
            debug!("columnar artifact: {}", path.display());
            Some(path)
        }
        _ => {
            debug!("no time-series columns, skipping columnar artifact");
            None
        }
    };

    Ok(WriterStats {
        snapshot_path,
        columnar_path,
        session_keys: bundle.session.len(),
        trial_rows: bundle.trials.as_ref().map_or(0, Table::row_count),
        time_series_rows: bundle.time_series.as_ref().map_or(0, Table::row_count),
    })
}

/// Serialize the `{session, trials}` pair and move it into place.
fn write_snapshot(bundle: &SessionBundle, dest: &Path, path: &Path) -> Result<(), WriterError> {
    let snapshot = Snapshot {
        session: bundle.session.clone(),
        trials: bundle.trials.clone(),
    };
    let bytes = bincode::serialize(&snapshot)?;

    let mut staging = NamedTempFile::new_in(dest)?;
    staging.write_all(&bytes)?;
    staging.flush()?;
    staging.persist(path).map_err(|e| WriterError::Io(e.error))?;
    Ok(())
}

/// Encode the time-series table as Parquet and move it into place.
fn write_columnar(
    table: &Table,
    dest: &Path,
    path: &Path,
    basename: &str,
    config: &WriterConfig,
) -> Result<(), WriterError> {
    let arrow_schema = schema::table_schema(table)?;
    let rows = table.row_count();

    let arrays = table
        .columns
        .iter()
        .zip(arrow_schema.fields())
        .map(|(column, field)| build_array(&column.name, &column.cells, field.data_type(), rows))
        .collect::<Result<Vec<_>, _>>()?;

    let batch = RecordBatch::try_new(arrow_schema.clone(), arrays)?;

    let mut metadata = BTreeMap::new();
    metadata.insert(KEY_FORMAT_VERSION.to_string(), FORMAT_VERSION.to_string());
    metadata.insert(KEY_SOURCE_BASENAME.to_string(), basename.to_string());
    metadata.insert(KEY_STRUCT_NAME.to_string(), table.name.clone());
    let props = config.to_writer_properties(&metadata);

    let staging = NamedTempFile::new_in(dest)?;
    let mut writer = ArrowWriter::try_new(staging, arrow_schema, Some(props))?;
    writer.write(&batch)?;
    let staging = writer.into_inner()?;
    staging.persist(path).map_err(|e| WriterError::Io(e.error))?;
    Ok(())
}

/// Build one Arrow array, padding ragged columns with nulls up to `rows`.
fn build_array(
    name: &str,
    cells: &[Cell],
    dtype: &DataType,
    rows: usize,
) -> Result<ArrayRef, WriterError> {
    let pad = rows.saturating_sub(cells.len());

    let unexpected = |cell: &Cell| {
        WriterError::EncodingError(ColumnTypeError {
            column: name.to_string(),
            reason: format!("cell {:?} does not match inferred type {}", cell, dtype),
        })
    };

    let array: ArrayRef = match dtype {
        DataType::Int64 => {
            let mut builder = Int64Builder::with_capacity(rows);
            for cell in cells {
                match cell {
                    Cell::Int(v) => builder.append_value(*v),
                    Cell::Null => builder.append_null(),
                    other => return Err(unexpected(other)),
                }
            }
            builder.append_nulls(pad);
            Arc::new(builder.finish())
        }
        DataType::Float64 => {
            let mut builder = Float64Builder::with_capacity(rows);
            for cell in cells {
                match cell {
                    Cell::Float(v) => builder.append_value(*v),
                    Cell::Int(v) => builder.append_value(*v as f64),
                    Cell::Null => builder.append_null(),
                    other => return Err(unexpected(other)),
                }
            }
            builder.append_nulls(pad);
            Arc::new(builder.finish())
        }
        DataType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(rows);
            for cell in cells {
                match cell {
                    Cell::Bool(v) => builder.append_value(*v),
                    Cell::Null => builder.append_null(),
                    other => return Err(unexpected(other)),
                }
            }
            for _ in 0..pad {
                builder.append_null();
            }
            Arc::new(builder.finish())
        }
        DataType::Utf8 => {
            let mut builder = StringBuilder::new();
            for cell in cells {
                match cell {
                    Cell::Str(v) => builder.append_value(v),
                    Cell::Null => builder.append_null(),
                    other => return Err(unexpected(other)),
                }
            }
            for _ in 0..pad {
                builder.append_null();
            }
            Arc::new(builder.finish())
        }
        other => {
            return Err(WriterError::EncodingError(ColumnTypeError {
                column: name.to_string(),
                reason: format!("unsupported inferred type {}", other),
            }))
        }
    };

    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionRecord, SessionValue};
    use crate::table::Column;
    use tempfile::tempdir;

    fn bundle_with_time_series(columns: Vec<(&str, Vec<Cell>)>) -> SessionBundle {
        let mut session = SessionRecord::default();
        session.insert("subject_id", SessionValue::Scalar(Cell::Str("S1".into())));
        SessionBundle {
            session,
            trials: None,
            time_series: Some(Table {
                name: "TIME_SERIES_DATA".to_string(),
                columns: columns
                    .into_iter()
                    .map(|(n, cells)| Column { name: n.to_string(), cells })
                    .collect(),
            }),
        }
    }

    #[test]
    fn test_write_bundle_creates_both_artifacts() {
        let dir = tempdir().unwrap();
        let bundle = bundle_with_time_series(vec![
            ("t", vec![Cell::Int(0), Cell::Int(1)]),
            ("signal", vec![Cell::Float(0.1), Cell::Float(0.2)]),
        ]);

        let stats =
            write_bundle(&bundle, dir.path(), "session_001", &WriterConfig::default()).unwrap();

        assert!(stats.snapshot_path.exists());
        assert!(stats.columnar_path.as_ref().unwrap().exists());
        assert_eq!(stats.session_keys, 1);
        assert_eq!(stats.time_series_rows, 2);
    }

    #[test]
    fn test_missing_time_series_skips_columnar_artifact() {
        let dir = tempdir().unwrap();
        let mut bundle = bundle_with_time_series(vec![]);
        bundle.time_series = None;

        let stats =
            write_bundle(&bundle, dir.path(), "session_002", &WriterConfig::default()).unwrap();
        assert!(stats.snapshot_path.exists());
        assert!(stats.columnar_path.is_none());
    }

    #[test]
    fn test_nested_column_reports_name() {
        let dir = tempdir().unwrap();
        let bundle =
            bundle_with_time_series(vec![("rig", vec![Cell::Nested(Default::default())])]);

        let err =
            write_bundle(&bundle, dir.path(), "session_003", &WriterConfig::default()).unwrap_err();
        match err {
            WriterError::EncodingError(e) => assert_eq!(e.column, "rig"),
            other => panic!("expected encoding error, got {:?}", other),
        }
    }

    #[test]
    fn test_encoding_failure_leaves_no_columnar_artifact() {
        let dir = tempdir().unwrap();
        let bundle =
            bundle_with_time_series(vec![("rig", vec![Cell::Nested(Default::default())])]);

        let _ = write_bundle(&bundle, dir.path(), "session_004", &WriterConfig::default());
        assert!(!dir.path().join("session_004.columnar").exists());
        // Staging files must not linger either.
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(true, |ext| ext != SNAPSHOT_EXTENSION))
            .collect();
        assert!(leftovers.is_empty(), "staging leftovers: {:?}", leftovers);
    }

    #[test]
    fn test_unwritable_destination_reports_path_and_writes_nothing() {
        let dir = tempdir().unwrap();
        // A regular file where the destination directory should go.
        let blocked = dir.path().join("occupied");
        fs::write(&blocked, b"not a directory").unwrap();

        let bundle = bundle_with_time_series(vec![("t", vec![Cell::Int(0)])]);
        let err =
            write_bundle(&bundle, &blocked, "session_006", &WriterConfig::default()).unwrap_err();

        match err {
            WriterError::DestinationUnwritable { path, .. } => assert_eq!(path, blocked),
            other => panic!("expected destination error, got {:?}", other),
        }
        assert!(!blocked.join("session_006.snapshot").exists());
        assert_eq!(fs::read(&blocked).unwrap(), b"not a directory");
    }

    #[test]
    fn test_ragged_columns_padded_with_nulls() {
        let dir = tempdir().unwrap();
        let bundle = bundle_with_time_series(vec![
            ("t", vec![Cell::Int(0), Cell::Int(1), Cell::Int(2)]),
            ("marker", vec![Cell::Str("start".into())]),
        ]);

        let stats =
            write_bundle(&bundle, dir.path(), "session_005", &WriterConfig::default()).unwrap();
        assert_eq!(stats.time_series_rows, 3);

        // Short columns come back padded with nulls to the common row count.
        let read = crate::reader::read_columnar(stats.columnar_path.as_ref().unwrap()).unwrap();
        assert_eq!(
            read.column("t").unwrap().cells,
            vec![Cell::Int(0), Cell::Int(1), Cell::Int(2)]
        );
        assert_eq!(
            read.column("marker").unwrap().cells,
            vec![Cell::Str("start".into()), Cell::Null, Cell::Null]
        );
    }
}
