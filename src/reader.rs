//! # Artifact Read-Back
//!
//! Reloads the two artifacts the writer produces: the bincode snapshot in a
//! single deserialization call, and the Parquet columnar artifact back into a
//! [`Table`]. Analysis pipelines that prefer Parquet-native tooling can skip
//! this module entirely; it exists for round-trip verification and the `info`
//! command.

use std::fs::{self, File};
use std::path::Path;

use arrow::array::{Array, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::container::Cell;
use crate::schema::{KEY_STRUCT_NAME, TIME_SERIES_DATA};
use crate::session::Snapshot;
use crate::table::{Column, Table};

/// Errors that can occur while reading artifacts
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// Opening or reading the artifact failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parquet decoding failure
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Arrow decoding failure
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Snapshot deserialization failure
    #[error("snapshot decoding error: {0}")]
    Snapshot(#[from] bincode::Error),

    /// The columnar artifact holds a column type this reader does not map
    #[error("unsupported column type {dtype} in column {column}")]
    UnsupportedColumn {
        /// Name of the column
        column: String,
        /// Its Arrow data type
        dtype: DataType,
    },
}

/// Read a snapshot artifact back into the `{session, trials}` pair.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, ReaderError> {
    let bytes = fs::read(path)?;
    Ok(bincode::deserialize(&bytes)?)
}

/// Read a columnar artifact back into a [`Table`].
///
/// The table name is taken from the footer metadata written alongside the
/// data, falling back to `TIME_SERIES_DATA` for artifacts written by other
/// tools.
pub fn read_columnar(path: &Path) -> Result<Table, ReaderError> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let table_name = builder
        .metadata()
        .file_metadata()
        .key_value_metadata()
        .and_then(|kv| kv.iter().find(|kv| kv.key == KEY_STRUCT_NAME))
        .and_then(|kv| kv.value.clone())
        .unwrap_or_else(|| TIME_SERIES_DATA.to_string());

    let arrow_schema = builder.schema().clone();
    let mut columns: Vec<Column> = arrow_schema
        .fields()
        .iter()
        .map(|field| Column {
            name: field.name().clone(),
            cells: Vec::new(),
        })
        .collect();

    let reader = builder.build()?;
    for batch in reader {
        let batch = batch?;
        append_batch(&batch, &mut columns)?;
    }

    Ok(Table {
        name: table_name,
        columns,
    })
}

/// Append one record batch's values onto the accumulated columns.
fn append_batch(batch: &RecordBatch, columns: &mut [Column]) -> Result<(), ReaderError> {
    for (index, column) in columns.iter_mut().enumerate() {
        let array = batch.column(index);
        match array.data_type() {
            DataType::Int64 => {
                let values = downcast::<Int64Array>(array, &column.name)?;
                for i in 0..values.len() {
                    column.cells.push(if values.is_null(i) {
                        Cell::Null
                    } else {
                        Cell::Int(values.value(i))
                    });
                }
            }
            DataType::Float64 => {
                let values = downcast::<Float64Array>(array, &column.name)?;
                for i in 0..values.len() {
                    column.cells.push(if values.is_null(i) {
                        Cell::Null
                    } else {
                        Cell::Float(values.value(i))
                    });
                }
            }
            DataType::Boolean => {
                let values = downcast::<BooleanArray>(array, &column.name)?;
                for i in 0..values.len() {
                    column.cells.push(if values.is_null(i) {
                        Cell::Null
                    } else {
                        Cell::Bool(values.value(i))
                    });
                }
            }
            DataType::Utf8 => {
                let values = downcast::<StringArray>(array, &column.name)?;
                for i in 0..values.len() {
                    column.cells.push(if values.is_null(i) {
                        Cell::Null
                    } else {
                        Cell::Str(values.value(i).to_string())
                    });
                }
            }
            other => {
                return Err(ReaderError::UnsupportedColumn {
                    column: column.name.clone(),
                    dtype: other.clone(),
                })
            }
        }
    }
    Ok(())
}

fn downcast<'a, T: 'static>(
    array: &'a dyn Array,
    column: &str,
) -> Result<&'a T, ReaderError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| ReaderError::UnsupportedColumn {
            column: column.to_string(),
            dtype: array.data_type().clone(),
        })
}
