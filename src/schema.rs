//! # Naming Vocabulary and Columnar Schema Inference
//!
//! The source container uses a fixed struct-name vocabulary; this module is
//! the single place those names live. It also infers the Arrow schema for a
//! table headed to the columnar artifact.
//!
//! ## Type Inference Rules
//!
//! | Column contents | Arrow type |
//! |-----------------|------------|
//! | integers only | Int64 |
//! | any float (mixed with integers allowed) | Float64 |
//! | booleans only | Boolean |
//! | strings only | Utf8 |
//! | nulls only | Float64 |
//! | nested/list cells, or string/numeric mixes | rejected by name |
//!
//! All fields are nullable: nulls appear both in the source data and as
//! padding when the source's ragged column lengths are normalized to a common
//! row count.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema};

use crate::container::Cell;
use crate::table::Table;

/// Reserved loader-metadata keys stripped from the container on load.
pub const RESERVED_KEYS: [&str; 3] = ["__header__", "__version__", "__globals__"];

/// Struct whose single row becomes the scalar session metadata (required).
pub const SESSION_DATA: &str = "SESSION_DATA";

/// Struct holding the per-trial table.
pub const TRIAL_DATA: &str = "TRIAL_DATA";

/// Struct holding the bulk time-series table.
pub const TIME_SERIES_DATA: &str = "TIME_SERIES_DATA";

/// Suffix marking lookup tables merged into the session record.
pub const LOOKUP_TABLE_SUFFIX: &str = "_TABLE";

/// File extension of the structured snapshot artifact.
pub const SNAPSHOT_EXTENSION: &str = "snapshot";

/// File extension of the columnar artifact.
pub const COLUMNAR_EXTENSION: &str = "columnar";

/// Artifact format version - follows semantic versioning
pub const FORMAT_VERSION: &str = "1.0.0";

/// Parquet footer metadata key for the format version.
pub const KEY_FORMAT_VERSION: &str = "sessionpack:format_version";

/// Parquet footer metadata key for the source file basename.
pub const KEY_SOURCE_BASENAME: &str = "sessionpack:source_basename";

/// Parquet footer metadata key for the originating struct name.
pub const KEY_STRUCT_NAME: &str = "sessionpack:struct_name";

/// A column whose cells cannot be represented by the columnar format.
///
/// The offending column is always reported by name, never silently dropped.
#[derive(Debug, thiserror::Error)]
#[error("column {column} is not representable in the columnar format: {reason}")]
pub struct ColumnTypeError {
    /// Name of the offending column
    pub column: String,
    /// Why its cells cannot be encoded
    pub reason: String,
}

/// Infer the Arrow data type for one column's cells.
pub fn infer_data_type(name: &str, cells: &[Cell]) -> Result<DataType, ColumnTypeError> {
    let mut has_int = false;
    let mut has_float = false;
    let mut has_bool = false;
    let mut has_str = false;

    for cell in cells {
        match cell {
            Cell::Null => {}
            Cell::Int(_) => has_int = true,
            Cell::Float(_) => has_float = true,
            Cell::Bool(_) => has_bool = true,
            Cell::Str(_) => has_str = true,
            Cell::Nested(_) | Cell::List(_) => {
                return Err(ColumnTypeError {
                    column: name.to_string(),
                    reason: "nested values cannot be stored columnar".to_string(),
                });
            }
        }
    }

    let numeric = has_int || has_float;
    if (has_str && (numeric || has_bool)) || (has_bool && numeric) {
        return Err(ColumnTypeError {
            column: name.to_string(),
            reason: "mixed value types".to_string(),
        });
    }

    if has_float {
        Ok(DataType::Float64)
    } else if has_int {
        Ok(DataType::Int64)
    } else if has_bool {
        Ok(DataType::Boolean)
    } else if has_str {
        Ok(DataType::Utf8)
    } else {
        // All-null (or empty) column: the type is arbitrary, pick Float64.
        Ok(DataType::Float64)
    }
}

/// Infer the full Arrow schema for a table.
pub fn table_schema(table: &Table) -> Result<Arc<Schema>, ColumnTypeError> {
    let fields = table
        .columns
        .iter()
        .map(|column| {
            infer_data_type(&column.name, &column.cells)
                .map(|dtype| Field::new(&column.name, dtype, true))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Arc::new(Schema::new(fields)))
}
