//! # Table Builder
//!
//! Converts flattener output into a named, column-oriented table. Column order
//! follows the struct's declared field order. The source format does not
//! guarantee matching lengths across fields, so ragged column lengths are
//! accepted here; consumers must tolerate column-local lengths.

use serde::{Deserialize, Serialize};

use crate::container::Cell;
use crate::flatten::FlatStruct;

/// One named column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Field name this column was built from
    pub name: String,
    /// Flattened 1-D cell sequence
    pub cells: Vec<Cell>,
}

/// A named, column-oriented table built from one struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Source struct name
    pub name: String,
    /// Columns in declared field order
    pub columns: Vec<Column>,
}

impl Table {
    /// Build a table from flattener output. A struct with zero fields yields
    /// a valid empty table.
    pub fn from_flat(name: impl Into<String>, flat: FlatStruct) -> Table {
        Table {
            name: name.into(),
            columns: flat
                .fields
                .into_iter()
                .map(|(name, cells)| Column { name, cells })
                .collect(),
        }
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Row count: the longest column's length (columns may be ragged).
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(|c| c.cells.len()).max().unwrap_or(0)
    }

    /// Whether the table has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The first row as `(column, cell)` pairs; columns with no cells
    /// contribute a null.
    pub fn first_row(&self) -> impl Iterator<Item = (&str, Cell)> {
        self.columns.iter().map(|c| {
            (
                c.name.as_str(),
                c.cells.first().cloned().unwrap_or(Cell::Null),
            )
        })
    }
}
