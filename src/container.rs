//! # Raw Container Model
//!
//! The source format is a mapping from struct name to a nested record wrapped
//! in a singleton array-of-arrays. Each record carries parallel
//! `field_names`/`field_values` sequences; the pairing is an explicit contract
//! validated by the flattener rather than a positional assumption.
//!
//! Three reserved keys (`__header__`, `__version__`, `__globals__`) carry
//! loader metadata, not domain data. They are stripped here, on load, so the
//! rest of the pipeline only ever sees domain structs.
//!
//! Loading the container from disk is a collaborator seam: `sessionpack` is
//! not a general reader for the acquisition tool's native format. The shipped
//! [`JsonLoader`] reads the tool's JSON export; a vendor-format loader plugs
//! into the same [`ContainerLoader`] trait.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::RESERVED_KEYS;

/// Errors that can occur while loading a raw container
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Reading the source file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The top level of the container is not an object
    #[error("container root is not an object")]
    NotAnObject,

    /// A struct entry does not have the expected instance-grid shape
    #[error("struct {name} has an invalid shape: {reason}")]
    InvalidStruct {
        /// Name of the offending struct
        name: String,
        /// What was wrong with its shape
        reason: String,
    },
}

/// A single scalar or passthrough value held by a table cell.
///
/// Flattening reduces every field to a 1-D sequence of these. Numeric and
/// string cells map onto columnar types; `Nested` and `List` cells survive
/// into the snapshot artifact but are rejected by the columnar writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// Missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating-point value
    Float(f64),
    /// String value
    Str(String),
    /// Nested object leaf, passed through unflattened
    Nested(BTreeMap<String, Cell>),
    /// Sequence inside a nested passthrough value
    List(Vec<Cell>),
}

impl Cell {
    /// Convert a raw JSON value into a cell.
    ///
    /// Whole numbers become `Int`, other numbers `Float`. Objects and any
    /// arrays nested inside them are carried through verbatim; top-level
    /// arrays never reach this function because flattening recurses into them
    /// first.
    pub fn from_json(value: &Value) -> Cell {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Cell::Int(i)
                } else {
                    Cell::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Cell::Str(s.clone()),
            Value::Object(map) => Cell::Nested(
                map.iter()
                    .map(|(k, v)| (k.clone(), Cell::from_json(v)))
                    .collect(),
            ),
            Value::Array(items) => Cell::List(items.iter().map(Cell::from_json).collect()),
        }
    }
}

/// One record instance: parallel field-name and field-value sequences.
///
/// The two sequences must be equal in length and aligned in order; the
/// flattener validates this and fails with `MalformedRecord` otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordInstance {
    /// Declared field names, in source order
    pub field_names: Vec<String>,
    /// Field values, parallel to `field_names`
    pub field_values: Vec<Value>,
}

/// One named struct as stored in the source format: an instance grid that is
/// a singleton for every struct this pipeline accepts.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct StructArray(Vec<Vec<RecordInstance>>);

impl StructArray {
    /// The single record instance, if the grid is the expected `[[record]]`
    /// singleton.
    pub fn singleton(&self) -> Option<&RecordInstance> {
        match self.0.as_slice() {
            [inner] => match inner.as_slice() {
                [record] => Some(record),
                _ => None,
            },
            _ => None,
        }
    }
}

/// The full container after reserved-key stripping: every remaining key
/// denotes exactly one domain struct.
#[derive(Debug, Clone, Default)]
pub struct RawContainer {
    structs: BTreeMap<String, StructArray>,
}

impl RawContainer {
    /// Build a container from a parsed JSON document, stripping the reserved
    /// metadata keys.
    pub fn from_value(value: Value) -> Result<Self, LoadError> {
        let root = match value {
            Value::Object(map) => map,
            _ => return Err(LoadError::NotAnObject),
        };

        let mut structs = BTreeMap::new();
        for (name, entry) in root {
            if RESERVED_KEYS.contains(&name.as_str()) {
                continue;
            }
            let array: StructArray =
                serde_json::from_value(entry).map_err(|e| LoadError::InvalidStruct {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            structs.insert(name, array);
        }
        Ok(Self { structs })
    }

    /// Look up a struct by name.
    pub fn get(&self, name: &str) -> Option<&StructArray> {
        self.structs.get(name)
    }

    /// Names of all domain structs in the container.
    pub fn struct_names(&self) -> impl Iterator<Item = &str> {
        self.structs.keys().map(String::as_str)
    }

    /// Number of domain structs.
    pub fn len(&self) -> usize {
        self.structs.len()
    }

    /// Whether the container holds no domain structs.
    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }
}

/// Loader seam between the core pipeline and the source file format.
///
/// The core takes exactly one file per invocation; the loader decides how the
/// bytes on disk become a [`RawContainer`] and which file extension batch
/// dispatch should enumerate.
pub trait ContainerLoader {
    /// File extension (without dot) of source files this loader reads.
    fn source_extension(&self) -> &str;

    /// Load and strip one container file.
    fn load(&self, path: &Path) -> Result<RawContainer, LoadError>;
}

/// Loader for the acquisition tool's JSON container export.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl ContainerLoader for JsonLoader {
    fn source_extension(&self) -> &str {
        "json"
    }

    fn load(&self, path: &Path) -> Result<RawContainer, LoadError> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        RawContainer::from_value(value)
    }
}
