//! # Struct Flattener
//!
//! Converts one nested struct record into a flat mapping of field name to a
//! 1-D sequence of cells. Arrays are flattened depth-first regardless of their
//! original nesting; scalars become length-1 columns; object leaves pass
//! through as nested cells.
//!
//! The flattener is a pure function over the container: no side effects, no
//! aliasing back into the loader's buffers.

use serde_json::Value;

use crate::container::{Cell, RawContainer};

/// Errors produced by the flattener
#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    /// The requested struct name is absent from the container
    #[error("unknown struct: {0}")]
    UnknownStruct(String),

    /// The record violates the paired-sequence contract
    #[error("malformed record in struct {name}: {reason}")]
    MalformedRecord {
        /// Name of the offending struct
        name: String,
        /// What the record violated
        reason: String,
    },
}

/// Flattener output: field names paired with their 1-D columns, in declared
/// field order.
#[derive(Debug, Clone, Default)]
pub struct FlatStruct {
    /// `(field_name, cells)` pairs in source field order
    pub fields: Vec<(String, Vec<Cell>)>,
}

impl FlatStruct {
    /// Field names in declared order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

/// Flatten the named struct's single record instance.
///
/// The struct must exist in the container and must carry the source format's
/// singleton array-of-arrays wrapping; multi-instance records are malformed
/// at this boundary.
pub fn flatten_struct(container: &RawContainer, name: &str) -> Result<FlatStruct, FlattenError> {
    let array = container
        .get(name)
        .ok_or_else(|| FlattenError::UnknownStruct(name.to_string()))?;

    let record = array
        .singleton()
        .ok_or_else(|| FlattenError::MalformedRecord {
            name: name.to_string(),
            reason: "expected a singleton record instance".to_string(),
        })?;

    if record.field_names.len() != record.field_values.len() {
        return Err(FlattenError::MalformedRecord {
            name: name.to_string(),
            reason: format!(
                "field count mismatch: {} names vs {} values",
                record.field_names.len(),
                record.field_values.len()
            ),
        });
    }

    let fields = record
        .field_names
        .iter()
        .zip(record.field_values.iter())
        .map(|(field, value)| {
            let mut cells = Vec::new();
            flatten_value(value, &mut cells);
            (field.clone(), cells)
        })
        .collect();

    Ok(FlatStruct { fields })
}

/// Reduce a field value to a 1-D cell sequence, depth-first.
fn flatten_value(value: &Value, out: &mut Vec<Cell>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_value(item, out);
            }
        }
        other => out.push(Cell::from_json(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn container(structs: serde_json::Value) -> RawContainer {
        RawContainer::from_value(structs).unwrap()
    }

    fn one_struct(name: &str, names: &[&str], values: Vec<serde_json::Value>) -> RawContainer {
        container(json!({
            name: [[{ "field_names": names, "field_values": values }]],
        }))
    }

    #[test]
    fn test_unknown_struct() {
        let c = one_struct("SESSION_DATA", &[], vec![]);
        assert!(matches!(
            flatten_struct(&c, "NOPE"),
            Err(FlattenError::UnknownStruct(ref n)) if n == "NOPE"
        ));
    }

    #[test]
    fn test_field_count_mismatch() {
        let c = one_struct("SESSION_DATA", &["a", "b"], vec![json!(1)]);
        let err = flatten_struct(&c, "SESSION_DATA").unwrap_err();
        assert!(matches!(err, FlattenError::MalformedRecord { .. }));
        assert!(err.to_string().contains("2 names vs 1 values"));
    }

    #[test]
    fn test_non_singleton_is_malformed() {
        let c = container(json!({ "SESSION_DATA": [[]] }));
        assert!(matches!(
            flatten_struct(&c, "SESSION_DATA"),
            Err(FlattenError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_scalar_becomes_length_one_column() {
        let c = one_struct("SESSION_DATA", &["subject_id"], vec![json!("S1")]);
        let flat = flatten_struct(&c, "SESSION_DATA").unwrap();
        assert_eq!(flat.fields, vec![("subject_id".into(), vec![Cell::Str("S1".into())])]);
    }

    #[test]
    fn test_nested_arrays_flatten_to_one_dimension() {
        let c = one_struct("TIME_SERIES_DATA", &["signal"], vec![json!([[0.1, 0.2], [0.3]])]);
        let flat = flatten_struct(&c, "TIME_SERIES_DATA").unwrap();
        assert_eq!(
            flat.fields[0].1,
            vec![Cell::Float(0.1), Cell::Float(0.2), Cell::Float(0.3)]
        );
    }

    #[test]
    fn test_field_order_preserved() {
        let c = one_struct(
            "TRIAL_DATA",
            &["trial_id", "outcome"],
            vec![json!([1, 2]), json!(["hit", "miss"])],
        );
        let flat = flatten_struct(&c, "TRIAL_DATA").unwrap();
        let names: Vec<_> = flat.field_names().collect();
        assert_eq!(names, vec!["trial_id", "outcome"]);
    }

    #[test]
    fn test_zero_fields_is_valid() {
        let c = one_struct("EMPTY_DATA", &[], vec![]);
        let flat = flatten_struct(&c, "EMPTY_DATA").unwrap();
        assert!(flat.fields.is_empty());
    }

    #[test]
    fn test_object_leaf_passes_through() {
        let c = one_struct("SESSION_DATA", &["rig"], vec![json!([{ "id": 7 }])]);
        let flat = flatten_struct(&c, "SESSION_DATA").unwrap();
        assert!(matches!(flat.fields[0].1[0], Cell::Nested(_)));
    }
}
