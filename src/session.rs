//! # Session Composer
//!
//! Classifies the built tables by the fixed naming vocabulary and merges
//! scalar session metadata with lookup tables into one session record.
//!
//! Classification is an explicit tagged step ([`TableRole`]) rather than
//! string dispatch scattered through the pipeline; the naming convention is
//! the sole classifier, checked first match wins:
//!
//! 1. exactly `SESSION_DATA` - scalar metadata base (required)
//! 2. suffix `_TABLE` - lookup table merged into the session record
//! 3. exactly `TRIAL_DATA` - held aside for the snapshot
//! 4. exactly `TIME_SERIES_DATA` - held aside for the columnar artifact
//! 5. anything else - unclassified, dropped and logged at warn
//!
//! The drop in rule 5 is documented policy, preserved from the original tool.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::container::Cell;
use crate::schema::{LOOKUP_TABLE_SUFFIX, SESSION_DATA, TIME_SERIES_DATA, TRIAL_DATA};
use crate::table::Table;

/// Errors produced by the composer
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    /// The required `SESSION_DATA` struct is absent
    #[error("required struct {0} is missing")]
    MissingRequiredStruct(&'static str),
}

/// Role a table plays in the output, decided purely by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    /// Scalar session metadata base (`SESSION_DATA`)
    SessionMeta,
    /// Lookup table merged into the session record (`*_TABLE`)
    LookupTable,
    /// Per-trial table (`TRIAL_DATA`)
    TrialData,
    /// Bulk time-series table (`TIME_SERIES_DATA`)
    TimeSeriesData,
    /// Outside the fixed vocabulary; dropped
    Unclassified,
}

/// Classify a struct name against the fixed vocabulary.
pub fn classify(name: &str) -> TableRole {
    if name == SESSION_DATA {
        TableRole::SessionMeta
    } else if name.ends_with(LOOKUP_TABLE_SUFFIX) {
        TableRole::LookupTable
    } else if name == TRIAL_DATA {
        TableRole::TrialData
    } else if name == TIME_SERIES_DATA {
        TableRole::TimeSeriesData
    } else {
        TableRole::Unclassified
    }
}

/// One value in the session record: a metadata scalar or a merged lookup
/// table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionValue {
    /// Scalar metadata value from `SESSION_DATA`'s single row
    Scalar(Cell),
    /// Lookup table merged under its own struct name
    Table(Table),
}

/// Per-session metadata: `SESSION_DATA`'s single row extended with every
/// lookup table present in the container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    entries: BTreeMap<String, SessionValue>,
}

impl SessionRecord {
    /// Insert a value, overwriting any existing entry (last-write-wins).
    pub fn insert(&mut self, key: impl Into<String>, value: SessionValue) {
        self.entries.insert(key.into(), value);
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&SessionValue> {
        self.entries.get(key)
    }

    /// All keys in the record.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Composer output: the session record plus the tables that bypass it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionBundle {
    /// Merged session metadata
    pub session: SessionRecord,
    /// Per-trial table, if present
    pub trials: Option<Table>,
    /// Bulk time-series table, if present
    pub time_series: Option<Table>,
}

/// The pair persisted to the structured snapshot artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Merged session metadata
    pub session: SessionRecord,
    /// Per-trial table, if present in the source
    pub trials: Option<Table>,
}

/// Compose the full set of built tables into one session bundle.
///
/// Scalars from `SESSION_DATA`'s first row form the base; lookup tables are
/// merged afterwards, so a name collision resolves in the table's favor
/// (last-write-wins, never an error). All structs other than `SESSION_DATA`
/// are optional.
pub fn compose(tables: Vec<Table>) -> Result<SessionBundle, ComposeError> {
    let mut session_meta: Option<Table> = None;
    let mut lookups: Vec<Table> = Vec::new();
    let mut trials: Option<Table> = None;
    let mut time_series: Option<Table> = None;

    for table in tables {
        match classify(&table.name) {
            TableRole::SessionMeta => session_meta = Some(table),
            TableRole::LookupTable => lookups.push(table),
            TableRole::TrialData => trials = Some(table),
            TableRole::TimeSeriesData => time_series = Some(table),
            TableRole::Unclassified => {
                warn!("dropping unclassified struct: {}", table.name);
            }
        }
    }

    let session_meta =
        session_meta.ok_or(ComposeError::MissingRequiredStruct(SESSION_DATA))?;

    let mut session = SessionRecord::default();
    for (key, cell) in session_meta.first_row() {
        session.insert(key, SessionValue::Scalar(cell));
    }
    for lookup in lookups {
        session.insert(lookup.name.clone(), SessionValue::Table(lookup));
    }

    Ok(SessionBundle {
        session,
        trials,
        time_series,
    })
}
