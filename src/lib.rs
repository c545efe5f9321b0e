//! # sessionpack - Acquisition Session Container Converter
//!
//! `sessionpack` converts the nested structured-array containers exported by a
//! scientific acquisition tool into flat tabular artifacts suitable for
//! downstream analysis and long-term storage.
//!
//! ## What It Does
//!
//! One source container holds a fixed vocabulary of named structs, each a
//! nested record of parallel field-name/field-value arrays. The pipeline
//! flattens each struct into a column-oriented table, classifies the tables by
//! naming convention, and persists two artifacts per session:
//!
//! - **Structured snapshot** (`<basename>.snapshot`): the session metadata
//!   record (scalars merged with `_TABLE`-suffixed lookup tables) paired with
//!   the per-trial table, serialized with bincode for single-call
//!   reconstruction.
//! - **Columnar artifact** (`<basename>.columnar`): the bulk time-series
//!   table as Apache Parquet with ZSTD compression, enabling column-selective
//!   and chunked reads.
//!
//! ## Classification Vocabulary
//!
//! | Struct name | Role | Destination |
//! |-------------|------|-------------|
//! | `SESSION_DATA` | Scalar session metadata (required) | snapshot |
//! | `*_TABLE` | Lookup table merged into the session record | snapshot |
//! | `TRIAL_DATA` | Per-trial table | snapshot |
//! | `TIME_SERIES_DATA` | Bulk time-series | columnar |
//! | anything else | Dropped (logged at warn) | - |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sessionpack::container::JsonLoader;
//! use sessionpack::convert::{convert_file, ConvertOptions};
//!
//! let loader = JsonLoader;
//! let stats = convert_file(&loader, "session_001.json".as_ref(), &ConvertOptions::default())?;
//! println!("{}", stats);
//! # Ok::<(), sessionpack::convert::ConvertError>(())
//! ```
//!
//! ## Reading Artifacts Back
//!
//! ```rust,no_run
//! use sessionpack::reader::{read_columnar, read_snapshot};
//!
//! let snapshot = read_snapshot("dest/session_001.snapshot".as_ref())?;
//! println!("session keys: {}", snapshot.session.len());
//!
//! let time_series = read_columnar("dest/session_001.columnar".as_ref())?;
//! println!("{} columns", time_series.columns.len());
//! # Ok::<(), sessionpack::reader::ReaderError>(())
//! ```
//!
//! The columnar artifact is a standard Parquet file and can equally be read
//! with any Parquet-compatible tool (pyarrow, R arrow, DuckDB).
//!
//! ## Architecture
//!
//! - [`container`]: raw container model, reserved-key stripping, loader seam
//! - [`flatten`]: one nested struct record to flat 1-D columns
//! - [`table`]: column-oriented table construction
//! - [`session`]: classification and session-record composition
//! - [`schema`]: naming vocabulary and Arrow schema inference
//! - [`writer`]: snapshot and Parquet artifact output
//! - [`reader`]: artifact read-back
//! - [`convert`]: single-file pipeline orchestration
//! - [`batch`]: per-directory dispatch with per-file failure isolation

#![warn(missing_docs)]

pub mod batch;
pub mod container;
pub mod convert;
pub mod flatten;
pub mod reader;
pub mod schema;
pub mod session;
pub mod table;
pub mod writer;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::batch::{convert_dir, BatchError, BatchSummary};
    pub use crate::container::{Cell, ContainerLoader, JsonLoader, LoadError, RawContainer};
    pub use crate::convert::{convert_file, ConvertError, ConvertOptions, ConvertStats};
    pub use crate::flatten::{flatten_struct, FlatStruct, FlattenError};
    pub use crate::reader::{read_columnar, read_snapshot, ReaderError};
    pub use crate::session::{
        classify, compose, ComposeError, SessionBundle, SessionRecord, SessionValue, Snapshot,
        TableRole,
    };
    pub use crate::table::{Column, Table};
    pub use crate::writer::{write_bundle, WriterConfig, WriterError, WriterStats};
}
