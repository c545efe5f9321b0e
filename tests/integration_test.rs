//! Integration tests for sessionpack
//!
//! These tests drive the full pipeline from a source container file to the
//! written artifacts and back.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::tempdir;

use sessionpack::container::{Cell, JsonLoader};
use sessionpack::convert::{convert_file, ConvertOptions};
use sessionpack::reader::{read_columnar, read_snapshot};
use sessionpack::session::SessionValue;

fn write_source(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path
}

/// The reference container: session scalars, one lookup table, trials, and a
/// short time series.
fn reference_container() -> serde_json::Value {
    json!({
        "__header__": "MATLAB 5.0 MAT-file",
        "__version__": "1.0",
        "__globals__": [],
        "SESSION_DATA": [[{
            "field_names": ["subject_id", "date"],
            "field_values": [["S1"], ["2024-01-01"]],
        }]],
        "CALIBRATION_TABLE": [[{
            "field_names": ["gain", "offset"],
            "field_values": [[1.0, 1.0], [0.0, 0.0]],
        }]],
        "TRIAL_DATA": [[{
            "field_names": ["trial_id", "outcome"],
            "field_values": [[1, 2], ["hit", "miss"]],
        }]],
        "TIME_SERIES_DATA": [[{
            "field_names": ["t", "signal"],
            "field_values": [[0, 1, 2], [0.1, 0.2, 0.3]],
        }]],
    })
}

#[test]
fn test_end_to_end_scenario() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "session_001.json", reference_container());

    let stats = convert_file(&JsonLoader, &source, &ConvertOptions::default()).unwrap();
    assert_eq!(stats.tables_built, 4);

    // Snapshot: session scalars + merged calibration table + trial table.
    let snapshot = read_snapshot(&stats.writer.snapshot_path).unwrap();

    assert_eq!(
        snapshot.session.get("subject_id"),
        Some(&SessionValue::Scalar(Cell::Str("S1".into())))
    );
    assert_eq!(
        snapshot.session.get("date"),
        Some(&SessionValue::Scalar(Cell::Str("2024-01-01".into())))
    );
    match snapshot.session.get("CALIBRATION_TABLE") {
        Some(SessionValue::Table(calibration)) => {
            assert_eq!(
                calibration.column("gain").unwrap().cells,
                vec![Cell::Float(1.0), Cell::Float(1.0)]
            );
            assert_eq!(
                calibration.column("offset").unwrap().cells,
                vec![Cell::Float(0.0), Cell::Float(0.0)]
            );
        }
        other => panic!("expected merged calibration table, got {:?}", other),
    }
    assert_eq!(snapshot.session.len(), 3);

    let trials = snapshot.trials.expect("trial table present");
    assert_eq!(
        trials.column("trial_id").unwrap().cells,
        vec![Cell::Int(1), Cell::Int(2)]
    );
    assert_eq!(
        trials.column("outcome").unwrap().cells,
        vec![Cell::Str("hit".into()), Cell::Str("miss".into())]
    );

    // Columnar: the time series alone.
    let time_series = read_columnar(stats.writer.columnar_path.as_ref().unwrap()).unwrap();
    assert_eq!(time_series.name, "TIME_SERIES_DATA");
    assert_eq!(
        time_series.column("t").unwrap().cells,
        vec![Cell::Int(0), Cell::Int(1), Cell::Int(2)]
    );
    assert_eq!(
        time_series.column("signal").unwrap().cells,
        vec![Cell::Float(0.1), Cell::Float(0.2), Cell::Float(0.3)]
    );
}

#[test]
fn test_idempotent_reruns_are_byte_identical() {
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "session_001.json", reference_container());

    let stats = convert_file(&JsonLoader, &source, &ConvertOptions::default()).unwrap();
    let snapshot_first = fs::read(&stats.writer.snapshot_path).unwrap();
    let columnar_first = fs::read(stats.writer.columnar_path.as_ref().unwrap()).unwrap();

    let stats = convert_file(&JsonLoader, &source, &ConvertOptions::default()).unwrap();
    let snapshot_second = fs::read(&stats.writer.snapshot_path).unwrap();
    let columnar_second = fs::read(stats.writer.columnar_path.as_ref().unwrap()).unwrap();

    assert_eq!(snapshot_first, snapshot_second);
    assert_eq!(columnar_first, columnar_second);
}

#[test]
fn test_missing_session_data_writes_no_artifacts() {
    let dir = tempdir().unwrap();
    let source = write_source(
        dir.path(),
        "headless.json",
        json!({
            "TIME_SERIES_DATA": [[{
                "field_names": ["t"],
                "field_values": [[0, 1]],
            }]],
        }),
    );

    convert_file(&JsonLoader, &source, &ConvertOptions::default()).unwrap_err();

    let dest = dir.path().join("headless");
    assert!(!dest.join("headless.snapshot").exists());
    assert!(!dest.join("headless.columnar").exists());
}

#[test]
fn test_unclassified_struct_is_dropped() {
    let dir = tempdir().unwrap();
    let mut container = reference_container();
    container["SCRATCH_NOTES"] = json!([[{
        "field_names": ["note"],
        "field_values": [["ignore me"]],
    }]]);
    let source = write_source(dir.path(), "session_002.json", container);

    let stats = convert_file(&JsonLoader, &source, &ConvertOptions::default()).unwrap();

    let snapshot = read_snapshot(&stats.writer.snapshot_path).unwrap();
    assert!(snapshot.session.get("SCRATCH_NOTES").is_none());
    // Only the snapshot and columnar artifacts exist in the destination.
    let dest = stats.writer.snapshot_path.parent().unwrap().to_path_buf();
    let mut entries: Vec<_> = fs::read_dir(dest)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["session_002.columnar", "session_002.snapshot"]);
}

#[test]
fn test_columnar_artifact_is_plain_parquet() {
    // Downstream tools read the columnar artifact without sessionpack; the
    // file must carry the standard Parquet magic.
    let dir = tempdir().unwrap();
    let source = write_source(dir.path(), "session_003.json", reference_container());

    let stats = convert_file(&JsonLoader, &source, &ConvertOptions::default()).unwrap();
    let bytes = fs::read(stats.writer.columnar_path.as_ref().unwrap()).unwrap();
    assert_eq!(&bytes[..4], &b"PAR1"[..]);
    assert_eq!(&bytes[bytes.len() - 4..], &b"PAR1"[..]);
}
