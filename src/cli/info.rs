use anyhow::{Context, Result};
use std::path::PathBuf;

use sessionpack::reader::{read_columnar, read_snapshot};
use sessionpack::schema::{COLUMNAR_EXTENSION, SNAPSHOT_EXTENSION};
use sessionpack::session::SessionValue;

/// Display information about a snapshot or columnar artifact
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let extension = file
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match extension {
        ext if ext == SNAPSHOT_EXTENSION => print_snapshot(&file),
        ext if ext == COLUMNAR_EXTENSION => print_columnar(&file),
        other => anyhow::bail!(
            "Unrecognized artifact extension '.{}' (expected .{} or .{})",
            other,
            SNAPSHOT_EXTENSION,
            COLUMNAR_EXTENSION
        ),
    }
}

fn print_snapshot(file: &PathBuf) -> Result<()> {
    let snapshot = read_snapshot(file).context("Failed to read snapshot artifact")?;

    println!("Snapshot Artifact");
    println!("=================");
    println!("File: {}", file.display());
    println!();

    println!("Session record ({} keys):", snapshot.session.len());
    for key in snapshot.session.keys() {
        match snapshot.session.get(key) {
            Some(SessionValue::Scalar(cell)) => println!("  {}: {:?}", key, cell),
            Some(SessionValue::Table(table)) => println!(
                "  {}: table ({} columns, {} rows)",
                key,
                table.columns.len(),
                table.row_count()
            ),
            None => {}
        }
    }
    println!();

    match &snapshot.trials {
        Some(trials) => {
            println!("Trial table: {} rows", trials.row_count());
            for column in &trials.columns {
                println!("  {} ({} cells)", column.name, column.cells.len());
            }
        }
        None => println!("Trial table: absent"),
    }

    Ok(())
}

fn print_columnar(file: &PathBuf) -> Result<()> {
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use std::fs::File;

    // Footer summary straight from Parquet, then the decoded table shape.
    let handle = File::open(file).context("Failed to open file")?;
    let reader = SerializedFileReader::new(handle).context("Failed to read Parquet file")?;
    let metadata = reader.metadata();

    println!("Columnar Artifact");
    println!("=================");
    println!("File: {}", file.display());
    println!();
    println!("Row groups: {}", metadata.num_row_groups());
    println!("Total rows: {}", metadata.file_metadata().num_rows());
    println!();

    if let Some(kv_metadata) = metadata.file_metadata().key_value_metadata() {
        println!("Metadata Keys:");
        for kv in kv_metadata {
            println!(
                "  {}: {}",
                kv.key,
                kv.value.as_deref().unwrap_or("<null>")
            );
        }
        println!();
    }

    let table = read_columnar(file).context("Failed to decode columnar artifact")?;
    println!("Table: {}", table.name);
    for (i, column) in table.columns.iter().enumerate() {
        println!("  {:3}. {} ({} cells)", i + 1, column.name, column.cells.len());
    }

    Ok(())
}
