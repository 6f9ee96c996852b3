//! Build-log export for spreadsheet triage.
//!
//! Flattens `build_logs.json` into a CSV whose header is the union of
//! keys across all records: `repo` and `ref` first, everything else in
//! sorted order. Missing values become empty cells; non-string values
//! are rendered as JSON.

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

const LEADING_COLUMNS: [&str; 2] = ["repo", "ref"];

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Converts a JSON array of objects into CSV rows. Returns the number of
/// rows written.
pub fn run(input: &Path, output: &Path) -> Result<usize> {
    let file = File::open(input).map_err(|source| ExportError::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let records: Vec<Map<String, Value>> =
        serde_json::from_reader(file).map_err(|source| ExportError::Json {
            path: input.to_path_buf(),
            source,
        })?;

    let mut columns: Vec<String> = LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    let rest: BTreeSet<&String> = records
        .iter()
        .flat_map(|record| record.keys())
        .filter(|key| !LEADING_COLUMNS.contains(&key.as_str()))
        .collect();
    columns.extend(rest.into_iter().cloned());

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(&columns)?;
    for record in &records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| record.get(column).map(render).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: output.to_path_buf(),
        source,
    })?;

    info!(rows = records.len(), output = %output.display(), "exported build logs");
    Ok(records.len())
}
