use crate::error::{CliError, CliResult};
use linscan_tabular::{Row, TableSchema};
use serde::Deserialize;
use std::path::Path;

/// Job input document for `rand-table`.
#[derive(Debug, Deserialize)]
pub struct JobInput {
    #[serde(rename = "numRows")]
    pub num_rows: u64,
}

/// Read a job input JSON file.
pub fn read_job_input(path: &Path) -> CliResult<JobInput> {
    let content = read_file(path)?;
    serde_json::from_str(&content)
        .map_err(|e| CliError::Input(format!("invalid job input {}: {e}", path.display())))
}

/// Read rows from a file with one JSON array per line, conformed to `schema`.
///
/// Blank lines are skipped. Errors name the offending line.
pub fn read_rows(path: &Path, schema: &TableSchema) -> CliResult<Vec<Row>> {
    let content = read_file(path)?;
    let mut rows = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row: Row = serde_json::from_str(line).map_err(|e| {
            CliError::Input(format!("{}:{}: expected a JSON array row: {e}", path.display(), i + 1))
        })?;
        let row = schema
            .conform_row(row)
            .map_err(|e| CliError::Input(format!("{}:{}: {e}", path.display(), i + 1)))?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_file(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::Input(format!("failed to read {}: {e}", path.display())))
}
