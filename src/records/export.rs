//! Exporting the active view as a pretty-printed JSON document.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use super::Record;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write export to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Serialize the given view verbatim, two-space indented.
pub fn export_snapshot(view: &[Record]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(view)?)
}

/// `{prefix}-YYYY-MM-DD.json`.
pub fn export_file_name(prefix: &str, today: NaiveDate) -> String {
    format!("{prefix}-{}.json", today.format("%Y-%m-%d"))
}

/// Write the view to `dir/{prefix}-{today}.json`, creating `dir` if needed.
pub fn write_export(
    dir: &Path,
    prefix: &str,
    view: &[Record],
    today: NaiveDate,
) -> Result<PathBuf, ExportError> {
    let body = export_snapshot(view)?;
    let path = dir.join(export_file_name(prefix, today));

    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    fs::write(&path, body).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    Ok(path)
}
