//! Activity log: one JSON line per load, filter, reset or export.
//!
//! Log file: `~/.tally/activity.jsonl` (configurable via `[logging]`).
//! Writing is best-effort: a log that cannot be written never fails the
//! operation being logged.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::TallyConfig;

// ---------------------------------------------------------------------------
// Event entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Load,
    LoadFailed,
    Filter,
    Reset,
    Export,
    ExportFailed,
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::LoadFailed => "load_failed",
            Self::Filter => "filter",
            Self::Reset => "reset",
            Self::Export => "export",
            Self::ExportFailed => "export_failed",
        };
        f.write_str(name)
    }
}

/// A single line of the activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: String,
    pub kind: ActivityKind,
    /// Source, criteria, export path or error message.
    #[serde(default)]
    pub detail: String,
    /// Size of the resulting view, when there is one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub records: Option<usize>,
}

impl ActivityEvent {
    pub fn new(kind: ActivityKind, detail: impl Into<String>, records: Option<usize>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            kind,
            detail: detail.into(),
            records,
        }
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Appends events to the configured activity log.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: Option<PathBuf>,
}

impl ActivityLog {
    pub fn from_config(config: &TallyConfig) -> Self {
        let path = if config.logging.enabled {
            config.activity_log_path()
        } else {
            None
        };
        Self { path }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A log that drops every event.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record(&self, kind: ActivityKind, detail: impl Into<String>, records: Option<usize>) {
        self.append(&ActivityEvent::new(kind, detail, records));
    }

    pub fn append(&self, event: &ActivityEvent) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = append_event(path, event) {
            log::debug!("activity log write to {} failed: {e}", path.display());
        }
    }

    /// The most recent `limit` events, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<ActivityEvent> {
        let Some(path) = &self.path else {
            return Vec::new();
        };
        let mut events = read_events(path);
        let skip = events.len().saturating_sub(limit);
        events.drain(..skip);
        events
    }
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_event(path: &Path, event: &ActivityEvent) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(event)?;
    writeln!(file, "{json}")?;

    Ok(())
}

/// Read every event, silently skipping malformed lines.
fn read_events(path: &Path) -> Vec<ActivityEvent> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(|line| line.ok())
        .filter_map(|line| serde_json::from_str::<ActivityEvent>(&line).ok())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
