/// Configuration schema and defaults for tally.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[counter]`, `[data]`, `[pagination]`, `[export]`, `[web]` and
/// `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use serde::{Deserialize, Serialize};

use crate::pagination::DEFAULT_PAGE_SIZE;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level tally configuration.
///
/// Maps directly to `~/.tally/config.toml` and `.tally.toml`. All sections
/// and fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    pub counter: CounterConfig,
    pub data: DataConfig,
    pub pagination: PaginationConfig,
    pub export: ExportConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [counter]
// ---------------------------------------------------------------------------

/// Live counter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Reference instant, `dd/mm/yyyy hh:mm`.
    pub start: String,
    /// Tick interval in milliseconds.
    pub interval_ms: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            start: "17/07/2025 17:33".to_string(),
            interval_ms: 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// [data]
// ---------------------------------------------------------------------------

/// Record source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// File path or `http(s)://` URL of the JSON record list.
    pub source: String,
    /// Request timeout for URL sources (milliseconds).
    pub timeout_ms: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: "data.json".to_string(),
            timeout_ms: 5000,
        }
    }
}

// ---------------------------------------------------------------------------
// [pagination]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Records per page; must be at least 1.
    pub page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// [export]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory that `tally export` writes into.
    pub dir: String,
    /// File name prefix; the date and `.json` are appended.
    pub prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            prefix: "tally-export".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `tally serve`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether the activity log is written.
    pub enabled: bool,
    /// Path to the activity log file. `~` is expanded to the home directory.
    pub path: String,
    /// Diagnostic log level: `"error"`, `"warn"`, `"info"`, `"debug"`.
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.tally/activity.jsonl".to_string(),
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML
// ---------------------------------------------------------------------------

impl TallyConfig {
    /// Annotated default configuration written by `tally config init`.
    pub fn default_toml() -> String {
        r#"# tally configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (TALLY_*)
#   2. Project config (.tally.toml in current directory)
#   3. User global config (~/.tally/config.toml)
#   4. Built-in defaults

[counter]
start = "17/07/2025 17:33"   # dd/mm/yyyy hh:mm, local time
interval_ms = 1000

[data]
source = "data.json"         # file path or http(s):// URL
timeout_ms = 5000

[pagination]
page_size = 10

[export]
dir = "."
prefix = "tally-export"      # -> tally-export-YYYY-MM-DD.json

[web]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
enabled = true
path = "~/.tally/activity.jsonl"
level = "info"               # error | warn | info | debug
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = TallyConfig::default();
        assert_eq!(config.counter.start, "17/07/2025 17:33");
        assert_eq!(config.counter.interval_ms, 1000);
        assert_eq!(config.data.source, "data.json");
        assert_eq!(config.pagination.page_size, 10);
        assert_eq!(config.export.prefix, "tally-export");
        assert!(config.logging.enabled);
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: TallyConfig = toml::from_str("").unwrap();
        assert_eq!(config, TallyConfig::default());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: TallyConfig = toml::from_str(
            r#"
[pagination]
page_size = 25

[data]
source = "https://example.com/data.json"
"#,
        )
        .unwrap();
        assert_eq!(config.pagination.page_size, 25);
        assert_eq!(config.data.source, "https://example.com/data.json");
        assert_eq!(config.data.timeout_ms, 5000);
        assert_eq!(config.counter, CounterConfig::default());
    }

    #[test]
    fn default_toml_parses_back() {
        let config: TallyConfig = toml::from_str(&TallyConfig::default_toml()).unwrap();
        assert_eq!(config, TallyConfig::default());
    }
}
