/// Configuration system for tally.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::TallyConfig::default()`]
/// 2. **User global config**: `~/.tally/config.toml`
/// 3. **Project local config**: `.tally.toml` in the current working directory
/// 4. **Environment variables**: `TALLY_*` overrides (highest precedence)
///
/// Later layers override earlier ones key by key: a project file that only
/// sets `pagination.page_size` keeps every other value from the layers
/// below it.
///
/// # Usage
///
/// ```rust,ignore
/// use tally::config;
///
/// let cfg = config::load();
/// cfg.validate()?;
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::datetime::{self, DateTimeError};
use crate::records::DataSource;

pub use schema::TallyConfig;

/// A configured value the application cannot run with.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("invalid counter start {value:?}: {source}")]
    InvalidStart {
        value: String,
        #[source]
        source: DateTimeError,
    },

    #[error("pagination.page_size must be at least 1")]
    InvalidPageSize,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved tally configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. Malformed files are skipped with a warning.
pub fn load() -> TallyConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config
}

/// Merge the given TOML files over the built-in defaults, in order.
///
/// Each layer is checked against the schema as it is merged. A layer that
/// would make the result invalid (e.g. a string where a number belongs) is
/// skipped whole with a warning; earlier layers still apply.
pub fn load_layers(paths: &[Option<PathBuf>]) -> TallyConfig {
    let mut resolved = TallyConfig::default();
    let Ok(mut merged) = toml::Value::try_from(&resolved) else {
        return resolved;
    };

    for path in paths.iter().flatten() {
        let Some(layer) = load_toml_value(path) else {
            continue;
        };
        let mut candidate = merged.clone();
        merge_values(&mut candidate, layer);
        match candidate.clone().try_into::<TallyConfig>() {
            Ok(config) => {
                merged = candidate;
                resolved = config;
            }
            Err(e) => log::warn!("ignoring invalid config {}: {e}", path.display()),
        }
    }

    resolved
}

/// Read a TOML file as a raw value tree. `None` if missing or malformed.
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring malformed config {}: {e}", path.display());
            None
        }
    }
}

/// Recursively overlay `overlay` onto `base`: tables merge, everything else
/// replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

impl TallyConfig {
    /// Check the values the core refuses to run with.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.start_instant()?;
        if self.pagination.page_size == 0 {
            return Err(ConfigurationError::InvalidPageSize);
        }
        Ok(())
    }

    /// The parsed counter start instant.
    pub fn start_instant(&self) -> Result<chrono::NaiveDateTime, ConfigurationError> {
        datetime::parse_fixed_datetime(&self.counter.start).map_err(|source| {
            ConfigurationError::InvalidStart {
                value: self.counter.start.clone(),
                source,
            }
        })
    }

    /// Activity log path with `~` expanded.
    pub fn activity_log_path(&self) -> Option<PathBuf> {
        expand_tilde(&self.logging.path)
    }

    /// Configured record source; file paths get `~` expanded.
    pub fn data_source(&self) -> DataSource {
        match DataSource::parse(&self.data.source) {
            DataSource::File(path) => {
                DataSource::File(expand_tilde(&path.to_string_lossy()).unwrap_or(path))
            }
            url => url,
        }
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.data.timeout_ms)
    }

    /// Export directory with `~` expanded.
    pub fn export_dir(&self) -> PathBuf {
        expand_tilde(&self.export.dir).unwrap_or_else(|| PathBuf::from(&self.export.dir))
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~") {
        Some(rest) => {
            let rest = rest.trim_start_matches(['/', '\\']);
            dirs::home_dir().map(|home| home.join(rest))
        }
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.tally/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tally").join("config.toml"))
}

/// Path to the project local config: `.tally.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".tally.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `TALLY_START`: counter start instant
/// - `TALLY_SOURCE`: record source path or URL
/// - `TALLY_PAGE_SIZE`: records per page
/// - `TALLY_WEB_ADDR`: dashboard listen address
/// - `TALLY_LOGGING`: activity log enabled (`1`/`true`/`yes`/`on`)
fn apply_env_overrides(config: &mut TallyConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

fn apply_overrides(config: &mut TallyConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("TALLY_START")
        && !val.trim().is_empty()
    {
        config.counter.start = val;
    }
    if let Some(val) = var("TALLY_SOURCE")
        && !val.trim().is_empty()
    {
        config.data.source = val;
    }
    if let Some(val) = var("TALLY_PAGE_SIZE")
        && let Ok(size) = val.trim().parse::<usize>()
    {
        config.pagination.page_size = size;
    }
    if let Some(val) = var("TALLY_WEB_ADDR")
        && !val.trim().is_empty()
    {
        config.web.addr = val;
    }
    if let Some(val) = var("TALLY_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.tally/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;
    write_default_config(&path, force)?;
    Ok(path)
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }

    fs::write(path, TallyConfig::default_toml()).context("failed to write config file")
}

/// Set a single config key (dotted, e.g. `pagination.page_size`) in the
/// global config file, creating it from defaults when missing.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;
    set_value_in_file(&path, key, value)
}

fn set_value_in_file(path: &Path, key: &str, value: &str) -> Result<()> {
    let mut root: toml::Value = if path.exists() {
        let content = fs::read_to_string(path).context("failed to read config file")?;
        toml::from_str(&content).context("failed to parse config as TOML value")?
    } else {
        toml::Value::try_from(TallyConfig::default())
            .context("failed to serialize default config")?
    };

    // Keys missing from a sparse file are resolved against the defaults so
    // the value still gets the right TOML type.
    let defaults =
        toml::Value::try_from(TallyConfig::default()).context("failed to serialize defaults")?;
    set_toml_value(&mut root, &defaults, key, value)?;

    let _: TallyConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("'{value}' is not a valid value for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The key must exist in `schema`; its type there decides how `raw_value`
/// is parsed.
fn set_toml_value(
    root: &mut toml::Value,
    schema: &toml::Value,
    key: &str,
    raw_value: &str,
) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    let mut expected = schema;
    for &part in sections {
        expected = expected
            .get(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
        let table = current
            .as_table_mut()
            .with_context(|| format!("expected table above '{part}' in '{key}'"))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    let template = expected
        .get(*leaf)
        .with_context(|| format!("config key not found: '{key}'"))?;

    let new_value = match template {
        toml::Value::Boolean(_) => toml::Value::Boolean(is_truthy(raw_value)),
        toml::Value::Integer(_) => {
            let n: i64 = raw_value
                .trim()
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    current
        .as_table_mut()
        .with_context(|| format!("expected table at '{key}'"))?
        .insert((*leaf).to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn defaults_value() -> toml::Value {
        toml::Value::try_from(TallyConfig::default()).unwrap()
    }

    #[test]
    fn later_layers_override_key_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(&global, "[pagination]\npage_size = 20\n[data]\nsource = \"a.json\"\n").unwrap();
        fs::write(&project, "[data]\nsource = \"b.json\"\n").unwrap();

        let config = load_layers(&[Some(global), Some(project)]);
        assert_eq!(config.pagination.page_size, 20);
        assert_eq!(config.data.source, "b.json");
        assert_eq!(config.data.timeout_ms, 5000);
    }

    #[test]
    fn malformed_layer_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[pagination\npage_size = ").unwrap();

        let config = load_layers(&[Some(broken), None]);
        assert_eq!(config, TallyConfig::default());
    }

    #[test]
    fn mistyped_layer_is_skipped_and_others_apply() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join("project.toml");
        fs::write(&global, "[data]\nsource = \"global.json\"\n").unwrap();
        fs::write(&project, "[pagination]\npage_size = \"lots\"\n[data]\nsource = \"p.json\"\n")
            .unwrap();

        let config = load_layers(&[Some(global.clone()), Some(project)]);
        assert_eq!(config.data.source, "global.json");
        assert_eq!(config.pagination.page_size, TallyConfig::default().pagination.page_size);

        let later = dir.path().join("later.toml");
        fs::write(&later, "[pagination]\npage_size = 7\n").unwrap();
        let project = dir.path().join("project.toml");
        let config = load_layers(&[Some(global), Some(project), Some(later)]);
        assert_eq!(config.data.source, "global.json");
        assert_eq!(config.pagination.page_size, 7);
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("TALLY_START", "01/01/2024 08:00"),
            ("TALLY_PAGE_SIZE", "5"),
            ("TALLY_LOGGING", "off"),
        ]
        .into_iter()
        .collect();

        let mut config = TallyConfig::default();
        apply_overrides(&mut config, |name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.counter.start, "01/01/2024 08:00");
        assert_eq!(config.pagination.page_size, 5);
        assert!(!config.logging.enabled);
        assert_eq!(config.data.source, "data.json");
    }

    #[test]
    fn invalid_page_size_override_is_ignored() {
        let mut config = TallyConfig::default();
        apply_overrides(&mut config, |name| {
            (name == "TALLY_PAGE_SIZE").then(|| "ten".to_string())
        });
        assert_eq!(config.pagination.page_size, 10);
    }

    #[test]
    fn validate_rejects_bad_start_and_zero_page_size() {
        let mut config = TallyConfig::default();
        assert!(config.validate().is_ok());

        config.counter.start = "yesterday".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidStart { .. })
        ));

        let mut config = TallyConfig::default();
        config.pagination.page_size = 0;
        assert_eq!(config.validate(), Err(ConfigurationError::InvalidPageSize));
    }

    #[test]
    fn is_truthy_accepts_variants() {
        for yes in ["1", "true", "TRUE", "yes", "on", " On "] {
            assert!(is_truthy(yes), "{yes}");
        }
        for no in ["0", "false", "no", "off", ""] {
            assert!(!is_truthy(no), "{no}");
        }
    }

    #[test]
    fn expand_tilde_uses_home() {
        assert_eq!(expand_tilde("data/log.jsonl"), Some(PathBuf::from("data/log.jsonl")));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_tilde("~/.tally/activity.jsonl"),
                Some(home.join(".tally/activity.jsonl"))
            );
        }
    }

    #[test]
    fn set_toml_value_types_from_schema() {
        let mut root: toml::Value = toml::from_str("[pagination]\npage_size = 10\n").unwrap();
        let schema = defaults_value();

        set_toml_value(&mut root, &schema, "pagination.page_size", "25").unwrap();
        set_toml_value(&mut root, &schema, "web.open_browser", "no").unwrap();
        set_toml_value(&mut root, &schema, "counter.start", "01/02/2025 10:00").unwrap();

        assert_eq!(root["pagination"]["page_size"].as_integer(), Some(25));
        assert_eq!(root["web"]["open_browser"].as_bool(), Some(false));
        assert_eq!(root["counter"]["start"].as_str(), Some("01/02/2025 10:00"));
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root = defaults_value();
        let schema = defaults_value();
        assert!(set_toml_value(&mut root, &schema, "nonexistent.key", "x").is_err());
        assert!(set_toml_value(&mut root, &schema, "pagination.rows", "x").is_err());
        assert!(set_toml_value(&mut root, &schema, "pagination.page_size", "many").is_err());
    }

    #[test]
    fn set_value_in_file_creates_and_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        set_value_in_file(&path, "data.source", "https://example.com/data.json").unwrap();
        set_value_in_file(&path, "pagination.page_size", "3").unwrap();

        let config = load_layers(&[Some(path)]);
        assert_eq!(config.data.source, "https://example.com/data.json");
        assert_eq!(config.pagination.page_size, 3);
    }

    #[test]
    fn write_default_config_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        write_default_config(&path, false).unwrap();
        assert!(write_default_config(&path, false).is_err());
        assert!(write_default_config(&path, true).is_ok());
    }

    #[test]
    fn data_source_classifies_urls_and_paths() {
        let mut config = TallyConfig::default();
        assert_eq!(
            config.data_source(),
            DataSource::File(PathBuf::from("data.json"))
        );

        config.data.source = "https://example.com/data.json".to_string();
        assert_eq!(
            config.data_source(),
            DataSource::Url("https://example.com/data.json".to_string())
        );
        assert_eq!(config.load_timeout(), Duration::from_millis(5000));
    }
}
