//! CLI command implementations for tally.
//!
//! Provides subcommand handlers for:
//! - `tally list`: one page of the (filtered) record table
//! - `tally stats`: summary statistics of the (filtered) view
//! - `tally export`: write the (filtered) view to a dated JSON file
//! - `tally counter`: live elapsed-days counter
//! - `tally activity`: recent entries of the activity log
//! - `tally config show|init|set|reset`: configuration management

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::activity::{ActivityEvent, ActivityKind, ActivityLog};
use crate::config::{self, TallyConfig};
use crate::counter::{CounterSnapshot, CounterStatus, LiveCounter, SystemClock, Ticker};
use crate::datetime;
use crate::filter::FilterCriteria;
use crate::records::{self, write_export};
use crate::session::{DashboardView, Session};
use crate::stats::Summary;
use crate::table::TableRow;

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Filter flags shared by `list`, `stats` and `export`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Exact record date, e.g. 17/07/2025
    #[arg(long)]
    pub date: Option<String>,
    /// Month number, 1-12
    #[arg(long)]
    pub month: Option<String>,
    /// Four-digit year
    #[arg(long)]
    pub year: Option<String>,
    /// Case-insensitive substring of the duration text
    #[arg(long)]
    pub duration: Option<String>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        Self {
            date: args.date,
            month: args.month,
            year: args.year,
            duration: args.duration,
        }
        .normalized()
    }
}

/// Load the configured source and apply `criteria`.
fn load_session(
    config: &TallyConfig,
    criteria: FilterCriteria,
    activity: &ActivityLog,
) -> Result<Session> {
    let source = config.data_source();
    let loaded = match records::load(&source, config.load_timeout()) {
        Ok(loaded) => loaded,
        Err(e) => {
            activity.record(ActivityKind::LoadFailed, e.to_string(), None);
            return Err(e).context("could not load records");
        }
    };
    log::debug!("loaded {} records from {source}", loaded.len());
    activity.record(ActivityKind::Load, source.to_string(), Some(loaded.len()));

    let session = Session::new(config.pagination.page_size).with_loaded(loaded);
    if criteria.is_empty() {
        return Ok(session);
    }

    let session = session.with_filters(criteria);
    activity.record(
        ActivityKind::Filter,
        session.criteria().describe(),
        Some(session.view().len()),
    );
    Ok(session)
}

// ---------------------------------------------------------------------------
// tally list
// ---------------------------------------------------------------------------

/// Print one page of the record table.
pub fn run_list(
    config: &TallyConfig,
    filters: FilterArgs,
    page: usize,
    format: OutputFormat,
) -> Result<()> {
    let activity = ActivityLog::from_config(config);
    let session = load_session(config, filters.into(), &activity)?.with_page(page);
    let view = session.render();

    match format {
        OutputFormat::Json => print_json(&view)?,
        OutputFormat::Csv => print_rows_csv(&view.rows),
        OutputFormat::Table => print_list_table(&view),
    }

    Ok(())
}

fn print_list_table(view: &DashboardView) {
    println!("{}", "tally records".bold().cyan());
    if !view.criteria.is_empty() {
        println!("  {} {}", "Filters:".dimmed(), view.criteria.describe());
    }
    println!("{}", "=".repeat(60));

    if view.rows.is_empty() {
        println!("  {}", view.controls.info.yellow());
        return;
    }

    println!(
        "  {:<12} {:<6} {:<20} {}",
        "Date".bold(),
        "Time".bold(),
        "Days gone by".bold(),
        "Progress".bold()
    );
    println!("  {}", "-".repeat(56));
    for row in &view.rows {
        println!(
            "  {:<12} {:<6} {:<20} {} {:>3}%",
            row.date,
            row.time,
            truncate(&row.days_gone_by, 20),
            progress_bar(row.progress).green(),
            row.progress
        );
    }
    println!();
    println!("  {}", view.controls.info.dimmed());
}

fn print_rows_csv(rows: &[TableRow]) {
    println!("date,time,days_gone_by,progress");
    for row in rows {
        println!(
            "{},{},{},{}",
            csv_field(&row.date),
            csv_field(&row.time),
            csv_field(&row.days_gone_by),
            row.progress
        );
    }
}

// ---------------------------------------------------------------------------
// tally stats
// ---------------------------------------------------------------------------

/// Show summary statistics of the view.
pub fn run_stats(config: &TallyConfig, filters: FilterArgs, format: OutputFormat) -> Result<()> {
    let activity = ActivityLog::from_config(config);
    let session = load_session(config, filters.into(), &activity)?;
    let summary = session.render().summary;

    match format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Csv => {
            println!("total_records,average_duration,last_record");
            println!(
                "{},{},{}",
                summary.total_records,
                csv_field(&summary.average_duration),
                csv_field(&summary.last_record)
            );
        }
        OutputFormat::Table => print_stats_table(&summary, session.criteria()),
    }

    Ok(())
}

fn print_stats_table(summary: &Summary, criteria: &FilterCriteria) {
    println!("{}", "tally summary".bold().cyan());
    if !criteria.is_empty() {
        println!("  {} {}", "Filters:".dimmed(), criteria.describe());
    }
    println!("{}", "=".repeat(40));
    println!("  {} {}", "Total records:   ".bold(), summary.total_records);
    println!("  {} {}", "Average duration:".bold(), summary.average_duration);
    println!("  {} {}", "Last record:     ".bold(), summary.last_record);
}

// ---------------------------------------------------------------------------
// tally export
// ---------------------------------------------------------------------------

/// Write the view to `{dir}/{prefix}-YYYY-MM-DD.json`.
pub fn run_export(config: &TallyConfig, filters: FilterArgs) -> Result<()> {
    let activity = ActivityLog::from_config(config);
    let session = load_session(config, filters.into(), &activity)?;
    let today = datetime::local_now().date();

    let dir = config.export_dir();
    let path = match write_export(&dir, &config.export.prefix, session.view(), today) {
        Ok(path) => path,
        Err(e) => {
            activity.record(ActivityKind::ExportFailed, e.to_string(), None);
            return Err(e).context("export failed");
        }
    };
    activity.record(
        ActivityKind::Export,
        path.display().to_string(),
        Some(session.view().len()),
    );

    println!(
        "{} Exported {} records to {}",
        "✓".green().bold(),
        session.view().len(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// tally counter
// ---------------------------------------------------------------------------

/// Show the live counter, redrawn every `counter.interval_ms` until Enter.
pub fn run_counter(config: &TallyConfig, once: bool) -> Result<()> {
    let counter = LiveCounter::new(config.start_instant());

    if once || !counter.is_active() {
        let snapshot = counter.tick(&SystemClock);
        println!("{}", counter_line(&snapshot));
        if let Some(error) = &snapshot.error {
            println!("  {}", error.red());
        }
        return Ok(());
    }

    println!("{}", "Press Enter to stop.".dimmed());
    let interval = Duration::from_millis(config.counter.interval_ms.max(1));
    let ticker = Ticker::start(interval, move || {
        let line = counter_line(&counter.tick(&SystemClock));
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r{line}");
        let _ = out.flush();
    });

    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    ticker.stop();
    println!();

    Ok(())
}

fn counter_line(snapshot: &CounterSnapshot) -> String {
    let status = match snapshot.status {
        CounterStatus::Active => snapshot.status.to_string().green(),
        CounterStatus::InvalidConfiguration => snapshot.status.to_string().red(),
    };
    format!(
        "{}  {} since {}  [{}]",
        snapshot.now,
        snapshot.elapsed_label.bold(),
        snapshot.start,
        status
    )
}

// ---------------------------------------------------------------------------
// tally activity
// ---------------------------------------------------------------------------

/// Show the most recent activity log entries.
pub fn run_activity(config: &TallyConfig, limit: usize, format: OutputFormat) -> Result<()> {
    let log = ActivityLog::from_config(config);
    let events = log.recent(limit);

    if events.is_empty() {
        println!("{}", "No activity recorded yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_json(&events)?,
        OutputFormat::Csv => {
            println!("timestamp,kind,detail,records");
            for e in &events {
                println!(
                    "{},{},{},{}",
                    e.timestamp,
                    e.kind,
                    csv_field(&e.detail),
                    e.records.map(|n| n.to_string()).unwrap_or_default()
                );
            }
        }
        OutputFormat::Table => print_activity_table(&events),
    }

    Ok(())
}

fn print_activity_table(events: &[ActivityEvent]) {
    println!("{}", "tally activity".bold().cyan());
    println!("{}", "=".repeat(70));
    for e in events {
        let kind = match e.kind {
            ActivityKind::LoadFailed | ActivityKind::ExportFailed => e.kind.to_string().red(),
            _ => e.kind.to_string().green(),
        };
        let records = e.records.map(|n| format!("({n})")).unwrap_or_default();
        println!(
            "  {:<26} {:<14} {} {}",
            truncate(&e.timestamp, 25).dimmed(),
            kind,
            truncate(&e.detail, 40),
            records.dimmed()
        );
    }
}

// ---------------------------------------------------------------------------
// tally config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective tally Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let sources = [
        (config::global_config_file(), "~/.tally/config.toml"),
        (config::project_config_file(), ".tally.toml"),
    ];
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    for (path, label) in sources {
        if path.is_some_and(|p| p.exists()) {
            println!("  {} {}", "✓".green(), label.dimmed());
        } else {
            println!("  {} {}", "·".dimmed(), format!("{label} (not found)").dimmed());
        }
    }
    println!("  {} {}", "·".dimmed(), "TALLY_* environment variables".dimmed());

    let config = config::load();
    if let Some(start) = resolved_start(&config) {
        println!();
        println!("  {} counter starts {}", "✓".green(), start.bold());
    }
    if let Err(e) = config.validate() {
        println!();
        println!("  {} {}", "✗".red().bold(), e);
    }

    Ok(())
}

/// Initialize a default config file at `~/.tally/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!("{} Config written to {}", "✓".green().bold(), path.display());
    println!("  {}", "Edit the file to set the counter start and data source.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// The counter start as parsed, after any date rollover.
fn resolved_start(config: &TallyConfig) -> Option<String> {
    config
        .start_instant()
        .ok()
        .map(|start| datetime::format_minutes(&start))
}

fn print_json<T: serde::Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

/// Ten-cell bar for a `0..=100` percentage.
fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)).div_ceil(10);
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
