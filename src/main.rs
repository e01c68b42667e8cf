use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;

use tally::cli::{self, FilterArgs, OutputFormat};
use tally::config::{self, ConfigurationError, TallyConfig};
use tally::web;

#[derive(Debug, Parser)]
#[command(name = "tally")]
#[command(about = "Track how many days have gone by, in the terminal or the browser")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the web dashboard
    Serve {
        /// Listen address (overrides web.addr)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open a browser window
        #[arg(long)]
        no_open: bool,
    },
    /// List one page of records, newest first
    List {
        #[command(flatten)]
        filters: FilterArgs,
        /// Page number, 1-based
        #[arg(long, default_value = "1")]
        page: usize,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show total, average duration and last record
    Stats {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Write the (filtered) records to a dated JSON file
    Export {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show the live day counter
    Counter {
        /// Print a single line and exit
        #[arg(long)]
        once: bool,
    },
    /// Show recent loads, filters and exports
    Activity {
        /// Number of entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default ~/.tally/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a value by dotted key, e.g. `pagination.page_size 20`
    Set { key: String, value: String },
    /// Restore the default configuration file
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let rust_log = init_logging();
    let config = config::load();
    if !rust_log {
        log::set_max_level(configured_level(&config));
    }

    if !matches!(app.command, Commands::Config { .. }) {
        check_config(&config)?;
    }

    match app.command {
        Commands::Serve { addr, no_open } => {
            let mut config = config;
            if let Some(addr) = addr {
                config.web.addr = addr;
            }
            if no_open {
                config.web.open_browser = false;
            }
            web::serve(config)
        }
        Commands::List {
            filters,
            page,
            format,
        } => cli::run_list(&config, filters, page, OutputFormat::from_str_opt(Some(&format))),
        Commands::Stats { filters, format } => {
            cli::run_stats(&config, filters, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Export { filters } => cli::run_export(&config, filters),
        Commands::Counter { once } => cli::run_counter(&config, once),
        Commands::Activity { limit, format } => {
            cli::run_activity(&config, limit, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}

/// Install the logger before the config is read so its warnings show.
///
/// `RUST_LOG` wins when set (returns `true`). Otherwise everything passes
/// the logger and the global max level gates output: warnings until the
/// config is loaded, then `[logging] level`.
fn init_logging() -> bool {
    let rust_log = std::env::var_os("RUST_LOG").is_some();
    let mut builder = env_logger::Builder::from_default_env();
    if !rust_log {
        builder.filter_level(LevelFilter::Trace);
    }
    builder.init();
    if !rust_log {
        log::set_max_level(LevelFilter::Warn);
    }
    rust_log
}

fn configured_level(config: &TallyConfig) -> LevelFilter {
    config
        .logging
        .level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::Info)
}

/// A zero page size is fatal; a bad counter start only makes the counter
/// inert.
fn check_config(config: &TallyConfig) -> Result<()> {
    if let Err(e) = config.start_instant() {
        log::warn!("{e}");
    }
    if config.pagination.page_size == 0 {
        return Err(ConfigurationError::InvalidPageSize.into());
    }
    Ok(())
}
