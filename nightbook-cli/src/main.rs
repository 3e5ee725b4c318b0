//! nightbook: plan the week's bills against logged nights of work.
//!
//! Usage:
//!   nightbook dashboard                 Everything at a glance
//!   nightbook week --nights 4           This week's bills, target and plan
//!   nightbook night add --gross 520     Log tonight
//!   nightbook bill add --name Rent      Track a bill
//!   nightbook import --csv nights.csv   Bulk-load nights

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use nightbook_core::{Dashboard, DayKey, safe_num, today_key};
use nightbook_store::{JsonFileStore, Ledger, SettingsPatch, parse_nights_csv};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod bill_cmd;
mod checkin_cmd;
mod config;
mod night_cmd;
mod render;
mod state;

use bill_cmd::BillCommand;
use checkin_cmd::CheckinCommand;
use config::{Config, DEFAULT_LOG_FILTER};
use night_cmd::NightCommand;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("NIGHTBOOK_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "nightbook",
    version,
    long_version = LONG_VERSION,
    about = "Track nights worked, plan the week's bills"
)]
struct Cli {
    /// Record directory (overrides config.toml)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 30-day totals, weekly target, insights and recent nights
    Dashboard {
        /// Nights you plan to work this week (1-7)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=7))]
        nights: Option<u8>,
    },

    /// This week's bills, target, plan and check-in
    Week {
        /// Nights you plan to work this week (1-7)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=7))]
        nights: Option<u8>,
    },

    /// Logged nights
    Night {
        #[command(subcommand)]
        command: NightCommand,
    },

    /// Bills
    Bill {
        #[command(subcommand)]
        command: BillCommand,
    },

    /// Planning settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Weekly reflection
    Checkin {
        #[command(subcommand)]
        command: CheckinCommand,
    },

    /// Append nights from a CSV export
    Import {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Manage ~/.nightbook/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,

    /// Update settings; values are clamped to their allowed ranges
    Set {
        /// Net a night must reach to count as a hit (0-999999)
        #[arg(long)]
        min_net: Option<String>,
        /// Buffer on top of unpaid bills (0-100)
        #[arg(long)]
        buffer_percent: Option<String>,
        /// Typical net for one night (1-999999)
        #[arg(long)]
        expected_net: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,
    /// Print the effective configuration
    Show,
}

/// Text or JSON, picked once per invocation
pub struct Output {
    json: bool,
}

impl Output {
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;

    init_logging(cli.verbose, &cfg);

    let out = Output { json: cli.json };

    if let Command::Config { command } = &cli.command {
        return match command {
            ConfigCommand::Init => config::init_config(),
            ConfigCommand::Show => show_config(&cfg, &cli, &out),
        };
    }

    let data_dir = cfg.resolve_data_dir(cli.data_dir.as_deref())?;
    let mut ledger = open_ledger(data_dir)?;
    let today = today_key();

    match cli.command {
        Command::Dashboard { nights } => {
            let settings = *ledger.settings();
            let dash = Dashboard::compute(&ledger.snapshot(), today, nights);
            out.emit(&dash, || render::dashboard(&dash, &settings))
        }
        Command::Week { nights } => {
            let dash = Dashboard::compute(&ledger.snapshot(), today, nights);
            out.emit(&dash, || render::week(&dash))
        }
        Command::Night { command } => night_cmd::run(command, &mut ledger, today, &out),
        Command::Bill { command } => bill_cmd::run(command, &mut ledger, today, &out),
        Command::Settings { command } => run_settings(command, &mut ledger, &out),
        Command::Checkin { command } => checkin_cmd::run(command, &mut ledger, today, &out),
        Command::Import { csv } => import_csv(csv, &mut ledger, &out),
        Command::Config { .. } => Ok(()),
    }
}

/// Priority: RUST_LOG > --verbose > config `log_filter`.
fn init_logging(verbose: bool, cfg: &Config) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&cfg.log_filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn open_ledger(data_dir: PathBuf) -> Result<Ledger<JsonFileStore>> {
    let store = JsonFileStore::open(&data_dir)
        .with_context(|| format!("open data dir {}", data_dir.display()))?;
    let dir = store.dir().to_path_buf();
    debug!(dir = %dir.display(), "opening ledger");
    Ledger::load(store).with_context(|| format!("load records from {}", dir.display()))
}

fn run_settings(
    cmd: SettingsCommand,
    ledger: &mut Ledger<JsonFileStore>,
    out: &Output,
) -> Result<()> {
    match cmd {
        SettingsCommand::Show => {
            let settings = ledger.settings();
            out.emit(settings, || render::settings(settings))
        }
        SettingsCommand::Set {
            min_net,
            buffer_percent,
            expected_net,
        } => {
            let patch = SettingsPatch {
                min_net_default: min_net.as_deref().map(safe_num),
                buffer_percent: buffer_percent.as_deref().map(safe_num),
                expected_net_per_night: expected_net.as_deref().map(safe_num),
            };
            if patch.min_net_default.is_none()
                && patch.buffer_percent.is_none()
                && patch.expected_net_per_night.is_none()
            {
                bail!("nothing to change (see `nightbook settings set --help`)");
            }
            let settings = ledger.update_settings(patch)?;
            out.emit(&settings, || render::settings(&settings))
        }
    }
}

fn import_csv(csv: PathBuf, ledger: &mut Ledger<JsonFileStore>, out: &Output) -> Result<()> {
    if !csv.exists() {
        bail!("CSV not found: {}", csv.display());
    }
    let entries =
        parse_nights_csv(&csv).with_context(|| format!("parsing {}", csv.display()))?;
    let undated = entries.iter().filter(|e| e.date.is_none()).count();
    let count = ledger.import_entries(entries)?;

    #[derive(Serialize)]
    struct Imported<'a> {
        path: &'a std::path::Path,
        imported: usize,
        undated: usize,
    }

    let summary = Imported {
        path: &csv,
        imported: count,
        undated,
    };
    out.emit(&summary, || {
        let mut line = format!("Imported {count} nights from {}", csv.display());
        if undated > 0 {
            line.push_str(&format!(" ({undated} without a readable date)"));
        }
        line
    })
}

fn show_config(cfg: &Config, cli: &Cli, out: &Output) -> Result<()> {
    #[derive(Serialize)]
    struct Effective<'a> {
        config_path: PathBuf,
        data_dir: PathBuf,
        today: DayKey,
        #[serde(flatten)]
        config: &'a Config,
    }

    let effective = Effective {
        config_path: config::config_path()?,
        data_dir: cfg.resolve_data_dir(cli.data_dir.as_deref())?,
        today: today_key(),
        config: cfg,
    };
    out.emit(&effective, || {
        format!(
            "config:     {}\ndata dir:   {}\nlog filter: {}\ntoday:      {}",
            effective.config_path.display(),
            effective.data_dir.display(),
            effective.config.log_filter,
            effective.today
        )
    })
}
