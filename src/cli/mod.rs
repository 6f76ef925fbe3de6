//! CLI interface for trade-sizer
//!
//! Provides subcommands for:
//! - `size`: Size a position without recording it
//! - `trade`: Open, plan, sell down, trail and close journaled trades
//! - `metrics`: Portfolio and partial-sale summary
//! - `export` / `import`: JSON backup and CSV reports
//! - `config`: Show the effective configuration

mod export;
mod metrics;
mod size;
mod trade;

pub use export::{ExportArgs, ExportFormat, ImportArgs};
pub use metrics::MetricsArgs;
pub use size::{SetupArgs, SizeArgs};
pub use trade::{OpenArgs, SellArgs, TradeCommand};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::trade::TradeLedger;

#[derive(Parser, Debug)]
#[command(name = "trade-sizer")]
#[command(about = "Risk-based position sizing and trade journal for spot, CFD and knockout products")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    /// Trade journal file (overrides `journal.path`)
    #[arg(short, long, global = true)]
    pub journal: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Size a position without recording it
    Size(SizeArgs),
    /// Manage journaled trades
    #[command(subcommand)]
    Trade(TradeCommand),
    /// Show portfolio metrics
    Metrics(MetricsArgs),
    /// Export the journal as JSON or CSV
    Export(ExportArgs),
    /// Replace the journal with a JSON backup
    Import(ImportArgs),
    /// Show configuration
    Config,
}

/// Loaded configuration plus the resolved journal location
#[derive(Debug, Clone)]
pub struct Session {
    pub config: Config,
    pub journal: PathBuf,
}

impl Session {
    pub fn new(config: Config, journal_override: Option<PathBuf>) -> Self {
        let journal = journal_override.unwrap_or_else(|| config.journal.path.clone());
        Self { config, journal }
    }

    /// Read the journal; a missing file is an empty ledger
    pub fn load_ledger(&self) -> Result<TradeLedger> {
        crate::export::load(&self.journal)
    }

    /// Write the journal back
    pub fn save_ledger(&self, ledger: &TradeLedger) -> Result<()> {
        crate::export::save(ledger, &self.journal)
    }
}

impl Commands {
    pub fn execute(&self, session: &Session) -> Result<()> {
        match self {
            Commands::Size(args) => args.execute(session),
            Commands::Trade(cmd) => cmd.execute(session),
            Commands::Metrics(args) => args.execute(session),
            Commands::Export(args) => args.execute(session),
            Commands::Import(args) => args.execute(session),
            Commands::Config => {
                print_config(session);
                Ok(())
            }
        }
    }
}

fn print_config(session: &Session) {
    let config = &session.config;
    println!("Current configuration:");
    println!(
        "  Account: portfolio={}, risk={}%, cash={}",
        config.account.portfolio_value, config.account.risk_percent, config.account.cash_available
    );
    println!(
        "  Defaults: product={}, leverage={}x, spread={}%, overnight={}%/day, days={}",
        config.defaults.product,
        config.defaults.leverage,
        config.defaults.spread_percent,
        config.defaults.overnight_percent,
        config.defaults.holding_days
    );
    println!("  Journal: {}", session.journal.display());
    println!(
        "  Telemetry: level={}, format={:?}",
        config.telemetry.log_level, config.telemetry.log_format
    );
}
