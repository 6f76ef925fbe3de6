//! Export and import commands

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use super::Session;
use crate::exit::sale_rows;
use crate::export::{
    export_json, export_partial_sales_csv, export_performance_csv, export_trades_csv, import_json,
};
use crate::trade::TradeLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Full JSON backup document
    Json,
    /// One CSV row per trade
    Trades,
    /// One CSV row per partial sale
    Sales,
    /// Closed trades with holding duration
    Performance,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let ledger = session.load_ledger()?;
        let trades = ledger.list_all();

        let body = match self.format {
            ExportFormat::Json => export_json(&ledger)?,
            ExportFormat::Trades => export_trades_csv(trades)?,
            ExportFormat::Sales => export_partial_sales_csv(&sale_rows(trades))?,
            ExportFormat::Performance => export_performance_csv(trades)?,
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, body)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!(path = %path.display(), format = ?self.format, "Export written");
            }
            None => print!("{body}"),
        }
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON backup document
    pub file: PathBuf,
}

impl ImportArgs {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let json = std::fs::read_to_string(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;

        // Import replaces the whole journal
        let mut ledger = TradeLedger::new();
        let count = import_json(&mut ledger, &json)
            .with_context(|| format!("Failed to import {}", self.file.display()))?;
        session.save_ledger(&ledger)?;

        tracing::info!(trades = count, file = %self.file.display(), "Journal replaced from backup");
        println!("Imported {count} trades");
        Ok(())
    }
}
