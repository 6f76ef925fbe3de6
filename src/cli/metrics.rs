//! Metrics command implementation

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::Session;
use crate::exit::analyze;
use crate::format::{format_currency, format_percentage};
use crate::risk::Account;

#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// Include partial-sale analytics
    #[arg(long)]
    pub partials: bool,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

impl MetricsArgs {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let ledger = session.load_ledger()?;
        let metrics = ledger.metrics();
        let account = Account::from_config(&session.config.account);
        let analytics = self.partials.then(|| analyze(ledger.list_all()));

        if self.json {
            let doc = json!({
                "portfolio": metrics,
                "freeCash": account.free_cash(&metrics),
                "investedPercent": account.invested_pct(&metrics),
                "partialSales": analytics,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
            return Ok(());
        }

        println!("{}", metrics.format_table());
        println!(
            "Free cash:        {} ({} invested)",
            format_currency(account.free_cash(&metrics)),
            format_percentage(account.invested_pct(&metrics))
        );
        if let Some(analytics) = analytics {
            println!("{}", analytics.format_table());
        }
        Ok(())
    }
}
