//! Size command implementation

use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;

use super::Session;
use crate::config::DefaultsConfig;
use crate::risk::{PositionSizer, ProductVariant, TradeSetup};

/// Entry, stop and product parameters shared by `size` and `trade open|plan`
///
/// Anything left out falls back to the `[defaults]` config section.
#[derive(Args, Debug, Clone)]
pub struct SetupArgs {
    /// Entry price
    #[arg(long)]
    pub entry: Decimal,

    /// Initial stop-loss price
    #[arg(long)]
    pub stop: Decimal,

    /// spot, cfd_long, cfd_short, knockout_long or knockout_short
    #[arg(long)]
    pub product: Option<ProductVariant>,

    /// Leverage factor
    #[arg(long)]
    pub leverage: Option<Decimal>,

    /// Spread in percent of the entry price
    #[arg(long)]
    pub spread: Option<Decimal>,

    /// Overnight financing in percent per day
    #[arg(long)]
    pub overnight: Option<Decimal>,

    /// Planned holding period in days
    #[arg(long)]
    pub days: Option<u32>,

    /// Portfolio value (overrides `account.portfolio_value`)
    #[arg(long)]
    pub portfolio: Option<Decimal>,

    /// Risk percent per trade (overrides `account.risk_percent`)
    #[arg(long)]
    pub risk: Option<Decimal>,
}

impl SetupArgs {
    pub fn to_setup(&self, defaults: &DefaultsConfig) -> TradeSetup {
        TradeSetup::new(
            self.entry,
            self.stop,
            self.product.unwrap_or(defaults.product),
        )
        .with_leverage(self.leverage.unwrap_or(defaults.leverage))
        .with_spread_percent(self.spread.unwrap_or(defaults.spread_percent))
        .with_overnight_percent(self.overnight.unwrap_or(defaults.overnight_percent))
        .with_holding_days(self.days.unwrap_or(defaults.holding_days))
    }

    pub fn sizer(&self, session: &Session) -> Result<PositionSizer> {
        let account = &session.config.account;
        let sizer = PositionSizer::new(
            self.portfolio.unwrap_or(account.portfolio_value),
            self.risk.unwrap_or(account.risk_percent),
        )?;
        Ok(sizer)
    }
}

#[derive(Args, Debug)]
pub struct SizeArgs {
    #[command(flatten)]
    pub setup: SetupArgs,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl SizeArgs {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let setup = self.setup.to_setup(&session.config.defaults);
        let result = self.setup.sizer(session)?.size(&setup)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", result.format_table());
        }
        if result.units == 0 {
            tracing::warn!(
                total_risk_per_unit = %result.total_risk_per_unit,
                max_risk = %result.max_risk,
                "Risk per unit exceeds the risk budget, position size is zero"
            );
        }
        Ok(())
    }
}
