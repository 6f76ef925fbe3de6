//! Account cash tracking

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::AccountConfig;
use crate::trade::PortfolioMetrics;

/// Account balances used to gate opening new positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Total portfolio value
    pub portfolio_value: Decimal,
    /// Cash not tied up in positions before any open trades are deducted
    pub cash_available: Decimal,
}

impl Account {
    pub fn new(portfolio_value: Decimal, cash_available: Decimal) -> Self {
        Self {
            portfolio_value,
            cash_available,
        }
    }

    /// Create from AccountConfig
    pub fn from_config(config: &AccountConfig) -> Self {
        Self::new(config.portfolio_value, config.cash_available)
    }

    /// Cash left after the investment of currently open trades
    pub fn free_cash(&self, metrics: &PortfolioMetrics) -> Decimal {
        (self.cash_available - metrics.total_investment).max(Decimal::ZERO)
    }

    /// Whether a new position of `investment` fits in free cash
    pub fn can_afford(&self, investment: Decimal, metrics: &PortfolioMetrics) -> bool {
        investment <= self.free_cash(metrics)
    }

    /// Share of the portfolio currently invested, in percent
    pub fn invested_pct(&self, metrics: &PortfolioMetrics) -> Decimal {
        if self.portfolio_value <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        metrics.total_investment / self.portfolio_value * Decimal::ONE_HUNDRED
    }
}
