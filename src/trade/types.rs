//! Trade entity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::risk::{ProductVariant, SizingResult, TradeSetup};

/// Trade identifier
pub type TradeId = Uuid;

/// Lifecycle state of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    /// Sized and saved, not yet entered
    Planned,
    /// Position entered
    Open,
    /// Fully liquidated
    Closed,
}

impl TradeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeStatus::Planned => "planned",
            TradeStatus::Open => "open",
            TradeStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(TradeStatus::Planned),
            "open" => Ok(TradeStatus::Open),
            "closed" => Ok(TradeStatus::Closed),
            other => Err(format!(
                "unknown status '{other}' (expected planned, open or closed)"
            )),
        }
    }
}

/// A single partial liquidation of an open trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSaleRecord {
    /// Sale timestamp
    pub date: DateTime<Utc>,
    /// Units sold
    pub units_sold: u64,
    /// Sale price
    pub price: Decimal,
    /// units_sold * price
    pub proceeds: Decimal,
    /// Realized P&L of this slice
    pub pnl: Decimal,
    /// R-multiple against the original entry and stop
    pub r_multiple: Decimal,
    /// Requested percentage of the position held at sale time
    pub percentage: Decimal,
}

/// A tracked trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    // Identity
    pub id: TradeId,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
    pub status: TradeStatus,

    // Fixed at creation
    #[serde(rename = "productType")]
    pub product: ProductVariant,
    pub entry_price: Decimal,
    /// Original stop-loss
    pub stop_loss: Decimal,
    pub leverage: Decimal,
    pub spread_percent: Decimal,
    pub overnight_percent: Decimal,
    pub holding_days: u32,
    pub original_units: u64,
    pub investment: Decimal,
    pub exposure: Decimal,
    pub risk_amount: Decimal,
    #[serde(rename = "target1R")]
    pub target_1r: Decimal,
    #[serde(rename = "target2R")]
    pub target_2r: Decimal,
    #[serde(rename = "target5R")]
    pub target_5r: Decimal,

    // Mutable
    /// Current (possibly trailed) stop
    pub current_stop: Decimal,
    /// Remaining units
    pub units: u64,
    pub partial_sales: Vec<PartialSaleRecord>,
    pub total_realized_pnl: Decimal,

    // Set on close
    pub close_price: Option<Decimal>,
    pub close_date: Option<DateTime<Utc>>,
    pub final_pnl: Option<Decimal>,
    pub final_r_multiple: Option<Decimal>,
}

impl Trade {
    pub fn is_short(&self) -> bool {
        self.product.is_short()
    }

    /// Signed price move per unit from entry to `price`
    pub fn profit_per_unit(&self, price: Decimal) -> Decimal {
        if self.is_short() {
            self.entry_price - price
        } else {
            price - self.entry_price
        }
    }

    /// Per-unit risk between entry and the original stop, signed by direction
    pub fn risk_per_unit(&self) -> Decimal {
        if self.is_short() {
            self.stop_loss - self.entry_price
        } else {
            self.entry_price - self.stop_loss
        }
    }

    /// Mark-to-market P&L of the remaining units
    pub fn unrealized_pnl(&self, price: Decimal) -> Decimal {
        Decimal::from(self.units) * self.profit_per_unit(price)
    }

    /// R-multiple of `price` against the original entry and stop
    pub fn current_r_multiple(&self, price: Decimal) -> Decimal {
        let risk = self.risk_per_unit();
        if risk > Decimal::ZERO {
            self.profit_per_unit(price) / risk
        } else {
            Decimal::ZERO
        }
    }

    /// Whole days between creation and close, 0 while not closed
    pub fn held_days(&self) -> i64 {
        self.close_date
            .map(|closed| (closed - self.created_at).num_days())
            .unwrap_or(0)
    }
}

/// Fields supplied when creating a trade
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrade {
    pub symbol: String,
    pub product: ProductVariant,
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub units: u64,
    pub investment: Decimal,
    pub exposure: Decimal,
    pub risk_amount: Decimal,
    pub target_1r: Decimal,
    pub target_2r: Decimal,
    pub target_5r: Decimal,
    pub leverage: Decimal,
    pub spread_percent: Decimal,
    pub overnight_percent: Decimal,
    pub holding_days: u32,
    pub status: TradeStatus,
}

impl NewTrade {
    /// Build from a setup and its sizing result; the risk amount is the
    /// sizer's max risk
    pub fn from_sizing(
        symbol: impl Into<String>,
        setup: &TradeSetup,
        sizing: &SizingResult,
        status: TradeStatus,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            product: sizing.product,
            entry_price: sizing.entry_price,
            stop_loss: sizing.stop_loss,
            units: sizing.units,
            investment: sizing.actual_investment,
            exposure: sizing.notional_value,
            risk_amount: sizing.max_risk,
            target_1r: sizing.target_1r,
            target_2r: sizing.target_2r,
            target_5r: sizing.target_5r,
            leverage: sizing.leverage,
            spread_percent: setup.spread_percent,
            overnight_percent: setup.overnight_percent,
            holding_days: setup.holding_days,
            status,
        }
    }
}

/// Restricted update of a trade's mutable fields
///
/// Fields fixed at creation are not representable here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeUpdate {
    pub current_stop: Option<Decimal>,
    pub units: Option<u64>,
    pub status: Option<TradeStatus>,
    pub close_price: Option<Decimal>,
    pub close_date: Option<DateTime<Utc>>,
    pub final_pnl: Option<Decimal>,
    pub final_r_multiple: Option<Decimal>,
}

impl TradeUpdate {
    /// Move the current stop
    pub fn stop(current_stop: Decimal) -> Self {
        Self {
            current_stop: Some(current_stop),
            ..Self::default()
        }
    }

    /// Change the status
    pub fn status(status: TradeStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
