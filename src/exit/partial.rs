//! Partial exits
//!
//! `plan_exit` is pure over a trade snapshot; `apply_exit` commits a plan
//! to a trade held by the ledger.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::telemetry::{self, CounterMetric};
use crate::trade::{PartialSaleRecord, Trade, TradeId, TradeLedger, TradeStatus};

/// Partial exit errors
#[derive(Debug, Error, PartialEq)]
pub enum ExitError {
    /// Percentage or price out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// No trade with this id
    #[error("Trade not found: {0}")]
    TradeNotFound(TradeId),
    /// Trade is not open
    #[error("Trade {id} is {status}, not open")]
    TradeNotOpen { id: TradeId, status: TradeStatus },
    /// Floor of the requested percentage is zero units
    #[error("Selling {percent}% of {remaining} units is less than one unit")]
    NothingToSell { remaining: u64, percent: Decimal },
}

/// Effect of selling part of a position at a given price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitPlan {
    pub units_sold: u64,
    pub units_remaining: u64,
    pub proceeds: Decimal,
    pub pnl: Decimal,
    /// R-multiple against the original entry and stop
    pub r_multiple: Decimal,
    pub sale_price: Decimal,
    pub percentage: Decimal,
    /// Whether to move the stop to break-even
    pub should_move_stop: bool,
    pub recommended_stop: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl ExitPlan {
    fn to_record(&self) -> PartialSaleRecord {
        PartialSaleRecord {
            date: self.timestamp,
            units_sold: self.units_sold,
            price: self.sale_price,
            proceeds: self.proceeds,
            pnl: self.pnl,
            r_multiple: self.r_multiple,
            percentage: self.percentage,
        }
    }
}

/// Compute the effect of selling `sell_percent` of the remaining units
pub fn plan_exit(
    trade: &Trade,
    sell_percent: Decimal,
    current_price: Decimal,
) -> Result<ExitPlan, ExitError> {
    if sell_percent <= Decimal::ZERO || sell_percent > Decimal::ONE_HUNDRED {
        return Err(ExitError::InvalidInput(
            "sell percent must be in (0, 100]".to_string(),
        ));
    }
    if current_price <= Decimal::ZERO {
        return Err(ExitError::InvalidInput(
            "price must be positive".to_string(),
        ));
    }

    let units_sold = (Decimal::from(trade.units) * sell_percent / Decimal::ONE_HUNDRED)
        .floor()
        .to_u64()
        .unwrap_or(0)
        .min(trade.units);
    let units_remaining = trade.units - units_sold;
    let sold = Decimal::from(units_sold);

    let pnl = sold * trade.profit_per_unit(current_price);
    let r_multiple = trade.current_r_multiple(current_price);

    // Break-even once the slice is in profit, at any R
    let should_move_stop = r_multiple > Decimal::ZERO && trade.current_stop != trade.entry_price;
    let recommended_stop = if should_move_stop {
        trade.entry_price
    } else {
        trade.current_stop
    };

    Ok(ExitPlan {
        units_sold,
        units_remaining,
        proceeds: sold * current_price,
        pnl,
        r_multiple,
        sale_price: current_price,
        percentage: sell_percent,
        should_move_stop,
        recommended_stop,
        timestamp: Utc::now(),
    })
}

/// Plan and commit a partial exit on an open trade
///
/// Selling the last units closes the trade with the cumulative realized P&L
/// and the final slice's R-multiple.
pub fn apply_exit(
    ledger: &mut TradeLedger,
    id: TradeId,
    sell_percent: Decimal,
    current_price: Decimal,
    auto_move_stop: bool,
) -> Result<ExitPlan, ExitError> {
    let trade = ledger.get_mut(id).ok_or(ExitError::TradeNotFound(id))?;
    if trade.status != TradeStatus::Open {
        return Err(ExitError::TradeNotOpen {
            id,
            status: trade.status,
        });
    }

    let plan = plan_exit(trade, sell_percent, current_price)?;
    if plan.units_sold == 0 {
        return Err(ExitError::NothingToSell {
            remaining: trade.units,
            percent: sell_percent,
        });
    }

    trade.partial_sales.push(plan.to_record());
    trade.units = plan.units_remaining;
    trade.total_realized_pnl += plan.pnl;
    if auto_move_stop && plan.should_move_stop {
        trade.current_stop = plan.recommended_stop;
    }

    tracing::info!(
        trade_id = %id,
        units_sold = plan.units_sold,
        units_remaining = plan.units_remaining,
        pnl = %plan.pnl,
        r_multiple = %plan.r_multiple,
        "Partial sale applied"
    );
    telemetry::increment(CounterMetric::PartialSales);

    if trade.units == 0 {
        trade.status = TradeStatus::Closed;
        trade.close_price = Some(current_price);
        trade.close_date = Some(plan.timestamp);
        trade.final_pnl = Some(trade.total_realized_pnl);
        trade.final_r_multiple = Some(plan.r_multiple);

        tracing::info!(
            trade_id = %id,
            final_pnl = %trade.total_realized_pnl,
            "Trade closed by partial sales"
        );
        telemetry::increment(CounterMetric::TradesClosed);
    }

    Ok(plan)
}
