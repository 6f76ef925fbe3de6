//! Trade ledger
//!
//! Owns every trade by id. Lookups against unknown ids report absence as
//! `Option`/`bool` rather than errors.

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use uuid::Uuid;

use super::metrics::PortfolioMetrics;
use super::types::{NewTrade, Trade, TradeId, TradeStatus, TradeUpdate};
use crate::risk::ProductVariant;
use crate::telemetry::{self, CounterMetric};

/// Full ledger contents keyed by trade id
pub type LedgerSnapshot = BTreeMap<TradeId, Trade>;

/// Snapshot import errors
#[derive(Debug, Error)]
pub enum ImportError {
    /// Document is not valid JSON or does not match the trade schema
    #[error("Failed to parse backup: {0}")]
    Parse(#[from] serde_json::Error),
    /// Document has no top-level `trades` key
    #[error("Backup has no 'trades' key")]
    MissingTrades,
    /// Format version is newer than this build understands
    #[error("Unsupported backup format version: {0}")]
    UnsupportedVersion(String),
    /// A trade violates a ledger invariant
    #[error("Invalid trade {id}: {reason}")]
    InvalidTrade { id: TradeId, reason: String },
}

/// In-memory registry of trades
#[derive(Debug, Default)]
pub struct TradeLedger {
    trades: HashMap<TradeId, Trade>,
}

impl TradeLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            trades: HashMap::new(),
        }
    }

    /// Create a trade and return its id
    pub fn create(&mut self, new: NewTrade) -> TradeId {
        let trade = Trade {
            id: Uuid::new_v4(),
            symbol: new.symbol,
            created_at: Utc::now(),
            status: new.status,
            product: new.product,
            entry_price: new.entry_price,
            stop_loss: new.stop_loss,
            leverage: new.leverage,
            spread_percent: new.spread_percent,
            overnight_percent: new.overnight_percent,
            holding_days: new.holding_days,
            original_units: new.units,
            investment: new.investment,
            exposure: new.exposure,
            risk_amount: new.risk_amount,
            target_1r: new.target_1r,
            target_2r: new.target_2r,
            target_5r: new.target_5r,
            current_stop: new.stop_loss,
            units: new.units,
            partial_sales: vec![],
            total_realized_pnl: Decimal::ZERO,
            close_price: None,
            close_date: None,
            final_pnl: None,
            final_r_multiple: None,
        };

        let id = trade.id;
        tracing::info!(
            trade_id = %id,
            symbol = %trade.symbol,
            product = %trade.product,
            status = %trade.status,
            units = trade.units,
            "Trade created"
        );
        telemetry::increment(CounterMetric::TradesCreated);
        self.trades.insert(id, trade);
        id
    }

    /// Look up a trade
    pub fn get(&self, id: TradeId) -> Option<&Trade> {
        self.trades.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TradeId) -> Option<&mut Trade> {
        self.trades.get_mut(&id)
    }

    /// Apply a restricted update; false if the id is unknown or the status
    /// change is not allowed
    ///
    /// A unit count above the current remaining units is ignored. Driving
    /// units to zero closes the trade. A closed trade cannot be reopened, a
    /// trade with partial sales cannot go back to planned, and closing with
    /// units left goes through [`TradeLedger::close`] instead. A rejected
    /// update changes nothing.
    pub fn update(&mut self, id: TradeId, update: TradeUpdate) -> bool {
        let Some(trade) = self.trades.get_mut(&id) else {
            return false;
        };

        if let Some(status) = update.status {
            let units_after = match update.units {
                Some(units) if units <= trade.units => units,
                _ => trade.units,
            };
            if let Err(reason) = check_transition(trade, status, units_after) {
                tracing::warn!(
                    trade_id = %id,
                    from = %trade.status,
                    to = %status,
                    reason,
                    "Rejecting status change"
                );
                return false;
            }
        }

        if let Some(stop) = update.current_stop {
            trade.current_stop = stop;
        }
        if let Some(units) = update.units {
            if units > trade.units {
                tracing::warn!(
                    trade_id = %id,
                    current = trade.units,
                    requested = units,
                    "Ignoring unit increase"
                );
            } else {
                trade.units = units;
            }
        }
        if let Some(status) = update.status {
            trade.status = status;
        }
        if let Some(price) = update.close_price {
            trade.close_price = Some(price);
        }
        if let Some(date) = update.close_date {
            trade.close_date = Some(date);
        }
        if let Some(pnl) = update.final_pnl {
            trade.final_pnl = Some(pnl);
        }
        if let Some(r) = update.final_r_multiple {
            trade.final_r_multiple = Some(r);
        }

        if trade.units == 0 && trade.status != TradeStatus::Closed {
            trade.status = TradeStatus::Closed;
            trade.close_date.get_or_insert_with(Utc::now);
            telemetry::increment(CounterMetric::TradesClosed);
        }

        tracing::debug!(trade_id = %id, status = %trade.status, "Trade updated");
        true
    }

    /// Close a trade at `close_price`, liquidating the remaining units
    ///
    /// With `compute_pnl` the final P&L is the realized P&L of partial sales
    /// plus the remaining units' move from entry, signed by direction.
    /// Returns false if the id is unknown or the trade is already closed.
    pub fn close(&mut self, id: TradeId, close_price: Decimal, compute_pnl: bool) -> bool {
        let Some(trade) = self.trades.get_mut(&id) else {
            return false;
        };
        if trade.status == TradeStatus::Closed {
            tracing::warn!(trade_id = %id, "Trade already closed");
            return false;
        }

        if compute_pnl {
            let final_pnl = trade.total_realized_pnl + trade.unrealized_pnl(close_price);
            let final_r = if trade.risk_amount > Decimal::ZERO {
                final_pnl / trade.risk_amount
            } else {
                Decimal::ZERO
            };
            trade.final_pnl = Some(final_pnl);
            trade.final_r_multiple = Some(final_r);
        }

        trade.status = TradeStatus::Closed;
        trade.close_price = Some(close_price);
        trade.close_date = Some(Utc::now());
        trade.units = 0;

        tracing::info!(
            trade_id = %id,
            symbol = %trade.symbol,
            close_price = %close_price,
            final_pnl = ?trade.final_pnl,
            "Trade closed"
        );
        telemetry::increment(CounterMetric::TradesClosed);
        true
    }

    /// Remove a trade
    pub fn delete(&mut self, id: TradeId) -> bool {
        let removed = self.trades.remove(&id).is_some();
        if removed {
            tracing::info!(trade_id = %id, "Trade deleted");
            telemetry::increment(CounterMetric::TradesDeleted);
        }
        removed
    }

    /// All trades ordered by creation time
    pub fn list_all(&self) -> Vec<&Trade> {
        let mut trades: Vec<&Trade> = self.trades.values().collect();
        trades.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        trades
    }

    /// Trades with the given status
    pub fn by_status(&self, status: TradeStatus) -> Vec<&Trade> {
        self.list_all()
            .into_iter()
            .filter(|t| t.status == status)
            .collect()
    }

    /// Trades of the given product variant
    pub fn by_product(&self, product: ProductVariant) -> Vec<&Trade> {
        self.list_all()
            .into_iter()
            .filter(|t| t.product == product)
            .collect()
    }

    pub fn planned_trades(&self) -> Vec<&Trade> {
        self.by_status(TradeStatus::Planned)
    }

    pub fn open_trades(&self) -> Vec<&Trade> {
        self.by_status(TradeStatus::Open)
    }

    pub fn closed_trades(&self) -> Vec<&Trade> {
        self.by_status(TradeStatus::Closed)
    }

    /// Number of trades
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Portfolio rollup over the current contents
    pub fn metrics(&self) -> PortfolioMetrics {
        let metrics = PortfolioMetrics::from_trades(self.trades.values());
        telemetry::publish_portfolio(&metrics);
        metrics
    }

    /// Copy of the full ledger contents
    pub fn export_snapshot(&self) -> LedgerSnapshot {
        self.trades
            .iter()
            .map(|(id, trade)| (*id, trade.clone()))
            .collect()
    }

    /// Replace the ledger contents wholesale
    ///
    /// Every trade is validated first; on error the ledger is unchanged.
    pub fn import_snapshot(&mut self, snapshot: LedgerSnapshot) -> Result<usize, ImportError> {
        for (key, trade) in &snapshot {
            validate_trade(*key, trade)?;
        }

        let count = snapshot.len();
        self.trades = snapshot.into_iter().collect();
        tracing::info!(trades = count, "Ledger imported");
        Ok(count)
    }
}

fn check_transition(
    trade: &Trade,
    status: TradeStatus,
    units_after: u64,
) -> Result<(), &'static str> {
    match (trade.status, status) {
        (TradeStatus::Closed, TradeStatus::Closed) => Ok(()),
        (TradeStatus::Closed, _) => Err("closed trades cannot be reopened"),
        (_, TradeStatus::Planned) if !trade.partial_sales.is_empty() => {
            Err("trade with partial sales cannot be planned")
        }
        (_, TradeStatus::Closed) if units_after > 0 => Err("remaining units must be closed out"),
        _ => Ok(()),
    }
}

fn validate_trade(key: TradeId, trade: &Trade) -> Result<(), ImportError> {
    let invalid = |reason: &str| ImportError::InvalidTrade {
        id: key,
        reason: reason.to_string(),
    };

    if trade.id != key {
        return Err(invalid("map key does not match trade id"));
    }
    if trade.units > trade.original_units {
        return Err(invalid("remaining units exceed original units"));
    }
    match trade.status {
        TradeStatus::Planned if !trade.partial_sales.is_empty() => {
            Err(invalid("planned trade has partial sales"))
        }
        TradeStatus::Closed if trade.units != 0 => Err(invalid("closed trade has remaining units")),
        TradeStatus::Planned | TradeStatus::Open if trade.units == 0 => {
            Err(invalid("trade without remaining units is not closed"))
        }
        _ => Ok(()),
    }
}
