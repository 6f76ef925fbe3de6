//! Ledger counters and portfolio gauges
//!
//! Published through the `metrics` facade. Without an installed recorder
//! these calls are no-ops.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::trade::PortfolioMetrics;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Trades created in the ledger
    TradesCreated,
    /// Trades transitioned to closed
    TradesClosed,
    /// Partial sales applied
    PartialSales,
    /// Trades removed from the ledger
    TradesDeleted,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Open trade count
    OpenTrades,
    /// Investment in open trades
    TotalInvestment,
    /// Notional exposure of open trades
    TotalExposure,
    /// Risk committed to open trades
    TotalRisk,
    /// Realized P&L of closed trades
    RealizedPnl,
    /// Closed trade win rate
    WinRate,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::TradesCreated => "tradesizer_trades_created_total",
            CounterMetric::TradesClosed => "tradesizer_trades_closed_total",
            CounterMetric::PartialSales => "tradesizer_partial_sales_total",
            CounterMetric::TradesDeleted => "tradesizer_trades_deleted_total",
        }
    }
}

impl GaugeMetric {
    fn name(self) -> &'static str {
        match self {
            GaugeMetric::OpenTrades => "tradesizer_open_trades",
            GaugeMetric::TotalInvestment => "tradesizer_total_investment",
            GaugeMetric::TotalExposure => "tradesizer_total_exposure",
            GaugeMetric::TotalRisk => "tradesizer_total_risk",
            GaugeMetric::RealizedPnl => "tradesizer_realized_pnl",
            GaugeMetric::WinRate => "tradesizer_win_rate",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    metrics::counter!(metric.name()).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: Decimal) {
    let value = value.to_f64().unwrap_or_default();
    tracing::trace!(metric = metric.name(), value, "Setting gauge");
    metrics::gauge!(metric.name()).set(value);
}

/// Publish a full set of portfolio gauges
pub fn publish_portfolio(portfolio: &PortfolioMetrics) {
    set_gauge(GaugeMetric::OpenTrades, Decimal::from(portfolio.open_trades));
    set_gauge(GaugeMetric::TotalInvestment, portfolio.total_investment);
    set_gauge(GaugeMetric::TotalExposure, portfolio.total_exposure);
    set_gauge(GaugeMetric::TotalRisk, portfolio.total_risk);
    set_gauge(GaugeMetric::RealizedPnl, portfolio.realized_pnl);
    set_gauge(GaugeMetric::WinRate, portfolio.win_rate);
}
