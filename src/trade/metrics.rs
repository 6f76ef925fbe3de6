//! Portfolio-level rollups over the ledger

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use super::types::{Trade, TradeStatus};

/// Aggregated portfolio metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PortfolioMetrics {
    /// Total number of trades in the ledger
    pub total_trades: usize,
    pub planned_trades: usize,
    pub open_trades: usize,
    pub closed_trades: usize,
    /// Cash invested in open trades
    pub total_investment: Decimal,
    /// Notional exposure of open trades
    pub total_exposure: Decimal,
    /// Risk budget committed to open trades
    pub total_risk: Decimal,
    /// Sum of final P&L over closed trades
    pub realized_pnl: Decimal,
    /// Fraction of closed trades with positive final P&L (0..=1)
    pub win_rate: Decimal,
    /// Mean final R-multiple over closed trades that have one
    pub avg_r_multiple: Decimal,
}

impl PortfolioMetrics {
    /// Aggregate over a set of trades
    pub fn from_trades<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Self {
        let mut metrics = PortfolioMetrics::default();
        let mut winners = 0usize;
        let mut r_sum = Decimal::ZERO;
        let mut r_count = 0usize;

        for trade in trades {
            metrics.total_trades += 1;
            match trade.status {
                TradeStatus::Planned => metrics.planned_trades += 1,
                TradeStatus::Open => {
                    metrics.open_trades += 1;
                    metrics.total_investment += trade.investment;
                    metrics.total_exposure += trade.exposure;
                    metrics.total_risk += trade.risk_amount;
                }
                TradeStatus::Closed => {
                    metrics.closed_trades += 1;
                    let pnl = trade.final_pnl.unwrap_or(Decimal::ZERO);
                    metrics.realized_pnl += pnl;
                    if pnl > Decimal::ZERO {
                        winners += 1;
                    }
                    if let Some(r) = trade.final_r_multiple {
                        r_sum += r;
                        r_count += 1;
                    }
                }
            }
        }

        if metrics.closed_trades > 0 {
            metrics.win_rate = Decimal::from(winners) / Decimal::from(metrics.closed_trades);
        }
        if r_count > 0 {
            metrics.avg_r_multiple = r_sum / Decimal::from(r_count);
        }
        metrics
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               PORTFOLIO
══════════════════════════════════════════════════════

TRADES
───────────────────────────────────────────────────────
Total:            {}
Planned:          {}
Open:             {}
Closed:           {}

OPEN POSITIONS
───────────────────────────────────────────────────────
Investment:       {:.2}
Exposure:         {:.2}
Risk:             {:.2}

PERFORMANCE
───────────────────────────────────────────────────────
Realized P&L:     {:+.2}
Win Rate:         {:.1}%
Avg R-Multiple:   {:.2}R
══════════════════════════════════════════════════════
"#,
            self.total_trades,
            self.planned_trades,
            self.open_trades,
            self.closed_trades,
            self.total_investment,
            self.total_exposure,
            self.total_risk,
            self.realized_pnl,
            self.win_rate * dec!(100),
            self.avg_r_multiple,
        )
    }
}
