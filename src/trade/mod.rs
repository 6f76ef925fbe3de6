//! Trade lifecycle module
//!
//! Trade entities, the ledger that owns them, and portfolio rollups

mod ledger;
mod metrics;
mod types;

pub use ledger::{ImportError, LedgerSnapshot, TradeLedger};
pub use metrics::PortfolioMetrics;
pub use types::{NewTrade, PartialSaleRecord, Trade, TradeId, TradeStatus, TradeUpdate};
