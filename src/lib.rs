//! trade-sizer: risk-based position sizing and trade journal
//!
//! This library provides the core components for:
//! - Position sizing for spot, CFD and knockout products with spread and
//!   overnight financing costs
//! - Partial exits with R-multiple tracking and break-even stop moves
//! - An in-memory trade ledger with portfolio metrics
//! - JSON backup and CSV export of the ledger
//! - Structured logging and ledger metrics

pub mod cli;
pub mod config;
pub mod exit;
pub mod export;
pub mod format;
pub mod risk;
pub mod telemetry;
pub mod trade;
