//! Exit management module
//!
//! Partial sales with break-even stop recommendations, and analytics over
//! the resulting sale history

mod analytics;
mod partial;

pub use analytics::{
    analyze, sale_rows, PartialSaleAnalytics, PercentageGroup, RDistribution, SaleRow,
};
pub use partial::{apply_exit, plan_exit, ExitError, ExitPlan};
