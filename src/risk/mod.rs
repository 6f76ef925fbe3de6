//! Risk management module
//!
//! Position sizing, product variants and account cash checks

mod account;
mod sizing;
mod types;

pub use account::Account;
pub use sizing::{size, PositionSizer, SizingResult, TradeSetup};
pub use types::{ProductVariant, SizingError};
