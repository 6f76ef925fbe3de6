//! Risk management types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tradeable product variant
///
/// The variant fixes the trade direction and which cost components apply:
/// leverage and spread for everything except spot, overnight financing for
/// CFDs only.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProductVariant {
    /// Unleveraged cash position
    #[default]
    Spot,
    /// Contract for difference, long
    CfdLong,
    /// Contract for difference, short
    CfdShort,
    /// Knockout certificate, long
    KnockoutLong,
    /// Knockout certificate, short
    KnockoutShort,
}

impl ProductVariant {
    /// All variants in display order
    pub const ALL: [ProductVariant; 5] = [
        ProductVariant::Spot,
        ProductVariant::CfdLong,
        ProductVariant::CfdShort,
        ProductVariant::KnockoutLong,
        ProductVariant::KnockoutShort,
    ];

    /// Whether the position profits from falling prices
    pub fn is_short(self) -> bool {
        match self {
            ProductVariant::Spot | ProductVariant::CfdLong | ProductVariant::KnockoutLong => false,
            ProductVariant::CfdShort | ProductVariant::KnockoutShort => true,
        }
    }

    /// Whether leverage and spread costs apply
    pub fn is_leveraged(self) -> bool {
        match self {
            ProductVariant::Spot => false,
            ProductVariant::CfdLong
            | ProductVariant::CfdShort
            | ProductVariant::KnockoutLong
            | ProductVariant::KnockoutShort => true,
        }
    }

    /// Whether overnight financing is charged while holding
    pub fn has_overnight_financing(self) -> bool {
        match self {
            ProductVariant::CfdLong | ProductVariant::CfdShort => true,
            ProductVariant::Spot | ProductVariant::KnockoutLong | ProductVariant::KnockoutShort => {
                false
            }
        }
    }

    /// Serialized tag, e.g. `cfd_long`
    pub fn tag(self) -> &'static str {
        match self {
            ProductVariant::Spot => "spot",
            ProductVariant::CfdLong => "cfd_long",
            ProductVariant::CfdShort => "cfd_short",
            ProductVariant::KnockoutLong => "knockout_long",
            ProductVariant::KnockoutShort => "knockout_short",
        }
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            ProductVariant::Spot => "Spot",
            ProductVariant::CfdLong => "CFD Long",
            ProductVariant::CfdShort => "CFD Short",
            ProductVariant::KnockoutLong => "Knockout Long",
            ProductVariant::KnockoutShort => "Knockout Short",
        }
    }
}

impl fmt::Display for ProductVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ProductVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductVariant::ALL
            .into_iter()
            .find(|p| p.tag() == s)
            .ok_or_else(|| {
                format!(
                    "unknown product type '{s}' (expected one of: spot, cfd_long, cfd_short, knockout_long, knockout_short)"
                )
            })
    }
}

/// Sizing errors
#[derive(Debug, Error, PartialEq)]
pub enum SizingError {
    /// A numeric input is out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Entry and stop are ordered the wrong way for the product direction
    #[error("Invalid direction for {product}: entry {entry}, stop {stop}")]
    InvalidDirection {
        product: ProductVariant,
        entry: Decimal,
        stop: Decimal,
    },
    /// Total risk per unit is not positive
    #[error("Degenerate risk per unit: {0}")]
    DegenerateRisk(Decimal),
}
