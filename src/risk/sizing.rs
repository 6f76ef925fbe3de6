//! Position sizing
//!
//! Converts a trade setup (entry, stop, product, leverage and cost
//! assumptions) into a unit count such that a stop-out loses at most the
//! configured share of the portfolio. Unit counts are floored, so realized
//! risk never exceeds the budget.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::types::{ProductVariant, SizingError};
use crate::config::AccountConfig;

const HUNDRED: Decimal = dec!(100);

/// Entry/stop setup plus product parameters for a single sizing request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeSetup {
    /// Planned entry price
    pub entry_price: Decimal,
    /// Initial stop-loss price
    pub stop_loss: Decimal,
    /// Product variant
    pub product: ProductVariant,
    /// Leverage factor (ignored for spot)
    pub leverage: Decimal,
    /// Spread as percent of entry (ignored for spot)
    pub spread_percent: Decimal,
    /// Overnight financing as percent of entry per day (CFD only)
    pub overnight_percent: Decimal,
    /// Planned holding period in days
    pub holding_days: u32,
}

impl TradeSetup {
    /// Create a setup with leverage 1, no costs and a one day holding period
    pub fn new(entry_price: Decimal, stop_loss: Decimal, product: ProductVariant) -> Self {
        Self {
            entry_price,
            stop_loss,
            product,
            leverage: Decimal::ONE,
            spread_percent: Decimal::ZERO,
            overnight_percent: Decimal::ZERO,
            holding_days: 1,
        }
    }

    /// Set leverage
    pub fn with_leverage(mut self, leverage: Decimal) -> Self {
        self.leverage = leverage;
        self
    }

    /// Set spread percent
    pub fn with_spread_percent(mut self, spread_percent: Decimal) -> Self {
        self.spread_percent = spread_percent;
        self
    }

    /// Set overnight financing percent per day
    pub fn with_overnight_percent(mut self, overnight_percent: Decimal) -> Self {
        self.overnight_percent = overnight_percent;
        self
    }

    /// Set holding period
    pub fn with_holding_days(mut self, holding_days: u32) -> Self {
        self.holding_days = holding_days;
        self
    }
}

/// Result of a sizing calculation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizingResult {
    // Account
    pub portfolio_value: Decimal,
    pub max_risk: Decimal,
    pub risk_percent: Decimal,

    // Product
    pub product: ProductVariant,
    pub leverage: Decimal,
    pub is_short: bool,

    // Setup
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub basis_risk_per_unit: Decimal,
    pub total_risk_per_unit: Decimal,

    // Position
    pub units: u64,
    pub actual_investment: Decimal,
    pub notional_value: Decimal,
    pub portfolio_percentage: Decimal,

    // R-multiple targets
    pub target_1r: Decimal,
    pub target_2r: Decimal,
    pub target_5r: Decimal,

    // Cost breakdown
    pub basis_risk_total: Decimal,
    pub spread_cost_total: Decimal,
    pub overnight_cost_total: Decimal,
    pub total_cost: Decimal,
}

impl SizingResult {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               POSITION SIZE ({})
══════════════════════════════════════════════════════

ACCOUNT
───────────────────────────────────────────────────────
Portfolio:        {:.2}
Risk:             {:.2}% ({:.2})

POSITION
───────────────────────────────────────────────────────
Entry / Stop:     {} / {}
Leverage:         {}x
Units:            {}
Investment:       {:.2} ({:.1}% of portfolio)
Exposure:         {:.2}

TARGETS
───────────────────────────────────────────────────────
1R / 2R / 5R:     {:.2} / {:.2} / {:.2}

COSTS AT STOP
───────────────────────────────────────────────────────
Basis risk:       {:.2}
Spread:           {:.2}
Overnight:        {:.2}
Total:            {:.2}
══════════════════════════════════════════════════════
"#,
            self.product.label(),
            self.portfolio_value,
            self.risk_percent,
            self.max_risk,
            self.entry_price,
            self.stop_loss,
            self.leverage,
            self.units,
            self.actual_investment,
            self.portfolio_percentage,
            self.notional_value,
            self.target_1r,
            self.target_2r,
            self.target_5r,
            self.basis_risk_total,
            self.spread_cost_total,
            self.overnight_cost_total,
            self.total_cost,
        )
    }
}

/// Fixed fractional risk sizer
///
/// Holds the account side of the calculation (portfolio value and risk
/// percent); each call to [`PositionSizer::size`] is pure.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    portfolio_value: Decimal,
    risk_percent: Decimal,
    max_risk: Decimal,
}

impl PositionSizer {
    /// Create a sizer risking `risk_percent` (0 < r <= 100) of `portfolio_value`
    pub fn new(portfolio_value: Decimal, risk_percent: Decimal) -> Result<Self, SizingError> {
        validate_account(portfolio_value, risk_percent)?;
        Ok(Self {
            portfolio_value,
            risk_percent,
            max_risk: max_risk(portfolio_value, risk_percent)?,
        })
    }

    /// Create from AccountConfig
    pub fn from_config(config: &AccountConfig) -> Result<Self, SizingError> {
        Self::new(config.portfolio_value, config.risk_percent)
    }

    /// Change the portfolio value, keeping the risk percent
    pub fn update_portfolio(&mut self, new_value: Decimal) -> Result<(), SizingError> {
        validate_account(new_value, self.risk_percent)?;
        self.max_risk = max_risk(new_value, self.risk_percent)?;
        self.portfolio_value = new_value;
        Ok(())
    }

    pub fn portfolio_value(&self) -> Decimal {
        self.portfolio_value
    }

    pub fn risk_percent(&self) -> Decimal {
        self.risk_percent
    }

    /// Maximum loss per trade in account currency
    pub fn max_risk(&self) -> Decimal {
        self.max_risk
    }

    /// Size a position for the given setup
    ///
    /// Arithmetic that leaves the decimal range is reported as
    /// [`SizingError::InvalidInput`].
    pub fn size(&self, setup: &TradeSetup) -> Result<SizingResult, SizingError> {
        validate_setup(setup)?;

        let product = setup.product;
        let entry = setup.entry_price;
        let is_short = product.is_short();
        let basis_risk = (entry - setup.stop_loss).abs();

        let (effective_risk, spread_per_unit, overnight_per_unit, leverage_used) =
            if product.is_leveraged() {
                let spread = div(mul(entry, setup.spread_percent)?, HUNDRED)?;
                let overnight = if product.has_overnight_financing() {
                    let daily = div(mul(entry, setup.overnight_percent)?, HUNDRED)?;
                    mul(daily, Decimal::from(setup.holding_days))?
                } else {
                    Decimal::ZERO
                };
                (mul(basis_risk, setup.leverage)?, spread, overnight, setup.leverage)
            } else {
                (basis_risk, Decimal::ZERO, Decimal::ZERO, Decimal::ONE)
            };

        let total_risk_per_unit = add(add(effective_risk, spread_per_unit)?, overnight_per_unit)?;
        if total_risk_per_unit <= Decimal::ZERO {
            return Err(SizingError::DegenerateRisk(total_risk_per_unit));
        }

        let units = div(self.max_risk, total_risk_per_unit)?
            .floor()
            .to_u64()
            .ok_or_else(out_of_range)?;
        let units_dec = Decimal::from(units);

        let actual_investment = mul(units_dec, entry)?;
        let notional_value = if product.is_leveraged() {
            mul(actual_investment, leverage_used)?
        } else {
            actual_investment
        };

        let sign = if is_short { -Decimal::ONE } else { Decimal::ONE };
        let target = |multiple: Decimal| -> Result<Decimal, SizingError> {
            add(entry, mul(sign, mul(multiple, basis_risk)?)?)
        };

        let basis_risk_total = mul(units_dec, basis_risk)?;
        let spread_cost_total = mul(units_dec, spread_per_unit)?;
        let overnight_cost_total = mul(units_dec, overnight_per_unit)?;

        let result = SizingResult {
            portfolio_value: self.portfolio_value,
            max_risk: self.max_risk,
            risk_percent: self.risk_percent,
            product,
            leverage: leverage_used,
            is_short,
            entry_price: entry,
            stop_loss: setup.stop_loss,
            basis_risk_per_unit: basis_risk,
            total_risk_per_unit,
            units,
            actual_investment,
            notional_value,
            portfolio_percentage: mul(div(actual_investment, self.portfolio_value)?, HUNDRED)?,
            target_1r: target(dec!(1))?,
            target_2r: target(dec!(2))?,
            target_5r: target(dec!(5))?,
            basis_risk_total,
            spread_cost_total,
            overnight_cost_total,
            total_cost: add(add(basis_risk_total, spread_cost_total)?, overnight_cost_total)?,
        };

        tracing::debug!(
            product = %product,
            units = result.units,
            total_risk_per_unit = %total_risk_per_unit,
            investment = %result.actual_investment,
            "Position sized"
        );

        Ok(result)
    }
}

/// One-shot sizing without keeping a sizer around
pub fn size(
    portfolio_value: Decimal,
    risk_percent: Decimal,
    setup: &TradeSetup,
) -> Result<SizingResult, SizingError> {
    PositionSizer::new(portfolio_value, risk_percent)?.size(setup)
}

fn out_of_range() -> SizingError {
    SizingError::InvalidInput("position size out of range".to_string())
}

fn mul(a: Decimal, b: Decimal) -> Result<Decimal, SizingError> {
    a.checked_mul(b).ok_or_else(out_of_range)
}

fn div(a: Decimal, b: Decimal) -> Result<Decimal, SizingError> {
    a.checked_div(b).ok_or_else(out_of_range)
}

fn add(a: Decimal, b: Decimal) -> Result<Decimal, SizingError> {
    a.checked_add(b).ok_or_else(out_of_range)
}

fn max_risk(portfolio_value: Decimal, risk_percent: Decimal) -> Result<Decimal, SizingError> {
    div(mul(portfolio_value, risk_percent)?, HUNDRED)
}

fn validate_account(portfolio_value: Decimal, risk_percent: Decimal) -> Result<(), SizingError> {
    if portfolio_value <= Decimal::ZERO {
        return Err(SizingError::InvalidInput(
            "portfolio value must be positive".to_string(),
        ));
    }
    if risk_percent <= Decimal::ZERO || risk_percent > HUNDRED {
        return Err(SizingError::InvalidInput(
            "risk percent must be in (0, 100]".to_string(),
        ));
    }
    Ok(())
}

fn validate_setup(setup: &TradeSetup) -> Result<(), SizingError> {
    if setup.entry_price <= Decimal::ZERO {
        return Err(SizingError::InvalidInput(
            "entry price must be positive".to_string(),
        ));
    }
    if setup.stop_loss <= Decimal::ZERO {
        return Err(SizingError::InvalidInput(
            "stop loss must be positive".to_string(),
        ));
    }
    if setup.leverage < Decimal::ONE {
        return Err(SizingError::InvalidInput(
            "leverage must be at least 1".to_string(),
        ));
    }
    // Spot ignores the cost parameters entirely
    if setup.product.is_leveraged() {
        if setup.spread_percent < Decimal::ZERO || setup.overnight_percent < Decimal::ZERO {
            return Err(SizingError::InvalidInput(
                "cost percentages must not be negative".to_string(),
            ));
        }
        if setup.holding_days == 0 {
            return Err(SizingError::InvalidInput(
                "holding days must be at least 1".to_string(),
            ));
        }
    }

    let direction_ok = if setup.product.is_short() {
        setup.entry_price < setup.stop_loss
    } else {
        setup.entry_price > setup.stop_loss
    };
    if !direction_ok {
        return Err(SizingError::InvalidDirection {
            product: setup.product,
            entry: setup.entry_price,
            stop: setup.stop_loss,
        });
    }
    Ok(())
}
