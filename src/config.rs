//! Configuration types for trade-sizer

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

use crate::risk::ProductVariant;
use crate::telemetry::LogFormat;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Account the sizer risks against
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// Total portfolio value
    #[serde(default = "default_portfolio_value")]
    pub portfolio_value: Decimal,

    /// Percent of the portfolio risked per trade (1 = 1%)
    #[serde(default = "default_risk_percent")]
    pub risk_percent: Decimal,

    /// Cash available for new positions
    #[serde(default = "default_portfolio_value")]
    pub cash_available: Decimal,
}

fn default_portfolio_value() -> Decimal {
    Decimal::new(50_000, 0)
}
fn default_risk_percent() -> Decimal {
    Decimal::ONE
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            portfolio_value: default_portfolio_value(),
            risk_percent: default_risk_percent(),
            cash_available: default_portfolio_value(),
        }
    }
}

/// Product parameters used when the command line leaves them out
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub product: ProductVariant,

    #[serde(default = "default_leverage")]
    pub leverage: Decimal,

    /// Round-trip spread in percent of the entry price
    #[serde(default)]
    pub spread_percent: Decimal,

    /// Daily financing in percent of notional
    #[serde(default)]
    pub overnight_percent: Decimal,

    #[serde(default = "default_holding_days")]
    pub holding_days: u32,
}

fn default_leverage() -> Decimal {
    Decimal::ONE
}
fn default_holding_days() -> u32 {
    1
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            product: ProductVariant::default(),
            leverage: default_leverage(),
            spread_percent: Decimal::ZERO,
            overnight_percent: Decimal::ZERO,
            holding_days: default_holding_days(),
        }
    }
}

/// Trade journal location
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_journal_path")]
    pub path: PathBuf,
}

fn default_journal_path() -> PathBuf {
    PathBuf::from("trades.json")
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: default_journal_path(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
