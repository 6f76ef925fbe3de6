//! Configuration loading

use rust_decimal_macros::dec;
use std::io::Write;
use trade_sizer::config::Config;
use trade_sizer::risk::{Account, PositionSizer, ProductVariant};
use trade_sizer::telemetry::LogFormat;

#[test]
fn test_config_example_loads() {
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example")).unwrap();
    assert_eq!(config.account.risk_percent, dec!(1));
    assert_eq!(config.defaults.product, ProductVariant::Spot);
    assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
}

#[test]
fn test_config_drives_sizer_and_account() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [account]
        portfolio_value = 20000
        risk_percent = 2
        cash_available = 8000

        [defaults]
        product = "knockout_short"
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    let sizer = PositionSizer::from_config(&config.account).unwrap();
    assert_eq!(sizer.max_risk(), dec!(400));

    let account = Account::from_config(&config.account);
    assert_eq!(account.cash_available, dec!(8000));
    assert_eq!(config.defaults.product, ProductVariant::KnockoutShort);
    assert_eq!(config.defaults.holding_days, 1);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[account\nportfolio_value = ").unwrap();
    assert!(Config::load(file.path()).is_err());
}
