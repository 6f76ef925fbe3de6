//! Journal file, backup document and CSV export

use rust_decimal_macros::dec;
use trade_sizer::exit::{analyze, apply_exit, sale_rows};
use trade_sizer::export::{
    export_partial_sales_csv, export_performance_csv, export_trades_csv, load, parse_backup, save,
};
use trade_sizer::risk::{PositionSizer, ProductVariant, TradeSetup};
use trade_sizer::trade::{NewTrade, TradeLedger, TradeStatus};

fn populated_ledger() -> TradeLedger {
    let sizer = PositionSizer::new(dec!(50000), dec!(1)).unwrap();
    let mut ledger = TradeLedger::new();

    let long = TradeSetup::new(dec!(100), dec!(95), ProductVariant::Spot);
    let long_id = ledger.create(NewTrade::from_sizing(
        "AAPL",
        &long,
        &sizer.size(&long).unwrap(),
        TradeStatus::Open,
    ));

    let short = TradeSetup::new(dec!(200), dec!(210), ProductVariant::CfdShort)
        .with_leverage(dec!(2))
        .with_spread_percent(dec!(0.1));
    let short_id = ledger.create(NewTrade::from_sizing(
        "DAX",
        &short,
        &sizer.size(&short).unwrap(),
        TradeStatus::Open,
    ));

    let planned = TradeSetup::new(dec!(50), dec!(48), ProductVariant::KnockoutLong)
        .with_leverage(dec!(10));
    ledger.create(NewTrade::from_sizing(
        "SAP",
        &planned,
        &sizer.size(&planned).unwrap(),
        TradeStatus::Planned,
    ));

    apply_exit(&mut ledger, long_id, dec!(50), dec!(110), true).unwrap();
    apply_exit(&mut ledger, short_id, dec!(25), dec!(190), true).unwrap();
    ledger.close(short_id, dec!(185), true);
    ledger
}

#[test]
fn test_journal_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.json");
    let ledger = populated_ledger();

    save(&ledger, &path).unwrap();
    let reloaded = load(&path).unwrap();

    assert_eq!(reloaded.len(), 3);
    assert_eq!(reloaded.export_snapshot(), ledger.export_snapshot());
    assert_eq!(reloaded.metrics(), ledger.metrics());
}

#[test]
fn test_backup_document_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.json");
    save(&populated_ledger(), &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let trade = value["trades"].as_object().unwrap().values().next().unwrap();
    for key in [
        "id",
        "symbol",
        "createdAt",
        "status",
        "productType",
        "entryPrice",
        "stopLoss",
        "currentStop",
        "originalUnits",
        "riskAmount",
        "target1R",
        "target2R",
        "target5R",
        "partialSales",
        "totalRealizedPnl",
        "closePrice",
        "finalRMultiple",
    ] {
        assert!(trade.get(key).is_some(), "missing key {key}");
    }

    let doc = parse_backup(&text).unwrap();
    assert_eq!(doc.format_version, "1.0");
}

#[test]
fn test_corrupt_journal_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.json");
    std::fs::write(&path, "[]").unwrap();
    assert!(load(&path).is_err());
}

#[test]
fn test_csv_reports() {
    let ledger = populated_ledger();
    let trades = ledger.list_all();

    let trades_csv = export_trades_csv(trades.iter().copied()).unwrap();
    assert_eq!(trades_csv.lines().count(), 4);
    assert!(trades_csv.lines().next().unwrap().contains("partialSalesCount"));

    let sales_csv = export_partial_sales_csv(&sale_rows(trades.iter().copied())).unwrap();
    assert_eq!(sales_csv.lines().count(), 3);

    let perf_csv = export_performance_csv(trades.iter().copied()).unwrap();
    assert_eq!(perf_csv.lines().count(), 2);
    assert!(perf_csv.lines().nth(1).unwrap().starts_with("DAX,cfd_short"));
}

#[test]
fn test_analytics_over_ledger() {
    let ledger = populated_ledger();
    let analytics = analyze(ledger.list_all());

    assert_eq!(analytics.total_sales, 2);
    // long: +10 on a 5 stop, short: +10 on a 10 stop
    assert_eq!(analytics.r_distribution.one_to_two, 1);
    assert_eq!(analytics.r_distribution.two_to_five, 1);
    assert_eq!(analytics.avg_r_multiple, dec!(1.5));
}
