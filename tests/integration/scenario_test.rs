//! End-to-end sizing and trade lifecycle scenarios

use rust_decimal_macros::dec;
use trade_sizer::exit::apply_exit;
use trade_sizer::risk::{PositionSizer, ProductVariant, TradeSetup};
use trade_sizer::trade::{NewTrade, TradeLedger, TradeStatus};

fn sizer() -> PositionSizer {
    PositionSizer::new(dec!(50000), dec!(1)).unwrap()
}

#[test]
fn test_spot_long() {
    let setup = TradeSetup::new(dec!(120), dec!(115), ProductVariant::Spot);
    let result = sizer().size(&setup).unwrap();

    assert_eq!(result.max_risk, dec!(500));
    assert_eq!(result.units, 100);
    assert_eq!(result.actual_investment, dec!(12000));
    assert_eq!(result.notional_value, dec!(12000));
    assert_eq!(result.target_1r, dec!(125));
    assert_eq!(result.target_2r, dec!(130));
    assert_eq!(result.target_5r, dec!(145));
    assert_eq!(result.total_cost, dec!(500));
}

#[test]
fn test_cfd_long_with_costs() {
    let setup = TradeSetup::new(dec!(120), dec!(115), ProductVariant::CfdLong)
        .with_leverage(dec!(5))
        .with_spread_percent(dec!(0.2))
        .with_overnight_percent(dec!(0.01))
        .with_holding_days(10);
    let result = sizer().size(&setup).unwrap();

    assert!(result.units < 100);
    assert_eq!(result.total_risk_per_unit, dec!(25.36));
    assert_eq!(result.units, 19);
    assert!(result.overnight_cost_total > dec!(0));
    assert_eq!(result.notional_value, result.actual_investment * dec!(5));
    assert_eq!(
        result.total_cost,
        result.basis_risk_total + result.spread_cost_total + result.overnight_cost_total
    );
}

#[test]
fn test_cfd_short_targets() {
    let setup =
        TradeSetup::new(dec!(120), dec!(125), ProductVariant::CfdShort).with_leverage(dec!(5));
    let result = sizer().size(&setup).unwrap();

    assert!(result.is_short);
    assert_eq!(result.target_1r, dec!(115));
    assert_eq!(result.target_2r, dec!(110));
    assert_eq!(result.target_5r, dec!(95));
}

#[test]
fn test_wrong_direction_rejected() {
    let setup = TradeSetup::new(dec!(120), dec!(125), ProductVariant::KnockoutLong);
    assert!(sizer().size(&setup).is_err());
}

#[test]
fn test_partial_exit_lifecycle() {
    let mut ledger = TradeLedger::new();
    let id = ledger.create(NewTrade {
        symbol: "ACME".to_string(),
        product: ProductVariant::Spot,
        entry_price: dec!(100),
        stop_loss: dec!(95),
        units: 100,
        investment: dec!(10000),
        exposure: dec!(10000),
        risk_amount: dec!(500),
        target_1r: dec!(105),
        target_2r: dec!(110),
        target_5r: dec!(125),
        leverage: dec!(1),
        spread_percent: dec!(0),
        overnight_percent: dec!(0),
        holding_days: 1,
        status: TradeStatus::Open,
    });

    let first = apply_exit(&mut ledger, id, dec!(25), dec!(125), true).unwrap();
    assert_eq!(first.units_sold, 25);
    assert_eq!(first.units_remaining, 75);
    assert_eq!(first.pnl, dec!(625));
    assert_eq!(first.r_multiple, dec!(5));

    let trade = ledger.get(id).unwrap();
    assert_eq!(trade.current_stop, dec!(100));
    assert_eq!(trade.status, TradeStatus::Open);

    let second = apply_exit(&mut ledger, id, dec!(100), dec!(130), true).unwrap();
    assert_eq!(second.units_sold, 75);
    assert_eq!(second.units_remaining, 0);

    let trade = ledger.get(id).unwrap();
    assert_eq!(trade.status, TradeStatus::Closed);
    assert_eq!(trade.final_pnl, Some(dec!(2875)));
    assert_eq!(trade.total_realized_pnl, dec!(2875));
    assert_eq!(trade.close_price, Some(dec!(130)));

    let metrics = ledger.metrics();
    assert_eq!(metrics.closed_trades, 1);
    assert_eq!(metrics.realized_pnl, dec!(2875));
    assert_eq!(metrics.win_rate, dec!(1));
}

#[test]
fn test_sized_trade_flows_into_ledger() {
    let setup = TradeSetup::new(dec!(120), dec!(115), ProductVariant::Spot);
    let result = sizer().size(&setup).unwrap();

    let mut ledger = TradeLedger::new();
    let id = ledger.create(NewTrade::from_sizing("NVDA", &setup, &result, TradeStatus::Planned));
    let trade = ledger.get(id).unwrap();

    assert_eq!(trade.units, 100);
    assert_eq!(trade.original_units, 100);
    assert_eq!(trade.current_stop, dec!(115));
    assert_eq!(trade.risk_amount, dec!(500));
    assert!(apply_exit(&mut ledger, id, dec!(50), dec!(125), true).is_err());
}
