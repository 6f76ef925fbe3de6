//! Property tests for sizing and exit invariants
//!
//! Uses proptest to verify:
//! 1. Risk bound: a stop-out never costs more than the risk budget
//! 2. Spot equivalence: spot ignores leverage and cost parameters
//! 3. Direction symmetry: mirrored long/short setups size identically
//! 4. Leverage scaling: per-unit risk and notional scale with leverage
//! 5. Knockouts carry no overnight financing
//! 6. Targets are ordered away from the stop
//! 7. Partial sales conserve units and P&L
//! 8. Sale R-multiples do not depend on the trailing stop
//! 9. Backup round trip reproduces the ledger

use proptest::prelude::*;
use rust_decimal::Decimal;
use trade_sizer::exit::{apply_exit, plan_exit, ExitError};
use trade_sizer::export::{export_json, import_json};
use trade_sizer::risk::{PositionSizer, ProductVariant, TradeSetup};
use trade_sizer::trade::{NewTrade, TradeLedger, TradeStatus, TradeUpdate};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_portfolio() -> impl Strategy<Value = Decimal> {
    (1_000i64..1_000_000).prop_map(Decimal::from)
}

fn arb_risk_percent() -> impl Strategy<Value = Decimal> {
    (1i64..=500).prop_map(|bp| Decimal::new(bp, 2))
}

/// Entry price and a stop distance smaller than the entry, in cents
fn arb_entry_and_distance() -> impl Strategy<Value = (Decimal, Decimal)> {
    (200i64..100_000).prop_flat_map(|entry| {
        (Just(entry), 1i64..entry / 2)
            .prop_map(|(entry, dist)| (Decimal::new(entry, 2), Decimal::new(dist, 2)))
    })
}

fn arb_leverage() -> impl Strategy<Value = Decimal> {
    (1i64..=30).prop_map(Decimal::from)
}

fn arb_cost_percent() -> impl Strategy<Value = Decimal> {
    (0i64..=100).prop_map(|bp| Decimal::new(bp, 2))
}

fn arb_leveraged_long() -> impl Strategy<Value = ProductVariant> {
    prop_oneof![Just(ProductVariant::CfdLong), Just(ProductVariant::KnockoutLong)]
}

fn mirror(product: ProductVariant) -> ProductVariant {
    match product {
        ProductVariant::CfdLong => ProductVariant::CfdShort,
        ProductVariant::KnockoutLong => ProductVariant::KnockoutShort,
        other => other,
    }
}

fn open_trade(ledger: &mut TradeLedger, entry: Decimal, stop: Decimal, units: u64) -> uuid::Uuid {
    let units_dec = Decimal::from(units);
    ledger.create(NewTrade {
        symbol: "PROP".to_string(),
        product: ProductVariant::Spot,
        entry_price: entry,
        stop_loss: stop,
        units,
        investment: entry * units_dec,
        exposure: entry * units_dec,
        risk_amount: (entry - stop) * units_dec,
        target_1r: entry + (entry - stop),
        target_2r: entry + (entry - stop) * Decimal::TWO,
        target_5r: entry + (entry - stop) * Decimal::from(5),
        leverage: Decimal::ONE,
        spread_percent: Decimal::ZERO,
        overnight_percent: Decimal::ZERO,
        holding_days: 1,
        status: TradeStatus::Open,
    })
}

proptest! {
    #[test]
    fn risk_never_exceeds_budget(
        portfolio in arb_portfolio(),
        risk in arb_risk_percent(),
        (entry, dist) in arb_entry_and_distance(),
        product in arb_leveraged_long(),
        leverage in arb_leverage(),
        spread in arb_cost_percent(),
        overnight in arb_cost_percent(),
        days in 1u32..60,
    ) {
        let sizer = PositionSizer::new(portfolio, risk).unwrap();
        let setup = TradeSetup::new(entry, entry - dist, product)
            .with_leverage(leverage)
            .with_spread_percent(spread)
            .with_overnight_percent(overnight)
            .with_holding_days(days);
        let result = sizer.size(&setup).unwrap();

        prop_assert!(Decimal::from(result.units) * result.total_risk_per_unit <= result.max_risk);
        prop_assert!(
            Decimal::from(result.units + 1) * result.total_risk_per_unit > result.max_risk
        );
        prop_assert_eq!(
            result.total_cost,
            result.basis_risk_total + result.spread_cost_total + result.overnight_cost_total
        );
    }

    #[test]
    fn spot_ignores_product_parameters(
        (entry, dist) in arb_entry_and_distance(),
        leverage in arb_leverage(),
        spread in arb_cost_percent(),
        overnight in arb_cost_percent(),
    ) {
        let sizer = PositionSizer::new(Decimal::from(50_000), Decimal::ONE).unwrap();
        let plain = sizer
            .size(&TradeSetup::new(entry, entry - dist, ProductVariant::Spot))
            .unwrap();
        let loaded = sizer
            .size(
                &TradeSetup::new(entry, entry - dist, ProductVariant::Spot)
                    .with_leverage(leverage)
                    .with_spread_percent(spread)
                    .with_overnight_percent(overnight)
                    .with_holding_days(30),
            )
            .unwrap();

        prop_assert_eq!(&plain, &loaded);
        prop_assert_eq!(loaded.leverage, Decimal::ONE);
        prop_assert_eq!(loaded.spread_cost_total, Decimal::ZERO);
        prop_assert_eq!(loaded.overnight_cost_total, Decimal::ZERO);
        prop_assert_eq!(loaded.notional_value, loaded.actual_investment);
    }

    #[test]
    fn long_and_short_are_symmetric(
        (entry, dist) in arb_entry_and_distance(),
        product in arb_leveraged_long(),
        leverage in arb_leverage(),
        spread in arb_cost_percent(),
        overnight in arb_cost_percent(),
    ) {
        let sizer = PositionSizer::new(Decimal::from(50_000), Decimal::ONE).unwrap();
        let long = sizer
            .size(
                &TradeSetup::new(entry, entry - dist, product)
                    .with_leverage(leverage)
                    .with_spread_percent(spread)
                    .with_overnight_percent(overnight),
            )
            .unwrap();
        let short = sizer
            .size(
                &TradeSetup::new(entry, entry + dist, mirror(product))
                    .with_leverage(leverage)
                    .with_spread_percent(spread)
                    .with_overnight_percent(overnight),
            )
            .unwrap();

        prop_assert_eq!(long.units, short.units);
        prop_assert_eq!(long.total_risk_per_unit, short.total_risk_per_unit);
        prop_assert_eq!(long.target_1r - entry, entry - short.target_1r);
        prop_assert_eq!(long.target_5r - entry, entry - short.target_5r);
    }

    #[test]
    fn risk_scales_with_leverage(
        (entry, dist) in arb_entry_and_distance(),
        leverage in arb_leverage(),
    ) {
        let sizer = PositionSizer::new(Decimal::from(50_000), Decimal::ONE).unwrap();
        let result = sizer
            .size(&TradeSetup::new(entry, entry - dist, ProductVariant::CfdLong).with_leverage(leverage))
            .unwrap();

        prop_assert_eq!(result.total_risk_per_unit, dist * leverage);
        prop_assert_eq!(result.notional_value, result.actual_investment * leverage);
    }

    #[test]
    fn knockouts_have_no_financing(
        (entry, dist) in arb_entry_and_distance(),
        overnight in arb_cost_percent(),
        days in 1u32..365,
    ) {
        let sizer = PositionSizer::new(Decimal::from(50_000), Decimal::ONE).unwrap();
        for (product, stop) in [
            (ProductVariant::KnockoutLong, entry - dist),
            (ProductVariant::KnockoutShort, entry + dist),
        ] {
            let result = sizer
                .size(
                    &TradeSetup::new(entry, stop, product)
                        .with_leverage(Decimal::TEN)
                        .with_overnight_percent(overnight)
                        .with_holding_days(days),
                )
                .unwrap();
            prop_assert_eq!(result.overnight_cost_total, Decimal::ZERO);
        }
    }

    #[test]
    fn targets_move_away_from_stop(
        (entry, dist) in arb_entry_and_distance(),
        short in any::<bool>(),
    ) {
        let sizer = PositionSizer::new(Decimal::from(50_000), Decimal::ONE).unwrap();
        let (product, stop) = if short {
            (ProductVariant::CfdShort, entry + dist)
        } else {
            (ProductVariant::CfdLong, entry - dist)
        };
        let r = sizer.size(&TradeSetup::new(entry, stop, product)).unwrap();

        if short {
            prop_assert!(r.stop_loss > r.entry_price);
            prop_assert!(r.entry_price > r.target_1r);
            prop_assert!(r.target_1r > r.target_2r);
            prop_assert!(r.target_2r > r.target_5r);
        } else {
            prop_assert!(r.stop_loss < r.entry_price);
            prop_assert!(r.entry_price < r.target_1r);
            prop_assert!(r.target_1r < r.target_2r);
            prop_assert!(r.target_2r < r.target_5r);
        }
    }

    #[test]
    fn partial_sales_conserve_units(
        units in 1u64..10_000,
        steps in prop::collection::vec((1i64..=100, 9_000i64..20_000), 1..8),
    ) {
        let mut ledger = TradeLedger::new();
        let id = open_trade(&mut ledger, Decimal::from(100), Decimal::from(95), units);

        for (pct, price_cents) in steps {
            match apply_exit(
                &mut ledger,
                id,
                Decimal::from(pct),
                Decimal::new(price_cents, 2),
                true,
            ) {
                Ok(_)
                | Err(ExitError::NothingToSell { .. })
                | Err(ExitError::TradeNotOpen { .. }) => {}
                Err(other) => prop_assert!(false, "unexpected exit error: {other}"),
            }
        }

        let trade = ledger.get(id).unwrap();
        let sold: u64 = trade.partial_sales.iter().map(|s| s.units_sold).sum();
        let pnl: Decimal = trade.partial_sales.iter().map(|s| s.pnl).sum();

        prop_assert_eq!(sold + trade.units, trade.original_units);
        prop_assert_eq!(pnl, trade.total_realized_pnl);
        prop_assert_eq!(trade.units == 0, trade.status == TradeStatus::Closed);

        if trade.status == TradeStatus::Closed {
            let last = trade.partial_sales.last().unwrap();
            prop_assert_eq!(trade.final_pnl, Some(pnl));
            prop_assert_eq!(trade.final_r_multiple, Some(last.r_multiple));
            prop_assert_eq!(trade.close_price, Some(last.price));
        } else {
            prop_assert!(trade.final_pnl.is_none());
        }
    }

    #[test]
    fn sale_r_multiple_ignores_trailing_stop(
        price_cents in 5_000i64..20_000,
        new_stop_cents in 5_000i64..15_000,
    ) {
        let mut ledger = TradeLedger::new();
        let id = open_trade(&mut ledger, Decimal::from(100), Decimal::from(95), 100);
        let price = Decimal::new(price_cents, 2);

        let before = plan_exit(ledger.get(id).unwrap(), Decimal::from(50), price).unwrap();
        ledger.update(id, TradeUpdate::stop(Decimal::new(new_stop_cents, 2)));
        let after = plan_exit(ledger.get(id).unwrap(), Decimal::from(50), price).unwrap();

        prop_assert_eq!(before.r_multiple, after.r_multiple);
        prop_assert_eq!(before.pnl, after.pnl);
    }

    #[test]
    fn backup_round_trip(
        trades in prop::collection::vec((1u64..1_000, 1i64..=100, any::<bool>()), 0..6),
    ) {
        let mut ledger = TradeLedger::new();
        for (units, pct, close) in trades {
            let id = open_trade(&mut ledger, Decimal::from(100), Decimal::from(95), units);
            let _ = apply_exit(&mut ledger, id, Decimal::from(pct), Decimal::from(110), true);
            if close {
                ledger.close(id, Decimal::from(90), true);
            }
        }

        let json = export_json(&ledger).unwrap();
        let mut restored = TradeLedger::new();
        prop_assert_eq!(import_json(&mut restored, &json).unwrap(), ledger.len());
        prop_assert_eq!(restored.export_snapshot(), ledger.export_snapshot());
    }
}
