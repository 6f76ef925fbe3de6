//! CSV exports: trade history, partial sales, closed-trade performance

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::exit::SaleRow;
use crate::trade::{Trade, TradeStatus};

const TRADE_COLUMNS: [&str; 26] = [
    "id",
    "symbol",
    "createdAt",
    "status",
    "productType",
    "entryPrice",
    "stopLoss",
    "currentStop",
    "leverage",
    "spreadPercent",
    "overnightPercent",
    "holdingDays",
    "units",
    "originalUnits",
    "investment",
    "exposure",
    "riskAmount",
    "target1R",
    "target2R",
    "target5R",
    "partialSalesCount",
    "totalRealizedPnl",
    "closePrice",
    "closeDate",
    "finalPnl",
    "finalRMultiple",
];

const SALE_COLUMNS: [&str; 8] = [
    "date",
    "symbol",
    "productType",
    "percentage",
    "unitsSold",
    "price",
    "pnl",
    "rMultiple",
];

const PERFORMANCE_COLUMNS: [&str; 11] = [
    "symbol",
    "productType",
    "entryPrice",
    "closePrice",
    "originalUnits",
    "investment",
    "finalPnl",
    "finalRMultiple",
    "createdAt",
    "closeDate",
    "heldDays",
];

fn dec(value: Decimal) -> String {
    value.normalize().to_string()
}

fn opt_dec(value: Option<Decimal>) -> String {
    value.map(dec).unwrap_or_default()
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per trade; partial sales are summarized as a count
pub fn export_trades_csv<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(TRADE_COLUMNS)?;

    for t in trades {
        wtr.write_record([
            t.id.to_string(),
            t.symbol.clone(),
            t.created_at.to_rfc3339(),
            t.status.to_string(),
            t.product.to_string(),
            dec(t.entry_price),
            dec(t.stop_loss),
            dec(t.current_stop),
            dec(t.leverage),
            dec(t.spread_percent),
            dec(t.overnight_percent),
            t.holding_days.to_string(),
            t.units.to_string(),
            t.original_units.to_string(),
            dec(t.investment),
            dec(t.exposure),
            dec(t.risk_amount),
            dec(t.target_1r),
            dec(t.target_2r),
            dec(t.target_5r),
            t.partial_sales.len().to_string(),
            dec(t.total_realized_pnl),
            opt_dec(t.close_price),
            t.close_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
            opt_dec(t.final_pnl),
            opt_dec(t.final_r_multiple.map(|r| r.round_dp(4))),
        ])?;
    }

    finish(wtr)
}

/// One row per partial sale
pub fn export_partial_sales_csv(sales: &[SaleRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(SALE_COLUMNS)?;

    for row in sales {
        let sale = &row.sale;
        wtr.write_record([
            sale.date.to_rfc3339(),
            row.symbol.clone(),
            row.product.to_string(),
            dec(sale.percentage),
            sale.units_sold.to_string(),
            dec(sale.price),
            dec(sale.pnl),
            dec(sale.r_multiple.round_dp(4)),
        ])?;
    }

    finish(wtr)
}

/// One row per closed trade with holding duration
pub fn export_performance_csv<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(PERFORMANCE_COLUMNS)?;

    for t in trades.into_iter().filter(|t| t.status == TradeStatus::Closed) {
        wtr.write_record([
            t.symbol.clone(),
            t.product.to_string(),
            dec(t.entry_price),
            opt_dec(t.close_price),
            t.original_units.to_string(),
            dec(t.investment),
            opt_dec(t.final_pnl),
            opt_dec(t.final_r_multiple.map(|r| r.round_dp(4))),
            t.created_at.to_rfc3339(),
            t.close_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
            t.held_days().to_string(),
        ])?;
    }

    finish(wtr)
}
