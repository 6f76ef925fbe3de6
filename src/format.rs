//! Display formatting for CLI output

use rust_decimal::Decimal;

use crate::risk::ProductVariant;
use crate::trade::{Trade, TradeStatus};

/// Two decimals with thousands separators, e.g. `-12,345.60`
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Percent with two decimals, e.g. `1.25%`
pub fn format_percentage(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

/// Signed R-multiple, e.g. `+2.50R`
pub fn format_r_multiple(value: Decimal) -> String {
    format!("{:+.2}R", value.round_dp(2))
}

pub fn product_label(product: ProductVariant) -> &'static str {
    product.label()
}

pub fn status_label(status: TradeStatus) -> &'static str {
    match status {
        TradeStatus::Planned => "Planned",
        TradeStatus::Open => "Open",
        TradeStatus::Closed => "Closed",
    }
}

/// One line per trade for `trade list`
pub fn format_trade_row(trade: &Trade) -> String {
    let pnl = match trade.status {
        TradeStatus::Closed => trade.final_pnl.unwrap_or(trade.total_realized_pnl),
        _ => trade.total_realized_pnl,
    };
    format!(
        "{}  {:<8} {:<14} {:<7} {:>6}/{:<6} entry {:>10}  stop {:>10}  P&L {:>12}",
        trade.id,
        trade.symbol,
        product_label(trade.product),
        status_label(trade.status),
        trade.units,
        trade.original_units,
        format_currency(trade.entry_price),
        format_currency(trade.current_stop),
        format_currency(pnl),
    )
}

/// Detailed view for `trade show`
pub fn format_trade_detail(trade: &Trade) -> String {
    let mut out = format!(
        r#"
TRADE {}
───────────────────────────────────────────────────────
Symbol:           {}
Product:          {}
Status:           {}
Created:          {}
Entry:            {}
Original Stop:    {}
Current Stop:     {}
Leverage:         {}x
Units:            {} of {}
Investment:       {}
Exposure:         {}
Risk Amount:      {}
Targets:          1R {} | 2R {} | 5R {}
Realized P&L:     {}
"#,
        trade.id,
        trade.symbol,
        product_label(trade.product),
        status_label(trade.status),
        trade.created_at.format("%Y-%m-%d %H:%M UTC"),
        format_currency(trade.entry_price),
        format_currency(trade.stop_loss),
        format_currency(trade.current_stop),
        trade.leverage.normalize(),
        trade.units,
        trade.original_units,
        format_currency(trade.investment),
        format_currency(trade.exposure),
        format_currency(trade.risk_amount),
        format_currency(trade.target_1r),
        format_currency(trade.target_2r),
        format_currency(trade.target_5r),
        format_currency(trade.total_realized_pnl),
    );

    if let (Some(price), Some(date)) = (trade.close_price, trade.close_date) {
        out.push_str(&format!(
            "Closed:           {} at {} ({} days)\n",
            date.format("%Y-%m-%d %H:%M UTC"),
            format_currency(price),
            trade.held_days()
        ));
    }
    if let Some(pnl) = trade.final_pnl {
        out.push_str(&format!("Final P&L:        {}\n", format_currency(pnl)));
    }
    if let Some(r) = trade.final_r_multiple {
        out.push_str(&format!("Final R:          {}\n", format_r_multiple(r)));
    }

    if !trade.partial_sales.is_empty() {
        out.push_str("\nPartial sales:\n");
        for sale in &trade.partial_sales {
            out.push_str(&format!(
                "  {}  {:>6} units ({}) at {}  P&L {}  {}\n",
                sale.date.format("%Y-%m-%d"),
                sale.units_sold,
                format_percentage(sale.percentage),
                format_currency(sale.price),
                format_currency(sale.pnl),
                format_r_multiple(sale.r_multiple),
            ));
        }
    }
    out
}
