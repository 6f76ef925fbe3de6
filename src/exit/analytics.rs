//! Partial sale analytics across trades

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::risk::ProductVariant;
use crate::trade::{PartialSaleRecord, Trade};

/// A partial sale together with the trade it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRow {
    pub symbol: String,
    pub product: ProductVariant,
    pub sale: PartialSaleRecord,
}

/// Count of sales per R-multiple band
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RDistribution {
    /// r < 0
    pub loss: usize,
    /// 0 <= r < 1
    pub zero_to_one: usize,
    /// 1 <= r < 2
    pub one_to_two: usize,
    /// 2 <= r < 5
    pub two_to_five: usize,
    /// r >= 5
    pub five_plus: usize,
}

impl RDistribution {
    fn record(&mut self, r: Decimal) {
        if r < Decimal::ZERO {
            self.loss += 1;
        } else if r < dec!(1) {
            self.zero_to_one += 1;
        } else if r < dec!(2) {
            self.one_to_two += 1;
        } else if r < dec!(5) {
            self.two_to_five += 1;
        } else {
            self.five_plus += 1;
        }
    }

    /// Bands with labels in ascending order
    pub fn bands(&self) -> [(&'static str, usize); 5] {
        [
            ("< 0R", self.loss),
            ("0R - 1R", self.zero_to_one),
            ("1R - 2R", self.one_to_two),
            ("2R - 5R", self.two_to_five),
            (">= 5R", self.five_plus),
        ]
    }
}

/// Aggregate for sales of one requested percentage
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentageGroup {
    pub count: usize,
    pub total_pnl: Decimal,
    pub avg_r: Decimal,
}

/// Summary over every partial sale in a set of trades
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PartialSaleAnalytics {
    pub total_sales: usize,
    pub total_proceeds: Decimal,
    pub total_pnl: Decimal,
    pub avg_r_multiple: Decimal,
    pub r_distribution: RDistribution,
    /// Keyed by the requested percentage truncated to a whole number
    pub by_percentage: BTreeMap<u32, PercentageGroup>,
    pub sales: Vec<SaleRow>,
}

/// Flatten the partial sales of `trades`, in trade order
pub fn sale_rows<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Vec<SaleRow> {
    trades
        .into_iter()
        .flat_map(|trade| {
            trade.partial_sales.iter().map(move |sale| SaleRow {
                symbol: trade.symbol.clone(),
                product: trade.product,
                sale: sale.clone(),
            })
        })
        .collect()
}

/// Analyze every partial sale of `trades`
pub fn analyze<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> PartialSaleAnalytics {
    let sales = sale_rows(trades);
    if sales.is_empty() {
        return PartialSaleAnalytics::default();
    }

    let mut analytics = PartialSaleAnalytics {
        total_sales: sales.len(),
        ..PartialSaleAnalytics::default()
    };
    let mut r_sum = Decimal::ZERO;
    let mut r_by_pct: BTreeMap<u32, Decimal> = BTreeMap::new();

    for row in &sales {
        let sale = &row.sale;
        analytics.total_proceeds += sale.proceeds;
        analytics.total_pnl += sale.pnl;
        r_sum += sale.r_multiple;
        analytics.r_distribution.record(sale.r_multiple);

        let pct = sale.percentage.trunc().to_u32().unwrap_or(0);
        let group = analytics.by_percentage.entry(pct).or_default();
        group.count += 1;
        group.total_pnl += sale.pnl;
        *r_by_pct.entry(pct).or_default() += sale.r_multiple;
    }

    analytics.avg_r_multiple = r_sum / Decimal::from(sales.len());
    for (pct, group) in analytics.by_percentage.iter_mut() {
        let sum = r_by_pct.get(pct).copied().unwrap_or_default();
        group.avg_r = sum / Decimal::from(group.count);
    }
    analytics.sales = sales;
    analytics
}

impl PartialSaleAnalytics {
    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let mut out = format!(
            r#"
PARTIAL SALES
───────────────────────────────────────────────────────
Count:            {}
Proceeds:         {:.2}
P&L:              {:+.2}
Avg R-Multiple:   {:.2}R
"#,
            self.total_sales, self.total_proceeds, self.total_pnl, self.avg_r_multiple,
        );
        for (label, count) in self.r_distribution.bands() {
            out.push_str(&format!("  {:<16}{}\n", label, count));
        }
        for (pct, group) in &self.by_percentage {
            out.push_str(&format!(
                "  {:>3}% sales:     {} (avg {:.2}R, P&L {:+.2})\n",
                pct, group.count, group.avg_r, group.total_pnl
            ));
        }
        out
    }
}
