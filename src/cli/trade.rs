//! Trade journal commands

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{SetupArgs, Session};
use crate::exit::{apply_exit, plan_exit, ExitPlan};
use crate::format::{format_currency, format_r_multiple, format_trade_detail, format_trade_row};
use crate::risk::{Account, ProductVariant};
use crate::trade::{NewTrade, TradeLedger, TradeStatus, TradeUpdate};

#[derive(Subcommand, Debug)]
pub enum TradeCommand {
    /// Size a position and record it as open
    Open(OpenArgs),
    /// Size a position and record it as planned
    Plan(OpenArgs),
    /// Enter a planned trade
    Activate {
        id: Uuid,
    },
    /// Sell a percentage of the remaining units
    Sell(SellArgs),
    /// Move the stop
    Stop {
        id: Uuid,
        /// New stop price
        #[arg(long)]
        price: Decimal,
    },
    /// Close the remaining position
    Close {
        id: Uuid,
        /// Exit price
        #[arg(long)]
        price: Decimal,
        /// Record the close without computing final P&L
        #[arg(long)]
        no_pnl: bool,
    },
    /// Remove a trade from the journal
    Delete {
        id: Uuid,
    },
    /// List trades
    List {
        /// planned, open or closed
        #[arg(long)]
        status: Option<TradeStatus>,
        #[arg(long)]
        product: Option<ProductVariant>,
    },
    /// Show one trade in detail
    Show {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Instrument symbol
    pub symbol: String,

    #[command(flatten)]
    pub setup: SetupArgs,
}

#[derive(Args, Debug)]
pub struct SellArgs {
    pub id: Uuid,

    /// Percent of the remaining units to sell
    #[arg(long)]
    pub percent: Decimal,

    /// Sale price
    #[arg(long)]
    pub price: Decimal,

    /// Leave the stop where it is
    #[arg(long)]
    pub keep_stop: bool,

    /// Show the plan without recording the sale
    #[arg(long)]
    pub dry_run: bool,
}

impl TradeCommand {
    pub fn execute(&self, session: &Session) -> Result<()> {
        let mut ledger = session.load_ledger()?;

        let changed = match self {
            TradeCommand::Open(args) => open(session, &mut ledger, args, TradeStatus::Open)?,
            TradeCommand::Plan(args) => open(session, &mut ledger, args, TradeStatus::Planned)?,
            TradeCommand::Activate { id } => activate(session, &mut ledger, *id)?,
            TradeCommand::Sell(args) => sell(&mut ledger, args)?,
            TradeCommand::Stop { id, price } => move_stop(&mut ledger, *id, *price)?,
            TradeCommand::Close { id, price, no_pnl } => {
                close(&mut ledger, *id, *price, !*no_pnl)?
            }
            TradeCommand::Delete { id } => {
                if !ledger.delete(*id) {
                    bail!("Trade not found: {id}");
                }
                println!("Deleted {id}");
                true
            }
            TradeCommand::List { status, product } => {
                let trades = ledger
                    .list_all()
                    .into_iter()
                    .filter(|t| status.map_or(true, |s| t.status == s))
                    .filter(|t| product.map_or(true, |p| t.product == p));
                let mut count = 0;
                for trade in trades {
                    println!("{}", format_trade_row(trade));
                    count += 1;
                }
                if count == 0 {
                    println!("No trades");
                }
                false
            }
            TradeCommand::Show { id } => {
                let trade = ledger
                    .get(*id)
                    .with_context(|| format!("Trade not found: {id}"))?;
                println!("{}", format_trade_detail(trade));
                false
            }
        };

        if changed {
            session.save_ledger(&ledger)?;
        }
        Ok(())
    }
}

fn open(
    session: &Session,
    ledger: &mut TradeLedger,
    args: &OpenArgs,
    status: TradeStatus,
) -> Result<bool> {
    let setup = args.setup.to_setup(&session.config.defaults);
    let sizing = args.setup.sizer(session)?.size(&setup)?;
    if sizing.units == 0 {
        bail!(
            "Risk per unit {} exceeds the risk budget {}; nothing to trade",
            sizing.total_risk_per_unit,
            sizing.max_risk
        );
    }

    if status == TradeStatus::Open {
        let account = Account::from_config(&session.config.account);
        let metrics = ledger.metrics();
        if !account.can_afford(sizing.actual_investment, &metrics) {
            bail!(
                "Investment {} exceeds free cash {}",
                format_currency(sizing.actual_investment),
                format_currency(account.free_cash(&metrics))
            );
        }
    }

    let id = ledger.create(NewTrade::from_sizing(
        args.symbol.clone(),
        &setup,
        &sizing,
        status,
    ));
    println!("{}", sizing.format_table());
    println!("Recorded {} trade {id}", status);
    Ok(true)
}

fn activate(session: &Session, ledger: &mut TradeLedger, id: Uuid) -> Result<bool> {
    let trade = ledger
        .get(id)
        .with_context(|| format!("Trade not found: {id}"))?;
    if trade.status != TradeStatus::Planned {
        bail!("Trade {id} is {}, not planned", trade.status);
    }

    let account = Account::from_config(&session.config.account);
    let metrics = ledger.metrics();
    if !account.can_afford(trade.investment, &metrics) {
        bail!(
            "Investment {} exceeds free cash {}",
            format_currency(trade.investment),
            format_currency(account.free_cash(&metrics))
        );
    }

    ledger.update(id, TradeUpdate::status(TradeStatus::Open));
    tracing::info!(trade_id = %id, "Planned trade activated");
    println!("Activated {id}");
    Ok(true)
}

fn sell(ledger: &mut TradeLedger, args: &SellArgs) -> Result<bool> {
    if args.dry_run {
        let trade = ledger
            .get(args.id)
            .with_context(|| format!("Trade not found: {}", args.id))?;
        print_plan(&plan_exit(trade, args.percent, args.price)?);
        return Ok(false);
    }

    let plan = apply_exit(ledger, args.id, args.percent, args.price, !args.keep_stop)?;
    print_plan(&plan);
    if plan.units_remaining == 0 {
        println!("Position fully sold, trade closed");
    }
    Ok(true)
}

fn print_plan(plan: &ExitPlan) {
    println!(
        "Sell {} units at {}: proceeds {}, P&L {}, {}",
        plan.units_sold,
        format_currency(plan.sale_price),
        format_currency(plan.proceeds),
        format_currency(plan.pnl),
        format_r_multiple(plan.r_multiple),
    );
    println!("Remaining units: {}", plan.units_remaining);
    if plan.should_move_stop {
        println!(
            "Recommended stop: {} (break-even)",
            format_currency(plan.recommended_stop)
        );
    }
}

fn move_stop(ledger: &mut TradeLedger, id: Uuid, price: Decimal) -> Result<bool> {
    let trade = ledger
        .get(id)
        .with_context(|| format!("Trade not found: {id}"))?;
    if trade.status == TradeStatus::Closed {
        bail!("Trade {id} is closed");
    }
    if price <= Decimal::ZERO {
        bail!("Stop price must be positive");
    }

    ledger.update(id, TradeUpdate::stop(price));
    println!("Stop for {id} moved to {}", format_currency(price));
    Ok(true)
}

fn close(ledger: &mut TradeLedger, id: Uuid, price: Decimal, compute_pnl: bool) -> Result<bool> {
    if price <= Decimal::ZERO {
        bail!("Close price must be positive");
    }
    if !ledger.close(id, price, compute_pnl) {
        bail!("Trade {id} not found or already closed");
    }

    if let Some(trade) = ledger.get(id) {
        match (trade.final_pnl, trade.final_r_multiple) {
            (Some(pnl), Some(r)) => println!(
                "Closed {id} at {}: P&L {}, {}",
                format_currency(price),
                format_currency(pnl),
                format_r_multiple(r)
            ),
            _ => println!("Closed {id} at {}", format_currency(price)),
        }
    }
    Ok(true)
}
