use anyhow::{Result, bail};
use clap::Subcommand;
use nightbook_core::{Bill, DayKey, WeekBills, format_usd, safe_num, week_end, week_start};
use nightbook_store::{BillPatch, JsonFileStore, Ledger};

use crate::Output;
use crate::render;

#[derive(Subcommand, Debug)]
pub enum BillCommand {
    /// Add a bill (due today unless --due is given)
    Add {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        due: Option<DayKey>,
        #[arg(long)]
        paid: bool,
    },

    /// Change fields of a bill
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long, conflicts_with = "no_due")]
        due: Option<DayKey>,
        /// Remove the due date; the bill leaves every weekly and monthly view
        #[arg(long)]
        no_due: bool,
        #[arg(long)]
        paid: Option<bool>,
    },

    /// Mark a bill paid
    Pay { id: String },

    /// Mark a bill unpaid
    Unpay { id: String },

    /// Delete a bill
    Rm { id: String },

    /// All bills, or only this week's with running unpaid totals
    List {
        #[arg(long)]
        week: bool,
    },
}

pub fn run(
    cmd: BillCommand,
    ledger: &mut Ledger<JsonFileStore>,
    today: DayKey,
    out: &Output,
) -> Result<()> {
    match cmd {
        BillCommand::Add {
            name,
            amount,
            due,
            paid,
        } => {
            let patch = BillPatch {
                name,
                amount: amount.as_deref().map(safe_num),
                paid: paid.then_some(true),
                ..BillPatch::default()
            };
            let bill = ledger.add_bill_with(due.unwrap_or(today), patch)?;
            out.emit(bill, || format!("Added {}", render::bill_line(bill)))
        }

        BillCommand::Edit {
            id,
            name,
            amount,
            due,
            no_due,
            paid,
        } => {
            let due_date = if no_due { Some(None) } else { due.map(Some) };
            let patch = BillPatch {
                name,
                amount: amount.as_deref().map(safe_num),
                due_date,
                paid,
            };
            if patch.is_empty() {
                bail!("nothing to change (see `nightbook bill edit --help`)");
            }
            let bill = ledger.update_bill(&id, patch)?;
            out.emit(bill, || format!("Updated {}", render::bill_line(bill)))
        }

        BillCommand::Pay { id } => {
            let bill = ledger.update_bill(&id, BillPatch::paid(true))?;
            out.emit(bill, || format!("Paid {}", render::bill_line(bill)))
        }

        BillCommand::Unpay { id } => {
            let bill = ledger.update_bill(&id, BillPatch::paid(false))?;
            out.emit(bill, || format!("Unpaid {}", render::bill_line(bill)))
        }

        BillCommand::Rm { id } => {
            let removed = ledger.remove_bill(&id)?;
            out.emit(&removed, || format!("Removed bill {}", removed.id))
        }

        BillCommand::List { week } => {
            if week {
                let start = week_start(today);
                let bills = WeekBills::for_week(start, week_end(start), ledger.bills());
                let rows = bills.running_unpaid();
                return out.emit(&rows, || {
                    let mut lines = vec![format!("Bills due {} to {}", bills.week_start, bills.week_end)];
                    lines.extend(rows.iter().map(|row| {
                        format!(
                            "  {}  running unpaid {}",
                            render::bill_line(&row.bill),
                            format_usd(row.running_unpaid)
                        )
                    }));
                    if rows.is_empty() {
                        lines.push("  nothing due".to_string());
                    }
                    lines.join("\n")
                });
            }

            let bills = by_due_date(ledger.bills());
            out.emit(&bills, || {
                if bills.is_empty() {
                    "No bills yet (nightbook bill add)".to_string()
                } else {
                    bills.iter().map(render::bill_line).collect::<Vec<_>>().join("\n")
                }
            })
        }
    }
}

/// Bills ordered by due date, undated first; ties keep insertion order.
fn by_due_date(bills: &[Bill]) -> Vec<Bill> {
    let mut sorted = bills.to_vec();
    sorted.sort_by_key(|b| b.due_date);
    sorted
}
