use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use nightbook_core::{DayKey, week_start};
use nightbook_store::{JsonFileStore, Ledger};

use crate::Output;
use crate::render;

#[derive(Subcommand, Debug)]
pub enum CheckinCommand {
    /// Show the reflection for a week
    Show {
        /// Any day in the week (default: today)
        #[arg(long)]
        week: Option<DayKey>,
    },

    /// Save (or overwrite) the reflection for a week
    Save {
        text: String,
        #[arg(long)]
        week: Option<DayKey>,
    },

    /// Empty the reflection for a week
    Clear {
        #[arg(long)]
        week: Option<DayKey>,
    },
}

pub fn run(
    cmd: CheckinCommand,
    ledger: &mut Ledger<JsonFileStore>,
    today: DayKey,
    out: &Output,
) -> Result<()> {
    match cmd {
        CheckinCommand::Show { week } => {
            let start = week_start(week.unwrap_or(today));
            let checkin = ledger.checkin(start);
            out.emit(&checkin, || render::checkin(start, checkin))
        }
        CheckinCommand::Save { text, week } => {
            let start = week_start(week.unwrap_or(today));
            let checkin = ledger.save_reflection(start, text, Utc::now())?;
            out.emit(checkin, || render::checkin(start, Some(checkin)))
        }
        CheckinCommand::Clear { week } => {
            let start = week_start(week.unwrap_or(today));
            let checkin = ledger.clear_reflection(start, Utc::now())?;
            out.emit(checkin, || render::checkin(start, Some(checkin)))
        }
    }
}
