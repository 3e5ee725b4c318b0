use anyhow::{Result, bail};
use clap::Subcommand;
use nightbook_core::{DayKey, Flag, safe_num};
use nightbook_store::{EntryPatch, JsonFileStore, Ledger};

use crate::Output;
use crate::render;

#[derive(Subcommand, Debug)]
pub enum NightCommand {
    /// Log a night (dated today unless --date is given)
    Add {
        #[arg(long)]
        date: Option<DayKey>,
        #[arg(long)]
        gross: Option<String>,
        #[arg(long)]
        tipout: Option<String>,
        #[arg(long)]
        expenses: Option<String>,
        /// Kept to the personal minimum
        #[arg(long)]
        min_kept: bool,
        #[arg(long)]
        left_early: bool,
        /// tired, anxious, disrespected or unsafe (repeatable)
        #[arg(long = "flag", value_parser = parse_flag)]
        flags: Vec<Flag>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Change fields of a logged night
    Edit {
        id: String,
        #[arg(long)]
        date: Option<DayKey>,
        #[arg(long)]
        gross: Option<String>,
        #[arg(long)]
        tipout: Option<String>,
        #[arg(long)]
        expenses: Option<String>,
        #[arg(long)]
        min_kept: Option<bool>,
        #[arg(long)]
        left_early: Option<bool>,
        /// Turn a flag on (repeatable)
        #[arg(long = "flag", value_parser = parse_flag)]
        flags: Vec<Flag>,
        /// Turn a flag off (repeatable)
        #[arg(long = "clear-flag", value_parser = parse_flag)]
        clear_flags: Vec<Flag>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a logged night
    Rm { id: String },

    /// Logged nights, newest first
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn parse_flag(raw: &str) -> std::result::Result<Flag, String> {
    Flag::from_name(raw).ok_or_else(|| {
        let names: Vec<&str> = Flag::ALL.iter().map(|f| f.name()).collect();
        format!("unknown flag '{raw}' (expected one of: {})", names.join(", "))
    })
}

pub fn run(
    cmd: NightCommand,
    ledger: &mut Ledger<JsonFileStore>,
    today: DayKey,
    out: &Output,
) -> Result<()> {
    match cmd {
        NightCommand::Add {
            date,
            gross,
            tipout,
            expenses,
            min_kept,
            left_early,
            flags,
            notes,
        } => {
            let patch = EntryPatch {
                gross: gross.as_deref().map(safe_num),
                tipout: tipout.as_deref().map(safe_num),
                expenses: expenses.as_deref().map(safe_num),
                min_kept: min_kept.then_some(true),
                left_early: left_early.then_some(true),
                flags: flags.into_iter().map(|f| (f, true)).collect(),
                notes,
                ..EntryPatch::default()
            };

            let entry = ledger.add_entry_with(date.unwrap_or(today), patch)?;
            out.emit(entry, || format!("Logged {}", render::entry_line(entry)))
        }

        NightCommand::Edit {
            id,
            date,
            gross,
            tipout,
            expenses,
            min_kept,
            left_early,
            flags,
            clear_flags,
            notes,
        } => {
            let patch = EntryPatch {
                date,
                gross: gross.as_deref().map(safe_num),
                tipout: tipout.as_deref().map(safe_num),
                expenses: expenses.as_deref().map(safe_num),
                min_kept,
                left_early,
                flags: flags
                    .into_iter()
                    .map(|f| (f, true))
                    .chain(clear_flags.into_iter().map(|f| (f, false)))
                    .collect(),
                notes,
            };
            if patch.is_empty() {
                bail!("nothing to change (see `nightbook night edit --help`)");
            }
            let entry = ledger.update_entry(&id, patch)?;
            out.emit(entry, || format!("Updated {}", render::entry_line(entry)))
        }

        NightCommand::Rm { id } => {
            let removed = ledger.remove_entry(&id)?;
            out.emit(&removed, || format!("Removed night {}", removed.id))
        }

        NightCommand::List { limit } => {
            let entries: Vec<_> = ledger
                .entries()
                .iter()
                .rev()
                .take(limit.unwrap_or(usize::MAX))
                .collect();
            out.emit(&entries, || {
                if entries.is_empty() {
                    "No nights logged yet (nightbook night add)".to_string()
                } else {
                    entries
                        .iter()
                        .map(|e| render::entry_line(e))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("Tired"), Ok(Flag::Tired));
        assert_eq!(parse_flag("unsafe"), Ok(Flag::Unsafe));
        let err = parse_flag("sleepy").unwrap_err();
        assert!(err.contains("tired, anxious, disrespected, unsafe"));
    }
}
