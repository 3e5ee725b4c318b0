//! Parse CSV exports of logged nights into entries.
//!
//! The first row is a header. Recognized columns, in any order and any case:
//! date, gross, tipout, expenses, minKept, leftEarly, tired, anxious,
//! disrespected, unsafe, notes. Only the four money/date columns are expected;
//! the rest default to false/empty.

use crate::error::Result;
use chrono::NaiveDate;
use nightbook_core::money::de::truthy;
use nightbook_core::{DayKey, Entry, Flag, Flags, safe_num};
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Date,
    Gross,
    Tipout,
    Expenses,
    MinKept,
    LeftEarly,
    Flag(Flag),
    Notes,
}

impl Column {
    fn from_header(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "date" => Some(Column::Date),
            "gross" => Some(Column::Gross),
            "tipout" => Some(Column::Tipout),
            "expenses" => Some(Column::Expenses),
            "minkept" => Some(Column::MinKept),
            "leftearly" => Some(Column::LeftEarly),
            "notes" => Some(Column::Notes),
            other => Flag::from_name(other).map(Column::Flag),
        }
    }
}

/// Parse a nights CSV file. Returned entries have empty ids; the ledger
/// assigns them on import.
pub fn parse_nights_csv(path: impl AsRef<Path>) -> Result<Vec<Entry>> {
    let path = path.as_ref();
    debug!(path = %path.display(), "reading nights csv");
    let file = std::fs::File::open(path)?;
    parse_nights_reader(file)
}

/// Parse nights CSV from any reader.
pub fn parse_nights_reader<R: Read>(reader: R) -> Result<Vec<Entry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<Option<Column>> = rdr.headers()?.iter().map(Column::from_header).collect();
    for (idx, col) in columns.iter().enumerate() {
        if col.is_none() {
            debug!(column = idx, "ignoring unrecognized csv column");
        }
    }

    let mut entries = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let mut entry = blank_entry();
        for (field, col) in record.iter().zip(&columns) {
            let Some(col) = col else { continue };
            match col {
                Column::Date => {
                    entry.date = parse_day(field);
                    if entry.date.is_none() && !field.is_empty() {
                        warn!(row = row + 1, value = field, "unparseable date; keeping night undated");
                    }
                }
                Column::Gross => entry.gross = safe_num(field),
                Column::Tipout => entry.tipout = safe_num(field),
                Column::Expenses => entry.expenses = safe_num(field),
                Column::MinKept => entry.min_kept = truthy(field),
                Column::LeftEarly => entry.left_early = truthy(field),
                Column::Flag(flag) => entry.flags.set(*flag, truthy(field)),
                Column::Notes => entry.notes = field.to_string(),
            }
        }
        entries.push(entry);
    }

    debug!(count = entries.len(), "parsed nights csv");
    Ok(entries)
}

fn blank_entry() -> Entry {
    Entry {
        id: String::new(),
        date: None,
        gross: 0.0,
        tipout: 0.0,
        expenses: 0.0,
        min_kept: false,
        left_early: false,
        flags: Flags::default(),
        notes: String::new(),
    }
}

// ISO first, then US-style statement dates
fn parse_day(raw: &str) -> Option<DayKey> {
    DayKey::parse(raw).or_else(|| {
        NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y")
            .ok()
            .map(DayKey::from)
    })
}
