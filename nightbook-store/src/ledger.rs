//! Ledger: owns the record collections and persists every mutation.
//!
//! Loading never fails on bad data. A missing key starts from the default, a
//! malformed document starts empty, and individual malformed records are
//! skipped. Only backend I/O errors propagate.

use crate::error::{Result, StoreError};
use crate::kv::KeyValueStore;
use chrono::{DateTime, Utc};
use nightbook_core::money::finite_or_zero;
use nightbook_core::{Bill, CheckIns, DayKey, Entry, Flag, Settings, Snapshot, WeekCheckIn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const ENTRIES_KEY: &str = "entries";
pub const BILLS_KEY: &str = "bills";
pub const SETTINGS_KEY: &str = "settings";
pub const CHECKINS_KEY: &str = "checkins";

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Field-by-field change to a logged night. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub date: Option<DayKey>,
    pub gross: Option<f64>,
    pub tipout: Option<f64>,
    pub expenses: Option<f64>,
    pub min_kept: Option<bool>,
    pub left_early: Option<bool>,
    pub flags: Vec<(Flag, bool)>,
    pub notes: Option<String>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.gross.is_none()
            && self.tipout.is_none()
            && self.expenses.is_none()
            && self.min_kept.is_none()
            && self.left_early.is_none()
            && self.flags.is_empty()
            && self.notes.is_none()
    }

    fn apply(self, entry: &mut Entry) {
        if let Some(date) = self.date {
            entry.date = Some(date);
        }
        if let Some(v) = self.gross {
            entry.gross = finite_or_zero(v);
        }
        if let Some(v) = self.tipout {
            entry.tipout = finite_or_zero(v);
        }
        if let Some(v) = self.expenses {
            entry.expenses = finite_or_zero(v);
        }
        if let Some(v) = self.min_kept {
            entry.min_kept = v;
        }
        if let Some(v) = self.left_early {
            entry.left_early = v;
        }
        for (flag, on) in self.flags {
            entry.flags.set(flag, on);
        }
        if let Some(notes) = self.notes {
            entry.notes = notes;
        }
    }
}

/// Field-by-field change to a bill. `due_date: Some(None)` clears the due date.
#[derive(Debug, Clone, Default)]
pub struct BillPatch {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub due_date: Option<Option<DayKey>>,
    pub paid: Option<bool>,
}

impl BillPatch {
    pub fn paid(paid: bool) -> Self {
        Self {
            paid: Some(paid),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.amount.is_none() && self.due_date.is_none() && self.paid.is_none()
    }

    fn apply(self, bill: &mut Bill) {
        if let Some(name) = self.name {
            bill.name = name;
        }
        if let Some(v) = self.amount {
            bill.amount = finite_or_zero(v);
        }
        if let Some(due) = self.due_date {
            bill.due_date = due;
        }
        if let Some(paid) = self.paid {
            bill.paid = paid;
        }
    }
}

/// Settings change. Values are clamped when applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingsPatch {
    pub min_net_default: Option<f64>,
    pub buffer_percent: Option<f64>,
    pub expected_net_per_night: Option<f64>,
}

/// The record store: entries, bills, settings and check-ins over a backend
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
    entries: Vec<Entry>,
    bills: Vec<Bill>,
    settings: Settings,
    checkins: CheckIns,
}

impl<S: KeyValueStore> Ledger<S> {
    /// Load every collection from `store`, degrading to defaults.
    pub fn load(store: S) -> Result<Self> {
        let mut entries: Vec<Entry> = load_list(&store, ENTRIES_KEY)?;
        let mut bills: Vec<Bill> = load_list(&store, BILLS_KEY)?;
        let settings = load_settings(&store)?;
        let checkins = load_checkins(&store)?;

        let entry_ids = fill_missing_ids(entries.iter_mut().map(|e| &mut e.id));
        let bill_ids = fill_missing_ids(bills.iter_mut().map(|b| &mut b.id));

        let mut ledger = Self {
            store,
            entries,
            bills,
            settings,
            checkins,
        };

        if entry_ids > 0 {
            info!(count = entry_ids, "assigned ids to stored entries");
            ledger.persist_entries()?;
        }
        if bill_ids > 0 {
            info!(count = bill_ids, "assigned ids to stored bills");
            ledger.persist_bills()?;
        }

        debug!(
            entries = ledger.entries.len(),
            bills = ledger.bills.len(),
            checkins = ledger.checkins.len(),
            "ledger loaded"
        );
        Ok(ledger)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn checkins(&self) -> &CheckIns {
        &self.checkins
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Borrow everything for one engine recompute.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            entries: &self.entries,
            bills: &self.bills,
            settings: &self.settings,
            checkins: &self.checkins,
        }
    }

    // --- entries ---

    /// Append a blank night dated `today`.
    pub fn add_entry(&mut self, today: DayKey) -> Result<&Entry> {
        self.add_entry_with(today, EntryPatch::default())
    }

    /// Append a night dated `today` with `patch` already applied, in one write.
    pub fn add_entry_with(&mut self, today: DayKey, patch: EntryPatch) -> Result<&Entry> {
        let mut entry = Entry::new(new_id(), today);
        patch.apply(&mut entry);
        let id = entry.id.clone();
        commit(&mut self.store, ENTRIES_KEY, &mut self.entries, |entries| {
            entries.push(entry)
        })?;
        info!(id = %id, date = %today, "entry added");
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn update_entry(&mut self, id: &str, patch: EntryPatch) -> Result<&Entry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("entry {id}")))?;
        commit(&mut self.store, ENTRIES_KEY, &mut self.entries, |entries| {
            patch.apply(&mut entries[idx])
        })?;
        info!(id, "entry updated");
        Ok(&self.entries[idx])
    }

    pub fn remove_entry(&mut self, id: &str) -> Result<Entry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("entry {id}")))?;
        let removed = commit(&mut self.store, ENTRIES_KEY, &mut self.entries, |entries| {
            entries.remove(idx)
        })?;
        info!(id, "entry removed");
        Ok(removed)
    }

    /// Append externally parsed nights, giving each a fresh id if it has none.
    pub fn import_entries(&mut self, entries: Vec<Entry>) -> Result<usize> {
        let count = entries.len();
        commit(&mut self.store, ENTRIES_KEY, &mut self.entries, |current| {
            for mut entry in entries {
                if entry.id.trim().is_empty() {
                    entry.id = new_id();
                }
                current.push(entry);
            }
        })?;
        info!(count, "entries imported");
        Ok(count)
    }

    // --- bills ---

    /// Append a blank unpaid bill due `today`.
    pub fn add_bill(&mut self, today: DayKey) -> Result<&Bill> {
        self.add_bill_with(today, BillPatch::default())
    }

    /// Append a bill due `today` with `patch` already applied, in one write.
    pub fn add_bill_with(&mut self, today: DayKey, patch: BillPatch) -> Result<&Bill> {
        let mut bill = Bill::new(new_id(), today);
        patch.apply(&mut bill);
        let id = bill.id.clone();
        commit(&mut self.store, BILLS_KEY, &mut self.bills, |bills| bills.push(bill))?;
        info!(id = %id, due = %today, "bill added");
        Ok(&self.bills[self.bills.len() - 1])
    }

    pub fn update_bill(&mut self, id: &str, patch: BillPatch) -> Result<&Bill> {
        let idx = self
            .bills
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("bill {id}")))?;
        commit(&mut self.store, BILLS_KEY, &mut self.bills, |bills| {
            patch.apply(&mut bills[idx])
        })?;
        info!(id, "bill updated");
        Ok(&self.bills[idx])
    }

    pub fn remove_bill(&mut self, id: &str) -> Result<Bill> {
        let idx = self
            .bills
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("bill {id}")))?;
        let removed = commit(&mut self.store, BILLS_KEY, &mut self.bills, |bills| {
            bills.remove(idx)
        })?;
        info!(id, "bill removed");
        Ok(removed)
    }

    // --- settings ---

    /// Apply and clamp a settings change, returning what was stored.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> Result<Settings> {
        commit(&mut self.store, SETTINGS_KEY, &mut self.settings, |settings| {
            if let Some(v) = patch.min_net_default {
                settings.set_min_net_default(v);
            }
            if let Some(v) = patch.buffer_percent {
                settings.set_buffer_percent(v);
            }
            if let Some(v) = patch.expected_net_per_night {
                settings.set_expected_net_per_night(v);
            }
        })?;
        info!(settings = ?self.settings, "settings updated");
        Ok(self.settings)
    }

    // --- weekly check-ins ---

    pub fn checkin(&self, week_start: DayKey) -> Option<&WeekCheckIn> {
        self.checkins.get(&week_start)
    }

    /// Create or overwrite the reflection for the week starting `week_start`.
    pub fn save_reflection(
        &mut self,
        week_start: DayKey,
        text: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&WeekCheckIn> {
        let checkin = WeekCheckIn {
            reflection: text.into(),
            updated_at: now,
        };
        commit(&mut self.store, CHECKINS_KEY, &mut self.checkins, |checkins| {
            checkins.insert(week_start, checkin);
        })?;
        info!(week = %week_start, "reflection saved");
        Ok(&self.checkins[&week_start])
    }

    /// Write an empty reflection. The record itself is kept.
    pub fn clear_reflection(&mut self, week_start: DayKey, now: DateTime<Utc>) -> Result<&WeekCheckIn> {
        self.save_reflection(week_start, String::new(), now)
    }

    fn persist_entries(&mut self) -> Result<()> {
        write_json(&mut self.store, ENTRIES_KEY, &self.entries)
    }

    fn persist_bills(&mut self) -> Result<()> {
        write_json(&mut self.store, BILLS_KEY, &self.bills)
    }
}

/// Apply `change` to a copy of `current`, write the copy, and only then
/// replace `current`. A failed write leaves memory as it was.
fn commit<T, R>(
    store: &mut impl KeyValueStore,
    key: &str,
    current: &mut T,
    change: impl FnOnce(&mut T) -> R,
) -> Result<R>
where
    T: Clone + Serialize,
{
    let mut next = current.clone();
    let out = change(&mut next);
    write_json(store, key, &next)?;
    *current = next;
    Ok(out)
}

fn write_json<T: Serialize>(store: &mut impl KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    store.set(key, &json)
}

fn fill_missing_ids<'a>(ids: impl Iterator<Item = &'a mut String>) -> usize {
    let mut filled = 0;
    for id in ids {
        if id.trim().is_empty() {
            *id = new_id();
            filled += 1;
        }
    }
    filled
}

/// Stored text for `key`. Undecodable bytes count as a missing value.
fn read_raw(store: &impl KeyValueStore, key: &str) -> Result<Option<String>> {
    match store.get(key) {
        Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::InvalidData => {
            warn!(key, error = %e, "stored value is not valid UTF-8; using default");
            Ok(None)
        }
        other => other,
    }
}

fn load_list<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Result<Vec<T>> {
    let Some(raw) = read_raw(store, key)? else {
        return Ok(Vec::new());
    };
    let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(key, error = %e, "stored value is not a JSON list; starting empty");
            return Ok(Vec::new());
        }
    };

    let mut out = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(item) => out.push(item),
            Err(e) => warn!(key, index, error = %e, "skipping malformed record"),
        }
    }
    Ok(out)
}

fn load_settings(store: &impl KeyValueStore) -> Result<Settings> {
    let Some(raw) = read_raw(store, SETTINGS_KEY)? else {
        return Ok(Settings::default());
    };
    match serde_json::from_str::<Settings>(&raw) {
        Ok(settings) => Ok(settings.clamped()),
        Err(e) => {
            warn!(error = %e, "stored settings are malformed; using defaults");
            Ok(Settings::default())
        }
    }
}

fn load_checkins(store: &impl KeyValueStore) -> Result<CheckIns> {
    let Some(raw) = read_raw(store, CHECKINS_KEY)? else {
        return Ok(CheckIns::new());
    };
    let values: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "stored check-ins are not a JSON object; starting empty");
            return Ok(CheckIns::new());
        }
    };

    let mut out = CheckIns::new();
    for (week, value) in values {
        let Some(week_start) = DayKey::parse(&week) else {
            warn!(week = %week, "skipping check-in with malformed week key");
            continue;
        };
        match serde_json::from_value::<WeekCheckIn>(value) {
            Ok(checkin) => {
                out.insert(week_start, checkin);
            }
            Err(e) => warn!(week = %week, error = %e, "skipping malformed check-in"),
        }
    }
    Ok(out)
}
