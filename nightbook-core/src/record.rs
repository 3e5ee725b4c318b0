//! Record types: logged nights, bills, settings and weekly check-ins.
//!
//! Field names serialize in camelCase so records round-trip with the JSON
//! the store writes. Every field deserializes leniently (see [`crate::money::de`]).

use crate::calendar::DayKey;
use crate::money::{clamp_finite, de};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Net for one night. Not floored at zero.
pub fn net(gross: f64, tipout: f64, expenses: f64) -> f64 {
    gross - tipout - expenses
}

/// One logged night of work
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Opaque unique token
    #[serde(default, deserialize_with = "de::text")]
    pub id: String,
    /// Day worked. Several entries may share a day.
    #[serde(default, deserialize_with = "de::day_key")]
    pub date: Option<DayKey>,
    #[serde(default, deserialize_with = "de::amount")]
    pub gross: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub tipout: f64,
    #[serde(default, deserialize_with = "de::amount")]
    pub expenses: f64,
    /// Stuck to the personal minimum rule
    #[serde(default, deserialize_with = "de::flag")]
    pub min_kept: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub left_early: bool,
    #[serde(default, deserialize_with = "de::or_default")]
    pub flags: Flags,
    /// Journal text, never read by the engine
    #[serde(default, deserialize_with = "de::text")]
    pub notes: String,
}

impl Entry {
    /// A blank night dated `date`, as created by an explicit "add".
    pub fn new(id: impl Into<String>, date: DayKey) -> Self {
        Self {
            id: id.into(),
            date: Some(date),
            gross: 0.0,
            tipout: 0.0,
            expenses: 0.0,
            min_kept: false,
            left_early: false,
            flags: Flags::default(),
            notes: String::new(),
        }
    }

    pub fn with_amounts(mut self, gross: f64, tipout: f64, expenses: f64) -> Self {
        self.gross = gross;
        self.tipout = tipout;
        self.expenses = expenses;
        self
    }

    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.set(flag, true);
        self
    }

    pub fn net(&self) -> f64 {
        net(self.gross, self.tipout, self.expenses)
    }
}

/// Named energy indicators recorded for a night
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flags {
    #[serde(default, deserialize_with = "de::flag")]
    pub tired: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub anxious: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub disrespected: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub r#unsafe: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Tired,
    Anxious,
    Disrespected,
    Unsafe,
}

impl Flag {
    pub const ALL: [Flag; 4] = [Flag::Tired, Flag::Anxious, Flag::Disrespected, Flag::Unsafe];

    pub fn name(&self) -> &'static str {
        match self {
            Flag::Tired => "tired",
            Flag::Anxious => "anxious",
            Flag::Disrespected => "disrespected",
            Flag::Unsafe => "unsafe",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

impl Flags {
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Tired => self.tired,
            Flag::Anxious => self.anxious,
            Flag::Disrespected => self.disrespected,
            Flag::Unsafe => self.r#unsafe,
        }
    }

    pub fn set(&mut self, flag: Flag, on: bool) {
        match flag {
            Flag::Tired => self.tired = on,
            Flag::Anxious => self.anxious = on,
            Flag::Disrespected => self.disrespected = on,
            Flag::Unsafe => self.r#unsafe = on,
        }
    }

    /// Number of indicators set
    pub fn count(&self) -> u32 {
        Flag::ALL.iter().filter(|f| self.get(**f)).count() as u32
    }

    pub fn active(&self) -> impl Iterator<Item = Flag> + '_ {
        Flag::ALL.into_iter().filter(|f| self.get(*f))
    }
}

/// A recurring or one-off bill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(default, deserialize_with = "de::text")]
    pub id: String,
    #[serde(default, deserialize_with = "de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "de::amount")]
    pub amount: f64,
    /// Bills without a due date never enter weekly or monthly windows
    #[serde(default, deserialize_with = "de::day_key")]
    pub due_date: Option<DayKey>,
    #[serde(default, deserialize_with = "de::flag")]
    pub paid: bool,
}

impl Bill {
    /// A blank, unpaid bill due on `due_date`.
    pub fn new(id: impl Into<String>, due_date: DayKey) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            amount: 0.0,
            due_date: Some(due_date),
            paid: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>, amount: f64) -> Self {
        self.name = name.into();
        self.amount = amount;
        self
    }

    pub fn with_paid(mut self, paid: bool) -> Self {
        self.paid = paid;
        self
    }
}

pub const DEFAULT_MIN_NET: f64 = 250.0;
pub const DEFAULT_BUFFER_PERCENT: f64 = 10.0;
pub const DEFAULT_EXPECTED_NET_PER_NIGHT: f64 = 300.0;
pub const SETTINGS_AMOUNT_MAX: f64 = 999_999.0;

fn default_min_net() -> f64 {
    DEFAULT_MIN_NET
}

fn default_buffer_percent() -> f64 {
    DEFAULT_BUFFER_PERCENT
}

fn default_expected_net_per_night() -> f64 {
    DEFAULT_EXPECTED_NET_PER_NIGHT
}

/// Process-wide planning settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// A night "hits" when its net reaches this
    #[serde(default = "default_min_net", deserialize_with = "de::amount")]
    pub min_net_default: f64,
    /// Percentage added on top of unpaid bills (0-100)
    #[serde(default = "default_buffer_percent", deserialize_with = "de::amount")]
    pub buffer_percent: f64,
    /// Typical net for one night, used to count nights needed (never 0)
    #[serde(
        default = "default_expected_net_per_night",
        deserialize_with = "de::amount"
    )]
    pub expected_net_per_night: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_net_default: DEFAULT_MIN_NET,
            buffer_percent: DEFAULT_BUFFER_PERCENT,
            expected_net_per_night: DEFAULT_EXPECTED_NET_PER_NIGHT,
        }
    }
}

impl Settings {
    /// Bring every field back into its allowed range.
    pub fn clamped(self) -> Self {
        let mut out = self;
        out.set_min_net_default(self.min_net_default);
        out.set_buffer_percent(self.buffer_percent);
        out.set_expected_net_per_night(self.expected_net_per_night);
        out
    }

    pub fn set_min_net_default(&mut self, value: f64) {
        self.min_net_default = clamp_finite(value, 0.0, SETTINGS_AMOUNT_MAX);
    }

    pub fn set_buffer_percent(&mut self, value: f64) {
        self.buffer_percent = clamp_finite(value, 0.0, 100.0);
    }

    pub fn set_expected_net_per_night(&mut self, value: f64) {
        self.expected_net_per_night = clamp_finite(value, 1.0, SETTINGS_AMOUNT_MAX);
    }
}

/// Sunday reflection for one week
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeekCheckIn {
    #[serde(default, deserialize_with = "de::text")]
    pub reflection: String,
    #[serde(default, deserialize_with = "de::or_default")]
    pub updated_at: DateTime<Utc>,
}

/// Check-ins keyed by week-start day
pub type CheckIns = BTreeMap<DayKey, WeekCheckIn>;

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> DayKey {
        DayKey::parse(s).unwrap()
    }

    #[test]
    fn test_net_formula() {
        assert_eq!(net(500.0, 80.0, 40.0), 380.0);
        assert_eq!(net(50.0, 80.0, 0.0), -30.0);
    }

    #[test]
    fn test_entry_defaults() {
        let e = Entry::new("e-1", day("2024-01-01"));
        assert_eq!(e.date, Some(day("2024-01-01")));
        assert_eq!(e.net(), 0.0);
        assert!(!e.min_kept);
        assert!(!e.left_early);
        assert_eq!(e.flags.count(), 0);
    }

    #[test]
    fn test_flags_count_and_names() {
        let mut flags = Flags::default();
        flags.set(Flag::Tired, true);
        flags.set(Flag::Unsafe, true);
        assert_eq!(flags.count(), 2);
        assert_eq!(flags.active().map(|f| f.name()).collect::<Vec<_>>(), ["tired", "unsafe"]);
        assert_eq!(Flag::from_name("Disrespected"), Some(Flag::Disrespected));
        assert_eq!(Flag::from_name("sleepy"), None);
    }

    #[test]
    fn test_entry_lenient_json() {
        let json = r#"{
            "id": "abc",
            "date": "2024-01-05",
            "gross": "500",
            "tipout": "",
            "expenses": null,
            "minKept": true,
            "flags": {"tired": true, "unsafe": "yes"},
            "notes": "slow start"
        }"#;
        let e: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(e.gross, 500.0);
        assert_eq!(e.tipout, 0.0);
        assert_eq!(e.expenses, 0.0);
        assert!(e.min_kept);
        assert!(!e.left_early);
        assert_eq!(e.flags.count(), 2);
        assert_eq!(e.net(), 500.0);
    }

    #[test]
    fn test_entry_garbage_fields_degrade() {
        let json = r#"{"date": "", "gross": "abc", "flags": null, "leftEarly": [1, 2]}"#;
        let e: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(e.id, "");
        assert_eq!(e.date, None);
        assert_eq!(e.gross, 0.0);
        assert_eq!(e.flags, Flags::default());
        assert!(!e.left_early);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let e = Entry::new("e-1", day("2024-01-01")).with_flag(Flag::Unsafe);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["date"], "2024-01-01");
        assert_eq!(v["minKept"], false);
        assert_eq!(v["flags"]["unsafe"], true);
    }

    #[test]
    fn test_bill_without_due_date() {
        let b: Bill = serde_json::from_str(r#"{"id":"b1","name":"Rent","amount":"1200","dueDate":""}"#)
            .unwrap();
        assert_eq!(b.amount, 1200.0);
        assert_eq!(b.due_date, None);
        assert!(!b.paid);
    }

    #[test]
    fn test_settings_defaults_when_missing() {
        let s: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.min_net_default, 250.0);
        assert_eq!(s.buffer_percent, 10.0);
        assert_eq!(s.expected_net_per_night, 300.0);
    }

    #[test]
    fn test_settings_clamp() {
        let mut s = Settings::default();
        s.set_buffer_percent(150.0);
        assert_eq!(s.buffer_percent, 100.0);
        s.set_expected_net_per_night(0.0);
        assert_eq!(s.expected_net_per_night, 1.0);
        s.set_min_net_default(-5.0);
        assert_eq!(s.min_net_default, 0.0);
        s.set_min_net_default(5_000_000.0);
        assert_eq!(s.min_net_default, 999_999.0);
    }

    #[test]
    fn test_settings_clamped_after_load() {
        let s: Settings =
            serde_json::from_str(r#"{"bufferPercent": "250", "expectedNetPerNight": ""}"#).unwrap();
        let s = s.clamped();
        assert_eq!(s.buffer_percent, 100.0);
        assert_eq!(s.expected_net_per_night, 1.0);
        assert_eq!(s.min_net_default, 250.0);
    }

    #[test]
    fn test_checkin_bad_timestamp_defaults() {
        let c: WeekCheckIn =
            serde_json::from_str(r#"{"reflection":"kept my rule","updatedAt":"yesterday"}"#).unwrap();
        assert_eq!(c.reflection, "kept my rule");
        assert_eq!(c.updated_at, DateTime::<Utc>::default());
    }
}
