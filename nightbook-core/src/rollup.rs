//! Aggregation: 30-day daily rollup, window totals and weekly bill windows.

use crate::calendar::{DayKey, add_days, in_range, month_key};
use crate::record::{Bill, Entry, Settings};
use serde::Serialize;
use std::collections::HashMap;

/// Length of the rolling daily window
pub const WINDOW_DAYS: usize = 30;

/// Sums for one calendar day of the rolling window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayBucket {
    pub date: DayKey,
    pub gross: f64,
    pub tipout: f64,
    pub expenses: f64,
    pub net: f64,
    /// Entries that day whose net reached the minimum
    pub min_hit_count: u32,
    pub left_early_count: u32,
    /// True flags across all entries that day
    pub flags_count: u32,
}

impl DayBucket {
    pub fn empty(date: DayKey) -> Self {
        Self {
            date,
            gross: 0.0,
            tipout: 0.0,
            expenses: 0.0,
            net: 0.0,
            min_hit_count: 0,
            left_early_count: 0,
            flags_count: 0,
        }
    }

    fn add(&mut self, entry: &Entry, min_net: f64) {
        let net = entry.net();
        self.gross += entry.gross;
        self.tipout += entry.tipout;
        self.expenses += entry.expenses;
        self.net += net;
        if net >= min_net {
            self.min_hit_count += 1;
        }
        if entry.left_early {
            self.left_early_count += 1;
        }
        self.flags_count += entry.flags.count();
    }
}

/// Roll entries into exactly [`WINDOW_DAYS`] day buckets ending at `today`.
///
/// Buckets run oldest (`today - 29`) to newest. Entries sharing a date are
/// summed; days with no entries are all-zero; undated entries are skipped.
pub fn daily_rollup(today: DayKey, entries: &[Entry], settings: &Settings) -> Vec<DayBucket> {
    let start = add_days(today, -(WINDOW_DAYS as i64 - 1));

    let mut by_date: HashMap<DayKey, DayBucket> = HashMap::new();
    for entry in entries {
        let Some(date) = entry.date else { continue };
        if !in_range(date, start, today) {
            continue;
        }
        by_date
            .entry(date)
            .or_insert_with(|| DayBucket::empty(date))
            .add(entry, settings.min_net_default);
    }

    (0..WINDOW_DAYS as i64)
        .map(|i| {
            let date = add_days(start, i);
            by_date.remove(&date).unwrap_or_else(|| DayBucket::empty(date))
        })
        .collect()
}

/// Totals over the rolling window.
///
/// The `*_days` counters are day-level: a day with three qualifying entries
/// still counts once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals30 {
    pub gross: f64,
    pub tipout: f64,
    pub expenses: f64,
    pub net: f64,
    /// Days where at least one entry reached the minimum
    pub min_hits: u32,
    pub left_early_days: u32,
    pub flags_days: u32,
}

impl Totals30 {
    pub fn from_buckets(buckets: &[DayBucket]) -> Self {
        buckets.iter().fold(Self::default(), |mut acc, b| {
            acc.gross += b.gross;
            acc.tipout += b.tipout;
            acc.expenses += b.expenses;
            acc.net += b.net;
            acc.min_hits += u32::from(b.min_hit_count > 0);
            acc.left_early_days += u32::from(b.left_early_count > 0);
            acc.flags_days += u32::from(b.flags_count > 0);
            acc
        })
    }
}

/// Totals over every logged night, dated or not
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TotalsAll {
    pub gross: f64,
    pub tipout: f64,
    pub expenses: f64,
    pub net: f64,
    /// Entries marked as having kept the minimum rule
    pub min_kept: u32,
    pub left_early: u32,
    pub flags_total: u32,
}

impl TotalsAll {
    pub fn from_entries(entries: &[Entry]) -> Self {
        entries.iter().fold(Self::default(), |mut acc, e| {
            acc.gross += e.gross;
            acc.tipout += e.tipout;
            acc.expenses += e.expenses;
            acc.net += e.net();
            acc.min_kept += u32::from(e.min_kept);
            acc.left_early += u32::from(e.left_early);
            acc.flags_total += e.flags.count();
            acc
        })
    }
}

/// Per-day net values, for charting
pub fn net_series(buckets: &[DayBucket]) -> Vec<f64> {
    buckets.iter().map(|b| b.net).collect()
}

/// Per-day flag counts, for charting
pub fn flags_series(buckets: &[DayBucket]) -> Vec<u32> {
    buckets.iter().map(|b| b.flags_count).collect()
}

/// A due bill alongside the cumulative unpaid amount up to and including it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillRow {
    pub bill: Bill,
    pub running_unpaid: f64,
}

/// Bills due inside one Monday-Sunday week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekBills {
    pub week_start: DayKey,
    pub week_end: DayKey,
    /// Sorted ascending by due date; ties keep insertion order
    pub due: Vec<Bill>,
}

impl WeekBills {
    pub fn for_week(week_start: DayKey, week_end: DayKey, bills: &[Bill]) -> Self {
        let mut due: Vec<Bill> = bills
            .iter()
            .filter(|b| {
                b.due_date
                    .is_some_and(|d| in_range(d, week_start, week_end))
            })
            .cloned()
            .collect();
        // stable: equal due dates keep insertion order
        due.sort_by_key(|b| b.due_date);

        Self {
            week_start,
            week_end,
            due,
        }
    }

    pub fn unpaid(&self) -> impl Iterator<Item = &Bill> {
        self.due.iter().filter(|b| !b.paid)
    }

    pub fn paid(&self) -> impl Iterator<Item = &Bill> {
        self.due.iter().filter(|b| b.paid)
    }

    pub fn unpaid_count(&self) -> usize {
        self.unpaid().count()
    }

    pub fn paid_count(&self) -> usize {
        self.paid().count()
    }

    pub fn running_unpaid(&self) -> Vec<BillRow> {
        let mut running = 0.0;
        self.due
            .iter()
            .map(|b| {
                if !b.paid {
                    running += b.amount;
                }
                BillRow {
                    bill: b.clone(),
                    running_unpaid: running,
                }
            })
            .collect()
    }
}

/// Paid bills whose due date falls in the current month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBills {
    /// `YYYY-MM`
    pub month: String,
    pub count: usize,
    pub total: f64,
}

impl MonthBills {
    pub fn paid_in_month(today: DayKey, bills: &[Bill]) -> Self {
        let month = month_key(today);
        let (count, total) = bills
            .iter()
            .filter(|b| b.paid && b.due_date.is_some_and(|d| month_key(d) == month))
            .fold((0, 0.0), |(n, sum), b| (n + 1, sum + b.amount));

        Self {
            month,
            count,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Flag;

    fn day(s: &str) -> DayKey {
        DayKey::parse(s).unwrap()
    }

    fn night(id: &str, date: &str, gross: f64) -> Entry {
        Entry::new(id, day(date)).with_amounts(gross, 0.0, 0.0)
    }

    #[test]
    fn test_window_is_always_thirty_days() {
        let today = day("2024-03-01");
        let buckets = daily_rollup(today, &[], &Settings::default());
        assert_eq!(buckets.len(), WINDOW_DAYS);
        assert_eq!(buckets[0].date, day("2024-02-01"));
        assert_eq!(buckets[29].date, today);
        assert!(buckets.iter().all(|b| b.net == 0.0 && b.flags_count == 0));
        assert!(buckets.windows(2).all(|w| add_days(w[0].date, 1) == w[1].date));
    }

    #[test]
    fn test_same_day_entries_are_summed() {
        let today = day("2024-01-10");
        let entries = vec![night("a", "2024-01-01", 100.0), night("b", "2024-01-01", 50.0)];
        let buckets = daily_rollup(today, &entries, &Settings::default());
        let jan1 = buckets.iter().find(|b| b.date == day("2024-01-01")).unwrap();
        assert_eq!(jan1.gross, 150.0);
        assert_eq!(jan1.net, 150.0);
    }

    #[test]
    fn test_entries_outside_window_and_undated_are_ignored() {
        let today = day("2024-01-31");
        let mut undated = night("u", "2024-01-31", 999.0);
        undated.date = None;
        let entries = vec![
            night("old", "2024-01-01", 400.0),
            night("first", "2024-01-02", 10.0),
            night("future", "2024-02-01", 400.0),
            undated,
        ];
        let buckets = daily_rollup(today, &entries, &Settings::default());
        let totals = Totals30::from_buckets(&buckets);
        assert_eq!(totals.gross, 10.0);
    }

    #[test]
    fn test_bucket_counters() {
        let today = day("2024-01-10");
        let mut a = Entry::new("a", day("2024-01-10"))
            .with_amounts(300.0, 20.0, 0.0)
            .with_flag(Flag::Tired)
            .with_flag(Flag::Anxious);
        a.left_early = true;
        let b = Entry::new("b", day("2024-01-10"))
            .with_amounts(100.0, 0.0, 0.0)
            .with_flag(Flag::Unsafe);
        let buckets = daily_rollup(today, &[a, b], &Settings::default());
        let last = buckets[29];
        assert_eq!(last.net, 380.0);
        assert_eq!(last.min_hit_count, 1);
        assert_eq!(last.left_early_count, 1);
        assert_eq!(last.flags_count, 3);
    }

    #[test]
    fn test_min_hits_count_days_not_entries() {
        let today = day("2024-01-10");
        let entries = vec![
            night("a", "2024-01-10", 300.0),
            night("b", "2024-01-10", 260.0),
            night("c", "2024-01-10", 10.0),
            night("d", "2024-01-09", 250.0),
        ];
        let buckets = daily_rollup(today, &entries, &Settings::default());
        assert_eq!(buckets[29].min_hit_count, 2);
        let totals = Totals30::from_buckets(&buckets);
        assert_eq!(totals.min_hits, 2);
    }

    #[test]
    fn test_rollup_is_idempotent() {
        let today = day("2024-01-10");
        let entries = vec![
            night("a", "2024-01-03", 120.25),
            night("b", "2024-01-03", 0.1),
            night("c", "2024-01-07", 333.33),
        ];
        let first = daily_rollup(today, &entries, &Settings::default());
        let second = daily_rollup(today, &entries, &Settings::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_totals_all_counts_every_entry() {
        let mut a = night("a", "2020-01-01", 500.0);
        a.min_kept = true;
        a.tipout = 80.0;
        a.expenses = 40.0;
        let mut b = night("b", "2024-01-01", 50.0).with_flag(Flag::Tired);
        b.tipout = 80.0;
        b.left_early = true;
        b.date = None;
        let totals = TotalsAll::from_entries(&[a, b]);
        assert_eq!(totals.gross, 550.0);
        assert_eq!(totals.net, 350.0);
        assert_eq!(totals.min_kept, 1);
        assert_eq!(totals.left_early, 1);
        assert_eq!(totals.flags_total, 1);
    }

    #[test]
    fn test_series_follow_buckets() {
        let today = day("2024-01-10");
        let entries = vec![night("a", "2024-01-10", 42.0).with_flag(Flag::Tired)];
        let buckets = daily_rollup(today, &entries, &Settings::default());
        let nets = net_series(&buckets);
        let flags = flags_series(&buckets);
        assert_eq!(nets.len(), 30);
        assert_eq!(nets[29], 42.0);
        assert_eq!(flags[29], 1);
        assert_eq!(flags[0], 0);
    }

    #[test]
    fn test_week_bills_filter_and_stable_sort() {
        let start = day("2024-01-01");
        let end = day("2024-01-07");
        let mut no_due = Bill::new("none", start).named("Loose", 10.0);
        no_due.due_date = None;
        let bills = vec![
            Bill::new("late", day("2024-01-05")).named("Phone", 60.0),
            Bill::new("tie-1", day("2024-01-02")).named("Car", 200.0),
            Bill::new("outside", day("2024-01-08")).named("Gym", 30.0),
            no_due,
            Bill::new("tie-2", day("2024-01-02")).named("Rent", 300.0),
            Bill::new("edge", day("2024-01-07")).named("Wifi", 40.0),
        ];
        let week = WeekBills::for_week(start, end, &bills);
        let ids: Vec<&str> = week.due.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["tie-1", "tie-2", "late", "edge"]);
    }

    #[test]
    fn test_week_bills_paid_split_and_running_total() {
        let start = day("2024-01-01");
        let end = day("2024-01-07");
        let bills = vec![
            Bill::new("a", day("2024-01-02")).named("Rent", 200.0),
            Bill::new("b", day("2024-01-03")).named("Car", 150.0).with_paid(true),
            Bill::new("c", day("2024-01-04")).named("Phone", 300.0),
        ];
        let week = WeekBills::for_week(start, end, &bills);
        assert_eq!(week.unpaid_count(), 2);
        assert_eq!(week.paid_count(), 1);

        let running: Vec<f64> = week.running_unpaid().iter().map(|r| r.running_unpaid).collect();
        assert_eq!(running, [200.0, 200.0, 500.0]);
    }

    #[test]
    fn test_paid_in_month() {
        let today = day("2024-02-15");
        let bills = vec![
            Bill::new("a", day("2024-02-01")).named("Rent", 900.0).with_paid(true),
            Bill::new("b", day("2024-02-20")).named("Car", 150.0),
            Bill::new("c", day("2024-01-31")).named("Phone", 60.0).with_paid(true),
            Bill::new("d", day("2024-02-28")).named("Wifi", 45.5).with_paid(true),
        ];
        let month = MonthBills::paid_in_month(today, &bills);
        assert_eq!(month.month, "2024-02");
        assert_eq!(month.count, 2);
        assert_eq!(month.total, 945.5);
    }
}
