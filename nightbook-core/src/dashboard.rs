//! One recompute pass: every view model derived from a record snapshot.

use crate::affirmation::affirmation_for;
use crate::calendar::{DayKey, week_end, week_start};
use crate::insights::Insights;
use crate::record::{Bill, CheckIns, Entry, Settings, WeekCheckIn};
use crate::rollup::{
    DayBucket, MonthBills, Totals30, TotalsAll, WeekBills, daily_rollup, flags_series, net_series,
};
use crate::target::{NightPlan, WeeklyTarget};
use crate::tier::EntryView;
use serde::Serialize;

/// Read-only view of the host's records for one recompute
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub entries: &'a [Entry],
    pub bills: &'a [Bill],
    pub settings: &'a Settings,
    pub checkins: &'a CheckIns,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub today: DayKey,
    pub week_start: DayKey,
    pub week_end: DayKey,
    pub days: Vec<DayBucket>,
    pub totals30: Totals30,
    pub totals_all: TotalsAll,
    pub series_net30: Vec<f64>,
    pub series_flags30: Vec<u32>,
    pub week_bills: WeekBills,
    pub weekly_target: WeeklyTarget,
    pub night_plan: NightPlan,
    pub insights: Insights,
    /// Newest-logged first
    pub entries: Vec<EntryView>,
    pub bills_paid_this_month: MonthBills,
    pub this_week_checkin: Option<WeekCheckIn>,
    pub affirmation: &'static str,
    pub has_bills: bool,
}

impl Dashboard {
    /// Derive everything for `today`. `planned_nights` is the user's night
    /// choice for the week; `None` uses the planner default.
    pub fn compute(snapshot: &Snapshot<'_>, today: DayKey, planned_nights: Option<u8>) -> Self {
        let settings = snapshot.settings;
        let week_start = week_start(today);
        let week_end = week_end(week_start);

        let days = daily_rollup(today, snapshot.entries, settings);
        let totals30 = Totals30::from_buckets(&days);
        let insights = Insights::generate(&days, totals30.min_hits);

        let week_bills = WeekBills::for_week(week_start, week_end, snapshot.bills);
        let weekly_target = WeeklyTarget::compute(&week_bills, settings);
        let night_plan = NightPlan::for_target(&weekly_target, planned_nights);

        let entries = snapshot
            .entries
            .iter()
            .rev()
            .map(|e| EntryView::from_entry(e, settings))
            .collect();

        Self {
            today,
            week_start,
            week_end,
            series_net30: net_series(&days),
            series_flags30: flags_series(&days),
            days,
            totals30,
            totals_all: TotalsAll::from_entries(snapshot.entries),
            week_bills,
            weekly_target,
            night_plan,
            insights,
            entries,
            bills_paid_this_month: MonthBills::paid_in_month(today, snapshot.bills),
            this_week_checkin: snapshot.checkins.get(&week_start).cloned(),
            affirmation: affirmation_for(today),
            has_bills: !snapshot.bills.is_empty(),
        }
    }
}
