//! Weekly target planner: unpaid bills plus a buffer, split into nights.

use crate::money::{clamp_finite, round_half_up};
use crate::record::Settings;
use crate::rollup::WeekBills;
use serde::Serialize;

/// Most nights a week can be planned for
pub const MAX_PLANNED_NIGHTS: u8 = 7;
/// Plan used when no nights are needed at all
pub const FALLBACK_PLANNED_NIGHTS: u8 = 3;

/// What this week has to bring in
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyTarget {
    /// Unpaid bills due this week
    pub base: f64,
    pub buffer: f64,
    pub total: f64,
    /// Buffer percentage actually applied (0-100)
    pub buffer_percent: f64,
    /// Whole-unit expected net for one night, at least 1
    pub per_night: f64,
    pub nights_needed: u32,
    pub unpaid_count: usize,
    pub total_count: usize,
}

impl WeeklyTarget {
    pub fn compute(week: &WeekBills, settings: &Settings) -> Self {
        let base: f64 = week.unpaid().map(|b| b.amount).sum();
        let buffer_percent = clamp_finite(settings.buffer_percent, 0.0, 100.0);
        let buffer = round_half_up(base * buffer_percent / 100.0);
        let total = base + buffer;

        let per_night = settings.expected_net_per_night.floor().max(1.0);
        let nights_needed = if total <= 0.0 {
            0
        } else {
            (total / per_night).ceil() as u32
        };

        Self {
            base,
            buffer,
            total,
            buffer_percent,
            per_night,
            nights_needed,
            unpaid_count: week.unpaid_count(),
            total_count: week.due.len(),
        }
    }
}

/// A chosen number of working nights and the resulting per-night goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NightPlan {
    pub planned_nights: u8,
    pub per_night_planned: f64,
}

impl NightPlan {
    /// Starting choice for the planner: nights needed, kept within a week,
    /// or a fallback when nothing is owed.
    pub fn default_nights(nights_needed: u32) -> u8 {
        if nights_needed == 0 {
            FALLBACK_PLANNED_NIGHTS
        } else {
            nights_needed.clamp(1, u32::from(MAX_PLANNED_NIGHTS)) as u8
        }
    }

    /// Split `total` over `planned` nights, with `planned` held to 1..=7.
    pub fn new(total: f64, planned: u8) -> Self {
        let planned_nights = planned.clamp(1, MAX_PLANNED_NIGHTS);
        Self {
            planned_nights,
            per_night_planned: total / f64::from(planned_nights),
        }
    }

    /// Plan for a target, using the user's choice if there is one.
    pub fn for_target(target: &WeeklyTarget, planned: Option<u8>) -> Self {
        let nights = planned.unwrap_or_else(|| Self::default_nights(target.nights_needed));
        Self::new(target.total, nights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DayKey;
    use crate::record::Bill;

    fn day(s: &str) -> DayKey {
        DayKey::parse(s).unwrap()
    }

    fn week_of(bills: &[Bill]) -> WeekBills {
        WeekBills::for_week(day("2024-01-01"), day("2024-01-07"), bills)
    }

    #[test]
    fn test_weekly_target_math() {
        let bills = vec![
            Bill::new("a", day("2024-01-02")).named("Car", 200.0),
            Bill::new("b", day("2024-01-05")).named("Rent", 300.0),
        ];
        let target = WeeklyTarget::compute(&week_of(&bills), &Settings::default());
        assert_eq!(target.base, 500.0);
        assert_eq!(target.buffer, 50.0);
        assert_eq!(target.total, 550.0);
        assert_eq!(target.per_night, 300.0);
        assert_eq!(target.nights_needed, 2);
        assert_eq!(target.unpaid_count, 2);
        assert_eq!(target.total_count, 2);
    }

    #[test]
    fn test_paid_bills_do_not_count() {
        let bills = vec![
            Bill::new("a", day("2024-01-02")).named("Car", 200.0).with_paid(true),
            Bill::new("b", day("2024-01-05")).named("Rent", 300.0),
        ];
        let target = WeeklyTarget::compute(&week_of(&bills), &Settings::default());
        assert_eq!(target.base, 300.0);
        assert_eq!(target.total, 330.0);
        assert_eq!(target.unpaid_count, 1);
        assert_eq!(target.total_count, 2);
    }

    #[test]
    fn test_zero_bills() {
        let target = WeeklyTarget::compute(&week_of(&[]), &Settings::default());
        assert_eq!(target.total, 0.0);
        assert_eq!(target.nights_needed, 0);
    }

    #[test]
    fn test_buffer_rounds_half_up() {
        let bills = vec![Bill::new("a", day("2024-01-02")).named("Phone", 45.0)];
        // 45 * 10% = 4.5 -> 5
        let target = WeeklyTarget::compute(&week_of(&bills), &Settings::default());
        assert_eq!(target.buffer, 5.0);
        assert_eq!(target.total, 50.0);
    }

    #[test]
    fn test_per_night_floored_and_never_zero() {
        let bills = vec![Bill::new("a", day("2024-01-02")).named("Rent", 10.0)];
        let settings = Settings {
            expected_net_per_night: 0.4,
            buffer_percent: 0.0,
            ..Settings::default()
        };
        let target = WeeklyTarget::compute(&week_of(&bills), &settings);
        assert_eq!(target.per_night, 1.0);
        assert_eq!(target.nights_needed, 10);

        let settings = Settings {
            expected_net_per_night: 299.9,
            ..Settings::default()
        };
        let target = WeeklyTarget::compute(&week_of(&bills), &settings);
        assert_eq!(target.per_night, 299.0);
    }

    #[test]
    fn test_out_of_range_buffer_is_clamped() {
        let bills = vec![Bill::new("a", day("2024-01-02")).named("Rent", 100.0)];
        let settings = Settings {
            buffer_percent: 150.0,
            ..Settings::default()
        };
        let target = WeeklyTarget::compute(&week_of(&bills), &settings);
        assert_eq!(target.buffer_percent, 100.0);
        assert_eq!(target.total, 200.0);
    }

    #[test]
    fn test_default_planned_nights() {
        assert_eq!(NightPlan::default_nights(0), 3);
        assert_eq!(NightPlan::default_nights(2), 2);
        assert_eq!(NightPlan::default_nights(12), 7);
    }

    #[test]
    fn test_night_plan_split() {
        let plan = NightPlan::new(550.0, 2);
        assert_eq!(plan.planned_nights, 2);
        assert_eq!(plan.per_night_planned, 275.0);

        let guarded = NightPlan::new(550.0, 0);
        assert_eq!(guarded.planned_nights, 1);
        assert_eq!(guarded.per_night_planned, 550.0);

        let capped = NightPlan::new(700.0, 9);
        assert_eq!(capped.planned_nights, 7);
        assert_eq!(capped.per_night_planned, 100.0);
    }

    #[test]
    fn test_plan_for_target_defaults_from_nights_needed() {
        let bills = vec![
            Bill::new("a", day("2024-01-02")).named("Car", 200.0),
            Bill::new("b", day("2024-01-05")).named("Rent", 300.0),
        ];
        let target = WeeklyTarget::compute(&week_of(&bills), &Settings::default());
        let plan = NightPlan::for_target(&target, None);
        assert_eq!(plan.planned_nights, 2);
        assert_eq!(plan.per_night_planned, 275.0);

        let chosen = NightPlan::for_target(&target, Some(5));
        assert_eq!(chosen.per_night_planned, 110.0);
    }
}
