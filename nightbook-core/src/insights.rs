//! Insight generator: flagged vs. calm nights and minimum hit rate.
//!
//! Simple fixed-threshold heuristics over the 30-day rollup. Nothing here is
//! configurable or learned.

use crate::money::format_usd;
use crate::rollup::{DayBucket, WINDOW_DAYS};
use serde::Serialize;

/// Average-net gap (either direction) that counts as a real difference
pub const ENERGY_GAP: f64 = 25.0;
/// Hit-rate percentages for the boss narrative
pub const HIGH_HIT_RATE: f64 = 70.0;
pub const BUILDING_HIT_RATE: f64 = 40.0;

/// How money tracks with the energy flags
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoneyEnergy {
    /// No flagged day in the window
    NoFlags,
    /// Calm days out-earn flagged days by `diff`
    EnergyCost { diff: f64 },
    /// Flagged days out-earn calm days
    Resilience,
    Steady,
}

impl MoneyEnergy {
    pub fn select(flagged_days: usize, diff: f64) -> Self {
        if flagged_days == 0 {
            MoneyEnergy::NoFlags
        } else if diff > ENERGY_GAP {
            MoneyEnergy::EnergyCost { diff }
        } else if diff < -ENERGY_GAP {
            MoneyEnergy::Resilience
        } else {
            MoneyEnergy::Steady
        }
    }

    pub fn message(&self) -> String {
        match self {
            MoneyEnergy::NoFlags => {
                "No flags logged this month. That's self-control and peace.".to_string()
            }
            MoneyEnergy::EnergyCost { diff } => format!(
                "When flags are checked, your average net is lower by about {}. \
                 Protecting your energy protects your bag.",
                format_usd(*diff)
            ),
            MoneyEnergy::Resilience => "Even on flagged nights, you still performed. \
                 That's resilience, but don't normalize burnout."
                .to_string(),
            MoneyEnergy::Steady => "Your net is fairly steady whether flags happen or not. \
                 Keep boundaries tight and money stays consistent."
                .to_string(),
        }
    }
}

/// Consistency at hitting the minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BossLevel {
    HighConsistency,
    BuildingConsistency,
    Rebuilding,
}

impl BossLevel {
    pub fn select(hit_rate_pct: f64) -> Self {
        if hit_rate_pct >= HIGH_HIT_RATE {
            BossLevel::HighConsistency
        } else if hit_rate_pct >= BUILDING_HIT_RATE {
            BossLevel::BuildingConsistency
        } else {
            BossLevel::Rebuilding
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BossLevel::HighConsistency => {
                "Boss behavior: you hit your minimum most nights. Keep that standard."
            }
            BossLevel::BuildingConsistency => {
                "You're building consistency. Tighten the plan and protect your energy."
            }
            BossLevel::Rebuilding => {
                "No shame, just data. This month is for rebuilding your standard, one night at a time."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Insights {
    pub money_energy: MoneyEnergy,
    pub boss: BossLevel,
    pub avg_flagged: f64,
    pub avg_calm: f64,
    /// `avg_calm - avg_flagged`
    pub diff: f64,
    pub hit_rate_pct: f64,
}

impl Insights {
    /// `min_hits` is the day-level count from [`crate::rollup::Totals30`].
    pub fn generate(days: &[DayBucket], min_hits: u32) -> Self {
        let (flagged, calm): (Vec<&DayBucket>, Vec<&DayBucket>) =
            days.iter().partition(|d| d.flags_count > 0);

        let avg_flagged = avg_net(&flagged);
        let avg_calm = avg_net(&calm);
        let diff = avg_calm - avg_flagged;
        let hit_rate_pct = f64::from(min_hits) * 100.0 / WINDOW_DAYS as f64;

        Self {
            money_energy: MoneyEnergy::select(flagged.len(), diff),
            boss: BossLevel::select(hit_rate_pct),
            avg_flagged,
            avg_calm,
            diff,
            hit_rate_pct,
        }
    }
}

fn avg_net(days: &[&DayBucket]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    days.iter().map(|d| d.net).sum::<f64>() / days.len() as f64
}
