//! Night tiers: classify a net amount by ordered range lookup.

use crate::calendar::DayKey;
use crate::record::{Entry, Settings};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder the presentation layer shows for an unclassified net
pub const UNCLASSIFIED_LABEL: &str = "—";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    DeadMaintenance,
    BelowMinimum,
    MinimumSecured,
    GoodMoney,
    GreatNight,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::DeadMaintenance => "Dead / Maintenance Night",
            Tier::BelowMinimum => "Below Minimum",
            Tier::MinimumSecured => "Minimum Secured",
            Tier::GoodMoney => "Good Money",
            Tier::GreatNight => "Great Night (Bossed Up)",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct TierRange {
    min: f64,
    max: f64,
    tier: Tier,
}

// Inclusive on both ends. Disjoint by construction.
const TIERS: [TierRange; 5] = [
    TierRange { min: 0.0, max: 150.0, tier: Tier::DeadMaintenance },
    TierRange { min: 151.0, max: 249.0, tier: Tier::BelowMinimum },
    TierRange { min: 250.0, max: 399.0, tier: Tier::MinimumSecured },
    TierRange { min: 400.0, max: 699.0, tier: Tier::GoodMoney },
    TierRange { min: 700.0, max: f64::INFINITY, tier: Tier::GreatNight },
];

/// First tier whose range contains `net`.
///
/// Returns `None` for a negative net (and for fractional values that fall
/// between two rows, e.g. 150.5). Nothing is clamped.
pub fn classify(net: f64) -> Option<Tier> {
    TIERS
        .iter()
        .find(|r| net >= r.min && net <= r.max)
        .map(|r| r.tier)
}

/// Display label for `net`, or [`UNCLASSIFIED_LABEL`].
pub fn tier_label(net: f64) -> &'static str {
    classify(net).map_or(UNCLASSIFIED_LABEL, |t| t.label())
}

/// What the presentation layer shows for one logged night
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    pub id: String,
    pub date: Option<DayKey>,
    pub net: f64,
    pub tier: Option<Tier>,
    /// Net reached the configured minimum
    pub hit_min: bool,
}

impl EntryView {
    pub fn from_entry(entry: &Entry, settings: &Settings) -> Self {
        let net = entry.net();
        Self {
            id: entry.id.clone(),
            date: entry.date,
            net,
            tier: classify(net),
            hit_min: net >= settings.min_net_default,
        }
    }

    pub fn tier_label(&self) -> &'static str {
        self.tier.map_or(UNCLASSIFIED_LABEL, |t| t.label())
    }
}
