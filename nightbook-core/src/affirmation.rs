//! Daily affirmation, picked reproducibly from the day key.

use crate::calendar::DayKey;
use chrono::Datelike;

pub const AFFIRMATIONS: [&str; 5] = [
    "I protect my energy and my money respects me.",
    "My boundaries are part of my bag.",
    "I track it, I stack it, I secure it.",
    "I leave early before burnout steals my glow.",
    "I'm in control. My money follows my standards.",
];

/// Affirmation for an explicit seed.
pub fn affirmation_from_seed(seed: u64) -> &'static str {
    AFFIRMATIONS[(mix(seed) % AFFIRMATIONS.len() as u64) as usize]
}

/// Affirmation for a day. Stable for the whole day.
pub fn affirmation_for(day: DayKey) -> &'static str {
    let ordinal = i64::from(day.date().num_days_from_ce());
    affirmation_from_seed(ordinal as u64)
}

// splitmix64 finalizer, so neighbouring days don't walk the list in order
fn mix(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
