//! nightbook-core: derived-metrics engine for logged nights and bills
//!
//! Everything in this crate is a pure function over borrowed records. The
//! store owns the data; the engine only reads and derives.

pub mod affirmation;
pub mod calendar;
pub mod dashboard;
pub mod insights;
pub mod money;
pub mod record;
pub mod rollup;
pub mod target;
pub mod tier;

pub use affirmation::{affirmation_for, affirmation_from_seed};
pub use calendar::{DayKey, add_days, in_range, month_key, today_key, week_end, week_start};
pub use dashboard::{Dashboard, Snapshot};
pub use insights::{BossLevel, Insights, MoneyEnergy};
pub use money::{format_usd, safe_num};
pub use record::{Bill, CheckIns, Entry, Flag, Flags, Settings, WeekCheckIn, net};
pub use rollup::{
    BillRow, DayBucket, MonthBills, Totals30, TotalsAll, WINDOW_DAYS, WeekBills, daily_rollup,
};
pub use target::{NightPlan, WeeklyTarget};
pub use tier::{EntryView, Tier, UNCLASSIFIED_LABEL, classify, tier_label};
