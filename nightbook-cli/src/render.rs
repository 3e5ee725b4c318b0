//! Plain-text views of the engine's output.

use nightbook_core::{
    Bill, Dashboard, DayKey, Entry, EntryView, Settings, WeekCheckIn, format_usd, tier_label,
};

pub fn dashboard(dash: &Dashboard, settings: &Settings) -> String {
    let mut out = Vec::new();
    out.push(format!("Nightbook {}", dash.today));
    out.push(format!("\"{}\"", dash.affirmation));
    out.push(String::new());

    let t = &dash.totals30;
    out.push("Last 30 days".to_string());
    out.push(format!(
        "  gross {}  tipout {}  expenses {}  net {}",
        format_usd(t.gross),
        format_usd(t.tipout),
        format_usd(t.expenses),
        format_usd(t.net)
    ));
    out.push(format!(
        "  min hit days {}  left-early days {}  flagged days {}  (min {})",
        t.min_hits,
        t.left_early_days,
        t.flags_days,
        format_usd(settings.min_net_default)
    ));

    let a = &dash.totals_all;
    out.push(format!(
        "All time: net {} over {} nights (min kept {}, left early {}, flags {})",
        format_usd(a.net),
        dash.entries.len(),
        a.min_kept,
        a.left_early,
        a.flags_total
    ));
    out.push(String::new());

    out.extend(target_lines(dash));
    out.push(String::new());

    out.push("Insights".to_string());
    out.push(format!("  {}", dash.insights.money_energy.message()));
    out.push(format!(
        "  {} (hit rate {:.0}%)",
        dash.insights.boss.message(),
        dash.insights.hit_rate_pct
    ));
    out.push(String::new());

    out.push(format!(
        "Net by day: {}",
        dash.series_net30
            .iter()
            .map(|n| format!("{n:.0}"))
            .collect::<Vec<_>>()
            .join(" ")
    ));
    out.push(format!(
        "Flags by day: {}",
        dash.series_flags30
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    ));
    out.push(String::new());

    out.push(format!(
        "Paid this month ({}): {} bills, {}",
        dash.bills_paid_this_month.month,
        dash.bills_paid_this_month.count,
        format_usd(dash.bills_paid_this_month.total)
    ));

    if !dash.entries.is_empty() {
        out.push(String::new());
        out.push("Recent nights".to_string());
        out.extend(dash.entries.iter().take(5).map(|v| format!("  {}", entry_view_line(v))));
    }

    out.join("\n")
}

/// This week's bills, target and plan, plus the week's check-in.
pub fn week(dash: &Dashboard) -> String {
    let mut out = target_lines(dash);
    out.push(String::new());
    out.push(checkin(dash.week_start, dash.this_week_checkin.as_ref()));
    out.join("\n")
}

fn target_lines(dash: &Dashboard) -> Vec<String> {
    let target = &dash.weekly_target;
    let plan = &dash.night_plan;
    let mut out = vec![format!("Week {} to {}", dash.week_start, dash.week_end)];

    if dash.week_bills.due.is_empty() {
        let hint = if dash.has_bills {
            "no bills due this week"
        } else {
            "no bills yet (nightbook bill add)"
        };
        out.push(format!("  {hint}"));
    } else {
        for row in dash.week_bills.running_unpaid() {
            out.push(format!(
                "  {}  running unpaid {}",
                bill_line(&row.bill),
                format_usd(row.running_unpaid)
            ));
        }
    }

    out.push(format!(
        "  unpaid {} + buffer {} ({:.0}%) = target {}",
        format_usd(target.base),
        format_usd(target.buffer),
        target.buffer_percent,
        format_usd(target.total)
    ));
    out.push(format!(
        "  {} of {} bills unpaid; {} nights needed at {} per night",
        target.unpaid_count,
        target.total_count,
        target.nights_needed,
        format_usd(target.per_night)
    ));
    out.push(format!(
        "  plan: {} nights at {} each",
        plan.planned_nights,
        format_usd(plan.per_night_planned)
    ));
    out
}

pub fn checkin(week_start: DayKey, checkin: Option<&WeekCheckIn>) -> String {
    match checkin {
        Some(c) if !c.reflection.is_empty() => format!(
            "Check-in for week of {week_start} (updated {}):\n  {}",
            c.updated_at.format("%Y-%m-%d %H:%M UTC"),
            c.reflection
        ),
        Some(c) => format!(
            "Check-in for week of {week_start} is empty (cleared {})",
            c.updated_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => format!("No check-in for week of {week_start}"),
    }
}

fn entry_view_line(view: &EntryView) -> String {
    format!(
        "{}  {}  net {}  {}{}",
        view.id,
        date_or_dash(view.date),
        format_usd(view.net),
        view.tier_label(),
        if view.hit_min { "  [min hit]" } else { "" }
    )
}

pub fn entry_line(entry: &Entry) -> String {
    let mut line = format!(
        "{}  {}  gross {}  tipout {}  expenses {}  net {}  {}",
        entry.id,
        date_or_dash(entry.date),
        format_usd(entry.gross),
        format_usd(entry.tipout),
        format_usd(entry.expenses),
        format_usd(entry.net()),
        tier_label(entry.net())
    );
    if entry.min_kept {
        line.push_str("  [min kept]");
    }
    if entry.left_early {
        line.push_str("  [left early]");
    }
    let flags: Vec<&str> = entry.flags.active().map(|f| f.name()).collect();
    if !flags.is_empty() {
        line.push_str(&format!("  flags: {}", flags.join(",")));
    }
    if !entry.notes.is_empty() {
        line.push_str(&format!("  \"{}\"", entry.notes));
    }
    line
}

pub fn bill_line(bill: &Bill) -> String {
    let name = if bill.name.is_empty() { "(unnamed)" } else { bill.name.as_str() };
    format!(
        "{}  {}  {}  due {}  {}",
        bill.id,
        name,
        format_usd(bill.amount),
        date_or_dash(bill.due_date),
        if bill.paid { "paid" } else { "unpaid" }
    )
}

pub fn settings(settings: &Settings) -> String {
    [
        format!("min net per night:     {}", format_usd(settings.min_net_default)),
        format!("buffer percent:        {:.0}%", settings.buffer_percent),
        format!("expected net / night:  {}", format_usd(settings.expected_net_per_night)),
    ]
    .join("\n")
}

fn date_or_dash(date: Option<DayKey>) -> String {
    date.map_or_else(|| "----------".to_string(), |d| d.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nightbook_core::{CheckIns, Flag, Snapshot};

    fn day(s: &str) -> DayKey {
        DayKey::parse(s).unwrap()
    }

    #[test]
    fn test_entry_line() {
        let entry = Entry::new("n1", day("2024-01-09"))
            .with_amounts(500.0, 80.0, 40.0)
            .with_flag(Flag::Anxious);
        let line = entry_line(&entry);
        assert!(line.starts_with("n1  2024-01-09"));
        assert!(line.contains("net $380.00"));
        assert!(line.contains("Minimum Secured"));
        assert!(line.contains("flags: anxious"));
    }

    #[test]
    fn test_negative_net_shows_placeholder() {
        let entry = Entry::new("n2", day("2024-01-09")).with_amounts(50.0, 80.0, 0.0);
        let line = entry_line(&entry);
        assert!(line.contains("net -$30.00"));
        assert!(line.ends_with(nightbook_core::UNCLASSIFIED_LABEL));
    }

    #[test]
    fn test_bill_line_without_due_date() {
        let mut bill = Bill::new("b1", day("2024-01-09")).named("", 45.5);
        bill.due_date = None;
        assert_eq!(bill_line(&bill), "b1  (unnamed)  $45.50  due ----------  unpaid");
    }

    #[test]
    fn test_checkin_states() {
        let week = day("2024-01-08");
        assert_eq!(checkin(week, None), "No check-in for week of 2024-01-08");

        let mut c = WeekCheckIn {
            reflection: "solid week".into(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 14, 20, 30, 0).unwrap(),
        };
        assert!(checkin(week, Some(&c)).ends_with("solid week"));
        c.reflection.clear();
        assert!(checkin(week, Some(&c)).contains("is empty"));
    }

    #[test]
    fn test_week_view() {
        let bills = vec![
            Bill::new("rent", day("2024-01-12")).named("Rent", 300.0),
            Bill::new("car", day("2024-01-08")).named("Car", 200.0),
        ];
        let settings = Settings::default();
        let checkins = CheckIns::new();
        let snapshot = Snapshot {
            entries: &[],
            bills: &bills,
            settings: &settings,
            checkins: &checkins,
        };
        let dash = Dashboard::compute(&snapshot, day("2024-01-10"), Some(5));
        let text = week(&dash);
        assert!(text.contains("Week 2024-01-08 to 2024-01-14"));
        assert!(text.contains("running unpaid $500.00"));
        assert!(text.contains("= target $550.00"));
        assert!(text.contains("2 nights needed at $300.00"));
        assert!(text.contains("plan: 5 nights at $110.00 each"));
        assert!(text.contains("No check-in"));

        let full = dashboard(&dash, &settings);
        assert!(full.contains("Last 30 days"));
        assert!(full.contains(dash.affirmation));
    }
}
