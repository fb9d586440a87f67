//! Maintenance schedule command implementations

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use pitstop_core::dates::add_months_clamped;
use pitstop_core::schedule::{default_window, series_items};
use pitstop_core::{
    build_agenda, notification_plan, series_status, AgendaFilter, DateWindow, EngineConfig,
    EventSource, EventStatus, EventType, MemoryStore,
};
use serde::Serialize;

use super::{parse_optional_date, truncate, Output};

/// Fill missing window ends; `to` falls back to `default_to(from)`
fn resolve_window(
    from: Option<&str>,
    to: Option<&str>,
    default_from: NaiveDate,
    default_to: impl FnOnce(NaiveDate) -> Option<NaiveDate>,
) -> Result<DateWindow> {
    let from = parse_optional_date("--from", from)?.unwrap_or(default_from);
    let to = match parse_optional_date("--to", to)? {
        Some(to) => to,
        None => default_to(from).context("Window end is out of range")?,
    };
    Ok(DateWindow::new(from, to)?)
}

fn join_dates(dates: &[NaiveDate]) -> String {
    if dates.is_empty() {
        return "-".to_string();
    }
    dates
        .iter()
        .map(|d| d.format("%m-%d").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn status_badge(status: EventStatus) -> String {
    match status {
        EventStatus::Overdue => format!("\x1b[31m{:9}\x1b[0m", status.label()),
        EventStatus::Upcoming => format!("{:9}", status.label()),
        EventStatus::Completed => format!("\x1b[2m{:9}\x1b[0m", status.label()),
    }
}

pub fn cmd_occurrences(
    store: &MemoryStore,
    event: i64,
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
    output: Output,
) -> Result<()> {
    let series = store.series_by_id(event)?;
    let window = resolve_window(from, to, series.start_date, |from| {
        add_months_clamped(from, 12)
    })?;
    let items = series_items(&series, &window, today)?;

    if output.is_json() {
        return output.print_json(&items);
    }

    let (tracked, status) = series_status(&series, today)?;

    println!();
    println!("🔧 {} (car {})", series.title, series.car_id);
    println!(
        "   {} · {} · every {}",
        series.event_type.label(),
        series.recurrence.kind.label(),
        series.recurrence.interval
    );
    println!("   Current: {} {}", tracked.date, status.label());
    println!("   Window: {} to {}", window.from, window.to);
    println!("   ─────────────────────────────────────────────");

    if items.is_empty() {
        println!("   No occurrences in this window.");
        return Ok(());
    }

    println!("   {:>4} │ {:10} │ {:9} │ Reminders", "#", "Date", "Status");
    println!("   ─────┼────────────┼───────────┼──────────────");
    for item in &items {
        println!(
            "   {:>4} │ {:10} │ {} │ {}",
            item.index,
            item.date.to_string(),
            status_badge(item.status),
            join_dates(&item.notify_on)
        );
    }

    Ok(())
}

/// Agenda filters as given on the command line
pub struct AgendaArgs<'a> {
    pub car: Option<i64>,
    pub event_type: Option<&'a str>,
    pub status: Option<&'a str>,
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
}

pub fn cmd_agenda(
    store: &MemoryStore,
    config: &EngineConfig,
    today: NaiveDate,
    args: AgendaArgs<'_>,
    output: Output,
) -> Result<()> {
    let event_type = args
        .event_type
        .map(|t| t.parse::<EventType>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;
    let status = args
        .status
        .map(|s| s.parse::<EventStatus>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let defaults = default_window(today, config)?;
    let lookahead = Days::new(config.agenda_lookahead_days as u64);
    let window = resolve_window(args.from, args.to, defaults.from, |from| {
        if args.from.is_some() {
            from.checked_add_days(lookahead)
        } else {
            Some(defaults.to)
        }
    })?;

    let filter = AgendaFilter::new()
        .car_id(args.car)
        .event_type(event_type)
        .status(status);
    let agenda = build_agenda(store, &filter, &window, today)?;

    if output.is_json() {
        return output.print_json(&agenda);
    }

    println!();
    println!("🗓️  Maintenance Agenda");
    println!("   {} to {} (today {})", window.from, window.to, today);
    println!("   ─────────────────────────────────────────────────────────────");

    if agenda.is_empty() {
        println!("   Nothing scheduled in this window.");
        return Ok(());
    }

    for group in &agenda {
        println!();
        println!("   {}", group.label);
        for item in &group.items {
            println!(
                "   {:10} │ {} │ {:>3} │ {:12} │ {:25} │ {}",
                item.date.to_string(),
                status_badge(item.status),
                item.car_id,
                item.event_type.label(),
                truncate(&item.title, 25),
                join_dates(&item.notify_on)
            );
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ReminderRow<'a> {
    title: &'a str,
    notify_on: NaiveDate,
    occurrence_date: NaiveDate,
    days_before: i64,
}

pub fn cmd_reminders(
    store: &MemoryStore,
    config: &EngineConfig,
    event: i64,
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
    output: Output,
) -> Result<()> {
    let series = store.series_by_id(event)?;
    let lookahead = Days::new(config.agenda_lookahead_days as u64);
    let window = resolve_window(from, to, today, |from| from.checked_add_days(lookahead))?;
    let plan = notification_plan(&series, &window)?;

    let rows: Vec<ReminderRow> = plan
        .iter()
        .map(|n| ReminderRow {
            title: &series.title,
            notify_on: n.notify_on,
            occurrence_date: n.occurrence_date,
            days_before: (n.occurrence_date - n.notify_on).num_days(),
        })
        .collect();

    if output.is_json() {
        return output.print_json(&rows);
    }

    println!();
    println!("🔔 Reminders for {}", series.title);
    println!("   Occurrences from {} to {}", window.from, window.to);
    println!("   ─────────────────────────────────────────────");

    if rows.is_empty() {
        println!("   No reminders scheduled.");
        return Ok(());
    }

    println!("   {:10} │ {:10} │ {:>11}", "Notify On", "Due", "Days Before");
    println!("   ───────────┼────────────┼────────────");
    for row in &rows {
        let marker = if row.notify_on < today { " (past)" } else { "" };
        println!(
            "   {:10} │ {:10} │ {:>11}{}",
            row.notify_on.to_string(),
            row.occurrence_date.to_string(),
            row.days_before,
            marker
        );
    }

    Ok(())
}
