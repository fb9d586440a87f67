//! Expense analytics command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pitstop_core::{
    analytics_report, dashboard_summary, month_grid, AnalyticsQuery, EngineConfig, ExpenseFilter,
    ExpenseSource, MemoryStore, MonthCalendar, MonthKey, TimeRange, TrendMatrix,
};
use rust_decimal::Decimal;

use super::Output;

pub fn cmd_analytics(
    store: &MemoryStore,
    config: &EngineConfig,
    today: NaiveDate,
    car: Option<i64>,
    range: &str,
    output: Output,
) -> Result<()> {
    let time_range = range.parse::<TimeRange>().map_err(|e| anyhow::anyhow!(e))?;
    let query = AnalyticsQuery::new(time_range).car(car);
    let report = analytics_report(store, &query, today, config)?;

    if output.is_json() {
        return output.print_json(&report);
    }

    println!();
    println!("📊 Expense Analytics");
    println!("   Period: {} to {}", report.period.from, report.period.to);
    if let Some(car_id) = report.car_id {
        println!("   Car: {}", car_id);
    }
    println!("   ─────────────────────────────────────────────────────────────");

    if report.total.is_zero() {
        println!("   No expenses found in this period.");
    } else {
        println!("   Total: {:.2}", report.total);
        println!();
        println!("   {:15} │ {:>10} │ {:>6} │ {:>5}", "Category", "Amount", "%", "Count");
        println!("   ────────────────┼────────────┼────────┼───────");
        for slice in &report.categories {
            let share = slice.amount / report.total * Decimal::ONE_HUNDRED;
            println!(
                "   {:15} │ {:>10.2} │ {:>5.1}% │ {:>5}",
                slice.category.as_str(),
                slice.amount,
                share,
                slice.expense_count
            );
        }
    }

    print_trend(&report.trend);

    for calendar in &report.calendars {
        print_calendar(calendar);
    }

    if report.skipped > 0 {
        println!();
        println!("   \x1b[2m{} expense(s) without a date were left out\x1b[0m", report.skipped);
    }

    Ok(())
}

fn print_trend(trend: &TrendMatrix) {
    println!();
    println!("📈 Monthly Trend");
    print!("   {:15}", "Category");
    for label in &trend.labels {
        print!(" │ {:>9}", label);
    }
    println!();
    print!("   ───────────────");
    for _ in &trend.labels {
        print!("─┼──────────");
    }
    println!();

    for row in &trend.rows {
        print!("   {:15}", row.category.as_str());
        for value in &row.values {
            print!(" │ {:>9.2}", value);
        }
        println!();
    }

    print!("   {:15}", "Total");
    for total in trend.month_totals() {
        print!(" │ {:>9.2}", total);
    }
    println!();
}

/// Shade for a heatmap cell
fn shade(intensity: f64) -> &'static str {
    match intensity {
        i if i <= 0.0 => " ",
        i if i < 0.25 => "░",
        i if i < 0.5 => "▒",
        i if i < 0.75 => "▓",
        _ => "█",
    }
}

fn print_calendar(calendar: &MonthCalendar) {
    println!();
    println!("📅 {}  (total {:.2})", calendar.label, calendar.total);
    println!("   Su  Mo  Tu  We  Th  Fr  Sa");
    for week in calendar.cells.chunks(7) {
        print!("  ");
        for cell in week {
            match cell.day {
                Some(day) => print!("{:>3}{}", day, shade(cell.intensity)),
                None => print!("    "),
            }
        }
        println!();
    }
}

pub fn cmd_calendar(
    store: &MemoryStore,
    config: &EngineConfig,
    month: &str,
    car: Option<i64>,
    output: Output,
) -> Result<()> {
    let month = month
        .parse::<MonthKey>()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Invalid --month")?;
    let expenses = store.expenses(&ExpenseFilter::new().car_id(car))?;
    let calendar = month_grid(
        month,
        expenses.iter().map(|e| (e.date, e.amount)),
        config.intensity_floor,
    );

    if output.is_json() {
        return output.print_json(&calendar);
    }

    print_calendar(&calendar);
    println!();
    println!("   {:12} │ {:>10} │ {:>9}", "Date", "Amount", "Intensity");
    println!("   ─────────────┼────────────┼──────────");
    for cell in calendar.days().filter(|c| !c.total.is_zero()) {
        if let Some(date) = cell.date {
            println!(
                "   {:12} │ {:>10.2} │ {:>9.2}",
                date.to_string(),
                cell.total,
                cell.intensity
            );
        }
    }

    Ok(())
}

pub fn cmd_dashboard(store: &MemoryStore, today: NaiveDate, output: Output) -> Result<()> {
    let summary = dashboard_summary(store, today)?;

    if output.is_json() {
        return output.print_json(&summary);
    }

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│           🚗 Pitstop Dashboard          │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Expenses:        {}", summary.expense_count);
    println!("  Total Spend:     {:.2}", summary.total);
    println!("  This Month:      {:.2}", summary.this_month);
    println!();

    if summary.expense_count == 0 {
        println!("  No expenses loaded. Pass an export with:");
        println!("  pitstop --data export.json dashboard");
        return Ok(());
    }

    println!("   {:15} │ {:>10} │ {:>5}", "Category", "Amount", "Count");
    println!("   ────────────────┼────────────┼───────");
    for slice in summary.categories.iter().filter(|c| c.expense_count > 0) {
        println!(
            "   {:15} │ {:>10.2} │ {:>5}",
            slice.category.as_str(),
            slice.amount,
            slice.expense_count
        );
    }

    println!();
    println!("   {:15} │ {:>10} │ {:>5}", "Car", "Amount", "Count");
    println!("   ────────────────┼────────────┼───────");
    for car in &summary.cars {
        println!(
            "   {:15} │ {:>10.2} │ {:>5}",
            car.car_id, car.amount, car.expense_count
        );
    }

    Ok(())
}
