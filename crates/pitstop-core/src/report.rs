//! Analytics and dashboard reports
//!
//! Reports pull records through an [`ExpenseSource`] and assemble the
//! aggregates a page needs in one call.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{
    bucket, category_totals, layout_month, trend_matrix, CategoryTotal, Granularity,
    MonthCalendar, TrendMatrix,
};
use crate::config::EngineConfig;
use crate::dates::{sub_months_clamped, DateWindow, MonthKey};
use crate::error::{Error, Result};
use crate::models::{CarId, ExpenseCategory, TimeRange};
use crate::source::{ExpenseFilter, ExpenseSource};

/// Analytics query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyticsQuery {
    pub car_filter: Option<CarId>,
    pub time_range: TimeRange,
}

impl AnalyticsQuery {
    pub fn new(time_range: TimeRange) -> Self {
        Self {
            car_filter: None,
            time_range,
        }
    }

    pub fn car(mut self, car_id: Option<CarId>) -> Self {
        self.car_filter = car_id;
        self
    }
}

/// Report period info
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl From<DateWindow> for ReportPeriod {
    fn from(window: DateWindow) -> Self {
        Self {
            from: window.from,
            to: window.to,
        }
    }
}

/// Window covered by a time range: one month or one year back from `today`,
/// both ends inclusive
pub fn period_window(range: TimeRange, today: NaiveDate) -> Result<DateWindow> {
    let months = match range {
        TimeRange::Month => 1,
        TimeRange::Year => 12,
    };
    let from = sub_months_clamped(today, months)
        .ok_or_else(|| Error::InvalidData(format!("no period before {}", today)))?;
    DateWindow::new(from, today)
}

/// Everything the analytics page shows
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    pub time_range: TimeRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_id: Option<CarId>,
    pub period: ReportPeriod,
    pub total: Decimal,
    pub categories: Vec<CategoryTotal>,
    pub trend: TrendMatrix,
    pub calendars: Vec<MonthCalendar>,
    /// Records without a usable date
    pub skipped: usize,
}

/// Build the analytics report for a query
pub fn analytics_report<S>(
    source: &S,
    query: &AnalyticsQuery,
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<AnalyticsReport>
where
    S: ExpenseSource + ?Sized,
{
    let window = period_window(query.time_range, today)?;
    // No window on the query itself: undated records must reach the
    // bucketer to be counted
    let expenses = source.expenses(&ExpenseFilter::new().car_id(query.car_filter))?;

    let categories = category_totals(&expenses, &window);
    let trend = trend_matrix(&expenses, today, config.buckets_for(query.time_range));

    let daily = bucket(
        expenses.iter().map(|e| (e.date, e.amount)),
        Granularity::Day,
        &window,
    );
    let calendars = window
        .months()
        .into_iter()
        .map(|month| layout_month(month, &daily, config.intensity_floor))
        .collect();

    debug!(
        range = query.time_range.as_str(),
        records = expenses.len(),
        skipped = daily.skipped,
        "Built analytics report"
    );

    Ok(AnalyticsReport {
        time_range: query.time_range,
        car_id: query.car_filter,
        period: window.into(),
        total: daily.grand_total(),
        categories,
        trend,
        calendars,
        skipped: daily.skipped,
    })
}

/// Spend of one car
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarTotal {
    pub car_id: CarId,
    pub amount: Decimal,
    pub expense_count: usize,
}

/// All-time dashboard figures
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub as_of: NaiveDate,
    pub total: Decimal,
    pub expense_count: usize,
    pub categories: Vec<CategoryTotal>,
    pub cars: Vec<CarTotal>,
    /// Spend in the month of `as_of`
    pub this_month: Decimal,
}

/// Totals over every record, dated or not
pub fn dashboard_summary<S>(source: &S, today: NaiveDate) -> Result<DashboardSummary>
where
    S: ExpenseSource + ?Sized,
{
    let expenses = source.expenses(&ExpenseFilter::new())?;

    let mut categories: Vec<CategoryTotal> = ExpenseCategory::ALL
        .iter()
        .map(|&category| CategoryTotal {
            category,
            color: category.color(),
            amount: Decimal::ZERO,
            expense_count: 0,
        })
        .collect();
    let mut cars: BTreeMap<CarId, CarTotal> = BTreeMap::new();
    let mut total = Decimal::ZERO;

    for expense in &expenses {
        total += expense.amount;

        let slot = &mut categories[expense.category.index()];
        slot.amount += expense.amount;
        slot.expense_count += 1;

        let car = cars.entry(expense.car_id).or_insert(CarTotal {
            car_id: expense.car_id,
            amount: Decimal::ZERO,
            expense_count: 0,
        });
        car.amount += expense.amount;
        car.expense_count += 1;
    }

    let this_month = bucket(
        expenses.iter().map(|e| (e.date, e.amount)),
        Granularity::Month,
        &MonthKey::of(today).window(),
    )
    .grand_total();

    Ok(DashboardSummary {
        as_of: today,
        total,
        expense_count: expenses.len(),
        categories,
        cars: cars.into_values().collect(),
        this_month,
    })
}
