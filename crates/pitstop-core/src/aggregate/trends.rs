//! Per-category totals and monthly trend series
//!
//! Every output contains the whole category universe in legend order, even
//! categories with no activity, so chart shape and colors never shift.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::bucket::{bucket, Granularity};
use crate::dates::{DateWindow, MonthKey};
use crate::models::{ExpenseCategory, ExpenseRecord};

/// One slice of the category pie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub color: &'static str,
    pub amount: Decimal,
    pub expense_count: usize,
}

/// One line of the trend chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub category: ExpenseCategory,
    pub color: &'static str,
    /// Exactly one sum per month of the axis, oldest first
    pub values: Vec<Decimal>,
}

/// Category x month matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendMatrix {
    pub months: Vec<MonthKey>,
    /// Presentation labels for `months` ("Oct 2026")
    pub labels: Vec<String>,
    pub rows: Vec<TrendRow>,
    /// Records without a usable date
    pub skipped: usize,
}

impl TrendMatrix {
    pub fn row(&self, category: ExpenseCategory) -> &TrendRow {
        &self.rows[category.index()]
    }

    /// Sum of all categories for each month
    pub fn month_totals(&self) -> Vec<Decimal> {
        (0..self.months.len())
            .map(|i| self.rows.iter().map(|row| row.values[i]).sum())
            .collect()
    }
}

/// Sum expenses per category inside a window, in universe order
pub fn category_totals(expenses: &[ExpenseRecord], window: &DateWindow) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = ExpenseCategory::ALL
        .iter()
        .map(|&category| CategoryTotal {
            category,
            color: category.color(),
            amount: Decimal::ZERO,
            expense_count: 0,
        })
        .collect();

    for expense in expenses {
        if expense.date.is_some_and(|d| window.contains(d)) {
            let slot = &mut totals[expense.category.index()];
            slot.amount += expense.amount;
            slot.expense_count += 1;
        }
    }
    totals
}

/// Build the trend matrix for the `bucket_count` months ending with the
/// month of `today`.
pub fn trend_matrix(
    expenses: &[ExpenseRecord],
    today: NaiveDate,
    bucket_count: u32,
) -> TrendMatrix {
    let bucket_count = bucket_count.max(1);
    let current = MonthKey::of(today);
    let months: Vec<MonthKey> = (0..bucket_count)
        .rev()
        .map(|back| current.add(-(back as i32)))
        .collect();
    let window = DateWindow::months_ending(current, bucket_count);

    let mut skipped = 0;
    let rows = ExpenseCategory::ALL
        .iter()
        .map(|&category| {
            let buckets = bucket(
                expenses
                    .iter()
                    .filter(|e| e.category == category)
                    .map(|e| (e.date, e.amount)),
                Granularity::Month,
                &window,
            );
            skipped += buckets.skipped;
            TrendRow {
                category,
                color: category.color(),
                values: months.iter().map(|&m| buckets.month(m)).collect(),
            }
        })
        .collect();

    TrendMatrix {
        labels: months.iter().map(MonthKey::short_label).collect(),
        months,
        rows,
        skipped,
    }
}
