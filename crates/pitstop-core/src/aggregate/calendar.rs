//! Month heatmap layout
//!
//! A month grid starts with blank cells up to the weekday of the 1st
//! (Sunday first), then one cell per day carrying a color intensity.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::bucket::{bucket, Buckets, Granularity};
use crate::dates::MonthKey;

/// Lowest intensity of a day with any spending
pub const DEFAULT_INTENSITY_FLOOR: f64 = 0.1;

/// One grid cell; padding cells have no day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarCell {
    pub day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub total: Decimal,
    /// 0 for empty days, otherwise in `[floor, 1]`
    pub intensity: f64,
}

impl CalendarCell {
    fn padding() -> Self {
        Self {
            day: None,
            date: None,
            total: Decimal::ZERO,
            intensity: 0.0,
        }
    }

    pub fn is_padding(&self) -> bool {
        self.day.is_none()
    }
}

/// A laid out month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthCalendar {
    pub month: MonthKey,
    /// Presentation label ("October 2026")
    pub label: String,
    pub total: Decimal,
    pub max_daily: Decimal,
    pub cells: Vec<CalendarCell>,
}

impl MonthCalendar {
    /// Cells for actual days, without the leading padding
    pub fn days(&self) -> impl Iterator<Item = &CalendarCell> {
        self.cells.iter().filter(|c| !c.is_padding())
    }
}

/// Intensity of one day relative to the month maximum.
///
/// A zero maximum yields 0 for every day instead of dividing.
pub fn intensity(daily: Decimal, month_max: Decimal, floor: f64) -> f64 {
    if month_max.is_zero() || daily <= Decimal::ZERO {
        return 0.0;
    }
    let ratio = (daily / month_max).to_f64().unwrap_or(0.0);
    ratio.max(floor).min(1.0)
}

/// Lay out a month from day buckets.
///
/// Day buckets outside `month` are ignored, so the same buckets can be laid
/// out for every month of a longer window.
pub fn layout_month(month: MonthKey, daily: &Buckets, floor: f64) -> MonthCalendar {
    let first = month.first_day();
    let padding = first.weekday().num_days_from_sunday() as usize;

    let day_totals: Vec<(NaiveDate, Decimal)> = (1..=month.days_in_month())
        .filter_map(|day| NaiveDate::from_ymd_opt(month.year, month.month, day))
        .map(|date| (date, daily.day(date)))
        .collect();
    let max_daily = day_totals
        .iter()
        .map(|(_, total)| *total)
        .max()
        .unwrap_or(Decimal::ZERO);

    let mut cells = Vec::with_capacity(padding + day_totals.len());
    cells.extend((0..padding).map(|_| CalendarCell::padding()));
    cells.extend(day_totals.iter().map(|&(date, total)| CalendarCell {
        day: Some(date.day()),
        date: Some(date),
        total,
        intensity: intensity(total, max_daily, floor),
    }));

    MonthCalendar {
        month,
        label: month.long_label(),
        total: day_totals.iter().map(|(_, total)| *total).sum(),
        max_daily,
        cells,
    }
}

/// Bucket `(date, amount)` pairs by day for one month and lay it out
pub fn month_grid<I>(month: MonthKey, entries: I, floor: f64) -> MonthCalendar
where
    I: IntoIterator<Item = (Option<NaiveDate>, Decimal)>,
{
    let daily = bucket(entries, Granularity::Day, &month.window());
    layout_month(month, &daily, floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn amt(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_padding_matches_first_weekday() {
        // 2024-05-01 is a Wednesday
        let may = month_grid(MonthKey::new(2024, 5).unwrap(), Vec::new(), DEFAULT_INTENSITY_FLOOR);
        assert_eq!(may.cells.iter().take_while(|c| c.is_padding()).count(), 3);
        assert_eq!(may.days().count(), 31);
        assert_eq!(may.cells.len(), 34);

        // 2023-10-01 is a Sunday
        let oct = month_grid(MonthKey::new(2023, 10).unwrap(), Vec::new(), DEFAULT_INTENSITY_FLOOR);
        assert!(!oct.cells[0].is_padding());
        assert_eq!(oct.cells[0].day, Some(1));

        // 2024-02 starts on Thursday and has 29 days
        let feb = month_grid(MonthKey::new(2024, 2).unwrap(), Vec::new(), DEFAULT_INTENSITY_FLOOR);
        assert_eq!(feb.cells.len(), 4 + 29);
        assert_eq!(feb.cells.last().and_then(|c| c.day), Some(29));
    }

    #[test]
    fn test_all_zero_month_has_zero_intensity() {
        let entries = vec![
            (Some(d(2024, 5, 2)), Decimal::ZERO),
            (Some(d(2024, 5, 9)), Decimal::ZERO),
        ];
        let grid = month_grid(MonthKey::new(2024, 5).unwrap(), entries, DEFAULT_INTENSITY_FLOOR);
        assert_eq!(grid.max_daily, Decimal::ZERO);
        assert!(grid.days().all(|c| c.intensity == 0.0));
    }

    #[test]
    fn test_intensity_scaling_and_floor() {
        let entries = vec![
            (Some(d(2024, 5, 1)), amt("200")),
            (Some(d(2024, 5, 2)), amt("50")),
            (Some(d(2024, 5, 3)), amt("1")),
            (Some(d(2024, 6, 1)), amt("5000")),
        ];
        let grid = month_grid(MonthKey::new(2024, 5).unwrap(), entries, DEFAULT_INTENSITY_FLOOR);
        let by_day = |day: u32| grid.days().find(|c| c.day == Some(day)).unwrap().clone();

        assert_eq!(grid.max_daily, amt("200"));
        assert_eq!(by_day(1).intensity, 1.0);
        assert!((by_day(2).intensity - 0.25).abs() < 1e-9);
        assert_eq!(by_day(3).intensity, 0.1);
        assert_eq!(by_day(4).intensity, 0.0);
        assert_eq!(grid.total, amt("251"));
    }

    #[test]
    fn test_layout_ignores_other_months() {
        let window = crate::dates::DateWindow::new(d(2024, 4, 1), d(2024, 5, 31)).unwrap();
        let daily = bucket(
            vec![(Some(d(2024, 4, 30)), amt("80")), (Some(d(2024, 5, 1)), amt("20"))],
            Granularity::Day,
            &window,
        );
        let may = layout_month(MonthKey::new(2024, 5).unwrap(), &daily, DEFAULT_INTENSITY_FLOOR);
        assert_eq!(may.max_daily, amt("20"));
        assert_eq!(may.total, amt("20"));
    }

    #[test]
    fn test_intensity_function() {
        assert_eq!(intensity(Decimal::ZERO, Decimal::ZERO, 0.1), 0.0);
        assert_eq!(intensity(amt("5"), Decimal::ZERO, 0.1), 0.0);
        assert_eq!(intensity(Decimal::ZERO, amt("10"), 0.1), 0.0);
        assert_eq!(intensity(amt("0.5"), amt("100"), 0.1), 0.1);
        assert_eq!(intensity(amt("10"), amt("10"), 0.1), 1.0);
    }
}
