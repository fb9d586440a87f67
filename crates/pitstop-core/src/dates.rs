//! Calendar primitives shared by the aggregation and schedule engines
//!
//! - [`MonthKey`]: structured (year, month) bucket key, never a locale string
//! - [`DateWindow`]: inclusive `[from, to]` range of calendar days
//! - Month arithmetic that clamps day-of-month overflow to the last valid day

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{Error, Result};

/// A calendar month, ordered chronologically (year first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month number
    pub month: u32,
}

impl MonthKey {
    /// Build a key, rejecting month numbers outside 1..=12
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidData(format!("Invalid month number: {}", month)));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // year/month are validated on construction, day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// The whole month as a window
    pub fn window(&self) -> DateWindow {
        DateWindow {
            from: self.first_day(),
            to: self.last_day(),
        }
    }

    pub fn next(&self) -> Self {
        self.add(1)
    }

    pub fn prev(&self) -> Self {
        self.add(-1)
    }

    /// Shift by a signed number of months
    pub fn add(&self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Short presentation label, e.g. "Oct 2026"
    pub fn short_label(&self) -> String {
        self.first_day().format("%b %Y").to_string()
    }

    /// Long presentation label, e.g. "October 2026"
    pub fn long_label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("Invalid month: {} (use YYYY-MM)", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid month: {} (use YYYY-MM)", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month: {} (use YYYY-MM)", s))?;
        Self::new(year, month).map_err(|e| e.to_string())
    }
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// Build a window, rejecting `from > to`
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(Error::InvalidData(format!(
                "Window start {} is after window end {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    /// Window covering `count` whole months ending with `last`
    pub fn months_ending(last: MonthKey, count: u32) -> Self {
        let first = last.add(1 - count.max(1) as i32);
        Self {
            from: first.first_day(),
            to: last.last_day(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Overlap of two windows, `None` when they are disjoint
    pub fn intersect(&self, other: &DateWindow) -> Option<DateWindow> {
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        (from <= to).then_some(DateWindow { from, to })
    }

    /// Every month touched by the window, oldest first
    pub fn months(&self) -> Vec<MonthKey> {
        let last = MonthKey::of(self.to);
        let mut months = Vec::new();
        let mut current = MonthKey::of(self.from);
        while current <= last {
            months.push(current);
            current = current.next();
        }
        months
    }
}

/// Add months, clamping the day to the end of the target month.
/// Jan 31 + 1 month is the last day of February.
pub fn add_months_clamped(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Subtract months with the same clamping rule as [`add_months_clamped`]
pub fn sub_months_clamped(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_sub_months(Months::new(months))
}

/// Parse a record date.
///
/// Accepts a plain ISO day (`2024-05-10`), an RFC 3339 timestamp, or a naive
/// `YYYY-MM-DDTHH:MM:SS` timestamp. Returns `None` for anything else.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}
