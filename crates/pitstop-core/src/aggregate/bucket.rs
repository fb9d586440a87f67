//! Day and month bucketing of dated amounts
//!
//! Sums are exact decimals. Bucket sets merge by plain addition, so a large
//! input can be partitioned, bucketed piecewise and recombined in any order.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dates::{DateWindow, MonthKey};

/// Bucket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
        }
    }

    /// The bucket a date falls into
    pub fn key_for(&self, date: NaiveDate) -> BucketKey {
        match self {
            Self::Day => BucketKey::Day(date),
            Self::Month => BucketKey::Month(MonthKey::of(date)),
        }
    }
}

/// Bucket identity: an ISO day or a structured month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketKey {
    Day(NaiveDate),
    Month(MonthKey),
}

/// Result of one bucketing pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Buckets {
    pub totals: BTreeMap<BucketKey, Decimal>,
    /// Records without a usable date
    pub skipped: usize,
}

impl Buckets {
    /// Sum for a bucket, zero when nothing landed in it
    pub fn total(&self, key: BucketKey) -> Decimal {
        self.totals.get(&key).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn day(&self, date: NaiveDate) -> Decimal {
        self.total(BucketKey::Day(date))
    }

    pub fn month(&self, month: MonthKey) -> Decimal {
        self.total(BucketKey::Month(month))
    }

    /// Sum of every bucket
    pub fn grand_total(&self) -> Decimal {
        self.totals.values().copied().sum()
    }

    /// Largest single bucket, zero when empty
    pub fn max(&self) -> Decimal {
        self.totals.values().copied().max().unwrap_or(Decimal::ZERO)
    }

    /// Combine two partial results
    pub fn merge(mut self, other: Buckets) -> Buckets {
        for (key, value) in other.totals {
            *self.totals.entry(key).or_insert(Decimal::ZERO) += value;
        }
        self.skipped += other.skipped;
        self
    }
}

/// Group `(date, value)` pairs into buckets inside an inclusive window.
///
/// Pairs outside the window are dropped silently. Pairs with no date are
/// dropped and counted in [`Buckets::skipped`].
pub fn bucket<I>(entries: I, granularity: Granularity, window: &DateWindow) -> Buckets
where
    I: IntoIterator<Item = (Option<NaiveDate>, Decimal)>,
{
    let mut buckets = Buckets::default();
    for (date, value) in entries {
        let Some(date) = date else {
            buckets.skipped += 1;
            continue;
        };
        if !window.contains(date) {
            continue;
        }
        *buckets
            .totals
            .entry(granularity.key_for(date))
            .or_insert(Decimal::ZERO) += value;
    }
    buckets
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

    fn sample() -> Vec<(Option<NaiveDate>, Decimal)> {
        vec![
            (Some(d(2024, 1, 5)), amt("10.10")),
            (Some(d(2024, 1, 5)), amt("0.20")),
            (Some(d(2024, 1, 31)), amt("5")),
            (Some(d(2024, 2, 1)), amt("7.70")),
            (Some(d(2023, 12, 31)), amt("100")),
            (None, amt("42")),
            (Some(d(2024, 3, 1)), amt("1")),
        ]
    }

    fn jan_feb() -> DateWindow {
        DateWindow::new(d(2024, 1, 1), d(2024, 2, 29)).unwrap()
    }

    #[test]
    fn test_day_buckets_accumulate() {
        let buckets = bucket(sample(), Granularity::Day, &jan_feb());
        assert_eq!(buckets.day(d(2024, 1, 5)), amt("10.30"));
        assert_eq!(buckets.day(d(2024, 1, 31)), amt("5"));
        assert_eq!(buckets.day(d(2024, 1, 6)), Decimal::ZERO);
        assert_eq!(buckets.totals.len(), 3);
        assert_eq!(buckets.skipped, 1);
    }

    #[test]
    fn test_month_buckets() {
        let buckets = bucket(sample(), Granularity::Month, &jan_feb());
        assert_eq!(buckets.month(MonthKey::new(2024, 1).unwrap()), amt("15.30"));
        assert_eq!(buckets.month(MonthKey::new(2024, 2).unwrap()), amt("7.70"));
        assert_eq!(buckets.month(MonthKey::new(2023, 12).unwrap()), Decimal::ZERO);
    }

    #[test]
    fn test_window_edges_are_inclusive() {
        let window = DateWindow::new(d(2024, 1, 31), d(2024, 2, 1)).unwrap();
        let buckets = bucket(sample(), Granularity::Day, &window);
        assert_eq!(buckets.grand_total(), amt("12.70"));
    }

    #[test]
    fn test_conservation() {
        let window = jan_feb();
        let entries = sample();
        let expected: Decimal = entries
            .iter()
            .filter_map(|(date, value)| date.filter(|d| window.contains(*d)).map(|_| *value))
            .sum();
        for granularity in [Granularity::Day, Granularity::Month] {
            let buckets = bucket(entries.clone(), granularity, &window);
            assert_eq!(buckets.grand_total(), expected);
        }
    }

    #[test]
    fn test_exact_decimal_sums() {
        let window = MonthKey::new(2024, 1).unwrap().window();
        let entries = (0..1000).map(|_| (Some(d(2024, 1, 15)), amt("0.10")));
        let buckets = bucket(entries, Granularity::Month, &window);
        assert_eq!(buckets.month(MonthKey::new(2024, 1).unwrap()), amt("100.00"));
    }

    #[test]
    fn test_merge_of_partitions_matches_whole() {
        let window = jan_feb();
        let entries = sample();
        let whole = bucket(entries.clone(), Granularity::Day, &window);

        let (left, right) = entries.split_at(3);
        let a = bucket(left.to_vec(), Granularity::Day, &window);
        let b = bucket(right.to_vec(), Granularity::Day, &window);

        assert_eq!(a.clone().merge(b.clone()), whole);
        assert_eq!(b.merge(a), whole);
    }

    #[test]
    fn test_empty_input() {
        let buckets = bucket(Vec::new(), Granularity::Month, &jan_feb());
        assert!(buckets.totals.is_empty());
        assert_eq!(buckets.max(), Decimal::ZERO);
        assert_eq!(buckets.skipped, 0);
    }
}
