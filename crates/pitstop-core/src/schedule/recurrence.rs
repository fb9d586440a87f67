//! Occurrence expansion for recurring maintenance events
//!
//! Occurrence `k` is always computed from the start date as
//! `start + k * interval` periods, never by stepping from the previous
//! occurrence. Month and year steps clamp to the end of the target month, so
//! a Jan 31 monthly series lands on Feb 29, Mar 31, Apr 30, ... and never
//! drifts to the 29th.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::dates::{add_months_clamped, DateWindow};
use crate::error::Result;
use crate::models::{MaintenanceEventSeries, RecurrenceRule, RecurrenceType, SeriesId};

/// One concrete date of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Occurrence {
    pub series_id: SeriesId,
    pub date: NaiveDate,
    /// Sequence index `k` counted from the start date
    pub index: u64,
}

/// A validated (start date, rule) pair ready for expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    series_id: SeriesId,
    start: NaiveDate,
    rule: RecurrenceRule,
}

impl Recurrence {
    /// Validate the rule up front so expansion itself cannot fail
    pub fn new(series_id: SeriesId, start: NaiveDate, rule: RecurrenceRule) -> Result<Self> {
        rule.validate(start)?;
        Ok(Self {
            series_id,
            start,
            rule,
        })
    }

    pub fn for_series(series: &MaintenanceEventSeries) -> Result<Self> {
        Self::new(series.id, series.start_date, series.recurrence)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    /// Date of occurrence `k`, ignoring any window or end date.
    /// `None` when the date is not representable.
    pub fn nth(&self, k: u64) -> Option<NaiveDate> {
        if k == 0 {
            return Some(self.start);
        }
        let steps = k.checked_mul(self.rule.interval as u64)?;
        match self.rule.kind {
            RecurrenceType::None => None,
            RecurrenceType::Daily => self.start.checked_add_days(Days::new(steps)),
            RecurrenceType::Weekly => self.start.checked_add_days(Days::new(steps.checked_mul(7)?)),
            RecurrenceType::Monthly => add_months_clamped(self.start, u32::try_from(steps).ok()?),
            RecurrenceType::Yearly => {
                add_months_clamped(self.start, u32::try_from(steps.checked_mul(12)?).ok()?)
            }
        }
    }

    /// Lowest `k` whose occurrence could be on or after `from`.
    ///
    /// Exact for day based periods, a safe underestimate for month based ones
    /// (the iterator skips the remainder).
    fn first_index_from(&self, from: NaiveDate) -> u64 {
        if from <= self.start {
            return 0;
        }
        let interval = self.rule.interval as i64;
        match self.rule.kind {
            RecurrenceType::None => 0,
            RecurrenceType::Daily | RecurrenceType::Weekly => {
                let period = if self.rule.kind == RecurrenceType::Weekly { 7 } else { 1 };
                let step = period * interval;
                let days = (from - self.start).num_days();
                ((days + step - 1) / step) as u64
            }
            RecurrenceType::Monthly | RecurrenceType::Yearly => {
                let period = if self.rule.kind == RecurrenceType::Yearly { 12 } else { 1 };
                let step = period * interval;
                let months = (from.year() as i64 - self.start.year() as i64) * 12
                    + (from.month() as i64 - self.start.month() as i64);
                (months / step - 1).max(0) as u64
            }
        }
    }

    /// Lazily expand the occurrences that fall inside `window`.
    ///
    /// The returned iterator is strictly increasing and can be cloned or
    /// recreated to restart from the beginning; dropping it is the only
    /// cancellation needed.
    pub fn occurrences(&self, window: &DateWindow) -> Occurrences {
        let upper = match self.rule.end_date {
            Some(end) => end.min(window.to),
            None => window.to,
        };
        Occurrences {
            recurrence: *self,
            from: window.from,
            upper,
            next_index: self.first_index_from(window.from),
            done: false,
        }
    }

    /// Occurrence dates only
    pub fn dates(&self, window: &DateWindow) -> impl Iterator<Item = NaiveDate> {
        self.occurrences(window).map(|o| o.date)
    }

    /// Latest occurrence on or before `date`
    pub fn last_on_or_before(&self, date: NaiveDate) -> Option<Occurrence> {
        let date = match self.rule.end_date {
            Some(end) => date.min(end),
            None => date,
        };
        if date < self.start {
            return None;
        }
        let window = DateWindow {
            from: self.start,
            to: date,
        };
        if !self.rule.is_recurring() {
            return self.occurrences(&window).next();
        }
        // Jump close to `date`, then walk the few remaining steps
        let mut k = self.first_index_from(date).saturating_sub(1);
        let mut last = None;
        while let Some(candidate) = self.nth(k) {
            if candidate > date {
                break;
            }
            last = Some(Occurrence {
                series_id: self.series_id,
                date: candidate,
                index: k,
            });
            k += 1;
        }
        last
    }

    /// First occurrence on or after `date`, respecting the end date
    pub fn first_on_or_after(&self, date: NaiveDate) -> Option<Occurrence> {
        let window = DateWindow {
            from: date,
            to: NaiveDate::MAX,
        };
        self.occurrences(&window).next()
    }
}

/// Iterator over the occurrences of a [`Recurrence`] inside a window
#[derive(Debug, Clone)]
pub struct Occurrences {
    recurrence: Recurrence,
    from: NaiveDate,
    /// Smaller of the window end and the recurrence end date
    upper: NaiveDate,
    next_index: u64,
    done: bool,
}

impl Iterator for Occurrences {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        while !self.done {
            let k = self.next_index;
            let Some(date) = self.recurrence.nth(k) else {
                self.done = true;
                break;
            };
            if date > self.upper {
                self.done = true;
                break;
            }
            self.next_index += 1;
            if !self.recurrence.rule.is_recurring() {
                self.done = true;
            }
            if date >= self.from {
                return Some(Occurrence {
                    series_id: self.recurrence.series_id,
                    date,
                    index: k,
                });
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Occurrences {}
