//! Notification fire dates
//!
//! Only computes when reminders should fire. Dates already in the past are
//! kept: whether to drop, flag or still deliver them is up to the sender.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::recurrence::Recurrence;
use crate::dates::DateWindow;
use crate::error::{Error, Result};
use crate::models::{MaintenanceEventSeries, SeriesId};

/// Reject negative offsets
pub fn validate_offsets(offsets: &[i64]) -> Result<()> {
    match offsets.iter().find(|&&o| o < 0) {
        Some(bad) => Err(Error::Notification(format!(
            "days before must be zero or more, got {}",
            bad
        ))),
        None => Ok(()),
    }
}

/// Fire dates for one occurrence, ascending and deduplicated.
///
/// Offsets that reach before the earliest representable date are dropped.
pub fn fire_dates(occurrence: NaiveDate, offsets: &[i64]) -> Result<BTreeSet<NaiveDate>> {
    validate_offsets(offsets)?;
    Ok(offsets
        .iter()
        .filter_map(|&offset| occurrence.checked_sub_days(Days::new(offset as u64)))
        .collect())
}

/// A reminder to raise on `notify_on` for the occurrence on `occurrence_date`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ScheduledNotification {
    pub notify_on: NaiveDate,
    pub occurrence_date: NaiveDate,
    pub series_id: SeriesId,
}

/// Every reminder for the occurrences of a series inside `window`,
/// ordered by fire date
pub fn notification_plan(
    series: &MaintenanceEventSeries,
    window: &DateWindow,
) -> Result<Vec<ScheduledNotification>> {
    let recurrence = Recurrence::for_series(series)?;
    let mut plan = Vec::new();
    for occurrence in recurrence.occurrences(window) {
        for notify_on in fire_dates(occurrence.date, &series.notification_days_before)? {
            plan.push(ScheduledNotification {
                notify_on,
                occurrence_date: occurrence.date,
                series_id: series.id,
            });
        }
    }
    plan.sort();
    Ok(plan)
}
