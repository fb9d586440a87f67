//! Occurrence status classification
//!
//! Overdue and Upcoming are views over the clock: the same occurrence moves
//! from Upcoming to Overdue as `today` advances, with no write involved.
//! Completed is the only state set by an explicit action.

use chrono::NaiveDate;

use super::recurrence::{Occurrence, Recurrence};
use crate::error::Result;
use crate::models::{EventStatus, MaintenanceEventSeries};

/// Classify one occurrence.
///
/// An occurrence due today is still Upcoming; it becomes Overdue the day
/// after.
pub fn classify(occurrence_date: NaiveDate, completed: bool, today: NaiveDate) -> EventStatus {
    if completed {
        EventStatus::Completed
    } else if occurrence_date < today {
        EventStatus::Overdue
    } else {
        EventStatus::Upcoming
    }
}

/// The occurrence a series' `completed` flag refers to.
///
/// That is the latest occurrence on or before `today`, or the first
/// occurrence when the series has not started yet.
pub fn tracked_occurrence(series: &MaintenanceEventSeries, today: NaiveDate) -> Result<Occurrence> {
    let recurrence = Recurrence::for_series(series)?;
    Ok(recurrence
        .last_on_or_before(today)
        .unwrap_or(Occurrence {
            series_id: series.id,
            date: series.start_date,
            index: 0,
        }))
}

/// Status of a series as shown in the maintenance list
pub fn series_status(
    series: &MaintenanceEventSeries,
    today: NaiveDate,
) -> Result<(Occurrence, EventStatus)> {
    let tracked = tracked_occurrence(series, today)?;
    Ok((tracked, classify(tracked.date, series.completed, today)))
}
