//! Maintenance agenda
//!
//! Expands every series over a window into dated items, grouped by month
//! for the calendar list view.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use super::notify::fire_dates;
use super::recurrence::Recurrence;
use super::status::{classify, tracked_occurrence};
use crate::config::EngineConfig;
use crate::dates::{DateWindow, MonthKey};
use crate::error::{Error, Result};
use crate::models::{CarId, EventStatus, EventType, MaintenanceEventSeries, SeriesId};
use crate::source::{EventFilter, EventSource};

/// Filter for agenda items
#[derive(Debug, Clone, Copy, Default)]
pub struct AgendaFilter {
    pub car_id: Option<CarId>,
    pub event_type: Option<EventType>,
    pub status: Option<EventStatus>,
}

impl AgendaFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn car_id(mut self, id: Option<CarId>) -> Self {
        self.car_id = id;
        self
    }

    pub fn event_type(mut self, event_type: Option<EventType>) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn status(mut self, status: Option<EventStatus>) -> Self {
        self.status = status;
        self
    }
}

/// One occurrence on the agenda
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaItem {
    pub series_id: SeriesId,
    pub car_id: CarId,
    pub title: String,
    pub event_type: EventType,
    pub date: NaiveDate,
    pub index: u64,
    pub status: EventStatus,
    pub recurring: bool,
    pub notify_on: Vec<NaiveDate>,
}

/// Items of one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaGroup {
    pub month: MonthKey,
    /// Presentation label ("October 2026")
    pub label: String,
    pub items: Vec<AgendaItem>,
}

/// Default agenda window around `today`
pub fn default_window(today: NaiveDate, config: &EngineConfig) -> Result<DateWindow> {
    let from = today
        .checked_sub_days(Days::new(config.agenda_lookback_days as u64))
        .ok_or_else(|| Error::InvalidData(format!("no agenda window before {}", today)))?;
    let to = today
        .checked_add_days(Days::new(config.agenda_lookahead_days as u64))
        .ok_or_else(|| Error::InvalidData(format!("no agenda window after {}", today)))?;
    DateWindow::new(from, to)
}

/// Items of one series inside `window`.
///
/// The series' completed flag only covers its tracked occurrence; every
/// other occurrence is classified by date alone.
pub fn series_items(
    series: &MaintenanceEventSeries,
    window: &DateWindow,
    today: NaiveDate,
) -> Result<Vec<AgendaItem>> {
    let recurrence = Recurrence::for_series(series)?;
    let tracked = tracked_occurrence(series, today)?;

    let mut items = Vec::new();
    for occurrence in recurrence.occurrences(window) {
        let completed = series.completed && occurrence.index == tracked.index;
        items.push(AgendaItem {
            series_id: series.id,
            car_id: series.car_id,
            title: series.title.clone(),
            event_type: series.event_type,
            date: occurrence.date,
            index: occurrence.index,
            status: classify(occurrence.date, completed, today),
            recurring: series.recurrence.is_recurring(),
            notify_on: fire_dates(occurrence.date, &series.notification_days_before)?
                .into_iter()
                .collect(),
        });
    }
    Ok(items)
}

/// Build the agenda for `window`, grouped by month, oldest first
pub fn build_agenda<S>(
    source: &S,
    filter: &AgendaFilter,
    window: &DateWindow,
    today: NaiveDate,
) -> Result<Vec<AgendaGroup>>
where
    S: EventSource + ?Sized,
{
    let series = source.event_series(
        &EventFilter::new()
            .car_id(filter.car_id)
            .event_type(filter.event_type),
    )?;

    let mut items = Vec::new();
    for s in &series {
        match series_items(s, window, today) {
            Ok(mut found) => items.append(&mut found),
            Err(e) => {
                warn!(series_id = s.id, error = %e, "Skipping series");
            }
        }
    }
    if let Some(status) = filter.status {
        items.retain(|item| item.status == status);
    }
    items.sort_by(|a, b| (a.date, a.series_id).cmp(&(b.date, b.series_id)));

    let mut groups: BTreeMap<MonthKey, Vec<AgendaItem>> = BTreeMap::new();
    for item in items {
        groups.entry(MonthKey::of(item.date)).or_default().push(item);
    }

    debug!(series = series.len(), months = groups.len(), "Built agenda");

    Ok(groups
        .into_iter()
        .map(|(month, items)| AgendaGroup {
            month,
            label: month.long_label(),
            items,
        })
        .collect())
}
