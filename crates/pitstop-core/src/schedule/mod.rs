//! Maintenance scheduling
//!
//! - `recurrence`: occurrence dates from a start date and recurrence rule
//! - `status`: Overdue / Upcoming / Completed classification
//! - `notify`: reminder fire dates
//! - `agenda`: month-grouped occurrence lists across series

pub mod agenda;
pub mod notify;
pub mod recurrence;
pub mod status;

pub use agenda::{build_agenda, default_window, series_items, AgendaFilter, AgendaGroup, AgendaItem};
pub use notify::{fire_dates, notification_plan, ScheduledNotification};
pub use recurrence::{Occurrence, Occurrences, Recurrence};
pub use status::{classify, series_status, tracked_occurrence};
