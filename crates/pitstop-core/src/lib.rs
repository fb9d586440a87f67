//! Pitstop Core Library
//!
//! Temporal aggregation and scheduling for the Pitstop vehicle tracker:
//! - Validated expense and maintenance event models
//! - Day/month bucketing, category trends and calendar heatmaps
//! - Recurrence expansion, status classification and reminder dates
//! - Analytics, dashboard and agenda reports over a data source

pub mod aggregate;
pub mod config;
pub mod dates;
pub mod error;
pub mod models;
pub mod report;
pub mod schedule;
pub mod source;

pub use aggregate::{
    bucket, category_totals, layout_month, month_grid, trend_matrix, BucketKey, Buckets,
    CalendarCell, CategoryTotal, Granularity, MonthCalendar, TrendMatrix, TrendRow,
};
pub use config::EngineConfig;
pub use dates::{DateWindow, MonthKey};
pub use error::{Error, Result};
pub use models::{
    CarId, EventStatus, EventType, ExpenseCategory, ExpenseRecord, MaintenanceEventSeries,
    RecurrenceRule, RecurrenceType, SeriesId, TimeRange,
};
pub use report::{
    analytics_report, dashboard_summary, period_window, AnalyticsQuery, AnalyticsReport,
    CarTotal, DashboardSummary, ReportPeriod,
};
pub use schedule::{
    build_agenda, classify, fire_dates, notification_plan, series_status, tracked_occurrence,
    AgendaFilter, AgendaGroup, AgendaItem, Occurrence, Recurrence, ScheduledNotification,
};
pub use source::{EventFilter, EventSource, ExpenseFilter, ExpenseSource, MemoryStore};
