//! Expense aggregation
//!
//! - `bucket`: day/month bucketing within a window
//! - `trends`: per-category totals and the category x month trend matrix
//! - `calendar`: padded month heatmap grids

pub mod bucket;
pub mod calendar;
pub mod trends;

pub use bucket::{bucket, BucketKey, Buckets, Granularity};
pub use calendar::{layout_month, month_grid, CalendarCell, MonthCalendar};
pub use trends::{category_totals, trend_matrix, CategoryTotal, TrendMatrix, TrendRow};
