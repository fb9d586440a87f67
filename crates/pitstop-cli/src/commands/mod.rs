//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_store, resolve_today, date arguments, output mode)
//! - `analytics` - Expense commands (analytics, calendar, dashboard)
//! - `schedule` - Maintenance commands (occurrences, agenda, reminders)

pub mod analytics;
pub mod core;
pub mod schedule;

// Re-export command functions for main.rs
pub use analytics::*;
pub use self::core::*;
pub use schedule::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
