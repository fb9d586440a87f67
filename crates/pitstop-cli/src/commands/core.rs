//! Shared command utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use pitstop_core::MemoryStore;
use serde::Serialize;
use tracing::debug;

/// Load the JSON export and any extra expense CSVs into one store
pub fn open_store(data: Option<&Path>, csv_files: &[PathBuf]) -> Result<MemoryStore> {
    let mut store = match data {
        Some(path) => MemoryStore::from_json_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => MemoryStore::new(),
    };
    for path in csv_files {
        let count = store
            .load_expense_csv_file(path)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        debug!(path = %path.display(), count, "Imported expense CSV");
    }
    Ok(store)
}

/// `--today` if given, else the local date
pub fn resolve_today(today: Option<&str>) -> Result<NaiveDate> {
    match today {
        Some(s) => parse_date_arg("--today", s),
        None => Ok(Local::now().date_naive()),
    }
}

/// Parse a YYYY-MM-DD argument
pub fn parse_date_arg(flag: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

/// Parse an optional YYYY-MM-DD argument
pub fn parse_optional_date(flag: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    value.map(|v| parse_date_arg(flag, v)).transpose()
}

/// Table or JSON output
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print `value` as pretty JSON
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
