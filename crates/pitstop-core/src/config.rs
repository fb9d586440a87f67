//! Engine configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/pitstop/config/engine.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::aggregate::calendar::DEFAULT_INTENSITY_FLOOR;
use crate::error::{Error, Result};
use crate::models::TimeRange;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Longest trend axis accepted from config (ten years of months)
pub const MAX_TREND_BUCKETS: u32 = 120;

/// Engine settings
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Trend months for the "month" range
    pub month_range_buckets: u32,
    /// Trend months for the "year" range
    pub year_range_buckets: u32,
    /// Lowest heatmap intensity of a day with spending
    pub intensity_floor: f64,
    /// Agenda days before today
    pub agenda_lookback_days: u32,
    /// Agenda days after today
    pub agenda_lookahead_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            month_range_buckets: 4,
            year_range_buckets: 12,
            intensity_floor: DEFAULT_INTENSITY_FLOOR,
            agenda_lookback_days: 30,
            agenda_lookahead_days: 90,
        }
    }
}

impl EngineConfig {
    /// Load from `path` if given and present, else the data dir override,
    /// else the embedded defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let override_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path(),
        };
        match override_path.filter(|p| p.exists()) {
            Some(p) => {
                debug!(path = %p.display(), "Loading engine config");
                let content = fs::read_to_string(&p)
                    .map_err(|e| Error::Config(format!("Failed to read {}: {}", p.display(), e)))?;
                parse_config(&content)
            }
            None => parse_config(DEFAULT_CONFIG),
        }
    }

    /// Trend bucket count for a time range
    pub fn buckets_for(&self, range: TimeRange) -> u32 {
        match range {
            TimeRange::Month => self.month_range_buckets,
            TimeRange::Year => self.year_range_buckets,
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("pitstop").join("config").join("engine.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    analytics: Option<RawAnalytics>,
    calendar: Option<RawCalendar>,
    agenda: Option<RawAgenda>,
}

#[derive(Debug, Deserialize)]
struct RawAnalytics {
    month_range_buckets: Option<u32>,
    year_range_buckets: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawCalendar {
    intensity_floor: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAgenda {
    lookback_days: Option<u32>,
    lookahead_days: Option<u32>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = EngineConfig::default();

    if let Some(analytics) = raw.analytics {
        if let Some(n) = analytics.month_range_buckets {
            config.month_range_buckets = n;
        }
        if let Some(n) = analytics.year_range_buckets {
            config.year_range_buckets = n;
        }
    }

    if let Some(calendar) = raw.calendar {
        if let Some(floor) = calendar.intensity_floor {
            config.intensity_floor = floor;
        }
    }

    if let Some(agenda) = raw.agenda {
        if let Some(days) = agenda.lookback_days {
            config.agenda_lookback_days = days;
        }
        if let Some(days) = agenda.lookahead_days {
            config.agenda_lookahead_days = days;
        }
    }

    for buckets in [config.month_range_buckets, config.year_range_buckets] {
        if !(1..=MAX_TREND_BUCKETS).contains(&buckets) {
            return Err(Error::Config(format!(
                "trend bucket counts must be within [1, {}], got {}",
                MAX_TREND_BUCKETS, buckets
            )));
        }
    }
    if !(0.0..=1.0).contains(&config.intensity_floor) {
        return Err(Error::Config(format!(
            "intensity_floor must be within [0, 1], got {}",
            config.intensity_floor
        )));
    }

    Ok(config)
}
