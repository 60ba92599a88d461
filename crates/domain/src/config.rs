//! Configuration structures
//!
//! Loaded by the infra layer from environment variables or a config file;
//! defaults are usable as-is for local development and tests.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::{OpsBoardError, Result};
use crate::types::attendance::ClockTime;

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// IANA time zone name used for local-day bucketing.
    pub timezone: String,
    pub attendance: AttendanceConfig,
    pub log: LogConfig,
}

/// Attendance classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceConfig {
    /// First punch strictly later than this is classified Late.
    ///
    /// Single knob on purpose: the original dashboard hard-coded slightly
    /// different cutoffs per screen; every view reads this one value.
    pub late_threshold: ClockTime,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default tracing filter (overridable via `RUST_LOG`).
    pub level: String,
}

impl Default for ClockTime {
    fn default() -> Self {
        Self::from_decimal_hours(0.0)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: constants::DEFAULT_TIMEZONE.to_string(),
            attendance: AttendanceConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            late_threshold: ClockTime::parse(constants::DEFAULT_LATE_THRESHOLD)
                .unwrap_or_default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Config {
    /// Resolve the configured time zone.
    ///
    /// # Errors
    /// `OpsBoardError::Config` when the name is not a valid IANA zone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| OpsBoardError::Config(format!("invalid timezone: {}", self.timezone)))
    }
}
