//! TOML configuration for the `timetable` CLI.
//!
//! ```toml
//! timezone = "America/New_York"
//! default_day = "M"
//! schedule_file = "schedule.json"
//! ```
//!
//! Every key is optional. Command-line flags take precedence over the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use timetable_engine::DayCode;

/// The file as written by the user.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    timezone: Option<String>,
    default_day: Option<String>,
    schedule_file: Option<PathBuf>,
}

/// Resolved settings with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Zone used to decide what "now" (and therefore "this week") is.
    pub timezone: Tz,
    /// Day assumed for sections with an empty day pattern.
    pub default_day: DayCode,
    pub schedule_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            default_day: DayCode::Monday,
            schedule_file: None,
        }
    }
}

/// Load settings from `path`, or defaults when no path is given.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Parse settings from TOML text.
pub fn parse(content: &str) -> Result<Settings> {
    let raw: RawConfig = toml::from_str(content).context("Failed to parse TOML")?;
    let defaults = Settings::default();

    let timezone = match raw.timezone {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("Unknown timezone: '{}'", name))?,
        None => defaults.timezone,
    };

    let default_day = match raw.default_day {
        Some(code) => code
            .parse::<DayCode>()
            .with_context(|| format!("default_day must be one of M,T,W,R,F,S,U (got '{}')", code))?,
        None => defaults.default_day,
    };

    Ok(Settings {
        timezone,
        default_day,
        schedule_file: raw.schedule_file,
    })
}
