//! Layered configuration: built-in defaults, then `config.toml`, then `ATTENDANCE_*` variables.

use crate::error::{Error, Result};
use crate::models::parse_time;
use crate::session::{UserEntry, default_users};
use chrono::{NaiveTime, TimeDelta};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub store: StoreSettings,
    pub reports: ReportSettings,
    #[serde(default)]
    pub users: BTreeMap<String, UserEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// The directory the record store lives in.
    pub root: PathBuf,
    pub layout: AttendanceLayout,
}

/// How the capture system files check-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceLayout {
    /// One file per day: `attendance/<date>/<YEAR>.csv`.
    #[default]
    Daily,
    /// One growing file per year: `attendance/attendance_<YEAR>.csv`.
    Cumulative,
}

const MAX_LIVE_WINDOW_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    pub live_window_minutes: i64,
    /// Check-ins after this time of day are never attributed to a lecture.
    pub subject_cutoff: String,
    pub export_dir: PathBuf,
}

impl ReportSettings {
    /// The live window, between one minute and one day long.
    pub fn live_window(&self) -> Result<TimeDelta> {
        TimeDelta::try_minutes(self.live_window_minutes)
            .filter(|w| *w > TimeDelta::zero() && *w <= TimeDelta::days(1))
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "reports.live_window_minutes must be between 1 and {}, got {}",
                    MAX_LIVE_WINDOW_MINUTES, self.live_window_minutes
                ))
                .into()
            })
    }

    pub fn subject_cutoff(&self) -> Result<NaiveTime> {
        parse_time(&self.subject_cutoff).map_err(|e: Error| {
            ConfigError::Message(format!("reports.subject_cutoff: {e}")).into()
        })
    }
}

impl Settings {
    /// Loads the settings from `path`, or from an optional `config.toml` in the working
    /// directory when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let builder = Config::builder()
            .set_default("store.root", "data")?
            .set_default("store.layout", "daily")?
            .set_default("reports.live_window_minutes", 30)?
            .set_default("reports.subject_cutoff", "15:30")?
            .set_default("reports.export_dir", "exports")?;

        let builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        let mut settings: Settings = builder
            .add_source(
                Environment::with_prefix("ATTENDANCE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        if settings.users.is_empty() {
            settings.users = default_users();
        }

        Ok(settings)
    }
}
