//! Sampling and alerting configuration.

use crate::{
    alert::{Alerts, Thresholds},
    error::{Error, Result},
    history, process,
    process::SortBy,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Sampling configuration shared by the GUI and headless modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
#[serde(default)] // Ensures new fields don't break existing configurations
pub struct MonitorConfig {
    pub update_interval: Duration,
    pub history_size: usize,
    pub process_limit: usize,
    pub process_sort: SortBy,
    /// Path whose mount point is reported as disk usage.
    pub disk_path: PathBuf,
    pub thresholds: Thresholds,
    pub alert_hysteresis: f32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            update_interval: Self::DEFAULT_INTERVAL,
            history_size: history::DEFAULT_CAPACITY,
            process_limit: process::DEFAULT_LIMIT,
            process_sort: SortBy::default(),
            disk_path: Self::default_disk_path(),
            thresholds: Thresholds::default(),
            alert_hysteresis: Alerts::DEFAULT_HYSTERESIS,
        }
    }
}

impl MonitorConfig {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
    /// Matches `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`; shorter intervals skew cpu usage.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(200);
    pub const MAX_HISTORY: usize = 3600;

    #[must_use]
    pub fn default_disk_path() -> PathBuf {
        if cfg!(windows) {
            PathBuf::from("C:\\")
        } else {
            PathBuf::from("/")
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `interval` is shorter than [`Self::MIN_INTERVAL`].
    pub fn set_update_interval(&mut self, interval: Duration) -> Result<()> {
        if interval < Self::MIN_INTERVAL {
            return Err(Error::invalid_config(
                "update_interval",
                format!("{}ms", interval.as_millis()),
            ));
        }
        self.update_interval = interval;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `size` is zero or above [`Self::MAX_HISTORY`].
    pub fn set_history_size(&mut self, size: usize) -> Result<()> {
        if !(1..=Self::MAX_HISTORY).contains(&size) {
            return Err(Error::invalid_config("history_size", size));
        }
        self.history_size = size;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.update_interval < Self::MIN_INTERVAL {
            return Err(Error::invalid_config(
                "update_interval",
                format!("{}ms", self.update_interval.as_millis()),
            ));
        }
        if !(1..=Self::MAX_HISTORY).contains(&self.history_size) {
            return Err(Error::invalid_config("history_size", self.history_size));
        }
        if !(0.0..=50.0).contains(&self.alert_hysteresis) {
            return Err(Error::invalid_config(
                "alert_hysteresis",
                self.alert_hysteresis,
            ));
        }
        self.thresholds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.update_interval, Duration::from_secs(1));
        assert_eq!(config.history_size, 60);
    }

    #[test]
    fn rejects_short_interval() {
        let mut config = MonitorConfig::default();
        assert!(config
            .set_update_interval(Duration::from_millis(100))
            .is_err());
        assert!(config
            .set_update_interval(Duration::from_millis(199))
            .is_err());
        assert_eq!(config.update_interval, MonitorConfig::DEFAULT_INTERVAL);
        assert!(config
            .set_update_interval(Duration::from_millis(200))
            .is_ok());
        assert_eq!(config.update_interval, Duration::from_millis(200));

        config.update_interval = Duration::from_millis(150);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_history_size() {
        let mut config = MonitorConfig::default();
        assert!(config.set_history_size(0).is_err());
        assert!(config.set_history_size(3601).is_err());
        assert!(config.set_history_size(120).is_ok());
        assert_eq!(config.history_size, 120);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: MonitorConfig =
            serde_json::from_str(r#"{ "history_size": 30, "thresholds": { "cpu": 70.0 } }"#)
                .expect("valid config");
        assert_eq!(config.history_size, 30);
        assert_eq!(config.thresholds.cpu, 70.0);
        assert_eq!(config.thresholds.disk, 90.0);
        assert_eq!(config.update_interval, MonitorConfig::DEFAULT_INTERVAL);
    }
}
