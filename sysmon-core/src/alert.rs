//! Threshold alerts raised when a metric climbs above its configured limit.

use crate::{
    error::{Error, Result},
    sample::Sample,
};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::warn;

/// Maximum number of alerts retained before the oldest are dropped.
pub const MAX_ALERTS: usize = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    Cpu,
    Ram,
    Disk,
    Temp,
}

impl Metric {
    pub const ALL: [Self; 4] = [Self::Cpu, Self::Ram, Self::Disk, Self::Temp];

    /// Valid threshold range.
    #[must_use]
    pub const fn range(self) -> (f32, f32) {
        match self {
            Self::Cpu | Self::Ram | Self::Disk => (0.0, 100.0),
            Self::Temp => (0.0, 150.0),
        }
    }

    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Cpu | Self::Ram | Self::Disk => "%",
            Self::Temp => "°C",
        }
    }

    #[must_use]
    pub fn value(self, sample: &Sample) -> Option<f32> {
        match self {
            Self::Cpu => sample.cpu_percent,
            Self::Ram => sample.ram_percent(),
            Self::Disk => sample.disk_percent(),
            Self::Temp => sample.cpu_temp,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    const fn field(self) -> &'static str {
        match self {
            Self::Cpu => "thresholds.cpu",
            Self::Ram => "thresholds.ram",
            Self::Disk => "thresholds.disk",
            Self::Temp => "thresholds.temp",
        }
    }
}

impl AsRef<str> for Metric {
    fn as_ref(&self) -> &str {
        match self {
            Self::Cpu => "CPU",
            Self::Ram => "RAM",
            Self::Disk => "Disk",
            Self::Temp => "CPU Temperature",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// Alert limits in percent, or degrees Celsius for temperature.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
#[serde(default)] // Ensures new fields don't break existing configurations
pub struct Thresholds {
    pub cpu: f32,
    pub ram: f32,
    pub disk: f32,
    pub temp: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu: 80.0,
            ram: 80.0,
            disk: 90.0,
            temp: 80.0,
        }
    }
}

impl Thresholds {
    #[must_use]
    pub const fn get(&self, metric: Metric) -> f32 {
        match metric {
            Metric::Cpu => self.cpu,
            Metric::Ram => self.ram,
            Metric::Disk => self.disk,
            Metric::Temp => self.temp,
        }
    }

    /// Sets a threshold, leaving it unchanged if `value` is outside the metric's range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `value` is out of range or not a number.
    pub fn set(&mut self, metric: Metric, value: f32) -> Result<()> {
        let (min, max) = metric.range();
        if !(min..=max).contains(&value) {
            return Err(Error::invalid_config(metric.field(), value));
        }
        match metric {
            Metric::Cpu => self.cpu = value,
            Metric::Ram => self.ram = value,
            Metric::Disk => self.disk = value,
            Metric::Temp => self.temp = value,
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the first threshold that is out of range.
    pub fn validate(&self) -> Result<()> {
        Metric::ALL.iter().try_for_each(|&metric| {
            let (min, max) = metric.range();
            let value = self.get(metric);
            if (min..=max).contains(&value) {
                Ok(())
            } else {
                Err(Error::invalid_config(metric.field(), value))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Alert {
    pub timestamp: DateTime<Local>,
    pub metric: Metric,
    pub value: f32,
    pub threshold: f32,
}

impl Alert {
    #[must_use]
    pub fn message(&self) -> String {
        match self.metric {
            Metric::Temp => format!("{} {:.1}{}", self.metric, self.value, self.metric.unit()),
            _ => format!("{} at {:.1}{}", self.metric, self.value, self.metric.unit()),
        }
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - Alert: {}",
            self.timestamp.format("%H:%M:%S"),
            self.message()
        )
    }
}

/// Edge-triggered alert list.
///
/// A metric raises one alert when it rises above its threshold and re-arms once it falls to
/// `threshold - hysteresis` or below.
#[derive(Debug, Clone)]
#[must_use]
pub struct Alerts {
    alerts: VecDeque<Alert>,
    alerting: [bool; Metric::ALL.len()],
    hysteresis: f32,
}

impl Default for Alerts {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HYSTERESIS)
    }
}

impl Alerts {
    pub const DEFAULT_HYSTERESIS: f32 = 5.0;

    pub fn new(hysteresis: f32) -> Self {
        Self {
            alerts: VecDeque::new(),
            alerting: [false; Metric::ALL.len()],
            hysteresis: hysteresis.max(0.0),
        }
    }

    pub fn set_hysteresis(&mut self, hysteresis: f32) {
        self.hysteresis = hysteresis.max(0.0);
    }

    /// Evaluates `sample` against `thresholds`, returning the number of new alerts.
    pub fn check(&mut self, sample: &Sample, thresholds: &Thresholds) -> usize {
        let mut raised = 0;
        for metric in Metric::ALL {
            let Some(value) = metric.value(sample) else {
                continue;
            };
            let threshold = thresholds.get(metric);
            let alerting = &mut self.alerting[metric.index()];
            if !*alerting && value > threshold {
                *alerting = true;
                let alert = Alert {
                    timestamp: sample.timestamp,
                    metric,
                    value,
                    threshold,
                };
                let text = alert.to_string();
                if self.alerts.iter().any(|existing| existing.to_string() == text) {
                    continue;
                }
                warn!("{text}");
                if self.alerts.len() == MAX_ALERTS {
                    self.alerts.pop_front();
                }
                self.alerts.push_back(alert);
                raised += 1;
            } else if *alerting && value <= (threshold - self.hysteresis).max(0.0) {
                *alerting = false;
            }
        }
        raised
    }

    /// Removes all alerts. Metrics still above their threshold stay armed.
    pub fn clear(&mut self) {
        self.alerts.clear();
    }

    #[must_use]
    pub const fn is_alerting(&self, metric: Metric) -> bool {
        self.alerting[metric.index()]
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Alert> + ExactSizeIterator {
        self.alerts.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Usage;
    use chrono::{Duration, TimeZone};

    fn sample_at(secs: i64, cpu: f32) -> Sample {
        let start = Local
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .single()
            .expect("valid time");
        let mut sample = Sample::empty(start + Duration::seconds(secs));
        sample.cpu_percent = Some(cpu);
        sample
    }

    #[test]
    fn raises_once_per_crossing() {
        let thresholds = Thresholds::default();
        let mut alerts = Alerts::default();
        assert_eq!(alerts.check(&sample_at(0, 50.0), &thresholds), 0);
        assert_eq!(alerts.check(&sample_at(1, 85.0), &thresholds), 1);
        assert_eq!(alerts.check(&sample_at(2, 95.0), &thresholds), 0);
        assert!(alerts.is_alerting(Metric::Cpu));
        assert_eq!(alerts.len(), 1);
        let alert = alerts.iter().next().expect("alert");
        assert_eq!(alert.to_string(), "12:00:01 - Alert: CPU at 85.0%");
    }

    #[test]
    fn rearms_after_hysteresis() {
        let thresholds = Thresholds::default();
        let mut alerts = Alerts::new(5.0);
        alerts.check(&sample_at(0, 90.0), &thresholds);
        // Still inside the hysteresis band
        alerts.check(&sample_at(1, 78.0), &thresholds);
        assert_eq!(alerts.check(&sample_at(2, 81.0), &thresholds), 0);
        alerts.check(&sample_at(3, 75.0), &thresholds);
        assert!(!alerts.is_alerting(Metric::Cpu));
        assert_eq!(alerts.check(&sample_at(4, 81.0), &thresholds), 1);
        assert_eq!(alerts.len(), 2);
    }

    #[test]
    fn duplicate_messages_are_skipped() {
        let thresholds = Thresholds::default();
        let mut alerts = Alerts::new(0.0);
        alerts.check(&sample_at(0, 90.0), &thresholds);
        alerts.check(&sample_at(0, 10.0), &thresholds);
        assert_eq!(alerts.check(&sample_at(0, 90.0), &thresholds), 0);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn checks_every_metric() {
        let thresholds = Thresholds::default();
        let mut alerts = Alerts::default();
        let mut sample = sample_at(0, 99.0);
        sample.memory = Some(Usage::new(9, 10));
        sample.disk = Some(Usage::new(95, 100));
        sample.cpu_temp = Some(85.5);
        assert_eq!(alerts.check(&sample, &thresholds), 4);
        let messages = alerts.iter().map(Alert::message).collect::<Vec<_>>();
        assert_eq!(
            messages,
            [
                "CPU at 99.0%",
                "RAM at 90.0%",
                "Disk at 95.0%",
                "CPU Temperature 85.5°C"
            ]
        );
    }

    #[test]
    fn clear_keeps_armed_state() {
        let thresholds = Thresholds::default();
        let mut alerts = Alerts::default();
        alerts.check(&sample_at(0, 90.0), &thresholds);
        alerts.clear();
        assert!(alerts.is_empty());
        assert_eq!(alerts.check(&sample_at(1, 91.0), &thresholds), 0);
        assert!(alerts.is_alerting(Metric::Cpu));
    }

    #[test]
    fn caps_alert_count() {
        let thresholds = Thresholds::default();
        let mut alerts = Alerts::new(0.0);
        for secs in 0..(MAX_ALERTS as i64 + 10) {
            alerts.check(&sample_at(secs * 2, 90.0), &thresholds);
            alerts.check(&sample_at(secs * 2 + 1, 10.0), &thresholds);
        }
        assert_eq!(alerts.len(), MAX_ALERTS);
    }

    #[test]
    fn threshold_validation() {
        let mut thresholds = Thresholds::default();
        assert!(thresholds.set(Metric::Cpu, 50.0).is_ok());
        assert_eq!(thresholds.cpu, 50.0);
        assert!(thresholds.set(Metric::Ram, 101.0).is_err());
        assert!(thresholds.set(Metric::Disk, f32::NAN).is_err());
        assert_eq!(thresholds.ram, 80.0);
        assert!(thresholds.set(Metric::Temp, 120.0).is_ok());
        assert!(thresholds.validate().is_ok());
        thresholds.disk = -1.0;
        assert!(matches!(
            thresholds.validate(),
            Err(Error::InvalidConfig {
                field: "thresholds.disk",
                ..
            })
        ));
    }
}
