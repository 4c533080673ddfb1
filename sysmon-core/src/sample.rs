//! A single time-stamped reading of every displayed metric.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Bytes used and available for a resource such as RAM or a disk volume.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct Usage {
    pub used: u64,
    pub total: u64,
}

impl Usage {
    pub const fn new(used: u64, total: u64) -> Self {
        Self { used, total }
    }

    /// Percentage of `total` in use, or `0.0` when `total` is unknown.
    #[must_use]
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.used as f64 / self.total as f64 * 100.0) as f32
        }
    }
}

/// A pair of directional throughputs in bytes per second.
#[derive(Default, Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct IoRate {
    /// Read (disk) or received (network) bytes/s.
    pub input: f64,
    /// Written (disk) or sent (network) bytes/s.
    pub output: f64,
}

impl IoRate {
    pub const fn new(input: f64, output: f64) -> Self {
        Self { input, output }
    }
}

/// One tick worth of metrics. `None` means the metric could not be read this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Sample {
    pub timestamp: DateTime<Local>,
    pub cpu_percent: Option<f32>,
    pub cpu_temp: Option<f32>,
    pub memory: Option<Usage>,
    pub disk: Option<Usage>,
    pub disk_io: Option<IoRate>,
    pub network: Option<IoRate>,
    pub fps: Option<f32>,
}

impl Sample {
    /// An empty sample where every metric is unavailable.
    pub fn empty(timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            cpu_percent: None,
            cpu_temp: None,
            memory: None,
            disk: None,
            disk_io: None,
            network: None,
            fps: None,
        }
    }

    #[must_use]
    pub fn ram_percent(&self) -> Option<f32> {
        self.memory.as_ref().map(Usage::percent)
    }

    #[must_use]
    pub fn disk_percent(&self) -> Option<f32> {
        self.disk.as_ref().map(Usage::percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_percent() {
        assert_eq!(Usage::new(0, 0).percent(), 0.0);
        assert_eq!(Usage::new(25, 100).percent(), 25.0);
        assert_eq!(Usage::new(100, 100).percent(), 100.0);
    }

    #[test]
    fn derived_percents() {
        let mut sample = Sample::empty(Local::now());
        assert_eq!(sample.ram_percent(), None);
        sample.memory = Some(Usage::new(1, 4));
        sample.disk = Some(Usage::new(9, 10));
        assert_eq!(sample.ram_percent(), Some(25.0));
        assert_eq!(sample.disk_percent(), Some(90.0));
    }
}
