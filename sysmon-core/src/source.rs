//! The boundary between the monitor and whatever supplies raw OS readings.

use crate::{process::ProcessInfo, sample::Usage};
use std::path::PathBuf;

/// Raw readings from a single refresh. Network and disk I/O values are cumulative byte counts.
#[derive(Default, Debug, Copy, Clone, PartialEq)]
#[must_use]
pub struct Counters {
    pub cpu_percent: Option<f32>,
    pub cpu_temp: Option<f32>,
    pub memory: Option<Usage>,
    pub disk: Option<Usage>,
    pub disk_read_bytes: Option<u64>,
    pub disk_written_bytes: Option<u64>,
    pub net_received_bytes: Option<u64>,
    pub net_sent_bytes: Option<u64>,
}

/// Supplies OS metrics to a [`Monitor`](crate::monitor::Monitor).
pub trait MetricsSource {
    /// Refreshes the underlying readings. Called once per tick.
    fn refresh(&mut self);
    /// Readings from the last refresh.
    fn counters(&self) -> Counters;
    /// Processes seen on the last refresh, unsorted.
    fn processes(&self) -> Vec<ProcessInfo>;
    /// Changes which mount point disk usage is reported for.
    fn set_disk_path(&mut self, _disk_path: PathBuf) {}
}

impl<S: MetricsSource + ?Sized> MetricsSource for Box<S> {
    fn refresh(&mut self) {
        (**self).refresh();
    }

    fn counters(&self) -> Counters {
        (**self).counters()
    }

    fn processes(&self) -> Vec<ProcessInfo> {
        (**self).processes()
    }

    fn set_disk_path(&mut self, disk_path: PathBuf) {
        (**self).set_disk_path(disk_path);
    }
}
