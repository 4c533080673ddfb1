//! Fixed-capacity rolling windows of recent metric values.

use crate::sample::Sample;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of retained points, one per second for a minute.
pub const DEFAULT_CAPACITY: usize = 60;

/// A bounded queue that evicts its oldest value on overflow.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct History<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// Creates an empty window. Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `value`, evicting the oldest value if the window is full.
    pub fn push(&mut self, value: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Changes the capacity, keeping the newest values.
    pub fn resize(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        while self.values.len() > capacity {
            self.values.pop_front();
        }
        self.capacity = capacity;
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.values.iter()
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<'a, T> IntoIterator for &'a History<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Summary of the values currently retained in a [`History`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Stats {
    pub current: f32,
    pub min: f32,
    pub max: f32,
    pub avg: f32,
}

impl History<f32> {
    /// Returns `None` for an empty window.
    #[must_use]
    pub fn stats(&self) -> Option<Stats> {
        let current = *self.latest()?;
        let (min, max, sum) = self.values.iter().fold(
            (f32::INFINITY, f32::NEG_INFINITY, 0.0f64),
            |(min, max, sum), &value| (min.min(value), max.max(value), sum + f64::from(value)),
        );
        Some(Stats {
            current,
            min,
            max,
            avg: (sum / self.values.len() as f64) as f32,
        })
    }

    /// Largest retained value, or `floor` if every value is below it.
    #[must_use]
    pub fn max_or(&self, floor: f32) -> f32 {
        self.values.iter().copied().fold(floor, f32::max)
    }
}

/// Charted series.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Series {
    Cpu,
    Ram,
    Disk,
    DiskRead,
    DiskWrite,
    NetRecv,
    NetSent,
    Fps,
}

impl Series {
    pub const ALL: [Self; 8] = [
        Self::Cpu,
        Self::Ram,
        Self::Disk,
        Self::DiskRead,
        Self::DiskWrite,
        Self::NetRecv,
        Self::NetSent,
        Self::Fps,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Ram => "RAM",
            Self::Disk => "Disk",
            Self::DiskRead => "Disk Read",
            Self::DiskWrite => "Disk Write",
            Self::NetRecv => "Received",
            Self::NetSent => "Sent",
            Self::Fps => "FPS",
        }
    }
}

impl AsRef<str> for Series {
    fn as_ref(&self) -> &str {
        self.label()
    }
}

/// One [`History`] per [`Series`], fed from whole [`Sample`]s.
///
/// Metrics that were unavailable for a sample are skipped rather than recorded as zero.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Histories {
    series: [History<f32>; Series::ALL.len()],
    last_update: Option<chrono::DateTime<chrono::Local>>,
}

impl Histories {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            series: std::array::from_fn(|_| History::new(capacity)),
            last_update: None,
        }
    }

    pub fn push(&mut self, sample: &Sample) {
        let mut push = |series: Series, value: Option<f32>| {
            if let Some(value) = value {
                self.series[series.index()].push(value);
            }
        };
        push(Series::Cpu, sample.cpu_percent);
        push(Series::Ram, sample.ram_percent());
        push(Series::Disk, sample.disk_percent());
        push(Series::DiskRead, sample.disk_io.map(|io| io.input as f32));
        push(Series::DiskWrite, sample.disk_io.map(|io| io.output as f32));
        push(Series::NetRecv, sample.network.map(|io| io.input as f32));
        push(Series::NetSent, sample.network.map(|io| io.output as f32));
        push(Series::Fps, sample.fps);
        self.last_update = Some(sample.timestamp);
    }

    pub fn resize(&mut self, capacity: usize) {
        for history in &mut self.series {
            history.resize(capacity);
        }
    }

    pub fn clear(&mut self) {
        for history in &mut self.series {
            history.clear();
        }
        self.last_update = None;
    }

    pub const fn get(&self, series: Series) -> &History<f32> {
        &self.series[series.index()]
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.series[0].capacity()
    }

    #[must_use]
    pub const fn last_update(&self) -> Option<chrono::DateTime<chrono::Local>> {
        self.last_update
    }
}

impl Default for Histories {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
