//! Per-process resource snapshots.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default number of rows shown in the process table.
pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    /// Share of one core; may exceed 100 on multi-core systems.
    pub cpu_percent: f32,
    pub memory_bytes: u64,
    pub memory_percent: f32,
}

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    Cpu,
    Memory,
}

impl SortBy {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Cpu => Self::Memory,
            Self::Memory => Self::Cpu,
        }
    }

    fn key(self, process: &ProcessInfo) -> f32 {
        match self {
            Self::Cpu => process.cpu_percent,
            Self::Memory => process.memory_percent,
        }
    }
}

impl AsRef<str> for SortBy {
    fn as_ref(&self) -> &str {
        match self {
            Self::Cpu => "CPU",
            Self::Memory => "Memory",
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

/// Sorts descending by `sort` and keeps at most `limit` entries.
///
/// NaN usage sorts last and ties are broken by ascending pid so output is stable between ticks.
pub fn top(mut processes: Vec<ProcessInfo>, sort: SortBy, limit: usize) -> Vec<ProcessInfo> {
    processes.sort_by(|a, b| {
        let (a_key, b_key) = (sort.key(a), sort.key(b));
        match (a_key.is_nan(), b_key.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => b_key.total_cmp(&a_key),
        }
        .then_with(|| a.pid.cmp(&b.pid))
    });
    processes.truncate(limit);
    processes
}
