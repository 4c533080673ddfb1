use crate::{
    process::ProcessInfo,
    sample::Usage,
    source::{Counters, MetricsSource},
};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    thread,
    time::Instant,
};
use sysinfo::{
    Components, CpuRefreshKind, Disks, MemoryRefreshKind, Networks, ProcessRefreshKind,
    RefreshKind, MINIMUM_CPU_UPDATE_INTERVAL,
};
use tracing::{debug, trace};

const CPU_SENSOR_LABELS: [&str; 5] = ["cpu", "core", "package", "tctl", "tdie"];

fn refresh_kind() -> RefreshKind {
    RefreshKind::nothing()
        .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
        .with_memory(MemoryRefreshKind::nothing().with_ram())
        .with_processes(ProcessRefreshKind::nothing().with_cpu().with_memory())
}

/// [`MetricsSource`] backed by `sysinfo`.
#[derive(Debug)]
pub struct System {
    sys: Option<sysinfo::System>,
    disks: Disks,
    networks: Networks,
    components: Components,
    updated: Instant,
    disk_path: PathBuf,
    counters: Counters,
}

impl System {
    pub fn new(disk_path: PathBuf) -> Self {
        let sys = if sysinfo::IS_SUPPORTED_SYSTEM {
            // CPU usage is computed between two refreshes, so prime once up front
            let mut sys = sysinfo::System::new_with_specifics(refresh_kind());
            sys.refresh_specifics(refresh_kind());
            Some(sys)
        } else {
            debug!("sysinfo does not support this platform");
            None
        };

        Self {
            sys,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            components: Components::new_with_refreshed_list(),
            updated: Instant::now(),
            disk_path,
            counters: Counters::default(),
        }
    }
}

/// Blocks until `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL` has passed since `updated`.
fn wait_for_cpu_interval(updated: Instant) {
    let remaining = MINIMUM_CPU_UPDATE_INTERVAL.saturating_sub(updated.elapsed());
    if !remaining.is_zero() {
        trace!("waiting {remaining:?} before refreshing cpu usage");
        thread::sleep(remaining);
    }
}

fn disk_usage(disks: &Disks, path: &Path) -> Option<Usage> {
    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .filter(|disk| disk.total_space() > 0)
        .map(|disk| {
            let total = disk.total_space();
            Usage::new(total.saturating_sub(disk.available_space()), total)
        })
}

/// Cumulative bytes read and written across all devices. A device mounted more than once is
/// counted once.
fn disk_io_totals(disks: &Disks) -> Option<(u64, u64)> {
    let devices = disks
        .list()
        .iter()
        .map(|disk| (disk.name(), disk.usage()))
        .collect::<HashMap<_, _>>();
    if devices.is_empty() {
        return None;
    }
    Some(devices.values().fold((0u64, 0u64), |(read, written), usage| {
        (
            read.saturating_add(usage.total_read_bytes),
            written.saturating_add(usage.total_written_bytes),
        )
    }))
}

fn network_totals(networks: &Networks) -> Option<(u64, u64)> {
    let list = networks.list();
    if list.is_empty() {
        return None;
    }
    Some(list.values().fold((0u64, 0u64), |(rx, tx), data| {
        (
            rx.saturating_add(data.total_received()),
            tx.saturating_add(data.total_transmitted()),
        )
    }))
}

fn cpu_temp(components: &Components) -> Option<f32> {
    components
        .list()
        .iter()
        .filter(|component| {
            let label = component.label().to_lowercase();
            CPU_SENSOR_LABELS.iter().any(|name| label.contains(name))
        })
        .filter_map(|component| Option::<f32>::from(component.temperature()))
        .filter(|temp| temp.is_finite() && *temp > 0.0)
        .reduce(f32::max)
}

impl Default for System {
    fn default() -> Self {
        Self::new(crate::config::MonitorConfig::default_disk_path())
    }
}

impl MetricsSource for System {
    fn refresh(&mut self) {
        let Some(sys) = &mut self.sys else {
            return;
        };
        wait_for_cpu_interval(self.updated);
        sys.refresh_specifics(refresh_kind());
        self.updated = Instant::now();
        self.disks.refresh(true);
        self.networks.refresh(true);
        self.components.refresh(true);

        let total_memory = sys.total_memory();
        let disk_io = disk_io_totals(&self.disks);
        let network = network_totals(&self.networks);
        self.counters = Counters {
            cpu_percent: Some(sys.global_cpu_usage().clamp(0.0, 100.0)),
            cpu_temp: cpu_temp(&self.components),
            memory: (total_memory > 0).then(|| Usage::new(sys.used_memory(), total_memory)),
            disk: disk_usage(&self.disks, &self.disk_path),
            disk_read_bytes: disk_io.map(|(read, _)| read),
            disk_written_bytes: disk_io.map(|(_, written)| written),
            net_received_bytes: network.map(|(rx, _)| rx),
            net_sent_bytes: network.map(|(_, tx)| tx),
        };
        trace!("refreshed counters: {:?}", self.counters);
    }

    fn counters(&self) -> Counters {
        self.counters
    }

    fn processes(&self) -> Vec<ProcessInfo> {
        let Some(sys) = &self.sys else {
            return Vec::new();
        };
        let total_memory = sys.total_memory().max(1) as f64;
        sys.processes()
            .values()
            .map(|proc| ProcessInfo {
                pid: proc.pid().as_u32(),
                name: proc.name().to_string_lossy().into_owned(),
                cpu_percent: proc.cpu_usage(),
                memory_bytes: proc.memory(),
                memory_percent: (proc.memory() as f64 / total_memory * 100.0) as f32,
            })
            .collect()
    }

    fn set_disk_path(&mut self, disk_path: PathBuf) {
        self.disk_path = disk_path;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_refresh_waits_for_cpu_interval() {
        let start = Instant::now();
        let mut system = System::default();
        system.refresh();
        if sysinfo::IS_SUPPORTED_SYSTEM {
            assert!(
                start.elapsed() >= MINIMUM_CPU_UPDATE_INTERVAL,
                "refreshed after {:?}",
                start.elapsed()
            );
            let cpu = system.counters().cpu_percent.expect("cpu usage");
            assert!((0.0..=100.0).contains(&cpu), "cpu: {cpu}");
        }
    }

    #[test]
    fn disk_io_comes_from_device_totals() {
        let mut system = System::default();
        system.refresh();
        let first = system.counters();
        if system.disks.list().is_empty() {
            assert_eq!(first.disk_read_bytes, None);
            return;
        }
        let read = first.disk_read_bytes.expect("device read bytes");
        let written = first.disk_written_bytes.expect("device written bytes");

        let disk_count = system.disks.list().len();
        system.refresh();
        assert_eq!(system.disks.list().len(), disk_count);
        let second = system.counters();
        assert!(second.disk_read_bytes.is_some_and(|total| total >= read));
        assert!(second.disk_written_bytes.is_some_and(|total| total >= written));
    }

    #[test]
    fn interval_floor_covers_cpu_interval() {
        assert!(crate::config::MonitorConfig::MIN_INTERVAL >= MINIMUM_CPU_UPDATE_INTERVAL);
    }
}
