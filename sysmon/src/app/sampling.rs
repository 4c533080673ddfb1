use crate::app::event::{AppEvent, SamplingEvent};
use anyhow::Context;
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use std::{
    path::PathBuf,
    thread::JoinHandle,
    time::{Duration, Instant},
};
use sysmon_core::{
    config::MonitorConfig, monitor::Monitor, process::SortBy, source::MetricsSource, sys::System,
};
use tracing::{debug, error, trace, warn};
use winit::event_loop::EventLoopProxy;

/// Settings changes forwarded to the sampling thread.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Command {
    SetInterval(Duration),
    SetProcesses { sort: SortBy, limit: usize },
    SetDiskPath(PathBuf),
    Stop,
}

/// Owns a [`Monitor`] and ticks it on a fixed interval until stopped.
#[derive(Debug)]
#[must_use]
pub struct Worker<S> {
    monitor: Monitor<S>,
    interval: Duration,
    sort: SortBy,
    limit: usize,
}

impl<S: MetricsSource> Worker<S> {
    pub fn new(source: S, config: &MonitorConfig) -> Self {
        Self {
            monitor: Monitor::new(source),
            interval: config.update_interval,
            sort: config.process_sort,
            limit: config.process_limit,
        }
    }

    /// Runs until [`Command::Stop`] is received, the command channel disconnects, or `emit`
    /// returns `false`. The first tick happens immediately.
    pub fn run(&mut self, rx: &Receiver<Command>, mut emit: impl FnMut(AppEvent) -> bool) {
        let mut next_tick = Instant::now();
        loop {
            let timeout = next_tick.saturating_duration_since(Instant::now());
            match rx.recv_timeout(timeout) {
                Ok(Command::SetInterval(interval)) => {
                    debug!("sampling interval: {interval:?}");
                    next_tick = next_tick
                        .checked_sub(self.interval)
                        .map_or(next_tick, |last_tick| last_tick + interval);
                    self.interval = interval;
                }
                Ok(Command::SetProcesses { sort, limit }) => {
                    self.sort = sort;
                    self.limit = limit;
                }
                Ok(Command::SetDiskPath(path)) => {
                    debug!("disk path: {path:?}");
                    self.monitor.source_mut().set_disk_path(path);
                }
                Ok(Command::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    if !self.tick(&mut emit) {
                        debug!("event loop closed");
                        break;
                    }
                    let now = Instant::now();
                    next_tick += self.interval;
                    // Skip ticks missed while suspended instead of bursting to catch up
                    if next_tick < now {
                        next_tick = now + self.interval;
                    }
                }
            }
        }
    }

    fn tick(&mut self, emit: &mut impl FnMut(AppEvent) -> bool) -> bool {
        let sample = self.monitor.sample(Instant::now());
        trace!("tick {}", self.monitor.samples());
        let processes = self.monitor.processes(self.sort, self.limit);
        emit(SamplingEvent::from(sample).into())
            && emit(SamplingEvent::Processes(processes).into())
    }
}

/// Handle to the background sampling thread.
#[derive(Debug)]
#[must_use]
pub struct Sampler {
    tx: Sender<Command>,
    handle: Option<JoinHandle<()>>,
}

impl Sampler {
    pub fn spawn(
        event_proxy: EventLoopProxy<AppEvent>,
        config: &MonitorConfig,
    ) -> anyhow::Result<Self> {
        let worker = Worker::new(System::new(config.disk_path.clone()), config);
        Self::spawn_worker(worker, move |event| event_proxy.send_event(event).is_ok())
    }

    pub fn spawn_worker<S>(
        mut worker: Worker<S>,
        emit: impl FnMut(AppEvent) -> bool + Send + 'static,
    ) -> anyhow::Result<Self>
    where
        S: MetricsSource + Send + 'static,
    {
        let (tx, rx) = channel::unbounded();
        let handle = std::thread::Builder::new()
            .name("sampling".into())
            .spawn(move || {
                debug!("sampling thread started");
                worker.run(&rx, emit);
                debug!("sampling thread stopped");
            })
            .context("failed to spawn sampling thread")?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    pub fn send(&self, command: Command) {
        trace!("sampling command: {command:?}");
        if let Err(err) = self.tx.send(command) {
            warn!("sampling thread is not running: {err:?}");
        }
    }

    /// Asks the sampling thread to exit and waits for it.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.tx.send(Command::Stop);
        if handle.join().is_err() {
            error!("sampling thread panicked");
        }
    }

    /// Forwards the differences between two configurations.
    pub fn apply(&self, old: &MonitorConfig, new: &MonitorConfig) {
        if old.update_interval != new.update_interval {
            self.send(Command::SetInterval(new.update_interval));
        }
        if old.process_sort != new.process_sort || old.process_limit != new.process_limit {
            self.send(Command::SetProcesses {
                sort: new.process_sort,
                limit: new.process_limit,
            });
        }
        if old.disk_path != new.disk_path {
            self.send(Command::SetDiskPath(new.disk_path.clone()));
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysmon_core::{process::ProcessInfo, sample::Usage, source::Counters};

    #[derive(Default)]
    struct Fixed {
        disk_path: Option<PathBuf>,
    }

    impl MetricsSource for Fixed {
        fn refresh(&mut self) {}

        fn counters(&self) -> Counters {
            Counters {
                cpu_percent: Some(25.0),
                memory: Some(Usage::new(1, 4)),
                ..Counters::default()
            }
        }

        fn processes(&self) -> Vec<ProcessInfo> {
            (0..5)
                .map(|pid| ProcessInfo {
                    pid,
                    name: format!("proc-{pid}"),
                    cpu_percent: pid as f32,
                    memory_bytes: 100 - u64::from(pid),
                    memory_percent: 0.0,
                })
                .collect()
        }

        fn set_disk_path(&mut self, disk_path: PathBuf) {
            self.disk_path = Some(disk_path);
        }
    }

    fn config(limit: usize) -> MonitorConfig {
        MonitorConfig {
            update_interval: Duration::from_millis(100),
            process_limit: limit,
            ..MonitorConfig::default()
        }
    }

    #[test]
    fn emits_samples_until_stopped() {
        let (event_tx, event_rx) = channel::unbounded();
        let worker = Worker::new(Fixed::default(), &config(3));
        let mut sampler = Sampler::spawn_worker(worker, move |event| event_tx.send(event).is_ok())
            .expect("spawned sampler");

        let timeout = Duration::from_secs(5);
        match event_rx.recv_timeout(timeout).expect("sample event") {
            AppEvent::Sampling(SamplingEvent::Sample(sample)) => {
                assert_eq!(sample.cpu_percent, Some(25.0));
                assert_eq!(sample.ram_percent(), Some(25.0));
                assert_eq!(sample.fps, None);
            }
            event => panic!("unexpected event: {event:?}"),
        }
        match event_rx.recv_timeout(timeout).expect("processes event") {
            AppEvent::Sampling(SamplingEvent::Processes(processes)) => {
                let pids = processes.iter().map(|p| p.pid).collect::<Vec<_>>();
                assert_eq!(pids, [4, 3, 2]);
            }
            event => panic!("unexpected event: {event:?}"),
        }

        sampler.stop();
        while event_rx.try_recv().is_ok() {}
        assert!(event_rx.recv_timeout(Duration::from_millis(300)).is_err());
    }

    #[test]
    fn stops_when_receiver_closes() {
        let (tx, rx) = channel::unbounded();
        let mut worker = Worker::new(Fixed::default(), &config(1));
        let mut emitted = 0;
        // Returns once `emit` reports the event loop as gone
        worker.run(&rx, |_| {
            emitted += 1;
            false
        });
        assert_eq!(emitted, 1);
        drop(tx);
    }

    #[test]
    fn applies_commands_before_next_tick() {
        let (tx, rx) = channel::unbounded();
        let mut worker = Worker::new(Fixed::default(), &config(5));
        tx.send(Command::SetProcesses {
            sort: SortBy::Memory,
            limit: 2,
        })
        .expect("sent command");
        tx.send(Command::SetDiskPath(PathBuf::from("/data")))
            .expect("sent command");
        tx.send(Command::Stop).expect("sent command");

        // Commands queued before the first tick are handled first, so the worker exits
        // without sampling.
        let mut events = Vec::new();
        worker.run(&rx, |event| {
            events.push(event);
            true
        });
        assert!(events.is_empty());
        assert_eq!(worker.sort, SortBy::Memory);
        assert_eq!(worker.limit, 2);
        assert_eq!(
            worker.monitor.source().disk_path,
            Some(PathBuf::from("/data"))
        );
    }

    #[test]
    fn forwards_config_changes() {
        let (tx, rx) = channel::unbounded();
        let sampler = Sampler { tx, handle: None };
        let old = MonitorConfig::default();
        let mut new = old.clone();
        new.update_interval = Duration::from_millis(250);
        new.process_sort = SortBy::Memory;
        sampler.apply(&old, &new);

        let commands = rx.try_iter().collect::<Vec<_>>();
        assert_eq!(
            commands,
            [
                Command::SetInterval(Duration::from_millis(250)),
                Command::SetProcesses {
                    sort: SortBy::Memory,
                    limit: old.process_limit,
                },
            ]
        );
    }
}
