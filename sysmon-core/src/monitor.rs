//! Turns raw source readings into [`Sample`]s.

use crate::{
    process::{self, ProcessInfo, SortBy},
    rate::RateCounter,
    sample::{IoRate, Sample},
    source::MetricsSource,
};
use chrono::Local;
use std::time::Instant;
use tracing::trace;

#[derive(Default, Debug, Copy, Clone)]
struct Rates {
    disk_read: RateCounter,
    disk_write: RateCounter,
    net_recv: RateCounter,
    net_sent: RateCounter,
}

/// Polls a [`MetricsSource`] and derives per-second rates from its cumulative counters.
#[derive(Debug)]
#[must_use]
pub struct Monitor<S> {
    source: S,
    rates: Rates,
    samples: u64,
}

impl<S: MetricsSource> Monitor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            rates: Rates::default(),
            samples: 0,
        }
    }

    /// Refreshes the source and returns the readings for this tick.
    ///
    /// Rates are unavailable until two ticks have been observed. `fps` is left unset since
    /// frame timing belongs to whoever renders.
    pub fn sample(&mut self, now: Instant) -> Sample {
        self.source.refresh();
        let counters = self.source.counters();

        fn pair(
            read: &mut RateCounter,
            write: &mut RateCounter,
            totals: (Option<u64>, Option<u64>),
            now: Instant,
        ) -> Option<IoRate> {
            match totals {
                (Some(input), Some(output)) => {
                    let input = read.update(input, now);
                    let output = write.update(output, now);
                    input.zip(output).map(|(input, output)| IoRate::new(input, output))
                }
                _ => {
                    read.reset();
                    write.reset();
                    None
                }
            }
        }

        let Rates {
            disk_read,
            disk_write,
            net_recv,
            net_sent,
        } = &mut self.rates;
        let disk_io = pair(
            disk_read,
            disk_write,
            (counters.disk_read_bytes, counters.disk_written_bytes),
            now,
        );
        let network = pair(
            net_recv,
            net_sent,
            (counters.net_received_bytes, counters.net_sent_bytes),
            now,
        );

        self.samples += 1;
        let sample = Sample {
            timestamp: Local::now(),
            cpu_percent: counters.cpu_percent,
            cpu_temp: counters.cpu_temp,
            memory: counters.memory,
            disk: counters.disk,
            disk_io,
            network,
            fps: None,
        };
        trace!("sample {}: {sample:?}", self.samples);
        sample
    }

    /// The `limit` busiest processes as of the last [`Monitor::sample`].
    pub fn processes(&self, sort: SortBy, limit: usize) -> Vec<ProcessInfo> {
        process::top(self.source.processes(), sort, limit)
    }

    /// Number of samples taken so far.
    #[must_use]
    pub const fn samples(&self) -> u64 {
        self.samples
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{sample::Usage, source::Counters};
    use std::{collections::VecDeque, time::Duration};

    #[derive(Default)]
    struct Scripted {
        script: VecDeque<Counters>,
        current: Counters,
        refreshes: usize,
    }

    impl MetricsSource for Scripted {
        fn refresh(&mut self) {
            self.refreshes += 1;
            if let Some(next) = self.script.pop_front() {
                self.current = next;
            }
        }

        fn counters(&self) -> Counters {
            self.current
        }

        fn processes(&self) -> Vec<ProcessInfo> {
            (1..=3)
                .map(|pid| ProcessInfo {
                    pid,
                    name: format!("p{pid}"),
                    cpu_percent: pid as f32,
                    memory_bytes: 0,
                    memory_percent: 0.0,
                })
                .collect()
        }
    }

    fn counters(net: u64, disk: u64) -> Counters {
        Counters {
            cpu_percent: Some(10.0),
            memory: Some(Usage::new(2, 8)),
            disk_read_bytes: Some(disk),
            disk_written_bytes: Some(disk / 2),
            net_received_bytes: Some(net),
            net_sent_bytes: Some(net / 4),
            ..Counters::default()
        }
    }

    #[test]
    fn rates_from_successive_ticks() {
        let source = Scripted {
            script: [counters(1_000, 0), counters(5_000, 2_048)].into(),
            ..Scripted::default()
        };
        let mut monitor = Monitor::new(source);
        let start = Instant::now();

        let first = monitor.sample(start);
        assert_eq!(first.cpu_percent, Some(10.0));
        assert_eq!(first.ram_percent(), Some(25.0));
        assert_eq!(first.network, None);
        assert_eq!(first.disk_io, None);
        assert_eq!(first.fps, None);

        let second = monitor.sample(start + Duration::from_secs(2));
        assert_eq!(second.network, Some(IoRate::new(2_000.0, 500.0)));
        assert_eq!(second.disk_io, Some(IoRate::new(1_024.0, 512.0)));
        assert_eq!(monitor.samples(), 2);
        assert_eq!(monitor.source().refreshes, 2);
    }

    #[test]
    fn unavailable_counters_reset_rates() {
        let source = Scripted {
            script: [
                counters(0, 0),
                Counters::default(),
                counters(1_000, 0),
                counters(2_000, 0),
            ]
            .into(),
            ..Scripted::default()
        };
        let mut monitor = Monitor::new(source);
        let start = Instant::now();
        monitor.sample(start);
        let missing = monitor.sample(start + Duration::from_secs(1));
        assert_eq!(missing.cpu_percent, None);
        assert_eq!(missing.network, None);
        // Counters return but the rate must be primed again
        let primed = monitor.sample(start + Duration::from_secs(2));
        assert_eq!(primed.network, None);
        let rated = monitor.sample(start + Duration::from_secs(3));
        assert_eq!(rated.network, Some(IoRate::new(1_000.0, 250.0)));
    }

    #[test]
    fn top_processes() {
        let monitor = Monitor::new(Scripted::default());
        let top = monitor.processes(SortBy::Cpu, 2);
        assert_eq!(top.iter().map(|p| p.pid).collect::<Vec<_>>(), [3, 2]);
    }
}
