//! Prints samples as JSON lines instead of opening a window.

use anyhow::Context;
use std::{
    io::{self, Write},
    time::{Duration, Instant},
};
use sysmon_core::{config::MonitorConfig, monitor::Monitor, source::MetricsSource, sys::System};
use tracing::{debug, info};

/// Samples the system every `update_interval` and writes one JSON object per line to stdout,
/// stopping after `count` samples if given.
pub fn run(config: &MonitorConfig, count: Option<u64>) -> anyhow::Result<()> {
    info!(
        "headless monitoring every {:?}{}",
        config.update_interval,
        count.map_or_else(String::new, |count| format!(" for {count} samples"))
    );
    let mut monitor = Monitor::new(System::new(config.disk_path.clone()));
    let written = write_samples(
        &mut monitor,
        config.update_interval,
        count,
        &mut io::stdout().lock(),
    )?;
    debug!("wrote {written} samples");

    Ok(())
}

/// Writes samples from `monitor` to `out` until `count` is reached or `out` is closed.
/// Returns the number of samples written.
pub fn write_samples<S: MetricsSource>(
    monitor: &mut Monitor<S>,
    interval: Duration,
    count: Option<u64>,
    out: &mut impl Write,
) -> anyhow::Result<u64> {
    let mut written = 0;
    let mut next_tick = Instant::now();
    while count.map_or(true, |count| written < count) {
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        }
        next_tick += interval;

        let sample = monitor.sample(Instant::now());
        let line = serde_json::to_string(&sample).context("failed to serialize sample")?;
        match writeln!(out, "{line}").and_then(|()| out.flush()) {
            Ok(()) => written += 1,
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                debug!("output closed");
                break;
            }
            Err(err) => return Err(err).context("failed to write sample"),
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysmon_core::{
        process::ProcessInfo,
        sample::{Sample, Usage},
        source::Counters,
    };

    #[derive(Default)]
    struct Counting {
        ticks: u64,
    }

    impl MetricsSource for Counting {
        fn refresh(&mut self) {
            self.ticks += 1;
        }

        fn counters(&self) -> Counters {
            Counters {
                cpu_percent: Some(10.0),
                memory: Some(Usage::new(512, 1024)),
                net_received_bytes: Some(self.ticks * 4096),
                net_sent_bytes: Some(self.ticks * 1024),
                ..Counters::default()
            }
        }

        fn processes(&self) -> Vec<ProcessInfo> {
            Vec::new()
        }
    }

    #[test]
    fn writes_one_json_line_per_sample() {
        let mut monitor = Monitor::new(Counting::default());
        let mut out = Vec::new();
        let written = write_samples(&mut monitor, Duration::from_millis(5), Some(3), &mut out)
            .expect("wrote samples");
        assert_eq!(written, 3);

        let output = String::from_utf8(out).expect("utf8 output");
        let samples = output
            .lines()
            .map(|line| serde_json::from_str::<Sample>(line).expect("valid sample"))
            .collect::<Vec<_>>();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].cpu_percent, Some(10.0));
        assert_eq!(samples[0].ram_percent(), Some(50.0));
        assert!(samples[0].network.is_none());
        assert!(samples[2].network.is_some_and(|net| net.input > 0.0));
        assert!(samples.iter().all(|sample| sample.disk.is_none()));
    }

    #[test]
    fn stops_when_output_closes() {
        struct Closed;

        impl Write for Closed {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::BrokenPipe.into())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut monitor = Monitor::new(Counting::default());
        let written = write_samples(&mut monitor, Duration::from_millis(1), None, &mut Closed)
            .expect("closed output is not an error");
        assert_eq!(written, 0);
    }
}
