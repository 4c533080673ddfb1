//! Per-second rates derived from monotonically increasing counters.

use std::time::{Duration, Instant};

/// Converts a cumulative byte counter into bytes per second.
#[derive(Default, Debug, Copy, Clone)]
#[must_use]
pub struct RateCounter {
    last: Option<(u64, Instant)>,
}

impl RateCounter {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Records `total` at `now` and returns the rate since the previous update.
    ///
    /// The first update only primes the counter. A counter that went backwards (e.g. an
    /// interface was reset) re-primes and reports `0.0`.
    pub fn update(&mut self, total: u64, now: Instant) -> Option<f64> {
        let Some((last_total, last_time)) = self.last.replace((total, now)) else {
            return None;
        };
        let elapsed = now.saturating_duration_since(last_time).as_secs_f64();
        if elapsed <= 0.0 {
            // Keep the older reference point so the next update spans a real interval
            self.last = Some((last_total, last_time));
            return None;
        }
        match total.checked_sub(last_total) {
            Some(delta) => Some(delta as f64 / elapsed),
            None => Some(0.0),
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Counts rendered frames and reports frames per second over one second windows.
#[derive(Debug, Copy, Clone)]
#[must_use]
pub struct FrameCounter {
    window: Duration,
    window_start: Instant,
    frames: u32,
    fps: Option<f32>,
}

impl FrameCounter {
    pub const WINDOW: Duration = Duration::from_secs(1);

    pub fn new(now: Instant) -> Self {
        Self {
            window: Self::WINDOW,
            window_start: now,
            frames: 0,
            fps: None,
        }
    }

    /// Records one frame presented at `now`.
    pub fn tick(&mut self, now: Instant) {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= self.window {
            self.fps = Some(self.frames as f32 / elapsed.as_secs_f32());
            self.frames = 0;
            self.window_start = now;
        }
    }

    /// The last completed measurement, or `None` once no frame has been presented for two
    /// windows.
    #[must_use]
    pub fn fps_at(&self, now: Instant) -> Option<f32> {
        if now.saturating_duration_since(self.window_start) > self.window * 2 {
            return None;
        }
        self.fps
    }
}
