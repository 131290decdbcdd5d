// ============================================
// TIMING UTILITY - Pipeline Measurement
// ============================================
// Usage:
//   1. Logged on drop: let _timer = Timer::start("name");
//   2. Silent tracking for responses: let timer = Timer::silent("name"); timer.elapsed_ms();
// ============================================

use std::time::{Duration, Instant};
use tracing::debug;

/// Timer for measuring one pipeline run
pub struct Timer {
    name: String,
    start: Instant,
    silent: bool,
}

impl Timer {
    /// Create a timer that logs its duration when dropped
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            silent: false,
        }
    }

    /// Create a silent timer (never logs, read it with elapsed_ms())
    pub fn silent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            silent: true,
        }
    }

    /// Elapsed milliseconds, the unit of `processing_time_ms`
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn log_duration(&self, duration: Duration) {
        if self.silent {
            return;
        }
        let ms = duration.as_millis() as u64;
        debug!(
            operation = %self.name,
            elapsed_ms = ms,
            speed = Self::speed_label(ms),
            "Timing"
        );
    }

    /// Coarse bucket for the log line
    fn speed_label(ms: u64) -> &'static str {
        match ms {
            0..=100 => "very fast",
            101..=500 => "fast",
            501..=1000 => "acceptable",
            1001..=5000 => "slow",
            _ => "very slow",
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.log_duration(self.start.elapsed());
    }
}
