// Time source abstraction for the control loop and benches

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Something that reports monotonic elapsed time since a fixed origin.
///
/// The motion profiler computes step timing against wall-clock elapsed
/// time rather than loop iteration count, so the same clock instance must
/// be used for every tick of a given axis.
pub trait Clock: Send + Sync {
    fn elapsed(&self) -> Duration;
}

/// Monotonic clock backed by the operating system.
#[derive(Debug, Clone)]
pub struct OsClock {
    started: Instant,
}

impl OsClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for OsClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for OsClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Hand-driven clock for deterministic tests and benches.
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, by: Duration) {
        self.micros
            .fetch_add(by.as_micros() as u64, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn elapsed(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::Relaxed))
    }
}
