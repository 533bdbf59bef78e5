//! Playback timing telemetry.
//!
//! Records how far each play's wall-clock time drifted from its nominal
//! duration, in a fixed-size ring buffer.

use std::time::Duration;

/// Ring buffer size for drift samples.
const DRIFT_BUFFER_SIZE: usize = 128;

/// Summary of the drift samples collected since the last take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriftSummary {
    pub avg_drift_us: u32,
    pub max_drift_us: u32,
    pub p95_drift_us: u32,
    /// Plays that overran their nominal duration by more than the tolerance.
    pub late_plays: u64,
    pub samples: usize,
}

pub struct PlaybackTelemetry {
    /// Ring buffer of absolute drift in microseconds
    drift_us: [u32; DRIFT_BUFFER_SIZE],
    idx: usize,
    /// Maximum drift observed in the current window
    max_drift_us: u32,
    late_plays: u64,
    /// Saturates at DRIFT_BUFFER_SIZE
    sample_count: usize,
}

impl Default for PlaybackTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackTelemetry {
    pub fn new() -> Self {
        Self {
            drift_us: [0; DRIFT_BUFFER_SIZE],
            idx: 0,
            max_drift_us: 0,
            late_plays: 0,
            sample_count: 0,
        }
    }

    /// Record one play. `tolerance` is how much lateness is not counted
    /// as a late play.
    pub fn record(&mut self, nominal: Duration, actual: Duration, tolerance: Duration) {
        let drift = if actual > nominal {
            actual - nominal
        } else {
            nominal - actual
        };
        let us = drift.as_micros().min(u32::MAX as u128) as u32;

        self.drift_us[self.idx] = us;
        self.idx = (self.idx + 1) % DRIFT_BUFFER_SIZE;
        if self.sample_count < DRIFT_BUFFER_SIZE {
            self.sample_count += 1;
        }
        if us > self.max_drift_us {
            self.max_drift_us = us;
        }
        if actual > nominal + tolerance {
            self.late_plays += 1;
        }
    }

    /// Summarize and reset the window. The late count stays cumulative.
    pub fn take_summary(&mut self) -> DriftSummary {
        if self.sample_count == 0 {
            return DriftSummary::default();
        }

        let window = &self.drift_us[..self.sample_count];
        let sum: u64 = window.iter().map(|&x| x as u64).sum();
        let avg = (sum / self.sample_count as u64) as u32;

        let mut sorted = window.to_vec();
        sorted.sort_unstable();
        let p95_idx = (self.sample_count * 95 / 100).max(1) - 1;
        let p95 = sorted[p95_idx.min(self.sample_count - 1)];

        let summary = DriftSummary {
            avg_drift_us: avg,
            max_drift_us: self.max_drift_us,
            p95_drift_us: p95,
            late_plays: self.late_plays,
            samples: self.sample_count,
        };

        self.max_drift_us = 0;
        self.sample_count = 0;
        self.idx = 0;
        summary
    }
}
