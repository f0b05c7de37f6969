// Per-fetch statistics accumulation — retransmissions, timeouts, nacks, RTT.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

struct RttSample {
    /// Running mean RTT in milliseconds.
    avg_rtt_ms: f64,
    /// Running mean of |rtt - previous rtt| in milliseconds.
    avg_jitter_ms: f64,
    last_rtt_ms: Option<f64>,
    samples: u64,
    jitter_samples: u64,
}

/// Point-in-time copy of the accumulated counters, read once by telemetry.
#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub n_retransmitted: u64,
    pub n_timeouts: u64,
    pub n_nacks: u64,
    pub n_segments: u64,
    pub avg_rtt_ms: f64,
    pub avg_jitter_ms: f64,
}

/// Accumulator scoped to one fetch attempt.
///
/// Populated incrementally by the pipeline from concurrent in-flight
/// requests; partial values stay readable after a failed fetch so telemetry
/// can still report them.
pub struct FetchSessionStats {
    retransmitted: AtomicU64,
    timeouts: AtomicU64,
    nacks: AtomicU64,
    segments: AtomicU64,
    rtt: Mutex<RttSample>,
}

impl FetchSessionStats {
    pub fn new() -> Self {
        Self {
            retransmitted: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            nacks: AtomicU64::new(0),
            segments: AtomicU64::new(0),
            rtt: Mutex::new(RttSample {
                avg_rtt_ms: 0.0,
                avg_jitter_ms: 0.0,
                last_rtt_ms: None,
                samples: 0,
                jitter_samples: 0,
            }),
        }
    }

    /// A previously failed interest was re-expressed.
    pub fn record_retransmit(&self) {
        self.retransmitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_nack(&self) {
        self.nacks.fetch_add(1, Ordering::Relaxed);
    }

    /// One unit of content retrieved; folds its RTT into the running means.
    pub fn record_segment(&self, rtt: Duration) {
        self.segments.fetch_add(1, Ordering::Relaxed);

        let rtt_ms = rtt.as_secs_f64() * 1000.0;
        let mut sample = self.rtt.lock();
        sample.samples += 1;
        sample.avg_rtt_ms += (rtt_ms - sample.avg_rtt_ms) / sample.samples as f64;
        if let Some(last) = sample.last_rtt_ms {
            let jitter = (rtt_ms - last).abs();
            sample.jitter_samples += 1;
            sample.avg_jitter_ms += (jitter - sample.avg_jitter_ms) / sample.jitter_samples as f64;
        }
        sample.last_rtt_ms = Some(rtt_ms);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let sample = self.rtt.lock();
        StatsSnapshot {
            n_retransmitted: self.retransmitted.load(Ordering::Relaxed),
            n_timeouts: self.timeouts.load(Ordering::Relaxed),
            n_nacks: self.nacks.load(Ordering::Relaxed),
            n_segments: self.segments.load(Ordering::Relaxed),
            avg_rtt_ms: sample.avg_rtt_ms,
            avg_jitter_ms: sample.avg_jitter_ms,
        }
    }
}

impl Default for FetchSessionStats {
    fn default() -> Self {
        Self::new()
    }
}
