//! ClockJitterSource — monotonic clock read jitter.
//!
//! Successive `Instant::now()` calls are separated by a nondeterministic
//! number of nanoseconds: interrupt handling, frequency scaling, cache and
//! TLB state all perturb the delta. The least-significant bytes of those
//! deltas carry the jitter; three of them are packed into one 24-bit sample.

use std::hint::black_box;
use std::time::Duration;

use crate::source::{EntropySource, FetchTimer, SourceInfo, SourceQuality, SourceResult};

/// Spin iterations between the two clock reads of one delta measurement.
const SPIN_WORK: u64 = 64;

static CLOCK_JITTER_INFO: SourceInfo = SourceInfo {
    name: "clock_jitter",
    description: "LSBs of nanosecond deltas between monotonic clock reads",
    quality: SourceQuality::HardwareTiming,
    timeout: Duration::from_secs(2),
};

/// Local timing source harvesting monotonic-clock jitter.
pub struct ClockJitterSource;

impl ClockJitterSource {
    /// One jitter measurement: nanoseconds elapsed across a tiny spin loop.
    fn delta_nanos() -> u64 {
        let t = FetchTimer::start();
        let mut acc = 0u64;
        for i in 0..SPIN_WORK {
            acc = black_box(acc.wrapping_add(i).rotate_left(7));
        }
        black_box(acc);
        t.elapsed().as_nanos() as u64
    }
}

impl EntropySource for ClockJitterSource {
    fn info(&self) -> &SourceInfo {
        &CLOCK_JITTER_INFO
    }

    fn fetch(&self, n_samples: usize) -> SourceResult {
        let timer = FetchTimer::start();
        let mut samples = Vec::with_capacity(n_samples);
        let mut prev = Self::delta_nanos();

        while samples.len() < n_samples {
            if timer.elapsed() > self.info().timeout {
                break;
            }
            let a = Self::delta_nanos();
            let b = Self::delta_nanos();
            let c = Self::delta_nanos();
            // One byte of jitter per delta, one byte of inter-delta spread.
            let s = (a & 0xFF) | ((b & 0xFF) << 8) | ((c ^ prev) & 0xFF) << 16;
            samples.push(s);
            prev = c;
        }

        SourceResult::success(self.name(), samples, self.info().quality, timer.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FetchStatus, SAMPLE_MAX};

    #[test]
    fn collects_requested_sample_count() {
        let r = ClockJitterSource.fetch(100);
        assert_eq!(r.diagnostics.status, FetchStatus::Success);
        assert_eq!(r.samples.len(), 100);
        assert!(r.samples.iter().all(|&s| s <= SAMPLE_MAX));
    }

    #[test]
    fn deltas_are_not_all_identical() {
        let r = ClockJitterSource.fetch(200);
        let first = r.samples[0];
        assert!(
            r.samples.iter().any(|&s| s != first),
            "clock jitter produced a constant stream"
        );
    }
}
