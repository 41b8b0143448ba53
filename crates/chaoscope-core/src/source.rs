//! Abstract entropy source trait and the per-fetch result envelope.
//!
//! Every entropy provider, remote HTTP service or local timing trick,
//! implements [`EntropySource`]. A fetch never propagates an error: provider
//! failures (timeout, malformed payload, network loss) are absorbed inside
//! the adapter and surface as a [`SourceResult`] with `status = Error` and a
//! populated diagnostic message.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Upper bound of the fixed sample width: samples are 24-bit integers.
pub const SAMPLE_MAX: u64 = (1 << 24) - 1;

/// Provenance confidence of a source's output.
///
/// Informational only: the mixer never weights samples by quality; chain
/// ordering is the operator's preference declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceQuality {
    /// Physical randomness measured by the provider (atmospheric, quantum).
    TrueRandom,
    /// Output of a cryptographic generator or beacon.
    Cryptographic,
    /// Local hardware timing jitter.
    HardwareTiming,
    /// Derived from a signal that is not a randomness measurement.
    Simulated,
    /// Last-resort pseudo-random fallback.
    FallbackPseudo,
}

impl std::fmt::Display for SourceQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrueRandom => write!(f, "true_random"),
            Self::Cryptographic => write!(f, "cryptographic"),
            Self::HardwareTiming => write!(f, "hardware_timing"),
            Self::Simulated => write!(f, "simulated"),
            Self::FallbackPseudo => write!(f, "fallback_pseudo"),
        }
    }
}

/// Outcome of one adapter invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Success,
    Error,
}

/// Timing and outcome metadata recorded by the adapter itself.
///
/// Adapters measure their own wall clock. For timing-based sources the
/// measured latency is part of the entropy payload, so the measurement has
/// to happen inside the adapter boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Wall-clock duration of the fetch in milliseconds.
    pub response_time_ms: f64,
    /// Unix timestamp (milliseconds) when the result was produced.
    pub timestamp: u64,
    /// Number of samples returned.
    pub sample_count: usize,
    pub status: FetchStatus,
    /// Human-readable failure description when `status = Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Value object returned by one adapter invocation.
///
/// Created fresh on every fetch and never mutated afterwards; the next fetch
/// from the same source supersedes it wholesale. Callers must check
/// `samples.len()` explicitly, since length varies per call and per provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceResult {
    /// Stable identifier of the producing source.
    pub source_id: String,
    /// Ordered samples, each in `0..=SAMPLE_MAX`.
    pub samples: Vec<u64>,
    pub quality: SourceQuality,
    pub diagnostics: Diagnostics,
}

impl SourceResult {
    /// Build a successful result, stamping diagnostics from the elapsed fetch time.
    pub fn success(
        source_id: &str,
        samples: Vec<u64>,
        quality: SourceQuality,
        elapsed: Duration,
    ) -> Self {
        let sample_count = samples.len();
        Self {
            source_id: source_id.to_string(),
            samples,
            quality,
            diagnostics: Diagnostics {
                response_time_ms: elapsed.as_secs_f64() * 1000.0,
                timestamp: unix_millis(),
                sample_count,
                status: FetchStatus::Success,
                error: None,
            },
        }
    }

    /// Build an error result with empty samples and a failure description.
    pub fn error(
        source_id: &str,
        quality: SourceQuality,
        elapsed: Duration,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.to_string(),
            samples: Vec::new(),
            quality,
            diagnostics: Diagnostics {
                response_time_ms: elapsed.as_secs_f64() * 1000.0,
                timestamp: unix_millis(),
                sample_count: 0,
                status: FetchStatus::Error,
                error: Some(message.into()),
            },
        }
    }

    /// Whether this result satisfies the harvester's acceptance bar.
    pub fn is_usable(&self, min_samples: usize) -> bool {
        self.diagnostics.status == FetchStatus::Success && self.samples.len() >= min_samples
    }
}

/// Metadata about an entropy source.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Unique identifier (e.g. `"random_org"`).
    pub name: &'static str,
    /// One-line human-readable description.
    pub description: &'static str,
    /// Provenance tag applied to every result from this source.
    pub quality: SourceQuality,
    /// Hard upper bound the adapter applies to its own fetch. Adapters that
    /// do not bound their latency are non-compliant.
    pub timeout: Duration,
}

/// Trait every entropy source implements.
///
/// `fetch` is infallible at the signature level by design: the error channel
/// is the result envelope, not a `Result` or a panic.
pub trait EntropySource: Send + Sync {
    /// Source metadata.
    fn info(&self) -> &SourceInfo;

    /// Fetch up to `n_samples` samples. Must complete within
    /// `info().timeout` plus bookkeeping, and must never panic.
    fn fetch(&self, n_samples: usize) -> SourceResult;

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}

/// Current Unix time in milliseconds.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Stopwatch used by adapters to stamp their own response time.
pub struct FetchTimer(Instant);

impl FetchTimer {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

impl Default for FetchTimer {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_result_populates_diagnostics() {
        let r = SourceResult::success(
            "unit",
            vec![1, 2, 3],
            SourceQuality::HardwareTiming,
            Duration::from_millis(25),
        );
        assert_eq!(r.source_id, "unit");
        assert_eq!(r.diagnostics.sample_count, 3);
        assert_eq!(r.diagnostics.status, FetchStatus::Success);
        assert!(r.diagnostics.error.is_none());
        assert!((r.diagnostics.response_time_ms - 25.0).abs() < 1.0);
    }

    #[test]
    fn error_result_has_no_samples() {
        let r = SourceResult::error(
            "unit",
            SourceQuality::TrueRandom,
            Duration::from_millis(2000),
            "connect timed out",
        );
        assert!(r.samples.is_empty());
        assert_eq!(r.diagnostics.status, FetchStatus::Error);
        assert_eq!(r.diagnostics.error.as_deref(), Some("connect timed out"));
    }

    #[test]
    fn usability_requires_success_and_min_samples() {
        let ok = SourceResult::success(
            "u",
            vec![7; 10],
            SourceQuality::FallbackPseudo,
            Duration::ZERO,
        );
        assert!(ok.is_usable(10));
        assert!(!ok.is_usable(11));

        let err =
            SourceResult::error("u", SourceQuality::FallbackPseudo, Duration::ZERO, "boom");
        assert!(!err.is_usable(0));
    }

    #[test]
    fn quality_display_labels() {
        assert_eq!(SourceQuality::TrueRandom.to_string(), "true_random");
        assert_eq!(SourceQuality::FallbackPseudo.to_string(), "fallback_pseudo");
    }
}
