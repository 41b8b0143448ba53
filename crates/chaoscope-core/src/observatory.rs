//! Shared runtime state: cache, series buffers, latest seed.
//!
//! One explicitly constructed [`Observatory`] instance owns everything
//! mutable in the system: the source cache, the named ring buffers, and
//! the most recent chaos seed. It is passed by `Arc` to the collector, the
//! server, and the CLI instead of living in process-wide statics, so tests
//! construct as many independent instances as they need.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::analysis::{self, AnalysisReport};
use crate::cache::{DEFAULT_TTL, SourceCache};
use crate::mixer::ChaosSeed;
use crate::series::{DEFAULT_CAPACITY, SeriesBuffer};

/// Canonical series names recorded by the collector.
pub mod metric {
    /// Low byte of every harvested sample, all sources interleaved.
    pub const ENTROPY_STREAM: &str = "entropy_stream";
    /// Mixed value of each produced chaos seed.
    pub const MIXED_VALUE: &str = "mixed_value";

    /// Per-source fetch latency series.
    pub fn response_ms(source_id: &str) -> String {
        format!("{source_id}_response_ms")
    }

    /// Per-source sample-count series.
    pub fn sample_count(source_id: &str) -> String {
        format!("{source_id}_sample_count")
    }
}

/// Injectable state object owning the cache and the per-metric buffers.
pub struct Observatory {
    cache: SourceCache,
    series: Mutex<HashMap<String, SeriesBuffer>>,
    latest_seed: Mutex<Option<ChaosSeed>>,
    series_capacity: usize,
}

impl Observatory {
    pub fn new(cache_ttl: Duration, series_capacity: usize) -> Self {
        Self {
            cache: SourceCache::new(cache_ttl),
            series: Mutex::new(HashMap::new()),
            latest_seed: Mutex::new(None),
            series_capacity: series_capacity.max(1),
        }
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Append one observation, creating the buffer on first touch.
    pub fn record(&self, series: &str, value: f64) {
        let mut map = self.series.lock().unwrap();
        map.entry(series.to_string())
            .or_insert_with(|| SeriesBuffer::new(self.series_capacity))
            .push(value);
    }

    /// Append many observations in order.
    pub fn record_many(&self, series: &str, values: impl IntoIterator<Item = f64>) {
        let mut map = self.series.lock().unwrap();
        map.entry(series.to_string())
            .or_insert_with(|| SeriesBuffer::new(self.series_capacity))
            .extend(values);
    }

    /// Copy out a series in insertion order, `None` for unknown names.
    pub fn snapshot(&self, series: &str) -> Option<Vec<f64>> {
        self.series.lock().unwrap().get(series).map(|b| b.snapshot())
    }

    /// Names of every series observed so far, sorted.
    pub fn series_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.series.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn series_len(&self, series: &str) -> usize {
        self.series
            .lock()
            .unwrap()
            .get(series)
            .map_or(0, |b| b.len())
    }

    /// Replace the latest seed wholesale.
    pub fn set_seed(&self, seed: ChaosSeed) {
        *self.latest_seed.lock().unwrap() = Some(seed);
    }

    pub fn latest_seed(&self) -> Option<ChaosSeed> {
        self.latest_seed.lock().unwrap().clone()
    }

    /// Recompute an analysis report from the current buffer contents.
    /// Never cached; the buffers mutate continuously underneath.
    pub fn report(&self, series: &str) -> Option<AnalysisReport> {
        let data = self.snapshot(series)?;
        Some(analysis::analyze(&data))
    }

    /// Report for `series` plus cross-correlation against `other`.
    pub fn report_pair(&self, series: &str, other: &str) -> Option<AnalysisReport> {
        let data = self.snapshot(series)?;
        let partner = self.snapshot(other)?;
        Some(analysis::analyze_with_pair(&data, other, &partner))
    }

    /// Drain every buffer and forget the latest seed. Capacities survive.
    pub fn reset(&self) {
        for buf in self.series.lock().unwrap().values_mut() {
            buf.clear();
        }
        *self.latest_seed.lock().unwrap() = None;
        self.cache.clear();
    }
}

impl Default for Observatory {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_creates_buffers_lazily() {
        let obs = Observatory::default();
        assert!(obs.series_names().is_empty());
        obs.record("latency", 12.5);
        obs.record("latency", 13.0);
        assert_eq!(obs.snapshot("latency"), Some(vec![12.5, 13.0]));
        assert_eq!(obs.series_names(), vec!["latency"]);
    }

    #[test]
    fn unknown_series_yields_none() {
        let obs = Observatory::default();
        assert!(obs.snapshot("nothing").is_none());
        assert!(obs.report("nothing").is_none());
        assert_eq!(obs.series_len("nothing"), 0);
    }

    #[test]
    fn capacity_bounds_every_buffer() {
        let obs = Observatory::new(DEFAULT_TTL, 50);
        obs.record_many("stream", (0..120).map(|i| i as f64));
        let snap = obs.snapshot("stream").unwrap();
        assert_eq!(snap.len(), 50);
        assert_eq!(snap[0], 70.0);
        assert_eq!(*snap.last().unwrap(), 119.0);
    }

    #[test]
    fn latest_seed_round_trips() {
        let obs = Observatory::default();
        assert!(obs.latest_seed().is_none());
        obs.set_seed(ChaosSeed {
            mixed_value: 42,
            seed: 99,
            sources: vec!["a".into()],
            timestamp: 0,
        });
        assert_eq!(obs.latest_seed().unwrap().mixed_value, 42);
    }

    #[test]
    fn report_reflects_current_contents() {
        let obs = Observatory::default();
        obs.record_many("m", (0..600).map(|i| ((i * 37) % 101) as f64));
        let report = obs.report("m").unwrap();
        assert_eq!(report.sample_count, 600);
        assert!(report.entropy.is_some());
    }

    #[test]
    fn paired_report_requires_both_series() {
        let obs = Observatory::default();
        obs.record_many("a", (0..100).map(|i| i as f64));
        assert!(obs.report_pair("a", "missing").is_none());
        obs.record_many("b", (0..100).map(|i| (100 - i) as f64));
        let report = obs.report_pair("a", "b").unwrap();
        // Perfectly anti-aligned series.
        assert!((report.cross_correlation.unwrap() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn reset_drains_but_keeps_names() {
        let obs = Observatory::default();
        obs.record("x", 1.0);
        obs.set_seed(ChaosSeed {
            mixed_value: 1,
            seed: 2,
            sources: vec![],
            timestamp: 3,
        });
        obs.reset();
        assert_eq!(obs.series_len("x"), 0);
        assert!(obs.latest_seed().is_none());
    }
}
