//! Background collection loops.
//!
//! One polling thread per configured source plus one mixing thread. Each
//! poller fetches through the observatory's cache at a fixed interval and
//! records diagnostics and samples into the series buffers; the mixer folds
//! whatever per-source results are currently cached into a fresh chaos seed.
//!
//! Shutdown is cooperative: a shared flag is checked between iterations and
//! inside sleep slices. An in-flight fetch is never interrupted, so stopping
//! can lag by up to one adapter timeout.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::mixer;
use crate::observatory::{Observatory, metric};
use crate::source::EntropySource;

/// Granularity of the shutdown check inside an interval sleep.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Tuning for the background loops.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Poll interval per source (and mix interval).
    pub interval: Duration,
    /// Samples requested from each source per fresh fetch.
    pub samples_per_cycle: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            samples_per_cycle: 64,
        }
    }
}

/// Handle over the spawned background threads.
pub struct Collector {
    shutdown: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl Collector {
    /// Spawn one poller per source and the mixer thread.
    pub fn spawn(
        observatory: Arc<Observatory>,
        sources: Vec<Box<dyn EntropySource>>,
        config: CollectorConfig,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let names: Vec<String> = sources.iter().map(|s| s.name().to_string()).collect();
        let mut handles = Vec::with_capacity(sources.len() + 1);

        for source in sources {
            let obs = Arc::clone(&observatory);
            let stop = Arc::clone(&shutdown);
            let cfg = config.clone();
            let handle = std::thread::Builder::new()
                .name(format!("poll-{}", source.name()))
                .spawn(move || poll_loop(obs, source, cfg, stop))
                .expect("failed to spawn poller thread");
            handles.push(handle);
        }

        {
            let obs = Arc::clone(&observatory);
            let stop = Arc::clone(&shutdown);
            let cfg = config.clone();
            let handle = std::thread::Builder::new()
                .name("mixer".to_string())
                .spawn(move || mix_loop(obs, names, cfg, stop))
                .expect("failed to spawn mixer thread");
            handles.push(handle);
        }

        Self { shutdown, handles }
    }

    /// Token the embedding process can flip from a signal handler.
    pub fn shutdown_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Request shutdown and wait for every loop to finish its iteration.
    pub fn stop(self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

/// Poll one source through the cache, recording only fresh fetches.
fn poll_loop(
    obs: Arc<Observatory>,
    source: Box<dyn EntropySource>,
    cfg: CollectorConfig,
    stop: Arc<AtomicBool>,
) {
    let name = source.name();
    while !stop.load(Ordering::Relaxed) {
        if obs.cache().get(name).is_none() {
            let result = source.fetch(cfg.samples_per_cycle);
            log::debug!(
                "polled {name}: {} samples in {:.1}ms",
                result.samples.len(),
                result.diagnostics.response_time_ms
            );
            obs.record(&metric::response_ms(name), result.diagnostics.response_time_ms);
            obs.record(&metric::sample_count(name), result.samples.len() as f64);
            obs.record_many(
                metric::ENTROPY_STREAM,
                result.samples.iter().map(|&s| (s & 0xFF) as f64),
            );
            obs.cache().put(name, result);
        }
        sleep_with_shutdown(cfg.interval, &stop);
    }
}

/// Fold the currently cached per-source results into a fresh seed.
fn mix_loop(obs: Arc<Observatory>, names: Vec<String>, cfg: CollectorConfig, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        let results: Vec<_> = names.iter().filter_map(|n| obs.cache().get(n)).collect();
        if !results.is_empty() {
            let seed = mixer::mix(&results);
            obs.record(metric::MIXED_VALUE, seed.mixed_value as f64);
            obs.set_seed(seed);
        }
        sleep_with_shutdown(cfg.interval, &stop);
    }
}

/// Sleep for `total`, waking early when the shutdown flag flips.
fn sleep_with_shutdown(total: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + total;
    while Instant::now() < deadline {
        if stop.load(Ordering::Relaxed) {
            return;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        std::thread::sleep(remaining.min(SLEEP_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harvest::test_support::StaticSource;
    use crate::series::DEFAULT_CAPACITY;

    fn fast_config() -> CollectorConfig {
        CollectorConfig {
            interval: Duration::from_millis(10),
            samples_per_cycle: 8,
        }
    }

    #[test]
    fn collector_populates_series_and_seed() {
        // Long TTL: each poller fetches once and the mixer sees both entries.
        let obs = Arc::new(Observatory::new(Duration::from_secs(30), DEFAULT_CAPACITY));
        let sources: Vec<Box<dyn EntropySource>> = vec![
            Box::new(StaticSource::new("s1", vec![10, 20, 30])),
            Box::new(StaticSource::new("s2", vec![40, 50, 60])),
        ];

        let collector = Collector::spawn(Arc::clone(&obs), sources, fast_config());
        std::thread::sleep(Duration::from_millis(120));
        collector.stop();

        assert!(obs.series_len(&metric::response_ms("s1")) > 0);
        assert!(obs.series_len(&metric::response_ms("s2")) > 0);
        assert!(obs.series_len(metric::ENTROPY_STREAM) > 0);
        let seed = obs.latest_seed().expect("mixer should have produced a seed");
        assert_eq!(seed.sources.len(), 2);
    }

    #[test]
    fn stop_returns_promptly() {
        let obs = Arc::new(Observatory::default());
        let sources: Vec<Box<dyn EntropySource>> =
            vec![Box::new(StaticSource::new("s", vec![1, 2, 3]))];
        let collector = Collector::spawn(
            obs,
            sources,
            CollectorConfig {
                interval: Duration::from_secs(60),
                samples_per_cycle: 4,
            },
        );

        // Despite the 60s interval, the sliced sleep observes the flag fast.
        let t0 = Instant::now();
        collector.stop();
        assert!(t0.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn shutdown_token_is_shared() {
        let obs = Arc::new(Observatory::default());
        let collector = Collector::spawn(obs, Vec::new(), fast_config());
        let token = collector.shutdown_token();
        assert!(!token.load(Ordering::Relaxed));
        collector.stop();
        assert!(token.load(Ordering::Relaxed));
    }
}
