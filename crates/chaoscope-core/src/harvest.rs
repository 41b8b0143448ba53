//! Ordered fallback harvesting across an adapter chain.
//!
//! The policy is "best available", not "best quality": adapters are tried
//! strictly in the order the operator configured, and the first success with
//! enough samples wins. When every adapter degrades, the caller still gets
//! the last attempted result (typically the local fallback) rather than an
//! error. The harvester itself never fails.

use crate::cache::SourceCache;
use crate::source::{EntropySource, SourceResult};
use crate::sources::fallback::OsCsprngSource;

/// Default acceptance bar for a harvest.
pub const DEFAULT_MIN_SAMPLES: usize = 16;

/// Fallback-chain harvester.
pub struct Harvester {
    chain: Vec<Box<dyn EntropySource>>,
    min_samples: usize,
}

impl Harvester {
    /// Build a harvester over an ordered adapter chain.
    pub fn new(chain: Vec<Box<dyn EntropySource>>, min_samples: usize) -> Self {
        Self { chain, min_samples }
    }

    /// Harvester over the default registry chain.
    pub fn default_chain() -> Self {
        Self::new(crate::sources::default_chain(), DEFAULT_MIN_SAMPLES)
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Names of the chain entries, in priority order.
    pub fn source_names(&self) -> Vec<&'static str> {
        self.chain.iter().map(|s| s.name()).collect()
    }

    pub fn chain_len(&self) -> usize {
        self.chain.len()
    }

    /// Walk the chain until a result passes the acceptance bar.
    ///
    /// An empty chain degrades to the local CSPRNG fallback instead of
    /// crashing the caller.
    pub fn harvest(&self, n_samples: usize) -> SourceResult {
        if self.chain.is_empty() {
            log::warn!("harvest invoked with an empty chain; using local fallback");
            return OsCsprngSource.fetch(n_samples);
        }

        let mut last = None;
        for source in &self.chain {
            let result = source.fetch(n_samples);
            if result.is_usable(self.min_samples) {
                return result;
            }
            log::warn!(
                "source {} degraded ({} samples, error: {:?})",
                result.source_id,
                result.samples.len(),
                result.diagnostics.error
            );
            last = Some(result);
        }
        // All adapters degraded; surface the last attempt as-is.
        last.expect("chain is non-empty")
    }

    /// Like [`harvest`](Self::harvest), but consults `cache` per source id
    /// before fetching and stores every fresh fetch, degraded or not.
    ///
    /// Caching degraded results is deliberate: a provider that just timed
    /// out should not be re-hit on every cycle inside the refresh window.
    pub fn harvest_cached(&self, cache: &SourceCache, n_samples: usize) -> SourceResult {
        if self.chain.is_empty() {
            return self.harvest(n_samples);
        }

        let mut last = None;
        for source in &self.chain {
            let name = source.name();
            let result = match cache.get(name) {
                Some(cached) => cached,
                None => {
                    let fresh = source.fetch(n_samples);
                    cache.put(name, fresh.clone());
                    fresh
                }
            };
            if result.is_usable(self.min_samples) {
                return result;
            }
            last = Some(result);
        }
        last.expect("chain is non-empty")
    }

    /// Fetch every chain entry individually (cache-aware), in priority order.
    ///
    /// This is the mixer's feed: one result per source, whatever their
    /// status. The mixer flattens only the samples that are present.
    pub fn harvest_all_cached(
        &self,
        cache: &SourceCache,
        n_samples: usize,
    ) -> Vec<SourceResult> {
        self.chain
            .iter()
            .map(|source| {
                let name = source.name();
                match cache.get(name) {
                    Some(cached) => cached,
                    None => {
                        let fresh = source.fetch(n_samples);
                        cache.put(name, fresh.clone());
                        fresh
                    }
                }
            })
            .collect()
    }
}
