//! Time-bounded memoization of source results.
//!
//! One fixed TTL for every entry. Entries are replaced wholesale on `put`
//! (last writer wins) and expire lazily: `get` checks the age at read time
//! and drops stale entries on the spot. There is no background sweeper.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::source::SourceResult;

/// Default refresh window for cached results.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

struct CacheEntry {
    result: SourceResult,
    inserted_at: Instant,
}

/// TTL cache keyed by source identifier.
pub struct SourceCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl SourceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return a clone of the cached result for `source_id` if it is still
    /// inside the refresh window. Expired entries are removed here.
    pub fn get(&self, source_id: &str) -> Option<SourceResult> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(source_id) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                Some(entry.result.clone())
            }
            Some(_) => {
                entries.remove(source_id);
                None
            }
            None => None,
        }
    }

    /// Insert or replace the entry for `source_id` as a whole value.
    pub fn put(&self, source_id: &str, result: SourceResult) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            source_id.to_string(),
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceQuality;

    fn result_with(samples: Vec<u64>) -> SourceResult {
        SourceResult::success(
            "cached",
            samples,
            SourceQuality::Simulated,
            Duration::from_millis(1),
        )
    }

    #[test]
    fn hit_inside_ttl() {
        let cache = SourceCache::new(Duration::from_secs(30));
        cache.put("cached", result_with(vec![1, 2, 3]));
        let hit = cache.get("cached").expect("entry should still be valid");
        assert_eq!(hit.samples, vec![1, 2, 3]);
    }

    #[test]
    fn miss_after_ttl() {
        let cache = SourceCache::new(Duration::from_millis(20));
        cache.put("cached", result_with(vec![9]));
        std::thread::sleep(Duration::from_millis(40));
        assert!(cache.get("cached").is_none());
        // Lazy eviction removed the stale entry at read time.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn put_replaces_wholesale() {
        let cache = SourceCache::default();
        cache.put("cached", result_with(vec![1]));
        cache.put("cached", result_with(vec![2, 3]));
        assert_eq!(cache.get("cached").unwrap().samples, vec![2, 3]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn unknown_key_is_a_miss() {
        let cache = SourceCache::default();
        assert!(cache.get("never_inserted").is_none());
    }

    #[test]
    fn concurrent_writers_leave_a_complete_entry() {
        use std::sync::Arc;
        let cache = Arc::new(SourceCache::default());
        let mut handles = Vec::new();
        for i in 0..8u64 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                cache.put("shared", result_with(vec![i; 16]));
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        // Last writer wins; whichever entry survived must be internally whole.
        let r = cache.get("shared").unwrap();
        assert_eq!(r.samples.len(), 16);
        assert!(r.samples.windows(2).all(|w| w[0] == w[1]));
    }
}
