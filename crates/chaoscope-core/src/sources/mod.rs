//! All entropy source implementations and the constructor registry.

pub mod disk;
pub mod fallback;
pub mod http;
pub mod timing;

use crate::source::EntropySource;

/// Every known source constructor. Each returns a boxed source.
pub fn all_sources() -> Vec<Box<dyn EntropySource>> {
    vec![
        // Remote providers
        Box::new(http::RandomOrgSource::new()),
        Box::new(http::AnuQrngSource::new()),
        Box::new(http::NistBeaconSource::new()),
        Box::new(http::SpotPriceSource::new()),
        // Local timing
        Box::new(timing::ClockJitterSource),
        Box::new(disk::DiskLatencySource),
        // Fallback
        Box::new(fallback::OsCsprngSource),
    ]
}

/// The default fallback chain in operator-preference order: measured physical
/// randomness first, cryptographic beacons next, local timing after that, and
/// the OS CSPRNG as the terminal entry that always answers.
///
/// Ordering encodes declared preference, not measured quality. The harvester
/// takes the first acceptable result, it does not rank.
pub fn default_chain() -> Vec<Box<dyn EntropySource>> {
    vec![
        Box::new(http::RandomOrgSource::new()),
        Box::new(http::AnuQrngSource::new()),
        Box::new(http::NistBeaconSource::new()),
        Box::new(timing::ClockJitterSource),
        Box::new(disk::DiskLatencySource),
        Box::new(fallback::OsCsprngSource),
    ]
}

/// Look up a source constructor by its stable identifier.
pub fn source_by_name(name: &str) -> Option<Box<dyn EntropySource>> {
    all_sources().into_iter().find(|s| s.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceQuality;

    #[test]
    fn registry_names_are_unique() {
        let sources = all_sources();
        let mut names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), sources.len());
    }

    #[test]
    fn default_chain_ends_with_fallback() {
        let chain = default_chain();
        let last = chain.last().expect("chain is never empty");
        assert_eq!(last.name(), "os_csprng");
        assert_eq!(last.info().quality, SourceQuality::FallbackPseudo);
    }

    #[test]
    fn lookup_by_name() {
        assert!(source_by_name("clock_jitter").is_some());
        assert!(source_by_name("random_org").is_some());
        assert!(source_by_name("no_such_source").is_none());
    }

    #[test]
    fn every_source_declares_a_bounded_timeout() {
        for src in all_sources() {
            let t = src.info().timeout;
            assert!(t.as_secs() >= 1 && t.as_secs() <= 10, "{}", src.name());
        }
    }
}
