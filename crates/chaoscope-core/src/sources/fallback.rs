//! OsCsprngSource — the end-of-chain local fallback.
//!
//! Draws from the operating system CSPRNG via `getrandom`. The output is
//! cryptographically strong, but the source is tagged `FallbackPseudo`
//! because its role in a chain is "always answers", not "preferred
//! provenance". A degraded harvest should be visible as such downstream.

use std::time::Duration;

use crate::source::{EntropySource, FetchTimer, SourceInfo, SourceQuality, SourceResult};

static OS_CSPRNG_INFO: SourceInfo = SourceInfo {
    name: "os_csprng",
    description: "Operating system CSPRNG via getrandom; never fails, never blocks on the network",
    quality: SourceQuality::FallbackPseudo,
    timeout: Duration::from_secs(1),
};

/// Local fallback source backed by the OS CSPRNG.
pub struct OsCsprngSource;

impl EntropySource for OsCsprngSource {
    fn info(&self) -> &SourceInfo {
        &OS_CSPRNG_INFO
    }

    fn fetch(&self, n_samples: usize) -> SourceResult {
        let timer = FetchTimer::start();
        let mut raw = vec![0u8; n_samples * 3];
        match getrandom::fill(&mut raw) {
            Ok(()) => {
                let samples = raw
                    .chunks_exact(3)
                    .map(|c| u64::from(c[0]) | u64::from(c[1]) << 8 | u64::from(c[2]) << 16)
                    .collect();
                SourceResult::success(self.name(), samples, self.info().quality, timer.elapsed())
            }
            Err(e) => SourceResult::error(
                self.name(),
                self.info().quality,
                timer.elapsed(),
                format!("OS CSPRNG unavailable: {e}"),
            ),
        }
    }
}
