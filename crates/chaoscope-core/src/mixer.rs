//! Folding many source results into one chaos seed.
//!
//! The combiner is a position-dependent rotate-XOR: each sample is shifted
//! by `index % 8` before being XORed into the accumulator, so identical
//! values at different offsets do not cancel. This is a diffusion heuristic,
//! not a cryptographic mixing function; do not present it as one.

use sha2::{Digest, Sha256};

use serde::{Deserialize, Serialize};

use crate::source::{SourceResult, unix_millis};

/// Derived seed value: the deterministic mix plus a non-reproducible seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaosSeed {
    /// Pure function of constituent samples and their order. Identical
    /// inputs in identical order always reproduce this value.
    pub mixed_value: u64,
    /// SHA-256 derivation over `(mixed_value, timestamp, OS jitter)`,
    /// truncated to 64 bits. Deliberately not reproducible.
    pub seed: u64,
    /// Source ids that contributed, in harvest-priority order.
    pub sources: Vec<String>,
    /// Unix timestamp (milliseconds) of the mix.
    pub timestamp: u64,
}

/// Rotate-XOR fold over flattened samples.
pub fn rotate_xor_fold(samples: impl IntoIterator<Item = u64>) -> u64 {
    let mut acc = 0u64;
    for (i, v) in samples.into_iter().enumerate() {
        let shift = (i % 8) as u32;
        acc ^= v.wrapping_shl(shift) | (v >> (8 - shift));
    }
    acc
}

/// Derive the non-deterministic seed from the deterministic mix.
fn derive_seed(mixed_value: u64, timestamp: u64) -> u64 {
    let mut jitter = [0u8; 8];
    // Jitter failure degrades to zero bytes; the hash still covers mix + time.
    let _ = getrandom::fill(&mut jitter);

    let mut h = Sha256::new();
    h.update(mixed_value.to_le_bytes());
    h.update(timestamp.to_le_bytes());
    h.update(jitter);
    let digest = h.finalize();

    let mut first = [0u8; 8];
    first.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(first)
}

/// Fold all samples from `results` (result order, then sample order) into
/// a [`ChaosSeed`].
///
/// Error results contribute their (empty) sample lists like any other, so a
/// partially degraded harvest still mixes deterministically.
pub fn mix(results: &[SourceResult]) -> ChaosSeed {
    let mixed_value =
        rotate_xor_fold(results.iter().flat_map(|r| r.samples.iter().copied()));
    let timestamp = unix_millis();
    ChaosSeed {
        mixed_value,
        seed: derive_seed(mixed_value, timestamp),
        sources: results.iter().map(|r| r.source_id.clone()).collect(),
        timestamp,
    }
}
