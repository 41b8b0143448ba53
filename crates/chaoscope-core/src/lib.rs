//! # chaoscope-core
//!
//! **Many unreliable randomness providers, one resilient seed — and the
//! instruments to measure how chaotic it all really is.**
//!
//! `chaoscope-core` harvests samples from heterogeneous entropy sources
//! (remote true-random APIs, cryptographic beacons, local timing tricks),
//! races them through an ordered fallback chain, folds the survivors into a
//! single chaos seed, and runs nonlinear-dynamics diagnostics over
//! everything it observes: autocorrelation, Shannon entropy, Lyapunov
//! estimates, fractal dimension, Lempel-Ziv complexity.
//!
//! ## Quick Start
//!
//! ```no_run
//! use chaoscope_core::{Harvester, Observatory, mixer};
//!
//! let observatory = Observatory::default();
//! let harvester = Harvester::default_chain();
//!
//! // One harvest through the fallback chain, cached per source.
//! let result = harvester.harvest_cached(observatory.cache(), 64);
//! println!("{}: {} samples", result.source_id, result.samples.len());
//!
//! // Mix every source's freshest result into a chaos seed.
//! let all = harvester.harvest_all_cached(observatory.cache(), 64);
//! let seed = mixer::mix(&all);
//! println!("mixed value: {:#018x}", seed.mixed_value);
//! ```
//!
//! ## Architecture
//!
//! Sources → Harvester (ordered fallback) → Cache (TTL) → Mixer → seed
//!                                            ↓
//!                  Collector → SeriesBuffers → Analysis Engine → reports
//!
//! The harvester's policy is *best available*, not best quality: adapters
//! are tried in operator-declared order and the first acceptable result
//! wins. Every failure degrades into a diagnosed result instead of an
//! error; a fully degraded chain still answers from the local CSPRNG.
//!
//! The mixer's rotate-XOR fold is a diffusion heuristic, not a
//! cryptographic extractor; `mixed_value` is deterministic for a given
//! input order while the derived `seed` deliberately is not.

pub mod analysis;
pub mod cache;
pub mod collector;
pub mod harvest;
pub mod mixer;
pub mod observatory;
pub mod processes;
pub mod series;
pub mod session;
pub mod source;
pub mod sources;

pub use analysis::{AnalysisReport, LagCorrelation, analyze, analyze_with_pair};
pub use cache::{DEFAULT_TTL, SourceCache};
pub use collector::{Collector, CollectorConfig};
pub use harvest::{DEFAULT_MIN_SAMPLES, Harvester};
pub use mixer::{ChaosSeed, mix, rotate_xor_fold};
pub use observatory::{Observatory, metric};
pub use processes::{
    JumpDiffusionParams, LevyParams, PathRequest, ProcessError, ProcessKind,
    entropy_diffusion, fractional_brownian, jump_diffusion, levy_flight, levy_stable,
    sample_path,
};
pub use series::{DEFAULT_CAPACITY, SeriesBuffer};
pub use session::{SessionMeta, SessionWriter};
pub use source::{
    Diagnostics, EntropySource, FetchStatus, SAMPLE_MAX, SourceInfo, SourceQuality,
    SourceResult,
};
pub use sources::{all_sources, default_chain, source_by_name};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
