//! Stochastic process generators parametrized by an entropy-derived seed.
//!
//! Four related path generators: Lévy-stable flights (Chambers–Mallows–Stuck),
//! an approximate fractional Brownian motion, Merton-style jump-diffusion, and
//! an entropy-conditioned stable diffusion. All are pure functions of their
//! numeric inputs given the seed; no adapter or network access in here.

use std::f64::consts::{PI, TAU};
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of the α=1 branch around the tangent singularity.
const ALPHA_ONE_EPS: f64 = 1e-9;

/// Mean-reversion factor of the entropy-conditioned diffusion.
const REVERSION: f64 = 0.1;

/// Stability index of the entropy-kernel draws.
const KERNEL_ALPHA: f64 = 1.5;

/// Numeric-domain failures detected before a formula is evaluated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessError {
    #[error("stability index alpha must be in (0, 2], got {0}")]
    InvalidAlpha(f64),
    #[error("skewness beta must be in [-1, 1], got {0}")]
    InvalidBeta(f64),
    #[error("hurst exponent must be in (0, 1), got {0}")]
    InvalidHurst(f64),
    #[error("time step dt must be positive and finite, got {0}")]
    InvalidDt(f64),
    #[error("path length must be positive")]
    EmptyPath,
    #[error("entropy-conditioned diffusion requires at least one entropy value")]
    EmptyKernel,
    #[error("unknown process kind: {0:?}")]
    UnknownKind(String),
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Lévy-stable distribution parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LevyParams {
    /// Stability index α ∈ (0, 2]. 2 is Gaussian, 1 is Cauchy-like.
    pub alpha: f64,
    /// Skewness β ∈ [−1, 1].
    pub beta: f64,
    pub scale: f64,
    pub location: f64,
}

impl Default for LevyParams {
    fn default() -> Self {
        Self {
            alpha: 1.5,
            beta: 0.0,
            scale: 1.0,
            location: 0.0,
        }
    }
}

impl LevyParams {
    pub fn validate(&self) -> Result<(), ProcessError> {
        if !(self.alpha > 0.0 && self.alpha <= 2.0) {
            return Err(ProcessError::InvalidAlpha(self.alpha));
        }
        if !(-1.0..=1.0).contains(&self.beta) {
            return Err(ProcessError::InvalidBeta(self.beta));
        }
        Ok(())
    }
}

/// Merton jump-diffusion parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JumpDiffusionParams {
    pub dt: f64,
    /// Drift per unit time.
    pub mu: f64,
    /// Diffusion volatility per unit time.
    pub sigma: f64,
    /// Jump intensity (expected jumps per unit time).
    pub lambda: f64,
    pub jump_mean: f64,
    pub jump_std: f64,
}

impl Default for JumpDiffusionParams {
    fn default() -> Self {
        Self {
            dt: 0.01,
            mu: 0.0,
            sigma: 1.0,
            lambda: 0.5,
            jump_mean: 0.0,
            jump_std: 2.0,
        }
    }
}

impl JumpDiffusionParams {
    pub fn validate(&self) -> Result<(), ProcessError> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(ProcessError::InvalidDt(self.dt));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Samplers
// ---------------------------------------------------------------------------

/// Standard normal draw via Box–Muller.
fn gauss<R: Rng>(rng: &mut R) -> f64 {
    // 1 − U keeps the log argument in (0, 1].
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// One Lévy-stable draw by the Chambers–Mallows–Stuck transform.
///
/// Callers are expected to have run [`LevyParams::validate`]. The α=1 case
/// is branched before the general formula; `tan(πα/2)` is undefined there.
pub fn levy_stable<R: Rng>(rng: &mut R, p: &LevyParams) -> f64 {
    let v = (rng.random::<f64>() - 0.5) * PI; // Uniform(−π/2, π/2)
    let w = -(1.0 - rng.random::<f64>()).ln(); // Exponential(1)

    let x = if (p.alpha - 1.0).abs() < ALPHA_ONE_EPS {
        let half_pi = PI / 2.0;
        let t = half_pi + p.beta * v;
        (2.0 / PI)
            * (t * v.tan()
                - p.beta * ((half_pi * w * v.cos().max(f64::MIN_POSITIVE)) / t).ln())
    } else {
        let tan_term = (PI * p.alpha / 2.0).tan();
        let b = (p.beta * tan_term).atan() / p.alpha;
        let s = (1.0 + p.beta * p.beta * tan_term * tan_term).powf(1.0 / (2.0 * p.alpha));
        let cv = v.cos().max(f64::MIN_POSITIVE);
        // The power base stays positive in exact arithmetic; the clamp keeps
        // floating-point edge draws at ±π/2 from producing NaN.
        let base = ((v - p.alpha * (v + b)).cos() / w).max(f64::MIN_POSITIVE);
        s * (p.alpha * (v + b)).sin() / cv.powf(1.0 / p.alpha)
            * base.powf((1.0 - p.alpha) / p.alpha)
    };

    p.location + p.scale * x
}

// ---------------------------------------------------------------------------
// Path generators
// ---------------------------------------------------------------------------

/// Lévy flight: running sum of `n` stable increments.
pub fn levy_flight(seed: u64, n: usize, p: &LevyParams) -> Result<Vec<f64>, ProcessError> {
    p.validate()?;
    if n == 0 {
        return Err(ProcessError::EmptyPath);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut acc = 0.0;
    let mut path = Vec::with_capacity(n);
    for _ in 0..n {
        acc += levy_stable(&mut rng, p);
        path.push(acc);
    }
    Ok(path)
}

/// Approximate fractional Brownian motion with Hurst exponent `hurst`.
///
/// I.i.d. normal draws scaled by `((i+1)/n)^(H−0.5)` and accumulated. This
/// is a low-fidelity approximation: the covariance structure of exact fBm
/// (Cholesky or circulant embedding) is NOT matched, only the qualitative
/// persistence behavior. Exact covariance is a non-goal here.
pub fn fractional_brownian(seed: u64, n: usize, hurst: f64) -> Result<Vec<f64>, ProcessError> {
    if !(hurst > 0.0 && hurst < 1.0) {
        return Err(ProcessError::InvalidHurst(hurst));
    }
    if n == 0 {
        return Err(ProcessError::EmptyPath);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut acc = 0.0;
    let mut path = Vec::with_capacity(n);
    for i in 0..n {
        let weight = ((i + 1) as f64 / n as f64).powf(hurst - 0.5);
        acc += gauss(&mut rng) * weight;
        path.push(acc);
    }
    Ok(path)
}

/// Merton-style jump-diffusion: drift + Brownian diffusion + Poisson jumps,
/// accumulated from 0.
pub fn jump_diffusion(
    seed: u64,
    n: usize,
    p: &JumpDiffusionParams,
) -> Result<Vec<f64>, ProcessError> {
    p.validate()?;
    if n == 0 {
        return Err(ProcessError::EmptyPath);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let sqrt_dt = p.dt.sqrt();
    let mut x = 0.0;
    let mut path = Vec::with_capacity(n);
    for _ in 0..n {
        x += p.mu * p.dt + p.sigma * sqrt_dt * gauss(&mut rng);
        if rng.random::<f64>() < p.lambda * p.dt {
            x += p.jump_mean + p.jump_std * gauss(&mut rng);
        }
        path.push(x);
    }
    Ok(path)
}

/// Entropy-conditioned stable diffusion.
///
/// Builds a reusable kernel of Lévy-stable samples whose scale is
/// proportional to the range-normalized entropy values, then iterates a
/// mean-reverting walk: each step decays the state by the reversion factor
/// and adds a kernel draw scaled by `step_size`. The walk stays bounded
/// while its volatility tracks the entropy source's empirical spread.
pub fn entropy_diffusion(
    seed: u64,
    entropy: &[f64],
    n: usize,
    step_size: f64,
) -> Result<Vec<f64>, ProcessError> {
    if entropy.is_empty() {
        return Err(ProcessError::EmptyKernel);
    }
    if n == 0 {
        return Err(ProcessError::EmptyPath);
    }

    let min = entropy.iter().copied().fold(f64::INFINITY, f64::min);
    let max = entropy.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let mut rng = StdRng::seed_from_u64(seed);
    let kernel: Vec<f64> = entropy
        .iter()
        .map(|&e| {
            let norm = if range < 1e-12 { 0.5 } else { (e - min) / range };
            let p = LevyParams {
                alpha: KERNEL_ALPHA,
                beta: 0.0,
                scale: norm,
                location: 0.0,
            };
            levy_stable(&mut rng, &p)
        })
        .collect();

    let mut state = 0.0;
    let mut path = Vec::with_capacity(n);
    for _ in 0..n {
        let draw = kernel[rng.random_range(0..kernel.len())];
        state += -REVERSION * state + draw * step_size;
        path.push(state);
    }
    Ok(path)
}

// ---------------------------------------------------------------------------
// Request envelope
// ---------------------------------------------------------------------------

/// Named process kinds exposed to the CLI and the HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    Levy,
    Fbm,
    JumpDiffusion,
    EntropyDiffusion,
}

impl FromStr for ProcessKind {
    type Err = ProcessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "levy" => Ok(Self::Levy),
            "fbm" => Ok(Self::Fbm),
            "jump" | "jump_diffusion" => Ok(Self::JumpDiffusion),
            "entropy" | "entropy_diffusion" => Ok(Self::EntropyDiffusion),
            other => Err(ProcessError::UnknownKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Levy => write!(f, "levy"),
            Self::Fbm => write!(f, "fbm"),
            Self::JumpDiffusion => write!(f, "jump_diffusion"),
            Self::EntropyDiffusion => write!(f, "entropy_diffusion"),
        }
    }
}

fn default_length() -> usize {
    256
}
fn default_alpha() -> f64 {
    1.5
}
fn default_scale() -> f64 {
    1.0
}
fn default_hurst() -> f64 {
    0.7
}
fn default_dt() -> f64 {
    0.01
}
fn default_sigma() -> f64 {
    1.0
}
fn default_lambda() -> f64 {
    0.5
}
fn default_jump_std() -> f64 {
    2.0
}
fn default_step_size() -> f64 {
    0.1
}

/// Deserializable request for one sample path. The CLI builds this from
/// flags; the server builds it from query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PathRequest {
    pub kind: ProcessKind,
    #[serde(default = "default_length")]
    pub length: usize,
    /// Explicit seed; when absent the caller supplies an entropy-derived one.
    pub seed: Option<u64>,

    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub beta: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub location: f64,

    #[serde(default = "default_hurst")]
    pub hurst: f64,

    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default)]
    pub mu: f64,
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    #[serde(default = "default_lambda")]
    pub lambda: f64,
    #[serde(default)]
    pub jump_mean: f64,
    #[serde(default = "default_jump_std")]
    pub jump_std: f64,

    #[serde(default = "default_step_size")]
    pub step_size: f64,
}

impl PathRequest {
    pub fn new(kind: ProcessKind) -> Self {
        Self {
            kind,
            length: default_length(),
            seed: None,
            alpha: default_alpha(),
            beta: 0.0,
            scale: default_scale(),
            location: 0.0,
            hurst: default_hurst(),
            dt: default_dt(),
            mu: 0.0,
            sigma: default_sigma(),
            lambda: default_lambda(),
            jump_mean: 0.0,
            jump_std: default_jump_std(),
            step_size: default_step_size(),
        }
    }
}

/// Dispatch a path request to the matching generator.
///
/// `default_seed` is used when the request carries none (callers pass the
/// latest chaos seed). `entropy` feeds the entropy-conditioned diffusion
/// and is ignored by the other kinds.
pub fn sample_path(
    req: &PathRequest,
    default_seed: u64,
    entropy: &[f64],
) -> Result<Vec<f64>, ProcessError> {
    let seed = req.seed.unwrap_or(default_seed);
    match req.kind {
        ProcessKind::Levy => {
            let p = LevyParams {
                alpha: req.alpha,
                beta: req.beta,
                scale: req.scale,
                location: req.location,
            };
            levy_flight(seed, req.length, &p)
        }
        ProcessKind::Fbm => fractional_brownian(seed, req.length, req.hurst),
        ProcessKind::JumpDiffusion => {
            let p = JumpDiffusionParams {
                dt: req.dt,
                mu: req.mu,
                sigma: req.sigma,
                lambda: req.lambda,
                jump_mean: req.jump_mean,
                jump_std: req.jump_std,
            };
            jump_diffusion(seed, req.length, &p)
        }
        ProcessKind::EntropyDiffusion => {
            entropy_diffusion(seed, entropy, req.length, req.step_size)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
