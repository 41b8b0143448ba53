//! Chaos and complexity diagnostics for in-memory numeric series.
//!
//! Every estimator is pure, takes `&[f64]`, and signals "insufficient data"
//! with an absent value instead of panicking or dividing by zero. The
//! Lyapunov and fractal-dimension estimators are deliberately coarse
//! heuristics: their sign and trend carry the signal, not their magnitude.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use serde::Serialize;

/// Lag set for the multi-lag autocorrelation profile.
pub const DEFAULT_LAGS: &[usize] = &[1, 5, 10, 20, 50];

/// Most-recent window the profile is computed over.
pub const DEFAULT_WINDOW: usize = 512;

/// Equal-width histogram buckets for the entropy estimate.
pub const ENTROPY_BINS: usize = 16;

/// Step separation for the Lyapunov divergence estimate.
pub const LYAPUNOV_WINDOW: usize = 10;

/// Block sizes for the box-counting dimension estimate.
pub const BOX_SCALES: &[usize] = &[2, 4, 8, 16, 32];

/// Degenerate-denominator guard.
const EPS: f64 = 1e-12;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Autocorrelation at a single lag.
#[derive(Debug, Clone, Serialize)]
pub struct LagCorrelation {
    pub lag: usize,
    pub correlation: f64,
}

/// On-demand snapshot of every estimator over one series.
///
/// Always recomputed from the current buffer contents: the buffers mutate
/// continuously, so caching a report would serve stale structure.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub sample_count: usize,
    /// Empty when the window is smaller than the largest configured lag.
    pub autocorrelations: Vec<LagCorrelation>,
    /// Shannon entropy in nats (divide by ln 2 for bits).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyapunov_exponent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fractal_dimension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lz_complexity: Option<usize>,
    /// Zlib compressibility of the quantized series (1.0 ≈ incompressible).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_ratio: Option<f64>,
    /// Lag-0 co-movement with a paired series, when one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_correlation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cross_series: Option<String>,
}

// ---------------------------------------------------------------------------
// Estimators
// ---------------------------------------------------------------------------

/// Pearson-normalized autocovariance at one lag.
///
/// Returns 0.0 for a constant series (guarded denominator) and `None` when
/// there are not at least two points and one valid pair at this lag.
pub fn autocorrelation(series: &[f64], lag: usize) -> Option<f64> {
    let n = series.len();
    if n < 2 || lag >= n {
        return None;
    }

    let mean = series.iter().sum::<f64>() / n as f64;
    let denom: f64 = series.iter().map(|x| (x - mean).powi(2)).sum();
    if denom < EPS {
        return Some(0.0);
    }

    let num: f64 = (0..n - lag)
        .map(|i| (series[i] - mean) * (series[i + lag] - mean))
        .sum();
    Some(num / denom)
}

/// Autocorrelation at each configured lag over the most recent `window`
/// elements. Absent when the window holds fewer points than the largest lag
/// requires.
pub fn autocorrelation_profile(
    series: &[f64],
    lags: &[usize],
    window: usize,
) -> Option<Vec<LagCorrelation>> {
    let max_lag = *lags.iter().max()?;
    let start = series.len().saturating_sub(window);
    let recent = &series[start..];
    if recent.len() <= max_lag {
        return None;
    }

    Some(
        lags.iter()
            .filter_map(|&lag| {
                autocorrelation(recent, lag).map(|correlation| LagCorrelation {
                    lag,
                    correlation,
                })
            })
            .collect(),
    )
}

/// Shannon entropy (nats) over equal-width bins between observed min/max.
///
/// A zero-range series carries no information and reports 0.0; an empty
/// series reports nothing.
pub fn shannon_entropy(series: &[f64], bins: usize) -> Option<f64> {
    if series.is_empty() || bins == 0 {
        return None;
    }

    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range < EPS {
        return Some(0.0);
    }

    let mut counts = vec![0usize; bins];
    for &x in series {
        let idx = (((x - min) / range) * bins as f64) as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    let n = series.len() as f64;
    let h = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.ln()
        })
        .sum();
    Some(h)
}

/// Simplified nearest-neighbor divergence estimate of the largest Lyapunov
/// exponent.
///
/// For each offset, the separation of adjacent points is compared to the
/// separation of the pair `w` steps ahead and the log ratio is averaged.
/// This is a directional heuristic, not Wolf or Rosenstein: a positive
/// value suggests chaotic-like sensitivity; the magnitude is not calibrated.
pub fn lyapunov_exponent(series: &[f64], w: usize) -> Option<f64> {
    let n = series.len();
    if w == 0 || n < w + 2 {
        return None;
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    for i in 0..n - w - 1 {
        let d0 = (series[i + 1] - series[i]).abs();
        let dw = (series[i + w + 1] - series[i + w]).abs();
        if d0 > EPS && dw > EPS {
            sum += (dw / d0).ln() / w as f64;
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

/// Box-counting dimension approximation from block counts at several scales.
///
/// Counts occupied blocks per scale and fits log(count) against log(scale)
/// by least squares, returning the negated slope. Coarse by construction:
/// it partitions the index axis only, not a multi-dimensional embedding.
pub fn fractal_dimension(series: &[f64]) -> Option<f64> {
    let n = series.len();
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for &scale in BOX_SCALES {
        if scale > n {
            continue;
        }
        let blocks = n.div_ceil(scale);
        xs.push((scale as f64).ln());
        ys.push((blocks as f64).ln());
    }
    if xs.len() < 2 {
        return None;
    }

    let m = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / m;
    let mean_y = ys.iter().sum::<f64>() / m;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    for i in 0..xs.len() {
        cov += (xs[i] - mean_x) * (ys[i] - mean_y);
        var_x += (xs[i] - mean_x).powi(2);
    }
    if var_x < EPS {
        return None;
    }
    Some(-(cov / var_x))
}

/// LZ76-style complexity proxy: binarize at the midpoint, then count
/// distinct phrases in one left-to-right scan with a growing prefix
/// dictionary. Not a compressor, a structure counter.
pub fn lz_complexity(series: &[f64]) -> Option<usize> {
    if series.is_empty() {
        return None;
    }

    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mid = (min + max) / 2.0;
    let bits: Vec<u8> = series.iter().map(|&x| u8::from(x > mid)).collect();

    let mut seen = std::collections::HashSet::new();
    let mut phrases = 0usize;
    let mut current = Vec::new();
    for &b in &bits {
        current.push(b);
        if !seen.contains(&current) {
            seen.insert(current.clone());
            phrases += 1;
            current.clear();
        }
    }
    if !current.is_empty() {
        phrases += 1;
    }
    Some(phrases)
}

/// Lag-0 co-movement of two independently observed series, aligned to the
/// shorter one. Returns 0.0 when either side is constant.
pub fn cross_correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len().min(b.len());
    if n < 2 {
        return None;
    }
    let a = &a[..n];
    let b = &b[..n];

    let mean_a = a.iter().sum::<f64>() / n as f64;
    let mean_b = b.iter().sum::<f64>() / n as f64;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom < EPS {
        return Some(0.0);
    }
    Some(cov / denom)
}

/// Zlib compressibility of the quantized series: compressed size over
/// original size. Near 1.0 for structureless data, well below for
/// repetitive data. Complements [`lz_complexity`], which counts phrases
/// instead of bytes.
pub fn compression_ratio(series: &[f64]) -> Option<f64> {
    if series.is_empty() {
        return None;
    }

    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    let bytes: Vec<u8> = if range < EPS {
        vec![0u8; series.len()]
    } else {
        series
            .iter()
            .map(|&x| (((x - min) / range) * 255.0) as u8)
            .collect()
    };

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&bytes).ok()?;
    let compressed = encoder.finish().ok()?;
    Some(compressed.len() as f64 / bytes.len() as f64)
}

// ---------------------------------------------------------------------------
// Report assembly
// ---------------------------------------------------------------------------

/// Run every estimator over one series.
pub fn analyze(series: &[f64]) -> AnalysisReport {
    AnalysisReport {
        sample_count: series.len(),
        autocorrelations: autocorrelation_profile(series, DEFAULT_LAGS, DEFAULT_WINDOW)
            .unwrap_or_default(),
        entropy: shannon_entropy(series, ENTROPY_BINS),
        lyapunov_exponent: lyapunov_exponent(series, LYAPUNOV_WINDOW),
        fractal_dimension: fractal_dimension(series),
        lz_complexity: lz_complexity(series),
        compression_ratio: compression_ratio(series),
        cross_correlation: None,
        cross_series: None,
    }
}

/// Run every estimator over `series`, plus cross-correlation against a
/// jointly observed partner.
pub fn analyze_with_pair(series: &[f64], other_name: &str, other: &[f64]) -> AnalysisReport {
    let mut report = analyze(series);
    report.cross_correlation = cross_correlation(series, other);
    report.cross_series = Some(other_name.to_string());
    report
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lcg_series(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 33) as f64 / (1u64 << 31) as f64
            })
            .collect()
    }

    #[test]
    fn autocorrelation_lag_zero_is_one() {
        let series = lcg_series(500, 42);
        let r = autocorrelation(&series, 0).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn autocorrelation_of_constant_is_zero() {
        let series = vec![3.5; 200];
        assert_eq!(autocorrelation(&series, 0), Some(0.0));
        assert_eq!(autocorrelation(&series, 5), Some(0.0));
    }

    #[test]
    fn autocorrelation_insufficient_data() {
        assert!(autocorrelation(&[], 0).is_none());
        assert!(autocorrelation(&[1.0], 0).is_none());
        assert!(autocorrelation(&[1.0, 2.0, 3.0], 3).is_none());
    }

    #[test]
    fn alternating_series_has_strong_negative_lag_one() {
        let series: Vec<f64> = (0..400).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let r = autocorrelation(&series, 1).unwrap();
        assert!(r < -0.9, "lag-1 of alternation should be near -1, got {r}");
    }

    #[test]
    fn profile_absent_when_window_too_small() {
        let series = lcg_series(30, 7);
        // Largest default lag is 50; thirty points cannot support it.
        assert!(autocorrelation_profile(&series, DEFAULT_LAGS, DEFAULT_WINDOW).is_none());
    }

    #[test]
    fn profile_covers_all_configured_lags() {
        let series = lcg_series(600, 7);
        let profile =
            autocorrelation_profile(&series, DEFAULT_LAGS, DEFAULT_WINDOW).unwrap();
        assert_eq!(profile.len(), DEFAULT_LAGS.len());
        for lc in &profile {
            assert!(lc.correlation.abs() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn entropy_of_identical_values_is_zero() {
        let series = vec![7.0; 100];
        assert_eq!(shannon_entropy(&series, ENTROPY_BINS), Some(0.0));
    }

    #[test]
    fn entropy_of_uniform_spread_approaches_log_bins() {
        // Sixteen distinct levels, equally frequent: one level per bin.
        let series: Vec<f64> = (0..1600).map(|i| (i % 16) as f64).collect();
        let h = shannon_entropy(&series, 16).unwrap();
        assert!((h - (16.0f64).ln()).abs() < 1e-9, "got {h}");
    }

    #[test]
    fn entropy_absent_for_empty_series() {
        assert!(shannon_entropy(&[], ENTROPY_BINS).is_none());
    }

    #[test]
    fn lyapunov_none_for_constant_series() {
        // Zero separations everywhere; no valid pair survives the guard.
        let series = vec![1.0; 100];
        assert!(lyapunov_exponent(&series, LYAPUNOV_WINDOW).is_none());
    }

    #[test]
    fn lyapunov_zero_for_alternating_series() {
        let series: Vec<f64> = (0..200).map(|i| if i % 2 == 0 { 0.0 } else { 1.0 }).collect();
        let lam = lyapunov_exponent(&series, LYAPUNOV_WINDOW).unwrap();
        assert!(lam.abs() < 1e-9, "constant separations diverge at rate 0, got {lam}");
    }

    #[test]
    fn lyapunov_defined_for_noisy_series() {
        let series = lcg_series(500, 99);
        assert!(lyapunov_exponent(&series, LYAPUNOV_WINDOW).is_some());
    }

    #[test]
    fn fractal_dimension_near_one_for_dense_series() {
        // Block counts scale as n/s on the index axis; the fitted slope is -1.
        let series = lcg_series(320, 5);
        let d = fractal_dimension(&series).unwrap();
        assert!((d - 1.0).abs() < 0.1, "got {d}");
    }

    #[test]
    fn fractal_dimension_needs_two_scales() {
        assert!(fractal_dimension(&[1.0, 2.0, 3.0]).is_none());
        assert!(fractal_dimension(&[]).is_none());
    }

    #[test]
    fn lz_alternation_beats_constant() {
        let constant = vec![5.0; 200];
        let alternating: Vec<f64> =
            (0..200).map(|i| if i % 2 == 0 { 1.0 } else { 9.0 }).collect();
        let c = lz_complexity(&constant).unwrap();
        let a = lz_complexity(&alternating).unwrap();
        assert!(a > c, "alternating {a} should exceed constant {c}");
    }

    #[test]
    fn lz_absent_for_empty() {
        assert!(lz_complexity(&[]).is_none());
    }

    #[test]
    fn cross_correlation_of_identical_series_is_one() {
        let series = lcg_series(300, 11);
        let r = cross_correlation(&series, &series).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cross_correlation_aligns_to_shorter() {
        let a = lcg_series(300, 11);
        let b = lcg_series(120, 11);
        // Same generator, same prefix: perfect correlation over the overlap.
        let r = cross_correlation(&a, &b).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cross_correlation_zero_for_constant_side() {
        let a = vec![1.0; 50];
        let b = lcg_series(50, 3);
        assert_eq!(cross_correlation(&a, &b), Some(0.0));
    }

    #[test]
    fn independent_streams_are_weakly_correlated() {
        let a = lcg_series(2000, 0xdead_beef);
        let b = lcg_series(2000, 0x1234_5678);
        let r = cross_correlation(&a, &b).unwrap();
        assert!(r.abs() < 0.3, "got {r}");
    }

    #[test]
    fn compression_ratio_orders_structure() {
        let repetitive = vec![1.0; 4096];
        let noisy = lcg_series(4096, 77);
        let cr_rep = compression_ratio(&repetitive).unwrap();
        let cr_noise = compression_ratio(&noisy).unwrap();
        assert!(cr_rep < cr_noise, "repetitive {cr_rep} vs noisy {cr_noise}");
    }

    #[test]
    fn report_tolerates_empty_series() {
        let report = analyze(&[]);
        assert_eq!(report.sample_count, 0);
        assert!(report.autocorrelations.is_empty());
        assert!(report.entropy.is_none());
        assert!(report.lyapunov_exponent.is_none());
        assert!(report.fractal_dimension.is_none());
        assert!(report.lz_complexity.is_none());
    }

    #[test]
    fn report_is_fully_populated_for_a_rich_series() {
        let series = lcg_series(1000, 21);
        let report = analyze(&series);
        assert_eq!(report.sample_count, 1000);
        assert_eq!(report.autocorrelations.len(), DEFAULT_LAGS.len());
        assert!(report.entropy.is_some());
        assert!(report.lyapunov_exponent.is_some());
        assert!(report.fractal_dimension.is_some());
        assert!(report.lz_complexity.is_some());
        assert!(report.compression_ratio.is_some());
    }

    #[test]
    fn paired_report_carries_cross_fields() {
        let a = lcg_series(400, 1);
        let b = lcg_series(400, 2);
        let report = analyze_with_pair(&a, "partner", &b);
        assert!(report.cross_correlation.is_some());
        assert_eq!(report.cross_series.as_deref(), Some("partner"));
    }
}
