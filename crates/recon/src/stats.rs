//! Descriptive statistics, capability index and source-to-source comparison.
//!
//! Every statistic is either a finite number or `None`. Sums that leave the
//! f64 range come back as `None` instead of `inf`/`NaN`.

use crate::error::ReconError;
use crate::model::{ComparisonStats, DatasetStats, ReconciledRow};

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    finite(values.iter().sum::<f64>() / values.len() as f64)
}

/// True when every value is identical. Checked directly so that rounding in
/// the mean never turns a constant series into a tiny positive spread.
fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Sample standard deviation (N−1 denominator). `None` below two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    if is_constant(values) {
        return Some(0.0);
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    finite((ss / (values.len() - 1) as f64).sqrt())
}

/// Pearson correlation coefficient. `None` with fewer than two pairs,
/// mismatched lengths, or zero variance on either side.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 || is_constant(xs) || is_constant(ys) {
        return None;
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 || !sxx.is_finite() || !syy.is_finite() {
        return None;
    }
    finite(sxy / (sxx.sqrt() * syy.sqrt())).map(|r| r.clamp(-1.0, 1.0))
}

/// One-sided capability against an upper spec limit with zero as the
/// natural lower bound: `min((spec − μ) / 3σ, μ / 3σ)`.
pub fn capability_index(mean: f64, std_dev: Option<f64>, spec: f64) -> Option<f64> {
    let sigma = std_dev.filter(|s| *s > 0.0)?;
    let three_sigma = finite(3.0 * sigma)?;
    let upper = (spec - mean) / three_sigma;
    let lower = mean / three_sigma;
    finite(upper.min(lower))
}

/// Statistics for one source. Fails only when there is nothing to describe
/// or the mean itself overflows.
pub fn dataset_stats(source: &str, values: &[f64], spec: f64) -> Result<DatasetStats, ReconError> {
    if values.is_empty() {
        return Err(ReconError::EmptyInput { table: source.into() });
    }
    let mean = mean(values).ok_or_else(|| ReconError::NonFinite { table: source.into() })?;
    let std_dev = sample_std_dev(values);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    Ok(DatasetStats {
        count: values.len(),
        mean,
        std_dev,
        max,
        min,
        capability_index: capability_index(mean, std_dev, spec),
    })
}

/// Delta and correlation statistics over the comparable subset of `rows`.
pub fn comparison_stats(rows: &[ReconciledRow]) -> ComparisonStats {
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut deltas = Vec::new();

    for row in rows.iter().filter(|r| r.comparable) {
        if let (Some(a), Some(b), Some(d)) = (row.value_a, row.value_b, row.delta) {
            xs.push(a);
            ys.push(b);
            deltas.push(d);
        }
    }

    ComparisonStats {
        comparable_count: deltas.len(),
        delta_mean: mean(&deltas),
        delta_std_dev: sample_std_dev(&deltas),
        correlation: pearson(&xs, &ys),
    }
}
