//! Derived chart data: computed views layered on top of the reconciliation.

use crate::model::{DerivedOutputs, HistogramBin, MeasurementRow, NormalizedTable, ReconciledRow};

pub const DELTA_HISTOGRAM_BINS: usize = 20;

/// Rows whose measurement strictly exceeds the spec limit.
pub fn over_spec(table: &NormalizedTable, spec: f64) -> Vec<MeasurementRow> {
    table
        .rows
        .iter()
        .filter(|r| r.value.is_some_and(|v| v > spec))
        .cloned()
        .collect()
}

/// Equal-width histogram of comparable deltas. The last bin is closed on
/// both ends; every other bin is `[lower, upper)`.
pub fn delta_histogram(rows: &[ReconciledRow], bins: usize) -> Vec<HistogramBin> {
    let deltas: Vec<f64> = rows.iter().filter_map(|r| r.delta).collect();
    if deltas.is_empty() || bins == 0 {
        return Vec::new();
    }

    let lo = deltas.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = deltas.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if hi == lo {
        return vec![HistogramBin {
            lower: lo,
            upper: hi,
            count: deltas.len(),
        }];
    }

    let width = (hi - lo) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + i as f64 * width,
            upper: if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width },
            count: 0,
        })
        .collect();

    for d in deltas {
        let idx = (((d - lo) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// Largest value on either side over comparable rows.
pub fn parity_max(rows: &[ReconciledRow]) -> Option<f64> {
    rows.iter()
        .filter(|r| r.comparable)
        .flat_map(|r| [r.value_a, r.value_b])
        .flatten()
        .reduce(f64::max)
}

pub fn build_derived(
    a: &NormalizedTable,
    b: &NormalizedTable,
    rows: &[ReconciledRow],
    spec: f64,
) -> DerivedOutputs {
    DerivedOutputs {
        over_spec_a: over_spec(a, spec),
        over_spec_b: over_spec(b, spec),
        delta_histogram: delta_histogram(rows, DELTA_HISTOGRAM_BINS),
        parity_max: parity_max(rows),
    }
}
