use tracing::debug;

use crate::config::validate_spec;
use crate::derived::build_derived;
use crate::error::ReconError;
use crate::model::{DatasetStats, Diagnostic, NormalizedTable, RawTable, Report, SourceLabels};
use crate::normalize::{normalize, NormalizeOptions};
use crate::reconcile::{duplicate_keys, reconcile_with_policy, DuplicatePolicy};
use crate::report::{assemble, ReportContext};
use crate::stats::{comparison_stats, dataset_stats};
use crate::verdict::VerdictThresholds;

/// Knobs for one analysis run. The spec limit is passed separately.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub normalize: NormalizeOptions,
    pub duplicates: DuplicatePolicy,
    pub thresholds: VerdictThresholds,
}

/// Run the full pipeline over two raw tables.
///
/// Schema problems halt before any statistic is computed. Degenerate
/// statistics never fail the run; they surface as `None` plus a diagnostic.
pub fn analyze(
    a: &RawTable,
    b: &RawTable,
    spec: f64,
    options: &AnalysisOptions,
) -> Result<Report, ReconError> {
    validate_spec(spec)?;
    let table_a = normalize(a, &options.normalize)?;
    let table_b = normalize(b, &options.normalize)?;
    analyze_normalized(&table_a, &table_b, spec, options)
}

/// Run the pipeline over tables that already passed the schema check.
///
/// Values are re-coerced to finite magnitudes, so hand-built tables obey the
/// same invariant as normalized ones.
pub fn analyze_normalized(
    a: &NormalizedTable,
    b: &NormalizedTable,
    spec: f64,
    options: &AnalysisOptions,
) -> Result<Report, ReconError> {
    validate_spec(spec)?;
    let a = &a.magnitudes();
    let b = &b.magnitudes();

    let rows = reconcile_with_policy(a, b, options.duplicates)?;
    let duplicates = duplicate_keys(a, b);
    if !duplicates.is_empty() {
        debug!(count = duplicates.len(), "duplicate part numbers expanded");
    }

    let mut diagnostics = Vec::new();
    let stats_a = source_stats(a, spec, &mut diagnostics);
    let stats_b = source_stats(b, spec, &mut diagnostics);

    let comparison = comparison_stats(&rows);
    if comparison.comparable_count == 0 {
        diagnostics.push(Diagnostic::NoComparableRows);
    } else {
        let spread_lost =
            comparison.comparable_count >= 2 && comparison.delta_std_dev.is_none();
        if comparison.delta_mean.is_none() || spread_lost {
            diagnostics.push(Diagnostic::NonFinite {
                scope: "comparison".into(),
            });
        }
        if comparison.correlation.is_none() {
            diagnostics.push(Diagnostic::CorrelationUndefined {
                comparable: comparison.comparable_count,
            });
        }
    }

    let verdict = options
        .thresholds
        .classify(comparison.correlation, comparison.delta_mean, spec);
    debug!(
        comparable = comparison.comparable_count,
        correlation = ?comparison.correlation,
        delta_mean = ?comparison.delta_mean,
        %verdict,
        "classified"
    );

    let derived = build_derived(a, b, &rows, spec);

    Ok(assemble(
        rows,
        stats_a,
        stats_b,
        comparison,
        verdict,
        ReportContext {
            spec_limit: spec,
            sources: SourceLabels {
                a: a.source.clone(),
                b: b.source.clone(),
            },
            duplicate_keys: duplicates,
            derived,
            diagnostics,
        },
    ))
}

fn source_stats(
    table: &NormalizedTable,
    spec: f64,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<DatasetStats> {
    let source = table.source.clone();
    match dataset_stats(&table.source, &table.values(), spec) {
        Ok(stats) => {
            match stats.std_dev {
                None if stats.count < 2 => {
                    diagnostics.push(Diagnostic::InsufficientSpread { source })
                }
                Some(sd) if sd == 0.0 => diagnostics.push(Diagnostic::ZeroVariance { source }),
                Some(_) if stats.capability_index.is_some() => {}
                // spread or capability index overflowed
                _ => diagnostics.push(Diagnostic::NonFinite { scope: source }),
            }
            Some(stats)
        }
        Err(e) => {
            debug!(source = %table.source, error = %e, "statistics unavailable");
            diagnostics.push(match e {
                ReconError::NonFinite { .. } => Diagnostic::NonFinite { scope: source },
                _ => Diagnostic::EmptyInput { source },
            });
            None
        }
    }
}

/// Parse CSV text into a [`RawTable`]. The first record is the header row;
/// a leading UTF-8 byte-order mark is dropped.
pub fn load_csv_table(source: &str, csv_data: &str) -> Result<RawTable, ReconError> {
    let data = csv_data.strip_prefix('\u{feff}').unwrap_or(csv_data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let csv_err = |e: csv::Error| ReconError::Csv {
        table: source.into(),
        message: e.to_string(),
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    Ok(RawTable::new(source, headers, rows))
}
