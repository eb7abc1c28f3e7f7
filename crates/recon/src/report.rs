use std::collections::BTreeSet;

use crate::model::{
    ComparisonStats, DatasetStats, DerivedOutputs, Diagnostic, DuplicateKey, ReconSummary,
    ReconciledRow, Report, SourceLabels, Verdict,
};

/// Everything the report carries besides the core statistics.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub spec_limit: f64,
    pub sources: SourceLabels,
    pub duplicate_keys: Vec<DuplicateKey>,
    pub derived: DerivedOutputs,
    pub diagnostics: Vec<Diagnostic>,
}

/// Count rows and identifiers in a reconciled table.
pub fn compute_summary(rows: &[ReconciledRow], duplicate_keys: Vec<DuplicateKey>) -> ReconSummary {
    let identifiers: BTreeSet<&str> = rows.iter().map(|r| r.identifier.as_str()).collect();

    let (mut comparable, mut only_a, mut only_b, mut missing_value) = (0, 0, 0, 0);
    for row in rows {
        match (row.value_a.is_some(), row.value_b.is_some()) {
            (true, true) => comparable += 1,
            (true, false) => only_a += 1,
            (false, true) => only_b += 1,
            (false, false) => missing_value += 1,
        }
    }

    ReconSummary {
        total_rows: rows.len(),
        identifiers: identifiers.len(),
        comparable,
        not_comparable: rows.len() - comparable,
        only_a,
        only_b,
        missing_value,
        duplicate_keys,
    }
}

pub fn assemble(
    rows: Vec<ReconciledRow>,
    stats_a: Option<DatasetStats>,
    stats_b: Option<DatasetStats>,
    comparison: ComparisonStats,
    verdict: Verdict,
    context: ReportContext,
) -> Report {
    let summary = compute_summary(&rows, context.duplicate_keys);
    Report {
        spec_limit: context.spec_limit,
        sources: context.sources,
        summary,
        rows,
        stats_a,
        stats_b,
        comparison,
        verdict,
        derived: context.derived,
        diagnostics: context.diagnostics,
    }
}
