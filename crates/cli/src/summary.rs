//! Human-readable report summary (written to stderr by the CLI).

use warpcheck_recon::model::{DatasetStats, Report};

fn num(v: Option<f64>, precision: usize) -> String {
    match v {
        Some(x) => format!("{x:.precision$}"),
        None => "undefined".to_string(),
    }
}

fn stats_line(label: &str, stats: Option<&DatasetStats>) -> String {
    match stats {
        Some(s) => format!(
            "{label}: n={} mean={:.2} sd={} max={:.2} min={:.2} cpk={}",
            s.count,
            s.mean,
            num(s.std_dev, 2),
            s.max,
            s.min,
            num(s.capability_index, 3),
        ),
        None => format!("{label}: no usable measurements"),
    }
}

pub fn render_summary(report: &Report) -> String {
    let s = &report.summary;
    let c = &report.comparison;
    let mut lines = Vec::new();

    lines.push(format!(
        "reconciled {} row(s) over {} part(s), {} comparable, {} not comparable",
        s.total_rows, s.identifiers, s.comparable, s.not_comparable,
    ));
    if s.not_comparable > 0 {
        lines.push(format!(
            "  {} {} only, {} {} only, {} without a value",
            s.only_a, report.sources.a, s.only_b, report.sources.b, s.missing_value,
        ));
    }
    if !s.duplicate_keys.is_empty() {
        let keys: Vec<&str> = s.duplicate_keys.iter().map(|d| d.identifier.as_str()).collect();
        lines.push(format!("duplicate part no expanded: {}", keys.join(", ")));
    }

    lines.push(stats_line(&report.sources.a, report.stats_a.as_ref()));
    lines.push(stats_line(&report.sources.b, report.stats_b.as_ref()));

    let over_a = report.derived.over_spec_a.len();
    let over_b = report.derived.over_spec_b.len();
    if over_a + over_b > 0 {
        lines.push(format!(
            "over spec ({}): {} {}, {} {}",
            report.spec_limit, over_a, report.sources.a, over_b, report.sources.b,
        ));
    }

    lines.push(format!(
        "delta mean={} sd={} correlation={}",
        num(c.delta_mean, 2),
        num(c.delta_std_dev, 2),
        num(c.correlation, 3),
    ));

    lines.extend(report.diagnostics.iter().map(|d| format!("note: {d}")));

    lines.push(format!("verdict: {} ({})", report.verdict, report.verdict.advice()));
    lines.join("\n")
}
