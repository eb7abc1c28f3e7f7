use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One parsed table as handed over by the I/O layer, before any schema check.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Label used in error messages and in the report ("quality", "dsol", ...).
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(source: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: source.into(),
            headers,
            rows,
        }
    }
}

/// A single normalized measurement. `value` is always a magnitude (>= 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub identifier: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    pub source: String,
    pub rows: Vec<MeasurementRow>,
}

impl NormalizedTable {
    pub fn new(source: impl Into<String>, rows: Vec<MeasurementRow>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }

    /// Copy with every value forced to a finite magnitude; non-finite
    /// values become missing.
    pub fn magnitudes(&self) -> Self {
        let rows = self
            .rows
            .iter()
            .map(|r| MeasurementRow {
                identifier: r.identifier.clone(),
                value: r.value.filter(|v| v.is_finite()).map(f64::abs),
            })
            .collect();
        Self::new(self.source.clone(), rows)
    }

    /// Present measurement values, in row order.
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.value).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    pub identifier: String,
    pub value_a: Option<f64>,
    pub value_b: Option<f64>,
    pub comparable: bool,
    pub delta: Option<f64>,
}

impl ReconciledRow {
    /// Build a row from one joined pair. `comparable` and `delta` follow from
    /// the two sides and are never set independently.
    pub fn new(identifier: impl Into<String>, value_a: Option<f64>, value_b: Option<f64>) -> Self {
        let delta = match (value_a, value_b) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        };
        Self {
            identifier: identifier.into(),
            value_a,
            value_b,
            comparable: delta.is_some(),
            delta,
        }
    }
}

/// An identifier occurring more than once on at least one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub identifier: String,
    pub count_a: usize,
    pub count_b: usize,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two values.
    pub std_dev: Option<f64>,
    pub max: f64,
    pub min: f64,
    /// `None` when the spread is zero or undefined.
    pub capability_index: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonStats {
    pub comparable_count: usize,
    pub delta_mean: Option<f64>,
    pub delta_std_dev: Option<f64>,
    pub correlation: Option<f64>,
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    HighConfidence,
    ModerateDeviation,
    HighDeviation,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighConfidence => "high_confidence",
            Self::ModerateDeviation => "moderate_deviation",
            Self::HighDeviation => "high_deviation",
        }
    }

    /// Operator-facing recommendation.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::HighConfidence => "sources agree: data can be trusted",
            Self::ModerateDeviation => "some deviation between sources: re-measure selected parts",
            Self::HighDeviation => "sources deviate: re-measurement required",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Non-fatal conditions that left part of the report undefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The source has no usable measurement; its statistics are absent.
    EmptyInput { source: String },
    /// Only one measurement; standard deviation and capability index absent.
    InsufficientSpread { source: String },
    /// All measurements identical; capability index absent.
    ZeroVariance { source: String },
    /// No identifier has a value on both sides.
    NoComparableRows,
    /// Fewer than two comparable rows, one side has no variance, or the
    /// sums overflow.
    CorrelationUndefined { comparable: usize },
    /// A statistic left the f64 range and was dropped. `scope` is a source
    /// label or `comparison`.
    NonFinite { scope: String },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput { source } => write!(f, "{source}: no usable measurements"),
            Self::InsufficientSpread { source } => {
                write!(f, "{source}: single measurement, spread undefined")
            }
            Self::ZeroVariance { source } => {
                write!(f, "{source}: zero variance, capability index undefined")
            }
            Self::NoComparableRows => write!(f, "no comparable rows"),
            Self::CorrelationUndefined { comparable } => {
                write!(f, "correlation undefined over {comparable} comparable row(s)")
            }
            Self::NonFinite { scope } => {
                write!(f, "{scope}: statistic outside the f64 range, left undefined")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Derived outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Chart-ready data layered on top of the reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedOutputs {
    pub over_spec_a: Vec<MeasurementRow>,
    pub over_spec_b: Vec<MeasurementRow>,
    pub delta_histogram: Vec<HistogramBin>,
    /// Upper end of the y = x reference line over comparable values.
    pub parity_max: Option<f64>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLabels {
    pub a: String,
    pub b: String,
}

/// Row counts. `comparable`, `only_a`, `only_b` and `missing_value`
/// partition `total_rows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconSummary {
    pub total_rows: usize,
    pub identifiers: usize,
    pub comparable: usize,
    pub not_comparable: usize,
    /// Value from A only.
    pub only_a: usize,
    /// Value from B only.
    pub only_b: usize,
    /// Neither side has a value (blank or unparsable cell).
    pub missing_value: usize,
    pub duplicate_keys: Vec<DuplicateKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub spec_limit: f64,
    pub sources: SourceLabels,
    pub summary: ReconSummary,
    pub rows: Vec<ReconciledRow>,
    pub stats_a: Option<DatasetStats>,
    pub stats_b: Option<DatasetStats>,
    pub comparison: ComparisonStats,
    pub verdict: Verdict,
    pub derived: DerivedOutputs,
    pub diagnostics: Vec<Diagnostic>,
}
