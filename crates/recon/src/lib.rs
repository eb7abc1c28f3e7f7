//! `warpcheck-recon`: warpage dataset reconciliation and agreement engine.
//!
//! Pure engine crate: receives two parsed tables and a spec limit, returns a
//! reconciled report with statistics and a verdict. No CLI or file IO.

pub mod config;
pub mod derived;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod report;
pub mod stats;
pub mod verdict;

pub use config::AnalysisConfig;
pub use engine::{analyze, analyze_normalized, load_csv_table, AnalysisOptions};
pub use error::ReconError;
pub use model::{
    ComparisonStats, DatasetStats, Diagnostic, MeasurementRow, NormalizedTable, RawTable,
    ReconciledRow, Report, Verdict,
};
pub use normalize::{normalize, InvalidValuePolicy, NormalizeOptions};
pub use reconcile::{reconcile, DuplicatePolicy};
pub use verdict::{classify, VerdictThresholds};
