use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// Required columns absent from an input table.
    #[error("table '{table}': missing column(s) {}", .missing.join(", "))]
    Schema { table: String, missing: Vec<String> },
    /// Malformed measurement cell under the strict value policy.
    #[error("table '{table}', row {row}: cannot parse measurement '{value}'")]
    ValueParse { table: String, row: usize, value: String },
    /// Duplicate identifier under the reject policy.
    #[error("duplicate part no '{identifier}' ({count_a} in A, {count_b} in B)")]
    DuplicateKey { identifier: String, count_a: usize, count_b: usize },
    /// A dataset has no usable measurements.
    #[error("table '{table}': no usable measurements")]
    EmptyInput { table: String },
    /// A statistic over the table left the f64 range.
    #[error("table '{table}': statistics overflow the f64 range")]
    NonFinite { table: String },
    /// Spec limit is negative, NaN or infinite.
    #[error("spec limit must be a non-negative finite number, got {0}")]
    InvalidSpec(f64),
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad threshold, clashing labels, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// CSV decode error.
    #[error("table '{table}': CSV error: {message}")]
    Csv { table: String, message: String },
}
