//! Schema check + value cleanup at the ingestion boundary.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReconError;
use crate::model::{MeasurementRow, NormalizedTable, RawTable};

pub const DEFAULT_IDENTIFIER_COLUMN: &str = "part no";
pub const DEFAULT_VALUE_COLUMN: &str = "warpage(um)";

/// Column labels to look up. Matched after trimming and lowercasing both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNames {
    #[serde(default = "default_identifier_column")]
    pub identifier: String,
    #[serde(default = "default_value_column")]
    pub value: String,
}

fn default_identifier_column() -> String {
    DEFAULT_IDENTIFIER_COLUMN.into()
}

fn default_value_column() -> String {
    DEFAULT_VALUE_COLUMN.into()
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            identifier: default_identifier_column(),
            value: default_value_column(),
        }
    }
}

/// What to do with a measurement cell that is not a finite number.
///
/// Blank cells are always treated as missing; the policy only governs
/// cells with content that fails to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidValuePolicy {
    /// Keep the row with no value; it ends up non-comparable.
    #[default]
    Missing,
    /// Fail the whole normalization step.
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub columns: ColumnNames,
    pub invalid_values: InvalidValuePolicy,
}

/// Canonical form of a column label.
pub fn canonical_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Validate `raw` against the canonical schema and produce measurement rows.
///
/// Every present value is stored as its absolute magnitude: the sign of a
/// warpage reading is an artifact of the measuring equipment.
pub fn normalize(raw: &RawTable, options: &NormalizeOptions) -> Result<NormalizedTable, ReconError> {
    let headers: Vec<String> = raw.headers.iter().map(|h| canonical_label(h.as_str())).collect();
    let identifier_label = canonical_label(&options.columns.identifier);
    let value_label = canonical_label(&options.columns.value);

    let identifier_idx = headers.iter().position(|h| *h == identifier_label);
    let value_idx = headers.iter().position(|h| *h == value_label);

    let (identifier_idx, value_idx) = match (identifier_idx, value_idx) {
        (Some(i), Some(v)) => (i, v),
        (i, v) => {
            let mut missing = Vec::new();
            if i.is_none() {
                missing.push(identifier_label);
            }
            if v.is_none() {
                missing.push(value_label);
            }
            return Err(ReconError::Schema {
                table: raw.source.clone(),
                missing,
            });
        }
    };

    let mut rows = Vec::with_capacity(raw.rows.len());
    let mut invalid = 0usize;

    for (row_idx, record) in raw.rows.iter().enumerate() {
        let identifier = record.get(identifier_idx).map(|s| s.trim()).unwrap_or("");
        let cell = record.get(value_idx).map(|s| s.trim()).unwrap_or("");

        let value = if cell.is_empty() {
            None
        } else {
            match cell.parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v.abs()),
                _ => match options.invalid_values {
                    InvalidValuePolicy::Missing => {
                        invalid += 1;
                        None
                    }
                    InvalidValuePolicy::Error => {
                        return Err(ReconError::ValueParse {
                            table: raw.source.clone(),
                            row: row_idx + 1,
                            value: cell.into(),
                        });
                    }
                },
            }
        };

        rows.push(MeasurementRow {
            identifier: identifier.into(),
            value,
        });
    }

    debug!(
        source = %raw.source,
        rows = rows.len(),
        invalid,
        "normalized table"
    );

    Ok(NormalizedTable {
        source: raw.source.clone(),
        rows,
    })
}
