use serde::Deserialize;

use crate::engine::AnalysisOptions;
use crate::error::ReconError;
use crate::normalize::{ColumnNames, InvalidValuePolicy, NormalizeOptions};
use crate::reconcile::DuplicatePolicy;
use crate::verdict::VerdictThresholds;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// A `.warpage.toml` analysis definition.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    pub name: String,
    pub spec_limit: f64,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub columns: ColumnNames,
    #[serde(default)]
    pub thresholds: VerdictThresholds,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub a: SourceConfig,
    pub b: SourceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub label: String,
    /// CSV path, relative to the config file.
    pub file: String,
}

// ---------------------------------------------------------------------------
// Policy + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    #[serde(default)]
    pub invalid_values: InvalidValuePolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub export: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

/// Spec limits must be non-negative and finite.
pub fn validate_spec(spec: f64) -> Result<(), ReconError> {
    if spec.is_finite() && spec >= 0.0 {
        Ok(())
    } else {
        Err(ReconError::InvalidSpec(spec))
    }
}

impl AnalysisConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: AnalysisConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        validate_spec(self.spec_limit)
            .map_err(|e| ReconError::ConfigValidation(e.to_string()))?;

        self.thresholds.validate()?;

        for (slot, source) in [("a", &self.sources.a), ("b", &self.sources.b)] {
            if source.label.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "sources.{slot}: label must not be empty"
                )));
            }
            if source.file.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "sources.{slot}: file must not be empty"
                )));
            }
        }

        if self.sources.a.label == self.sources.b.label {
            return Err(ReconError::ConfigValidation(format!(
                "sources.a and sources.b share the label '{}'",
                self.sources.a.label
            )));
        }

        if self.columns.identifier.trim().is_empty() || self.columns.value.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "column names must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            normalize: NormalizeOptions {
                columns: self.columns.clone(),
                invalid_values: self.policy.invalid_values,
            },
            duplicates: self.policy.duplicates,
            thresholds: self.thresholds,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
