//! Agreement verdict from correlation and mean delta.

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::model::Verdict;

pub const DEFAULT_HIGH_CONFIDENCE_CORRELATION: f64 = 0.9;
pub const DEFAULT_MODERATE_CORRELATION: f64 = 0.7;
/// Allowed |mean delta| as a fraction of the spec limit.
pub const DEFAULT_DELTA_MEAN_SPEC_FRACTION: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerdictThresholds {
    #[serde(default = "default_high_confidence_correlation")]
    pub high_confidence_correlation: f64,
    #[serde(default = "default_moderate_correlation")]
    pub moderate_correlation: f64,
    #[serde(default = "default_delta_mean_spec_fraction")]
    pub delta_mean_spec_fraction: f64,
}

fn default_high_confidence_correlation() -> f64 {
    DEFAULT_HIGH_CONFIDENCE_CORRELATION
}

fn default_moderate_correlation() -> f64 {
    DEFAULT_MODERATE_CORRELATION
}

fn default_delta_mean_spec_fraction() -> f64 {
    DEFAULT_DELTA_MEAN_SPEC_FRACTION
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            high_confidence_correlation: DEFAULT_HIGH_CONFIDENCE_CORRELATION,
            moderate_correlation: DEFAULT_MODERATE_CORRELATION,
            delta_mean_spec_fraction: DEFAULT_DELTA_MEAN_SPEC_FRACTION,
        }
    }
}

impl VerdictThresholds {
    /// Undefined correlation always lands in `HighDeviation`. An undefined
    /// mean delta never satisfies the high-confidence bound.
    pub fn classify(&self, correlation: Option<f64>, delta_mean: Option<f64>, spec: f64) -> Verdict {
        let Some(r) = correlation else {
            return Verdict::HighDeviation;
        };

        let delta_ok = delta_mean
            .map(|d| d.abs() < self.delta_mean_spec_fraction * spec)
            .unwrap_or(false);

        if r >= self.high_confidence_correlation && delta_ok {
            Verdict::HighConfidence
        } else if r >= self.moderate_correlation {
            Verdict::ModerateDeviation
        } else {
            Verdict::HighDeviation
        }
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let in_range = |v: f64| v.is_finite() && (-1.0..=1.0).contains(&v);
        if !in_range(self.high_confidence_correlation) || !in_range(self.moderate_correlation) {
            return Err(ReconError::ConfigValidation(
                "correlation thresholds must lie in [-1, 1]".into(),
            ));
        }
        if self.moderate_correlation > self.high_confidence_correlation {
            return Err(ReconError::ConfigValidation(format!(
                "moderate_correlation ({}) exceeds high_confidence_correlation ({})",
                self.moderate_correlation, self.high_confidence_correlation
            )));
        }
        if !self.delta_mean_spec_fraction.is_finite() || self.delta_mean_spec_fraction < 0.0 {
            return Err(ReconError::ConfigValidation(format!(
                "delta_mean_spec_fraction must be a non-negative number, got {}",
                self.delta_mean_spec_fraction
            )));
        }
        Ok(())
    }
}

/// Classify with the default thresholds.
pub fn classify(correlation: Option<f64>, delta_mean: Option<f64>, spec: f64) -> Verdict {
    VerdictThresholds::default().classify(correlation, delta_mean, spec)
}
