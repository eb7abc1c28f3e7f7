//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Domain    | Description                                 |
//! |------|-----------|---------------------------------------------|
//! | 0    | Universal | Success (sources agree with high confidence) |
//! | 1    | Universal | General error (unspecified)                 |
//! | 2    | Universal | CLI usage error (bad args)                  |
//! | 3    | config    | Config file failed to parse or validate     |
//! | 4    | input     | Input table schema or value error           |
//! | 5    | runtime   | File read/write failure                     |
//! | 6    | verdict   | Moderate deviation between sources          |
//! | 7    | verdict   | High deviation between sources              |

use warpcheck_recon::{ReconError, Verdict};

/// Success - high-confidence agreement, or a non-analysis command succeeded.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config file could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Input table is missing required columns, has a malformed measurement
/// (strict policy) or a duplicate part number (reject policy).
pub const EXIT_INPUT: u8 = 4;

/// IO failure reading inputs or writing outputs.
pub const EXIT_RUNTIME: u8 = 5;

/// Verdict: moderate deviation, partial re-measurement advised.
pub const EXIT_VERDICT_MODERATE: u8 = 6;

/// Verdict: high deviation, re-measurement required.
pub const EXIT_VERDICT_HIGH: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::Schema { .. }
        | ReconError::ValueParse { .. }
        | ReconError::DuplicateKey { .. }
        | ReconError::Csv { .. }
        | ReconError::EmptyInput { .. }
        | ReconError::NonFinite { .. } => EXIT_INPUT,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::InvalidSpec(_) => EXIT_USAGE,
    }
}

/// Exit code carried by a verdict.
pub fn verdict_exit_code(verdict: Verdict) -> u8 {
    match verdict {
        Verdict::HighConfidence => EXIT_SUCCESS,
        Verdict::ModerateDeviation => EXIT_VERDICT_MODERATE,
        Verdict::HighDeviation => EXIT_VERDICT_HIGH,
    }
}
