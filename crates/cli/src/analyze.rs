//! `warpcheck run|compare|validate`: two-source warpage comparison.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use warpcheck_cli::export;
use warpcheck_cli::summary::render_summary;
use warpcheck_recon::{
    analyze, load_csv_table, AnalysisConfig, AnalysisOptions, DuplicatePolicy,
    InvalidValuePolicy, RawTable, Report,
};

use crate::exit_codes::{
    verdict_exit_code, EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_RUNTIME, EXIT_SUCCESS,
};
use crate::CliError;

/// Where to send the results of one analysis.
pub struct OutputTargets {
    pub json: bool,
    pub output: Option<PathBuf>,
    pub export: Option<PathBuf>,
}

/// Flags of `warpcheck compare`.
pub struct CompareArgs {
    pub a: PathBuf,
    pub b: PathBuf,
    pub spec: f64,
    pub label_a: String,
    pub label_b: String,
    pub strict_values: bool,
    pub reject_duplicates: bool,
}

/// `--json` / `--output` envelope. `run_at` lives here, outside the report,
/// so the report itself stays a pure function of its inputs.
#[derive(Serialize)]
struct AnalysisOutput<'a> {
    engine_version: &'static str,
    run_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_name: Option<&'a str>,
    report: &'a Report,
}

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn load_table(source: &str, path: &Path) -> Result<RawTable, CliError> {
    let data = std::fs::read_to_string(path).map_err(|e| {
        recon_err(EXIT_RUNTIME, format!("cannot read {}: {e}", path.display()))
    })?;
    let table = load_csv_table(source, &data).map_err(CliError::recon)?;
    debug!(source, path = %path.display(), rows = table.rows.len(), "loaded table");
    Ok(table)
}

fn read_config(config_path: &Path) -> Result<AnalysisConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| recon_err(EXIT_RUNTIME, format!("cannot read config: {e}")))?;
    AnalysisConfig::from_toml(&config_str)
        .map_err(|e| recon_err(EXIT_INVALID_CONFIG, e.to_string()))
}

pub fn cmd_run(config_path: PathBuf, targets: OutputTargets) -> Result<(), CliError> {
    let config = read_config(&config_path)?;

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let a = load_table(&config.sources.a.label, &base_dir.join(&config.sources.a.file))?;
    let b = load_table(&config.sources.b.label, &base_dir.join(&config.sources.b.file))?;

    // Flags win over the config's [output] section
    let targets = OutputTargets {
        json: targets.json,
        output: targets
            .output
            .or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p))),
        export: targets
            .export
            .or_else(|| config.output.export.as_ref().map(|p| base_dir.join(p))),
    };

    info!(name = %config.name, spec = config.spec_limit, "running analysis");
    let report = analyze(&a, &b, config.spec_limit, &config.analysis_options())
        .map_err(CliError::recon)?;

    emit(&report, Some(&config.name), &targets)
}

pub fn cmd_compare(args: CompareArgs, targets: OutputTargets) -> Result<(), CliError> {
    if args.label_a == args.label_b {
        return Err(CliError::args("--label-a and --label-b must differ"));
    }

    let a = load_table(&args.label_a, &args.a)?;
    let b = load_table(&args.label_b, &args.b)?;

    let mut options = AnalysisOptions::default();
    if args.strict_values {
        options.normalize.invalid_values = InvalidValuePolicy::Error;
    }
    if args.reject_duplicates {
        options.duplicates = DuplicatePolicy::Reject;
    }

    info!(spec = args.spec, "running analysis");
    let report = analyze(&a, &b, args.spec, &options).map_err(CliError::recon)?;

    emit(&report, None, &targets)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    eprintln!(
        "valid: '{}' spec {}, {} ({}) vs {} ({})",
        config.name,
        config.spec_limit,
        config.sources.a.label,
        config.sources.a.file,
        config.sources.b.label,
        config.sources.b.file,
    );
    Ok(())
}

/// Print, write and export the report, then turn the verdict into an exit code.
fn emit(report: &Report, config_name: Option<&str>, targets: &OutputTargets) -> Result<(), CliError> {
    let envelope = AnalysisOutput {
        engine_version: env!("CARGO_PKG_VERSION"),
        run_at: chrono::Utc::now().to_rfc3339(),
        config_name,
        report,
    };

    let json_str = serde_json::to_string_pretty(&envelope)
        .map_err(|e| recon_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = targets.output {
        std::fs::write(path, &json_str)
            .map_err(|e| recon_err(EXIT_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if let Some(ref path) = targets.export {
        export::export(report, path).map_err(|e| recon_err(EXIT_RUNTIME, e))?;
        eprintln!("exported {}", path.display());
    }

    if targets.json {
        println!("{json_str}");
    }

    // Human summary to stderr
    eprintln!("{}", render_summary(report));

    match verdict_exit_code(report.verdict) {
        EXIT_SUCCESS => Ok(()),
        code => Err(recon_err(code, format!("verdict: {}", report.verdict))
            .with_hint(report.verdict.advice())),
    }
}
