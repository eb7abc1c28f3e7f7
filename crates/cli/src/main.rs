// warpcheck CLI - compare two warpage measurement sources against a spec limit

mod analyze;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "warpcheck")]
#[command(about = "Reconcile two warpage datasets and judge whether the sources agree")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an analysis from a .warpage.toml config file
    #[command(after_help = "\
Examples:
  warpcheck run line3.warpage.toml
  warpcheck run line3.warpage.toml --json
  warpcheck run line3.warpage.toml --output report.json --export reconciled.xlsx")]
    Run {
        /// Path to the .warpage.toml config file
        config: PathBuf,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Compare two CSV files directly (no config file)
    #[command(after_help = "\
Examples:
  warpcheck compare --a quality.csv --b dsol.csv --spec 30
  warpcheck compare --a quality.csv --b dsol.csv --spec 30 --label-a quality --label-b dsol --json
  warpcheck compare --a q.csv --b d.csv --spec 30 --strict-values --reject-duplicates")]
    Compare {
        /// CSV file for source A (columns: part no, warpage(um))
        #[arg(long)]
        a: PathBuf,

        /// CSV file for source B (columns: part no, warpage(um))
        #[arg(long)]
        b: PathBuf,

        /// Spec limit (maximum acceptable warpage, um)
        #[arg(long, env = "WARPCHECK_SPEC")]
        spec: f64,

        /// Label for source A
        #[arg(long, default_value = "a")]
        label_a: String,

        /// Label for source B
        #[arg(long, default_value = "b")]
        label_b: String,

        /// Fail on non-numeric measurements instead of treating them as missing
        #[arg(long)]
        strict_values: bool,

        /// Fail on duplicate part numbers instead of expanding them
        #[arg(long)]
        reject_duplicates: bool,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Validate a config file without running
    #[command(after_help = "\
Examples:
  warpcheck validate line3.warpage.toml")]
    Validate {
        /// Path to the .warpage.toml config file
        config: PathBuf,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Output JSON to stdout
    #[arg(long)]
    json: bool,

    /// Write JSON output to file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Export the reconciled table (.csv or .xlsx)
    #[arg(long)]
    export: Option<PathBuf>,
}

impl From<OutputArgs> for analyze::OutputTargets {
    fn from(args: OutputArgs) -> Self {
        Self {
            json: args.json,
            output: args.output,
            export: args.export,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the matching exit code.
    pub fn recon(err: warpcheck_recon::ReconError) -> Self {
        let code = recon_exit_code(&err);
        let hint = match &err {
            warpcheck_recon::ReconError::Schema { .. } => Some(format!(
                "default columns are '{}' and '{}' (case and surrounding spaces ignored)",
                warpcheck_recon::normalize::DEFAULT_IDENTIFIER_COLUMN,
                warpcheck_recon::normalize::DEFAULT_VALUE_COLUMN,
            )),
            warpcheck_recon::ReconError::DuplicateKey { .. } => {
                Some("use policy.duplicates = \"expand\" (or drop --reject-duplicates) to accept them".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Default filter for a `-v` count when `RUST_LOG` is unset.
fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Logs go to stderr so stdout stays a clean JSON channel.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { config, out } => analyze::cmd_run(config, out.into()),
        Commands::Compare {
            a,
            b,
            spec,
            label_a,
            label_b,
            strict_values,
            reject_duplicates,
            out,
        } => analyze::cmd_compare(
            analyze::CompareArgs {
                a,
                b,
                spec,
                label_a,
                label_b,
                strict_values,
                reject_duplicates,
            },
            out.into(),
        ),
        Commands::Validate { config } => analyze::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(e.code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(1), "info");
        assert_eq!(default_level(2), "debug");
        assert_eq!(default_level(9), "debug");
    }

    #[test]
    fn verbose_flag_counts_and_is_global() {
        let cli = Cli::try_parse_from(["warpcheck", "validate", "x.toml", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
