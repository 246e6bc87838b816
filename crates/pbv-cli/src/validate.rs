//! # Validate Command
//!
//! Validates every playbook and inventory file in one directory and prints
//! a report. Files are matched to schemas by name; `secret.yml` and any
//! `--exclude`d names are skipped without being read.
//!
//! Exit codes: 0 when every validated file passes, 1 otherwise. Startup
//! failures (bad configuration, unreadable schema table, missing directory)
//! are returned as errors and also end in exit code 1.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use pbv_schema::validate_directory;

use crate::config::ValidatorConfig;
use crate::report;

/// Report format written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Arguments for a validation run.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory containing the playbooks and inventory to validate.
    #[arg(value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Validate files without a dedicated schema as play lists.
    #[arg(long)]
    pub fallback: bool,

    /// File name to skip, in addition to secret.yml. Repeatable.
    #[arg(long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// Reject files larger than this many bytes without parsing them.
    #[arg(long, value_name = "BYTES")]
    pub max_file_size: Option<u64>,

    /// Schema table file replacing the built-in playbook schemas.
    #[arg(long, value_name = "FILE")]
    pub schemas: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute a validation run with configuration from the environment and
/// `args`, writing the report to stdout.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let config = ValidatorConfig::from_env()
        .context("invalid environment configuration")?
        .with_args(args)
        .context("invalid command-line configuration")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&config, &args.directory, args.format, &mut out)
}

/// Validate `directory` under `config` and write the report to `out`.
pub fn execute(
    config: &ValidatorConfig,
    directory: &Path,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<u8> {
    tracing::debug!(?config, directory = %directory.display(), "starting validation");

    let registry = config.registry().with_context(|| match &config.schemas {
        Some(path) => format!("failed to load schema table {}", path.display()),
        None => "failed to build built-in schemas".to_owned(),
    })?;
    let report = validate_directory(directory, &registry, &config.load_options())
        .with_context(|| format!("cannot validate {}", directory.display()))?;

    match format {
        OutputFormat::Text => report::render_text(&report, out).context("failed to write report")?,
        OutputFormat::Json => {
            report::render_json(&report, out).context("failed to write JSON report")?
        }
    }

    if report.all_valid() {
        Ok(0)
    } else {
        Ok(1)
    }
}
