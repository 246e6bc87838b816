//! # pbv CLI entry point
//!
//! Parses command-line arguments, installs logging and runs the validator.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pbv_cli::validate::{run_validate, ValidateArgs};

/// Validate Ansible playbooks and inventory files against their schemas.
///
/// Every `.yml`/`.yaml` file directly inside DIRECTORY is matched to a
/// schema by file name and checked. `secret.yml` is never read.
#[derive(Parser, Debug)]
#[command(name = "pbv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,

    #[command(flatten)]
    validate: ValidateArgs,
}

/// Log level used when `RUST_LOG` is unset or invalid.
fn verbosity_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `RUST_LOG` when set, otherwise the `-v` level.
fn env_filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity_level(verbose)))
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = env_filter(verbose);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version requests are not failures.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_tracing(cli.verbose, cli.log_json);
    tracing::debug!("pbv v{} starting", env!("CARGO_PKG_VERSION"));

    match run_validate(&cli.validate) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
