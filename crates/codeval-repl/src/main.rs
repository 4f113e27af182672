//! codeval entry point.
//!
//! ```bash
//! codeval                         # interactive
//! codeval check hello.py          # one file, exit code reflects the outcome
//! codeval check Main.java --lang Java --timeout 30
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use codeval_repl::cli::{self, Cli, Command};

fn main() -> Result<ExitCode> {
    // Initialize tracing (respects RUST_LOG env var); stdout is for results.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();
    let config = args.validator_config()?;

    // Jobs run on the runtime's workers; this thread stays free for input.
    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;

    match &args.command {
        Some(Command::Check { path, lang }) => cli::check(&runtime, &config, path, lang),
        None => {
            codeval_repl::run(runtime.handle().clone(), &config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
