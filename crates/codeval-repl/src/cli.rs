//! Command-line arguments and the one-shot `check` mode.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;

use codeval_kernel::{OutcomeStatus, ValidationJob, ValidatorConfig};

use crate::format_outcome;

#[derive(Debug, Parser)]
#[command(name = "codeval", version, about = "Check a source file with its toolchain, then run it")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Kill a tool that runs longer than this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Keep at most this many bytes of each tool's output
    #[arg(long, global = true, value_name = "BYTES")]
    pub max_output: Option<usize>,

    /// Config file to read instead of ~/.config/codeval/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate one file and exit
    Check {
        /// Source file to validate
        path: String,

        /// Language tag: auto, Java, Python, PHP, JavaScript
        #[arg(long, short, default_value = "auto")]
        lang: String,
    },
}

impl Cli {
    /// Config file values, overridden by command-line flags.
    pub fn validator_config(&self) -> Result<ValidatorConfig> {
        let mut config = match &self.config {
            Some(path) => ValidatorConfig::load_from(path),
            None => ValidatorConfig::load(),
        }
        .context("Failed to load configuration")?;

        if let Some(secs) = self.timeout {
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(max) = self.max_output {
            config.max_output_bytes = Some(max);
        }
        tracing::debug!(?config, "configuration");
        Ok(config)
    }
}

/// Process exit code for an outcome status.
pub fn exit_code_for(status: OutcomeStatus) -> u8 {
    match status {
        OutcomeStatus::Success | OutcomeStatus::RuntimeOutput => 0,
        OutcomeStatus::CompileError => 1,
        OutcomeStatus::SelectionError | OutcomeStatus::SystemError => 2,
    }
}

/// Validate one file, print the result, and map it to an exit code.
pub fn check(runtime: &Runtime, config: &ValidatorConfig, path: &str, lang: &str) -> Result<ExitCode> {
    let outcome = runtime.block_on(async {
        let (job, mut outcomes) = ValidationJob::new(config)?;
        if !job.submit(path, lang) {
            anyhow::bail!("validation job refused a fresh submission");
        }
        outcomes
            .recv()
            .await
            .context("validation job ended without an outcome")
    })?;

    println!("{}", format_outcome(&outcome, std::io::IsTerminal::is_terminal(&std::io::stdout())));
    Ok(ExitCode::from(exit_code_for(outcome.status)))
}
