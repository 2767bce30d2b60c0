//! CLI for the bootstrap installer.

mod commands;

use anyhow::Result;
use bootstrap_core::config;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_checksum, run_completions, run_install, run_verify};

/// Top-level CLI for the bootstrap installer.
#[derive(Debug, Parser)]
#[command(name = "bootstrap", version)]
#[command(about = "Verify required files and repair them from the remote source", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Verify every managed file and repair whatever is missing or corrupt.
    Run {
        /// Maximum number of verify-and-repair passes (overrides config).
        #[arg(long, value_name = "N")]
        attempts: Option<u32>,
        /// Exit right after the final message instead of pausing.
        #[arg(long)]
        no_pause: bool,
    },

    /// Report the state of every managed file without changing anything.
    Verify {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Compute the CRC-32 of a file (e.g. to pin a package checksum).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

impl CliCommand {
    /// Parse arguments, dispatch, and return the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run { attempts, no_pause } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_install(&cfg, attempts, !no_pause).await
            }
            CliCommand::Verify { json } => run_verify(json).await,
            CliCommand::Checksum { path } => run_checksum(&path).await,
            CliCommand::Completions { shell } => run_completions(shell),
        }
    }
}

#[cfg(test)]
mod tests;
