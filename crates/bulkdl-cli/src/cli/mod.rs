//! CLI for the bulkdl bulk downloader.

mod commands;

use anyhow::Result;
use bulkdl_core::config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_fetch, run_status, FetchOpts};

/// Top-level CLI for the bulkdl bulk downloader.
#[derive(Debug, Parser)]
#[command(name = "bulkdl")]
#[command(about = "bulkdl: resumable concurrent bulk URL downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every URL in a list file, resuming from the output
    /// directory's ledger.
    Fetch {
        /// URL list: one URL per line, optional tab-separated output name,
        /// `#` comments.
        list: PathBuf,

        /// Output directory (ledger plus `data/` subdirectory).
        #[arg(long, default_value = "downloads")]
        out_dir: PathBuf,

        /// Worker thread count (overrides config).
        #[arg(long)]
        workers: Option<usize>,

        /// Targets per batch between ledger flushes (overrides config).
        #[arg(long)]
        batch_size: Option<usize>,

        /// Per-request timeout in seconds (overrides config).
        #[arg(long)]
        timeout: Option<u64>,

        /// Consecutive failures one worker tolerates before cooling down
        /// (overrides config).
        #[arg(long)]
        err_tolerance: Option<u32>,

        /// Cooldown seconds for a tripped worker (overrides config).
        #[arg(long)]
        cooldown: Option<u64>,

        /// Extra request header, `Name: value`. Repeatable.
        #[arg(long = "header", value_name = "HEADER")]
        headers: Vec<String>,

        /// Suppress per-url progress output.
        #[arg(long)]
        quiet: bool,
    },

    /// Show how many targets of a list are still pending for an output
    /// directory.
    Status {
        /// URL list, same format as `fetch`.
        list: PathBuf,

        /// Output directory the list is checked against.
        #[arg(long, default_value = "downloads")]
        out_dir: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                list,
                out_dir,
                workers,
                batch_size,
                timeout,
                err_tolerance,
                cooldown,
                headers,
                quiet,
            } => run_fetch(
                FetchOpts {
                    list,
                    out_dir,
                    workers,
                    batch_size,
                    timeout,
                    err_tolerance,
                    cooldown,
                    headers,
                    quiet,
                },
                &cfg,
            )?,
            CliCommand::Status { list, out_dir } => run_status(&list, &out_dir)?,
        }

        Ok(())
    }
}
