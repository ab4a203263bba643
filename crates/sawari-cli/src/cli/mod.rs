//! CLI for the sawari crawl pipeline.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sawari_core::config;
use sawari_core::session;
use std::path::PathBuf;

use commands::{run_audit, run_crawl, run_map_variants, run_verify};

/// Top-level CLI for the sawari crawl pipeline.
#[derive(Debug, Parser)]
#[command(name = "sawari")]
#[command(about = "sawari: vehicle-catalog crawl orchestrator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run a full crawl session: dispatch, persist, verify.
    Crawl {
        /// File of page URLs, newline- or comma-delimited.
        #[arg(long, value_name = "FILE")]
        urls: PathBuf,

        /// Vehicle brand; first level of the output tree.
        #[arg(long)]
        brand: String,

        /// Vehicle model; second level of the output tree.
        #[arg(long)]
        model: String,

        /// Root directory for session artifacts.
        #[arg(long, value_name = "DIR", default_value = "Output")]
        output_root: PathBuf,

        /// Run up to N extraction workers in parallel.
        #[arg(long, value_name = "N")]
        workers: Option<usize>,

        /// Per-job timeout in seconds; the extractor is killed when it elapses.
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,

        /// Retry rounds after the initial dispatch.
        #[arg(long, value_name = "N")]
        max_retries: Option<u32>,

        /// Extractor command; `{url}` in an argument is replaced per job,
        /// otherwise the URL is appended.
        #[arg(last = true, required = true, value_name = "COMMAND")]
        extractor: Vec<String>,
    },

    /// Check that a session folder's datasets agree on variant names.
    Verify {
        /// Session folder, e.g. `Output/Tata/Punch`.
        folder: PathBuf,
    },

    /// Fuzzy-map variant names from one dataset onto another.
    MapVariants {
        /// Source key list (CSV, JSON, or one name per line).
        source: PathBuf,
        /// Target key list.
        target: PathBuf,
        /// Where to write the JSON mapping.
        output: PathBuf,

        /// Minimum score to accept a match.
        #[arg(long, default_value = "0.5")]
        threshold: f64,

        /// CSV column holding the source keys (default: first column).
        #[arg(long, value_name = "NAME")]
        source_column: Option<String>,

        /// CSV column holding the target keys (default: first column).
        #[arg(long, value_name = "NAME")]
        target_column: Option<String>,
    },

    /// List key values appearing on more than one row of a dataset.
    Audit {
        /// CSV dataset to scan.
        csv: PathBuf,

        /// Key column to audit.
        #[arg(long, default_value = "variantName")]
        column: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Crawl {
                urls,
                brand,
                model,
                output_root,
                workers,
                timeout_secs,
                max_retries,
                extractor,
            } => {
                let mut cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                if let Some(n) = workers {
                    cfg.workers = n;
                }
                if let Some(secs) = timeout_secs {
                    cfg.job_timeout_secs = secs;
                }
                if let Some(n) = max_retries {
                    let mut dispatch = cfg.dispatch();
                    dispatch.max_retries = n;
                    cfg.dispatch = Some(dispatch);
                }
                let session = session::SessionContext::new(brand, model, output_root);
                run_crawl(&cfg, &session, &urls, &extractor).await?;
            }
            CliCommand::Verify { folder } => run_verify(&folder)?,
            CliCommand::MapVariants {
                source,
                target,
                output,
                threshold,
                source_column,
                target_column,
            } => run_map_variants(
                &source,
                &target,
                &output,
                threshold,
                source_column.as_deref(),
                target_column.as_deref(),
            )?,
            CliCommand::Audit { csv, column } => run_audit(&csv, &column)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
