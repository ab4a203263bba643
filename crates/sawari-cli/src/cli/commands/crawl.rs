//! `sawari crawl` – run a full crawl session.

use anyhow::{bail, Result};
use sawari_core::config::CrawlConfig;
use sawari_core::extract::CommandExtractor;
use sawari_core::pipeline;
use sawari_core::session::SessionContext;
use std::path::Path;
use std::sync::Arc;

pub async fn run_crawl(
    cfg: &CrawlConfig,
    session: &SessionContext,
    urls: &Path,
    extractor_cmd: &[String],
) -> Result<()> {
    let Some((program, args)) = extractor_cmd.split_first() else {
        bail!("extractor command is empty");
    };
    let extractor = Arc::new(CommandExtractor::new(program.as_str(), args.to_vec()));

    let summary = pipeline::run_session(extractor, session, urls, cfg).await?;

    for outcome in &summary.report.outcomes {
        println!(
            "  [{}] {:<8} {:>6.1}s  round {}  {}",
            outcome.job_index,
            outcome.status,
            outcome.duration.as_secs_f64(),
            outcome.retry_round,
            outcome.locator
        );
    }
    println!(
        "{}: {} succeeded, {} failed over {} round(s); datasets in {}",
        session,
        summary.report.success_count(),
        summary.report.failure_count(),
        summary.report.rounds_run,
        summary.output_dir.display()
    );
    if summary.unrouted > 0 {
        println!("  {} record(s) matched no dataset and were dropped", summary.unrouted);
    }
    if !summary.consistency.pass() {
        println!("{}", summary.consistency);
    }

    if !summary.report.all_success() {
        bail!("{} job(s) did not succeed", summary.report.failure_count());
    }
    Ok(())
}
