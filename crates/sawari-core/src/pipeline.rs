//! End-to-end session driver: locators in, verified datasets out.
//!
//! Wires the job list, shard dispatcher, record stores and consistency
//! gate into one operation. Per-job failures surface in the crawl report;
//! only structural problems (unreadable locator file, store I/O) abort.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::CrawlConfig;
use crate::dispatch::{run_with_retries, CrawlReport, RetrySchedule};
use crate::extract::Extractor;
use crate::session::SessionContext;
use crate::store::StoreSet;
use crate::verify::{self, ConsistencyReport};

/// What a full session run produced.
pub struct SessionSummary {
    pub report: CrawlReport,
    pub consistency: ConsistencyReport,
    /// Records dropped because no store claimed them.
    pub unrouted: usize,
    pub output_dir: PathBuf,
}

impl SessionSummary {
    /// Every job succeeded and the datasets agree.
    pub fn clean(&self) -> bool {
        self.report.all_success() && self.consistency.pass()
    }
}

/// Runs a complete crawl session: read locators, dispatch with retries,
/// route records into the session's stores as attempts finish, finalize,
/// then run the consistency gate over the written datasets.
pub async fn run_session<E>(
    extractor: Arc<E>,
    session: &SessionContext,
    locator_file: &Path,
    config: &CrawlConfig,
) -> Result<SessionSummary>
where
    E: Extractor + 'static,
{
    let locators = crate::joblist::read_locators(locator_file)?;
    let output_dir = session.ensure_output_dir()?;
    tracing::info!(
        session = %session,
        jobs = locators.len(),
        workers = config.workers,
        out = %output_dir.display(),
        "starting crawl session"
    );

    let dispatch = config.dispatch();
    let schedule = RetrySchedule::from(&dispatch);

    let mut stores = StoreSet::open(&output_dir)?;
    // The on_records callback cannot return an error through the
    // dispatcher; remember the first store failure and report it after.
    let mut store_error: Option<anyhow::Error> = None;
    let report = run_with_retries(
        extractor,
        &locators,
        config.workers,
        config.job_timeout(),
        &schedule,
        dispatch.worker_stagger(),
        |records| {
            for record in records {
                if store_error.is_none() {
                    if let Err(e) = stores.ingest(record) {
                        store_error = Some(e);
                    }
                }
            }
        },
    )
    .await;
    if let Some(e) = store_error {
        return Err(e.context("persist crawled records"));
    }

    let unrouted = stores.unrouted_count();
    stores.finalize()?;

    tracing::info!(
        session = %session,
        success = report.success_count(),
        failed = report.failure_count(),
        rounds = report.rounds_run,
        "crawl finished, checking dataset consistency"
    );
    let consistency = verify::check_folder(&output_dir)
        .with_context(|| format!("consistency check in {}", output_dir.display()))?;
    if !consistency.pass() {
        tracing::warn!(session = %session, "datasets are inconsistent:\n{consistency}");
    }

    Ok(SessionSummary {
        report,
        consistency,
        unrouted,
        output_dir,
    })
}
