//! Worker pool: one task per shard, strictly sequential within a shard.
//!
//! Workers share nothing but the result channel. Each job runs in its own
//! spawned task so that a panic surfaces as a harness `Error` outcome for
//! that job alone, and so a timeout can abort the task — which drops the
//! extractor future and kills its child process.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;

use super::outcome::{AttemptResult, JobOutcome, JobStatus};
use crate::extract::Extractor;
use crate::joblist::JobDescriptor;
use crate::record::RawRecord;

/// Dispatches one round: spawns a worker per shard and waits for all of
/// them. Exactly one `AttemptResult` is sent per job; the channel is the
/// only mutable state workers touch. Worker starts are staggered so many
/// browser sessions do not come up at once.
pub async fn run_round<E>(
    extractor: Arc<E>,
    shards: Vec<Vec<JobDescriptor>>,
    timeout: Duration,
    round: u32,
    stagger: Duration,
    tx: UnboundedSender<AttemptResult>,
) where
    E: Extractor + 'static,
{
    let mut workers = JoinSet::new();
    let total_shards = shards.len();

    for shard in shards {
        let extractor = Arc::clone(&extractor);
        let tx = tx.clone();
        workers.spawn(async move {
            for job in shard {
                let result = run_one_attempt(&extractor, &job, timeout, round).await;
                // Receiver gone means the run is being torn down.
                if tx.send(result).is_err() {
                    return;
                }
            }
        });
        if !stagger.is_zero() {
            tokio::time::sleep(stagger).await;
        }
    }

    tracing::debug!(workers = total_shards, round, "round dispatched");
    while let Some(res) = workers.join_next().await {
        if let Err(e) = res {
            // Per-job panics are already converted to Error outcomes; a
            // failure here means the shard loop itself died.
            tracing::error!("worker task join: {e}");
        }
    }
}

/// Runs one job bounded by `timeout` and classifies the attempt. A job
/// failure never aborts the rest of the worker's shard.
async fn run_one_attempt<E>(
    extractor: &Arc<E>,
    job: &JobDescriptor,
    timeout: Duration,
    round: u32,
) -> AttemptResult
where
    E: Extractor + 'static,
{
    let started = Instant::now();
    tracing::info!(
        job = job.index,
        shard = job.shard_id,
        round,
        name = %job.display_name(),
        "starting extraction"
    );

    let mut handle = tokio::spawn({
        let extractor = Arc::clone(extractor);
        let job = job.clone();
        async move { extractor.extract(&job).await }
    });

    let (status, records) = match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(Ok(records))) => (JobStatus::Success, records),
        Ok(Ok(Err(failure))) => {
            tracing::warn!(job = job.index, round, %failure, "extraction failed");
            (JobStatus::Failed, Vec::new())
        }
        Ok(Err(join_err)) => {
            tracing::error!(job = job.index, round, "extraction harness fault: {join_err}");
            (JobStatus::Error, Vec::new())
        }
        Err(_elapsed) => {
            // Hard-terminate: aborting the task drops the extractor future,
            // which kills the underlying child process.
            handle.abort();
            tracing::warn!(job = job.index, round, timeout_secs = timeout.as_secs(), "extraction timed out");
            (JobStatus::Timeout, Vec::new())
        }
    };

    let duration = started.elapsed();
    tracing::info!(
        job = job.index,
        round,
        status = %status,
        elapsed_ms = duration.as_millis() as u64,
        "attempt finished"
    );

    AttemptResult {
        outcome: JobOutcome {
            job_index: job.index,
            status,
            duration,
            locator: job.locator.clone(),
            retry_round: round,
        },
        records,
    }
}
