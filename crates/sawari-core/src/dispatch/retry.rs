//! Retry scheduler: regroup failed jobs into new shards and re-dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::outcome::{CrawlReport, JobOutcome};
use super::pool::run_round;
use crate::config::DispatchConfig;
use crate::extract::Extractor;
use crate::partition::{make_shards, reshard};
use crate::record::RawRecord;

/// Retry policy for a dispatch run. The inter-round delay is explicit and
/// off by default; rounds re-execute jobs from scratch with no carryover.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    /// Retry rounds after the initial dispatch; total attempts per job is
    /// at most `1 + max_retries`.
    pub max_retries: u32,
    /// Optional pause between rounds.
    pub round_delay: Option<Duration>,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            max_retries: 2,
            round_delay: None,
        }
    }
}

impl From<&DispatchConfig> for RetrySchedule {
    fn from(cfg: &DispatchConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            round_delay: cfg.round_delay(),
        }
    }
}

/// Dispatches `locators` across `workers` shards, retrying failed jobs for
/// up to `schedule.max_retries` extra rounds. Records from successful
/// attempts are handed to `on_records` as they arrive; a job's final status
/// is the status of its last attempt.
pub async fn run_with_retries<E, F>(
    extractor: Arc<E>,
    locators: &[String],
    workers: usize,
    timeout: Duration,
    schedule: &RetrySchedule,
    stagger: Duration,
    mut on_records: F,
) -> CrawlReport
where
    E: Extractor + 'static,
    F: FnMut(Vec<RawRecord>),
{
    let mut finals: BTreeMap<usize, JobOutcome> = BTreeMap::new();
    let mut shards = make_shards(locators, workers);
    let mut rounds_run = 0;

    for round in 1..=(1 + schedule.max_retries) {
        if shards.is_empty() {
            break;
        }
        rounds_run = round;
        let in_flight: usize = shards.iter().map(Vec::len).sum();
        tracing::info!(round, jobs = in_flight, shards = shards.len(), "dispatching round");

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let round_task = tokio::spawn(run_round(
            Arc::clone(&extractor),
            shards,
            timeout,
            round,
            stagger,
            tx,
        ));

        // Single consumer: drain attempts while the round is in flight so
        // records reach the stores as soon as a job finishes. The channel
        // closes when the last worker drops its sender.
        while let Some(attempt) = rx.recv().await {
            if !attempt.records.is_empty() {
                on_records(attempt.records);
            }
            finals.insert(attempt.outcome.job_index, attempt.outcome);
        }
        if let Err(e) = round_task.await {
            tracing::error!(round, "round driver join: {e}");
        }

        let failed: Vec<(usize, String)> = finals
            .values()
            .filter(|o| !o.status.is_success())
            .map(|o| (o.job_index, o.locator.clone()))
            .collect();

        if failed.is_empty() {
            shards = Vec::new();
            continue;
        }
        tracing::warn!(round, failed = failed.len(), "round left failed jobs");

        if round == 1 + schedule.max_retries {
            break;
        }
        if let Some(delay) = schedule.round_delay {
            tokio::time::sleep(delay).await;
        }
        shards = reshard(&failed, workers);
    }

    CrawlReport {
        outcomes: finals.into_values().collect(),
        rounds_run,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::JobStatus;
    use crate::extract::ExtractFailure;
    use crate::joblist::JobDescriptor;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fails each job a scripted number of times before succeeding.
    struct FlakyExtractor {
        fail_times: Vec<usize>,
        attempts: Mutex<Vec<usize>>,
    }

    impl FlakyExtractor {
        fn new(fail_times: Vec<usize>) -> Self {
            let n = fail_times.len();
            Self {
                fail_times,
                attempts: Mutex::new(vec![0; n]),
            }
        }

        fn attempts_for(&self, index: usize) -> usize {
            self.attempts.lock().unwrap()[index]
        }
    }

    #[async_trait]
    impl Extractor for FlakyExtractor {
        async fn extract(&self, job: &JobDescriptor) -> Result<Vec<RawRecord>, ExtractFailure> {
            let attempt = {
                let mut attempts = self.attempts.lock().unwrap();
                attempts[job.index] += 1;
                attempts[job.index]
            };
            if attempt <= self.fail_times[job.index] {
                return Err(ExtractFailure::Exit {
                    code: Some(1),
                    stderr_tail: "flaky".into(),
                });
            }
            Ok(vec![RawRecord::new()])
        }
    }

    fn locators(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://x.example/{i}")).collect()
    }

    #[tokio::test]
    async fn failed_jobs_are_retried_and_last_status_wins() {
        // Job 1 fails once then succeeds; job 3 always fails.
        let extractor = Arc::new(FlakyExtractor::new(vec![0, 1, 0, 99]));
        let schedule = RetrySchedule {
            max_retries: 2,
            round_delay: None,
        };
        let report = run_with_retries(
            Arc::clone(&extractor),
            &locators(4),
            2,
            Duration::from_secs(5),
            &schedule,
            Duration::ZERO,
            |_| {},
        )
        .await;

        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.success_count(), 3);
        assert_eq!(report.failure_count(), 1);

        let job3 = report.outcomes.iter().find(|o| o.job_index == 3).unwrap();
        assert_eq!(job3.status, JobStatus::Failed);
        // Attempts bounded by 1 + max_retries.
        assert_eq!(extractor.attempts_for(3), 3);
        // Job 1 succeeded on its second attempt, in round 2.
        let job1 = report.outcomes.iter().find(|o| o.job_index == 1).unwrap();
        assert_eq!(job1.status, JobStatus::Success);
        assert_eq!(job1.retry_round, 2);
        assert_eq!(extractor.attempts_for(1), 2);
    }

    #[tokio::test]
    async fn no_retry_round_when_all_succeed() {
        let extractor = Arc::new(FlakyExtractor::new(vec![0, 0, 0]));
        let report = run_with_retries(
            Arc::clone(&extractor),
            &locators(3),
            3,
            Duration::from_secs(5),
            &RetrySchedule::default(),
            Duration::ZERO,
            |_| {},
        )
        .await;
        assert!(report.all_success());
        assert_eq!(report.rounds_run, 1);
        for i in 0..3 {
            assert_eq!(extractor.attempts_for(i), 1);
        }
    }

    #[tokio::test]
    async fn records_are_forwarded_as_attempts_complete() {
        let extractor = Arc::new(FlakyExtractor::new(vec![0, 0]));
        let seen = AtomicUsize::new(0);
        let report = run_with_retries(
            extractor,
            &locators(2),
            2,
            Duration::from_secs(5),
            &RetrySchedule::default(),
            Duration::ZERO,
            |records| {
                seen.fetch_add(records.len(), Ordering::SeqCst);
            },
        )
        .await;
        assert!(report.all_success());
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn report_is_sorted_by_job_index() {
        let extractor = Arc::new(FlakyExtractor::new(vec![0; 9]));
        let report = run_with_retries(
            extractor,
            &locators(9),
            4,
            Duration::from_secs(5),
            &RetrySchedule::default(),
            Duration::ZERO,
            |_| {},
        )
        .await;
        let idx: Vec<usize> = report.outcomes.iter().map(|o| o.job_index).collect();
        assert_eq!(idx, (0..9).collect::<Vec<_>>());
    }
}
