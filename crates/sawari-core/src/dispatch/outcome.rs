//! Per-attempt outcomes and the final crawl report.

use std::time::Duration;

use crate::record::RawRecord;

/// How one extraction attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Extractor returned normally.
    Success,
    /// Extractor signaled an application-level failure.
    Failed,
    /// The deadline elapsed; the extractor process was killed.
    Timeout,
    /// Unexpected fault in the dispatch harness itself (e.g. worker panic).
    Error,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
            JobStatus::Timeout => "timeout",
            JobStatus::Error => "error",
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, JobStatus::Success)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attempt of one job. Later-round outcomes for the same job supersede
/// earlier ones in the final report.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job_index: usize,
    pub status: JobStatus,
    pub duration: Duration,
    pub locator: String,
    /// Dispatch round of this attempt, 1-based (1 = initial round).
    pub retry_round: u32,
}

/// What a worker sends into the result channel: the outcome plus whatever
/// records the extractor yielded (empty unless Success).
#[derive(Debug)]
pub struct AttemptResult {
    pub outcome: JobOutcome,
    pub records: Vec<RawRecord>,
}

/// Final view over a whole dispatch run: one outcome per job (its last
/// attempt), sorted by original job index.
#[derive(Debug)]
pub struct CrawlReport {
    pub outcomes: Vec<JobOutcome>,
    /// Highest round that was dispatched.
    pub rounds_run: u32,
}

impl CrawlReport {
    pub fn count(&self, status: JobStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn success_count(&self) -> usize {
        self.count(JobStatus::Success)
    }

    /// Jobs whose final status is not success.
    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    pub fn all_success(&self) -> bool {
        self.failure_count() == 0
    }
}
