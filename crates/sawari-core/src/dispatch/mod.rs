//! Job dispatch: parallel workers, per-job timeouts, bounded retry rounds.
//!
//! Shards of the job list run on independent workers; every attempt emits
//! exactly one outcome into the result channel, failed jobs are regrouped
//! and re-dispatched until they succeed or the retry bound is reached.

mod outcome;
mod pool;
mod retry;

pub use outcome::{AttemptResult, CrawlReport, JobOutcome, JobStatus};
pub use pool::run_round;
pub use retry::{run_with_retries, RetrySchedule};
