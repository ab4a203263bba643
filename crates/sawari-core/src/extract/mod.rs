//! Extractor boundary: the external collaborator that fetches a page via a
//! browser-driven session and yields structured records.
//!
//! The orchestrator only sees this trait. Page navigation, selectors and
//! session bootstrap all live on the other side of it.

mod command;
mod failure;

pub use command::CommandExtractor;
pub use failure::ExtractFailure;

use crate::joblist::JobDescriptor;
use crate::record::RawRecord;
use async_trait::async_trait;

/// Contract for one extraction attempt.
///
/// The dispatcher bounds each call with a timeout and drops the future when
/// the deadline passes; implementations must make that drop terminate the
/// underlying work (e.g. `kill_on_drop` on a child process). Graceful
/// cancellation of a browser session is not assumed to exist.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, job: &JobDescriptor) -> Result<Vec<RawRecord>, ExtractFailure>;
}
