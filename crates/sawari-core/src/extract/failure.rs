//! Typed extraction failures, classified at the dispatch boundary.

use thiserror::Error;

/// Application-level failure of one extraction attempt. These become
/// `JobStatus::Failed` outcomes; they are values, not panics, so one bad
/// job never takes down the rest of a worker's shard.
#[derive(Debug, Error)]
pub enum ExtractFailure {
    /// The extractor process could not be started at all.
    #[error("failed to spawn extractor: {0}")]
    Spawn(#[from] std::io::Error),

    /// The extractor ran but reported failure via its exit status.
    #[error("extractor exited with {code:?}: {stderr_tail}")]
    Exit {
        code: Option<i32>,
        stderr_tail: String,
    },

    /// The extractor's output stream could not be decoded at all.
    #[error("extractor output unreadable: {0}")]
    Malformed(String),
}
