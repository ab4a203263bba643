//! Crawl job input: source locators read from a text artifact, and the
//! per-job descriptor handed to workers.

use anyhow::{bail, Context, Result};
use std::path::Path;

/// One unit of crawl work, created at partition time and re-created from the
/// failed subset for each retry round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDescriptor {
    /// Position in the original job list (0-based). Stable across retries.
    pub index: usize,
    /// Source locator (page URL) passed to the extractor.
    pub locator: String,
    /// Shard this descriptor was assigned to for the current round.
    pub shard_id: usize,
}

impl JobDescriptor {
    /// Short form of the locator for log lines: the last path segment,
    /// truncated, like the original progress output.
    pub fn display_name(&self) -> String {
        let tail = url::Url::parse(&self.locator)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|s| s.filter(|p| !p.is_empty()).last().map(str::to_owned))
            })
            .unwrap_or_else(|| self.locator.clone());
        tail.chars().take(40).collect()
    }
}

/// Reads source locators from a newline- or comma-delimited text file.
/// Entries are trimmed and empties dropped. A file that yields zero locators
/// is a hard error: nothing may be dispatched from malformed input.
pub fn read_locators(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read locator file {}", path.display()))?;

    let locators: Vec<String> = content
        .split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();

    if locators.is_empty() {
        bail!("no locators found in {}", path.display());
    }

    Ok(locators)
}
