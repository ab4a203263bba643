//! Extractor backed by an external spider process, one process per job.
//!
//! The child is spawned with `kill_on_drop`, so when the dispatcher's
//! timeout fires and the in-flight future is dropped, the process (and the
//! browser session it drives) is killed rather than asked to stop.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use super::{ExtractFailure, Extractor};
use crate::joblist::JobDescriptor;
use crate::record::RawRecord;

/// Placeholder in argument templates replaced by the job's locator.
const LOCATOR_PLACEHOLDER: &str = "{url}";

/// Runs a configured command per job and parses its stdout as JSON lines,
/// one record object per line. Anything else on stdout is ignored with a
/// debug log, so spiders may still print progress noise.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
    /// `args` entries containing `{url}` have it substituted per job; if no
    /// entry does, the locator is appended as the last argument.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn job_args(&self, locator: &str) -> Vec<String> {
        let mut substituted = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| {
                if a.contains(LOCATOR_PLACEHOLDER) {
                    substituted = true;
                    a.replace(LOCATOR_PLACEHOLDER, locator)
                } else {
                    a.clone()
                }
            })
            .collect();
        if !substituted {
            args.push(locator.to_owned());
        }
        args
    }
}

#[async_trait]
impl Extractor for CommandExtractor {
    async fn extract(&self, job: &JobDescriptor) -> Result<Vec<RawRecord>, ExtractFailure> {
        let args = self.job_args(&job.locator);
        tracing::debug!(job = job.index, program = %self.program, "spawning extractor");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractFailure::Exit {
                code: output.status.code(),
                stderr_tail: tail(&stderr, 400),
            });
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| ExtractFailure::Malformed(e.to_string()))?;

        let mut records = Vec::new();
        for line in stdout.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<serde_json::Value>(line) {
                Ok(serde_json::Value::Object(map)) => records.push(map),
                Ok(_) | Err(_) => {
                    tracing::debug!(job = job.index, "skipping non-record stdout line");
                }
            }
        }

        tracing::debug!(job = job.index, records = records.len(), "extractor finished");
        Ok(records)
    }
}

fn tail(s: &str, max: usize) -> String {
    let trimmed = s.trim();
    if trimmed.len() <= max {
        return trimmed.to_owned();
    }
    let start = trimmed.len() - max;
    // Back off to a char boundary.
    let start = (start..trimmed.len())
        .find(|&i| trimmed.is_char_boundary(i))
        .unwrap_or(trimmed.len());
    trimmed[start..].to_owned()
}
