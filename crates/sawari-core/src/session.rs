//! Session context: which brand/model a crawl run belongs to and where its
//! artifacts live. Threaded explicitly through the partitioner, dispatcher
//! and stores instead of living in process-wide state.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Identifies one crawl session. All persisted artifacts for the session go
/// under `<output_root>/<brand>/<model>/`.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub brand: String,
    pub model: String,
    pub output_root: PathBuf,
}

impl SessionContext {
    pub fn new(brand: impl Into<String>, model: impl Into<String>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            brand: brand.into(),
            model: model.into(),
            output_root: output_root.into(),
        }
    }

    /// Directory holding this session's datasets, e.g. `Output/Tata/Punch`.
    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(&self.brand).join(&self.model)
    }

    /// Create the output directory if needed and return it.
    pub fn ensure_output_dir(&self) -> Result<PathBuf> {
        let dir = self.output_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create output dir {}", dir.display()))?;
        Ok(dir)
    }

    /// Path of a named dataset file inside the session directory.
    pub fn dataset_path(&self, file_name: &str) -> PathBuf {
        self.output_dir().join(file_name)
    }
}

impl std::fmt::Display for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.brand, self.model)
    }
}

/// Default output root, relative to the working directory.
pub fn default_output_root() -> PathBuf {
    Path::new("Output").to_path_buf()
}
