//! Snapshot-mode store: full JSON rewrite at session end.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::record::{DedupKey, RawRecord, RecordKind};

/// In-memory deduplicated set for one record kind, persisted as a
/// pretty-printed JSON array. Re-running with identical input reproduces
/// an identical file.
pub struct SnapshotStore {
    kind: RecordKind,
    path: PathBuf,
    items: Vec<RawRecord>,
    seen: HashSet<DedupKey>,
}

impl SnapshotStore {
    /// Loads the existing snapshot if present. A missing or unparseable
    /// file is treated as an empty set; the crawl must not die because a
    /// previous run left a truncated file behind.
    pub fn open(dir: &Path, kind: RecordKind) -> Self {
        let path = dir.join(format!("{}.json", kind.file_stem()));
        let items: Vec<RawRecord> = match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "snapshot unparseable, starting empty: {e}");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        let mut seen = HashSet::with_capacity(items.len());
        let mut deduped = Vec::with_capacity(items.len());
        for item in items {
            if seen.insert(kind.dedup_key(&item)) {
                deduped.push(item);
            }
        }

        Self {
            kind,
            path,
            items: deduped,
            seen,
        }
    }

    /// Inserts if the record belongs to this kind and its key is unseen.
    /// Returns whether the record was kept.
    pub fn insert(&mut self, record: RawRecord) -> bool {
        if !self.kind.matches(&record) {
            tracing::warn!(dataset = self.kind.file_stem(), "record failed kind predicate");
            return false;
        }
        let key = self.kind.dedup_key(&record);
        if !self.seen.insert(key) {
            tracing::debug!(dataset = self.kind.file_stem(), "skipping duplicate record");
            return false;
        }
        self.items.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes the full set to a temp file and renames it over the old
    /// snapshot, so readers never observe a half-written file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create snapshot dir {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.items).context("serialize snapshot")?;

        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".part");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)
            .with_context(|| format!("write snapshot temp {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("finalize snapshot {}", self.path.display()))?;
        Ok(())
    }
}
