//! Deduplicating record stores and the per-session store router.
//!
//! Each record kind persists twice: a snapshot JSON file rewritten
//! atomically at session end, and an append-only CSV that grows across
//! sessions. Workers never touch these files; the single pipeline consumer
//! is the only writer.

mod append;
mod snapshot;

pub use append::AppendStore;
pub use snapshot::SnapshotStore;

use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

use crate::record::{RawRecord, RecordKind, ALL_KINDS};

/// One snapshot + one append store per record kind, under a session's
/// output directory. Routes each incoming record to the first kind whose
/// field predicate claims it.
pub struct StoreSet {
    snapshots: HashMap<RecordKind, SnapshotStore>,
    appends: HashMap<RecordKind, AppendStore>,
    unrouted: usize,
}

impl StoreSet {
    pub fn open(dir: &Path) -> Result<Self> {
        let mut snapshots = HashMap::new();
        let mut appends = HashMap::new();
        for kind in ALL_KINDS {
            snapshots.insert(kind, SnapshotStore::open(dir, kind));
            appends.insert(kind, AppendStore::open(dir, kind)?);
        }
        Ok(Self {
            snapshots,
            appends,
            unrouted: 0,
        })
    }

    /// Routes one record into its kind's stores. Records no predicate
    /// claims are dropped with a warning; scraped-content oddities must
    /// not fail the run.
    pub fn ingest(&mut self, record: RawRecord) -> Result<()> {
        let Some(kind) = RecordKind::route(&record) else {
            self.unrouted += 1;
            tracing::warn!(
                fields = ?record.keys().collect::<Vec<_>>(),
                "dropping record no store claims"
            );
            return Ok(());
        };

        // Append first: it streams to disk immediately, so a later crash
        // still leaves the row persisted. Snapshot follows in memory.
        if let Some(store) = self.appends.get_mut(&kind) {
            store.insert(&record)?;
        }
        if let Some(store) = self.snapshots.get_mut(&kind) {
            store.insert(record);
        }
        Ok(())
    }

    /// Records dropped because no kind claimed them.
    pub fn unrouted_count(&self) -> usize {
        self.unrouted
    }

    pub fn snapshot(&self, kind: RecordKind) -> &SnapshotStore {
        &self.snapshots[&kind]
    }

    /// Writes every snapshot file and flushes every append writer.
    pub fn finalize(mut self) -> Result<()> {
        for kind in ALL_KINDS {
            if let Some(store) = self.appends.get_mut(&kind) {
                store.flush()?;
            }
        }
        for kind in ALL_KINDS {
            let store = &self.snapshots[&kind];
            store.save()?;
            tracing::info!(
                dataset = kind.file_stem(),
                records = store.len(),
                "snapshot written"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: serde_json::Value) -> RawRecord {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn ingest_routes_by_kind_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let mut stores = StoreSet::open(dir.path()).unwrap();

        stores
            .ingest(raw(json!({"modelName": "Punch", "variantName": "Pure MT"})))
            .unwrap();
        stores
            .ingest(raw(json!({"modelName": "PUNCH", "variantName": "pure mt"})))
            .unwrap();
        stores
            .ingest(raw(json!({"modelName": "Punch", "ratingCategoryName": "Safety", "rating": 5})))
            .unwrap();
        stores.ingest(raw(json!({"mystery": true}))).unwrap();

        assert_eq!(stores.snapshot(RecordKind::Variant).len(), 1);
        assert_eq!(stores.snapshot(RecordKind::Rating).len(), 1);
        assert_eq!(stores.unrouted_count(), 1);

        stores.finalize().unwrap();
        assert!(dir.path().join("Variants.json").exists());
        assert!(dir.path().join("Variants.csv").exists());
    }
}
