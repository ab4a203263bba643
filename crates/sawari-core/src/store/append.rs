//! Append-mode store: CSV rows streamed immediately, never rewritten.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::record::{field_str, DedupKey, RawRecord, RecordKind};

/// CSV store for one record kind. Existing rows seed the dedup set at open;
/// new rows are appended as they arrive; duplicates are dropped with a
/// warning. The file only ever grows.
pub struct AppendStore {
    kind: RecordKind,
    path: PathBuf,
    seen: HashSet<DedupKey>,
    writer: csv::Writer<std::fs::File>,
}

impl AppendStore {
    pub fn open(dir: &Path, kind: RecordKind) -> Result<Self> {
        let path = dir.join(format!("{}.csv", kind.file_stem()));
        let had_rows = path.exists()
            && std::fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);

        let seen = if had_rows {
            seed_keys(&path, kind)
        } else {
            HashSet::new()
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open append store {}", path.display()))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if !had_rows {
            writer
                .write_record(kind.headers())
                .with_context(|| format!("write header to {}", path.display()))?;
            tracing::info!(path = %path.display(), "created append store");
        } else {
            tracing::info!(path = %path.display(), existing = seen.len(), "appending to store");
        }

        Ok(Self {
            kind,
            path,
            seen,
            writer,
        })
    }

    /// Appends the record's row if its key is unseen. Returns whether a
    /// row was written. Duplicates are a warning, never an error.
    pub fn insert(&mut self, record: &RawRecord) -> Result<bool> {
        if !self.kind.matches(record) {
            tracing::warn!(dataset = self.kind.file_stem(), "record failed kind predicate");
            return Ok(false);
        }
        let key = self.kind.dedup_key(record);
        if self.seen.contains(&key) {
            tracing::warn!(
                dataset = self.kind.file_stem(),
                key = key.as_str(),
                "skipping duplicate row"
            );
            return Ok(false);
        }

        let row: Vec<String> = self
            .kind
            .headers()
            .iter()
            .map(|h| field_str(record, h).unwrap_or_default())
            .collect();
        self.writer
            .write_record(&row)
            .with_context(|| format!("append row to {}", self.path.display()))?;
        self.writer
            .flush()
            .with_context(|| format!("flush {}", self.path.display()))?;
        self.seen.insert(key);
        Ok(true)
    }

    /// Keys known to this store (seeded ∪ written this session).
    pub fn key_count(&self) -> usize {
        self.seen.len()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("flush append store")?;
        Ok(())
    }
}

/// Reads dedup keys from an existing CSV. A corrupt or header-less file
/// seeds nothing; the session then behaves as if the store were new.
fn seed_keys(path: &Path, kind: RecordKind) -> HashSet<DedupKey> {
    let mut reader = match csv::ReaderBuilder::new().flexible(true).from_path(path) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(path = %path.display(), "cannot read existing store, seeding empty: {e}");
            return HashSet::new();
        }
    };

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            tracing::warn!(path = %path.display(), "store header unreadable, seeding empty: {e}");
            return HashSet::new();
        }
    };
    let positions: Vec<Option<usize>> = kind
        .key_fields()
        .iter()
        .map(|f| headers.iter().position(|h| h == *f))
        .collect();

    let mut seen = HashSet::new();
    for row in reader.records() {
        let Ok(row) = row else { continue };
        let mut record = RawRecord::new();
        for (field, pos) in kind.key_fields().iter().zip(&positions) {
            if let Some(value) = pos.and_then(|p| row.get(p)) {
                record.insert((*field).to_owned(), value.into());
            }
        }
        seen.insert(kind.dedup_key(&record));
    }
    seen
}
