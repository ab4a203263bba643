//! Cross-dataset consistency checks.
//!
//! The variant list and the specification table must reference the same
//! variant-name key space; any surplus on either side blocks downstream
//! assembly until the offending pages are re-crawled.

use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use crate::record::normalize_key;

/// Key column shared by the variant and specification datasets.
pub const VARIANT_KEY_COLUMN: &str = "variantName";
/// Dataset files compared by the folder-level check.
pub const LEFT_DATASET: &str = "Variants.csv";
pub const RIGHT_DATASET: &str = "Specifications.csv";

/// Outcome of comparing the key sets of two datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
    pub left_only: BTreeSet<String>,
    pub right_only: BTreeSet<String>,
    pub matched: usize,
    pub left_total: usize,
    pub right_total: usize,
}

impl ConsistencyReport {
    /// Both sides hold exactly the same keys.
    pub fn pass(&self) -> bool {
        self.left_only.is_empty()
            && self.right_only.is_empty()
            && self.left_total == self.right_total
    }
}

impl fmt::Display for ConsistencyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "unique keys: left {}, right {}", self.left_total, self.right_total)?;
        if self.pass() {
            return write!(f, "all {} keys match", self.matched);
        }
        writeln!(f, "MISMATCH: {} matched", self.matched)?;
        if !self.left_only.is_empty() {
            writeln!(f, "present only on the left ({}):", self.left_only.len())?;
            for key in &self.left_only {
                writeln!(f, "  - {key}")?;
            }
        }
        if !self.right_only.is_empty() {
            writeln!(f, "present only on the right ({}):", self.right_only.len())?;
            for key in &self.right_only {
                writeln!(f, "  - {key}")?;
            }
        }
        Ok(())
    }
}

/// Pure set comparison; no I/O, fully deterministic.
pub fn compare_key_sets(left: &BTreeSet<String>, right: &BTreeSet<String>) -> ConsistencyReport {
    let matched = left.intersection(right).count();
    ConsistencyReport {
        left_only: left.difference(right).cloned().collect(),
        right_only: right.difference(left).cloned().collect(),
        matched,
        left_total: left.len(),
        right_total: right.len(),
    }
}

/// Reads the normalized unique values of one column from a CSV file.
/// A missing file or absent column is structural misconfiguration and a
/// hard error, unlike per-row oddities which are skipped.
pub fn read_key_column(path: &Path, column: &str) -> Result<BTreeSet<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open dataset {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("read header of {}", path.display()))?;
    let Some(pos) = headers.iter().position(|h| h == column) else {
        bail!("column '{}' not found in {}", column, path.display());
    };

    let mut keys = BTreeSet::new();
    for row in reader.records() {
        let Ok(row) = row else { continue };
        if let Some(value) = row.get(pos) {
            let normalized = normalize_key(value);
            if !normalized.is_empty() {
                keys.insert(normalized);
            }
        }
    }
    Ok(keys)
}

/// Folder-level check: `Variants.csv` vs `Specifications.csv` on the
/// shared variant-name column. This is the gate before report assembly.
pub fn check_folder(dir: &Path) -> Result<ConsistencyReport> {
    let left = read_key_column(&dir.join(LEFT_DATASET), VARIANT_KEY_COLUMN)?;
    let right = read_key_column(&dir.join(RIGHT_DATASET), VARIANT_KEY_COLUMN)?;
    Ok(compare_key_sets(&left, &right))
}

/// Audit: normalized key values of `column` appearing on more than one row,
/// with their occurrence counts. Diagnostic only.
pub fn find_duplicate_keys(path: &Path, column: &str) -> Result<Vec<(String, usize)>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open dataset {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("read header of {}", path.display()))?;
    let Some(pos) = headers.iter().position(|h| h == column) else {
        bail!("column '{}' not found in {}", column, path.display());
    };

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in reader.records() {
        let Ok(row) = row else { continue };
        if let Some(value) = row.get(pos) {
            let normalized = normalize_key(value);
            if !normalized.is_empty() {
                *counts.entry(normalized).or_insert(0) += 1;
            }
        }
    }
    Ok(counts.into_iter().filter(|(_, n)| *n > 1).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn mismatch_reports_both_surpluses() {
        let report = compare_key_sets(&keys(&["A", "B", "C"]), &keys(&["B", "C", "D"]));
        assert!(!report.pass());
        assert_eq!(report.left_only, keys(&["A"]));
        assert_eq!(report.right_only, keys(&["D"]));
        assert_eq!(report.matched, 2);
    }

    #[test]
    fn equal_sets_pass() {
        let report = compare_key_sets(&keys(&["A", "B"]), &keys(&["B", "A"]));
        assert!(report.pass());
        assert_eq!(report.matched, 2);
        assert!(report.left_only.is_empty() && report.right_only.is_empty());
    }

    #[test]
    fn key_column_is_normalized_and_unique() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Variants.csv");
        std::fs::write(
            &path,
            "modelName,variantName\nPunch,Pure MT\nPunch, pure  mt \nPunch,Adventure AMT\n",
        )
        .unwrap();
        let keys = read_key_column(&path, "variantName").unwrap();
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("PURE MT"));
        assert!(keys.contains("ADVENTURE AMT"));
    }

    #[test]
    fn missing_column_is_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Variants.csv");
        std::fs::write(&path, "modelName\nPunch\n").unwrap();
        assert!(read_key_column(&path, "variantName").is_err());
    }

    #[test]
    fn missing_file_is_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_folder(dir.path()).is_err());
    }

    #[test]
    fn folder_check_compares_variants_to_specifications() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("Variants.csv"),
            "variantName\nPure MT\nAdventure AMT\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("Specifications.csv"),
            "variantName,specificationName\nPURE MT,Engine\nAdventure AMT,Engine\n",
        )
        .unwrap();
        let report = check_folder(dir.path()).unwrap();
        assert!(report.pass());
    }

    #[test]
    fn duplicate_audit_counts_repeated_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Variants.csv");
        std::fs::write(
            &path,
            "variantName\nPure MT\nPURE MT\nAdventure AMT\npure mt\n",
        )
        .unwrap();
        let dupes = find_duplicate_keys(&path, "variantName").unwrap();
        assert_eq!(dupes, vec![("PURE MT".to_string(), 3)]);
    }
}
