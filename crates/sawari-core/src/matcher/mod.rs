//! Fuzzy variant reconciliation.
//!
//! When two datasets name the same trims differently ("Adventure (O) AMT"
//! vs "ADVENTURE OPT AMT"), exact key comparison cannot join them. This
//! module scores candidate pairs lexically plus domain rules and produces
//! an advisory source→target mapping with per-entry confidence. Callers
//! must not treat low-confidence entries as authoritative join keys.

mod assign;
mod score;

pub use assign::{assign, BandSummary, MatchOutcome, VariantMapping};
pub use score::{similarity, AbbreviationTable, MatchConfig};

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Loads a key list from CSV (named or first column), JSON (array of
/// strings or object keys), or plain text (one key per line), picked by
/// file extension.
pub fn load_keys(path: &Path, column: Option<&str>) -> Result<Vec<String>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => load_csv_keys(path, column),
        Some("json") => load_json_keys(path),
        _ => load_text_keys(path),
    }
}

fn load_csv_keys(path: &Path, column: Option<&str>) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open dataset {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("read header of {}", path.display()))?;
    let pos = match column {
        Some(name) => match headers.iter().position(|h| h == name) {
            Some(p) => p,
            None => bail!("column '{}' not found in {}", name, path.display()),
        },
        None => 0,
    };

    let mut keys = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for row in reader.records() {
        let Ok(row) = row else { continue };
        if let Some(value) = row.get(pos) {
            let value = value.trim();
            if !value.is_empty() && seen.insert(value.to_owned()) {
                keys.push(value.to_owned());
            }
        }
    }
    Ok(keys)
}

fn load_json_keys(path: &Path) -> Result<Vec<String>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    match value {
        serde_json::Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect()),
        serde_json::Value::Object(map) => Ok(map.into_iter().map(|(k, _)| k).collect()),
        _ => bail!("{} must hold a JSON array or object", path.display()),
    }
}

fn load_text_keys(path: &Path) -> Result<Vec<String>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect())
}
