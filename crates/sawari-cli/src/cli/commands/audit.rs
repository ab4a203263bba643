//! `sawari audit` – duplicate-key scan over an append-mode dataset.

use anyhow::Result;
use sawari_core::verify;
use std::path::Path;

pub fn run_audit(csv: &Path, column: &str) -> Result<()> {
    let duplicates = verify::find_duplicate_keys(csv, column)?;
    if duplicates.is_empty() {
        println!("no duplicate '{column}' values in {}", csv.display());
        return Ok(());
    }

    println!(
        "{} duplicated '{column}' value(s) in {}:",
        duplicates.len(),
        csv.display()
    );
    for (key, count) in &duplicates {
        println!("  {count}x {key}");
    }
    Ok(())
}
