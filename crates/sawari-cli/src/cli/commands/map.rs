//! `sawari map-variants` – fuzzy source→target variant-name mapping.

use anyhow::{Context, Result};
use sawari_core::matcher::{self, MatchConfig};
use std::path::Path;

pub fn run_map_variants(
    source: &Path,
    target: &Path,
    output: &Path,
    threshold: f64,
    source_column: Option<&str>,
    target_column: Option<&str>,
) -> Result<()> {
    let sources = matcher::load_keys(source, source_column)?;
    let targets = matcher::load_keys(target, target_column)?;
    tracing::info!(
        sources = sources.len(),
        targets = targets.len(),
        threshold,
        "mapping variant names"
    );

    let config = MatchConfig {
        threshold,
        ..MatchConfig::default()
    };
    let mapping = matcher::assign(&sources, &targets, &config);

    let json = serde_json::to_string_pretty(&mapping).context("serialize mapping")?;
    std::fs::write(output, json)
        .with_context(|| format!("write mapping to {}", output.display()))?;

    let s = mapping.summary;
    println!(
        "mapped {} of {} source name(s): {} high, {} medium, {} low; {} unmapped",
        s.high + s.medium + s.low,
        sources.len(),
        s.high,
        s.medium,
        s.low,
        s.unmapped
    );
    if !mapping.unused_targets.is_empty() {
        println!("unused target(s) ({}):", mapping.unused_targets.len());
        for target in &mapping.unused_targets {
            println!("  - {target}");
        }
    }
    println!("mapping written to {}", output.display());
    Ok(())
}
