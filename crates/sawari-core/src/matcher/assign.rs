//! Greedy assignment of source names to target names.

use serde::Serialize;
use std::collections::BTreeMap;

use super::score::{similarity, MatchConfig};

/// Chosen target for one source name, or `None` when every candidate
/// scored below the threshold.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MatchOutcome {
    pub target: Option<String>,
    pub confidence: f64,
}

/// Confidence-band tallies over the mapped entries.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct BandSummary {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unmapped: usize,
}

/// Full mapping output: per-source outcome, band tallies, and the
/// targets no source claimed.
#[derive(Debug, Clone, Serialize)]
pub struct VariantMapping {
    pub mapping: BTreeMap<String, MatchOutcome>,
    pub summary: BandSummary,
    pub unused_targets: Vec<String>,
}

/// Maps each source to its best-scoring target. Longer sources carry
/// more marker tokens and disambiguate better, so they pick first.
/// Each target is claimed at most once until all are claimed; after
/// that, reuse is allowed rather than leaving sources unmapped.
pub fn assign(sources: &[String], targets: &[String], config: &MatchConfig) -> VariantMapping {
    let mut order: Vec<&String> = sources.iter().collect();
    order.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));

    let mut used = vec![false; targets.len()];
    let mut mapping = BTreeMap::new();
    let mut summary = BandSummary::default();

    for source in order {
        let exhausted = used.iter().all(|u| *u);
        let best = targets
            .iter()
            .enumerate()
            .filter(|(i, _)| exhausted || !used[*i])
            .map(|(i, t)| (i, t, similarity(source, t, &config.abbreviations)))
            .max_by(|a, b| a.2.total_cmp(&b.2));

        let outcome = match best {
            Some((i, target, score)) if score >= config.threshold => {
                used[i] = true;
                tracing::debug!(source = %source, target = %target, score, "variant mapped");
                match score {
                    s if s >= 0.8 => summary.high += 1,
                    s if s >= 0.6 => summary.medium += 1,
                    _ => summary.low += 1,
                }
                MatchOutcome {
                    target: Some(target.clone()),
                    confidence: score,
                }
            }
            best => {
                let score = best.map(|(_, _, s)| s).unwrap_or(0.0);
                tracing::debug!(source = %source, score, "no target above threshold");
                summary.unmapped += 1;
                MatchOutcome {
                    target: None,
                    confidence: score,
                }
            }
        };
        mapping.insert(source.clone(), outcome);
    }

    let unused_targets = targets
        .iter()
        .zip(&used)
        .filter(|(_, u)| !**u)
        .map(|(t, _)| t.clone())
        .collect();

    VariantMapping {
        mapping,
        summary,
        unused_targets,
    }
}
