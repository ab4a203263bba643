//! Pairwise variant-name similarity.
//!
//! The score blends two lexical measures with bonus rules for the trim
//! vocabulary manufacturers actually use. Gearbox markers are the sharp
//! edge: "Adventure AMT" and "Adventure MT" are one edit apart but name
//! different cars, so marker disagreement outweighs lexical closeness.

use std::collections::BTreeSet;

use crate::record::normalize_key;

const EDIT_WEIGHT: f64 = 0.3;
const TOKEN_WEIGHT: f64 = 0.4;
const ABBREVIATION_BONUS: f64 = 0.15;

/// Short→long spellings of trim markers. A pair scores a bonus when one
/// side uses the short form and the other uses the short form or any of
/// its expansions.
#[derive(Debug, Clone)]
pub struct AbbreviationTable {
    entries: Vec<(String, Vec<String>)>,
}

impl Default for AbbreviationTable {
    fn default() -> Self {
        let table: &[(&str, &[&str])] = &[
            ("OPT", &["(O)", "PRO PACK", "OPTIONAL"]),
            ("DT", &["DUAL TONE"]),
            ("DUAL CNG", &["CNG DUO", "HY-CNG DUO", "CNG"]),
            ("AMT", &["AMT"]),
            ("MT", &["MT"]),
            ("EXECUTIVE", &["EXECUTIVE"]),
            ("SMART", &["SMART"]),
            ("TECH", &["TECH"]),
            ("KNIGHT", &["KNIGHT EDITION"]),
            ("CONNECT", &["CONNECT"]),
            ("PLUS", &["PLUS"]),
        ];
        Self {
            entries: table
                .iter()
                .map(|(short, longs)| {
                    (
                        (*short).to_owned(),
                        longs.iter().map(|l| (*l).to_owned()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl AbbreviationTable {
    /// Empty table; scoring then rests on the lexical measures and
    /// domain rules alone.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn insert(&mut self, short: &str, expansions: &[&str]) {
        self.entries.push((
            normalize_key(short),
            expansions.iter().map(|e| normalize_key(e)).collect(),
        ));
    }

    fn bonus(&self, a: &Name, b: &Name) -> f64 {
        let mut bonus = 0.0;
        for (short, expansions) in &self.entries {
            let forward = a.mentions(short)
                && expansions.iter().any(|e| b.mentions(e));
            let backward = b.mentions(short)
                && expansions.iter().any(|e| a.mentions(e));
            if forward || backward {
                bonus += ABBREVIATION_BONUS;
            }
        }
        bonus
    }
}

/// Matcher tuning: acceptance threshold plus the abbreviation table.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub threshold: f64,
    pub abbreviations: AbbreviationTable,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            abbreviations: AbbreviationTable::default(),
        }
    }
}

/// A normalized variant name with its token set.
struct Name {
    text: String,
    tokens: BTreeSet<String>,
}

impl Name {
    fn new(raw: &str) -> Self {
        let text = normalize_key(raw);
        let tokens = text.split_whitespace().map(str::to_owned).collect();
        Self { text, tokens }
    }

    /// Multi-word markers match as substrings, single tokens exactly.
    /// Token equality matters for gearbox markers: "MT" must not match
    /// inside "AMT".
    fn mentions(&self, marker: &str) -> bool {
        if marker.contains(' ') {
            self.text.contains(marker)
        } else {
            self.tokens.contains(marker)
        }
    }

    fn first_token(&self) -> Option<&str> {
        self.text.split_whitespace().next()
    }
}

/// Similarity in `[0, 1]` between two variant names.
pub fn similarity(a: &str, b: &str, table: &AbbreviationTable) -> f64 {
    let a = Name::new(a);
    let b = Name::new(b);

    let edit = strsim::normalized_levenshtein(&a.text, &b.text);
    let overlap = token_overlap(&a.tokens, &b.tokens);

    let score =
        EDIT_WEIGHT * edit + TOKEN_WEIGHT * overlap + table.bonus(&a, &b) + domain_bonus(&a, &b);
    score.min(1.0)
}

fn token_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn domain_bonus(a: &Name, b: &Name) -> f64 {
    let mut bonus = 0.0;

    let a_amt = a.mentions("AMT");
    let b_amt = b.mentions("AMT");
    let a_mt = a.mentions("MT");
    let b_mt = b.mentions("MT");
    if a_amt && b_amt {
        bonus += 0.1;
    } else if (a_amt && b_mt) || (b_amt && a_mt) {
        // One side automated, the other plain manual: near-identical
        // strings naming different gearboxes.
        bonus -= 0.3;
    } else if a_mt && b_mt {
        bonus += 0.05;
    }

    if a.text.contains("CNG") && b.text.contains("CNG") {
        bonus += 0.15;
    }

    let dual_tone = |n: &Name| n.mentions("DT") || n.text.contains("DUAL TONE");
    if dual_tone(a) && dual_tone(b) {
        bonus += 0.15;
    }

    if a.text.contains("KNIGHT") && b.text.contains("KNIGHT") {
        bonus += 0.1;
    }

    let optional = |n: &Name| {
        n.mentions("OPT") || n.mentions("(O)") || n.text.contains("PRO PACK")
    };
    if optional(a) && optional(b) {
        bonus += 0.15;
    }

    if a.mentions("CONNECT") && b.mentions("CONNECT") {
        bonus += 0.1;
    }

    if let (Some(fa), Some(fb)) = (a.first_token(), b.first_token()) {
        if fa == fb {
            bonus += 0.1;
        }
    }

    bonus
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(a: &str, b: &str) -> f64 {
        similarity(a, b, &AbbreviationTable::default())
    }

    #[test]
    fn gearbox_marker_dominates_edit_distance() {
        let amt = score("Punch Adventure AMT", "Punch Adventure AMT");
        let mt = score("Punch Adventure AMT", "Punch Adventure MT");
        assert!(amt > mt, "amt={amt} mt={mt}");
        assert!(mt < 0.8, "mismatched gearboxes must not score high: {mt}");
    }

    #[test]
    fn identical_names_score_one() {
        assert!((score("Pure MT", "pure  mt") - 1.0).abs() < 1e-9);
    }

    #[test]
    fn mt_is_not_a_substring_of_amt() {
        // Both plain manual: small bonus, no penalty.
        let plain = score("Pure MT", "Pure Petrol MT");
        assert!(plain > 0.5, "plain={plain}");
        // Penalty path only fires across AMT/MT, not within AMT/AMT.
        let auto = score("Pure AMT", "Pure Petrol AMT");
        assert!(auto > plain);
    }

    #[test]
    fn abbreviation_table_bridges_spellings() {
        let with = score("Adventure OPT", "Adventure (O)");
        let without = similarity("Adventure OPT", "Adventure (O)", &AbbreviationTable::empty());
        assert!(with > without);
    }

    #[test]
    fn dual_tone_spellings_attract() {
        let bonus = score("Accomplished DT", "Accomplished Dual Tone");
        let base = score("Accomplished DT", "Accomplished Plain");
        assert!(bonus > base);
    }

    #[test]
    fn cng_family_attracts() {
        assert!(score("Pure CNG", "Pure Hy-CNG Duo") > score("Pure CNG", "Pure Petrol"));
    }

    #[test]
    fn unrelated_names_stay_below_threshold() {
        assert!(score("Punch Pure MT", "Nexon Fearless DCA") < 0.5);
    }
}
