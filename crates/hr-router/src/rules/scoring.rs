//! Clause-to-tool scoring.

use std::collections::BTreeSet;

use super::keywords::KeywordProfile;

/// The winning tool for one clause.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolMatch {
    /// Index into the request's tool list.
    pub index: usize,
    pub score: f64,
    pub overlap: usize,
}

/// Normalized overlap ratio plus raw overlap count.
///
/// Favors tools whose small, tightly relevant keyword set is mostly covered.
pub fn score(tokens: &BTreeSet<String>, profile: &KeywordProfile) -> (f64, usize) {
    let overlap = profile.overlap(tokens);
    let ratio = overlap as f64 / profile.len().max(1) as f64;
    (ratio + overlap as f64, overlap)
}

/// Strictly highest-scoring tool; ties keep the earliest tool. Zero scores never win.
pub fn best_match(tokens: &BTreeSet<String>, profiles: &[KeywordProfile]) -> Option<ToolMatch> {
    let mut best: Option<ToolMatch> = None;
    for (index, profile) in profiles.iter().enumerate() {
        let (score, overlap) = score(tokens, profile);
        if score <= 0.0 {
            continue;
        }
        if best.is_none_or(|b| score > b.score) {
            best = Some(ToolMatch {
                index,
                score,
                overlap,
            });
        }
    }
    best
}
