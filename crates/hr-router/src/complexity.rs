//! Cheap heuristic for utterances that ask for more than one action.

const CONJUNCTIONS: &[&str] = &[" and ", " also ", " then ", ","];

const ACTION_VERBS: &[&str] = &[
    "set", "remind", "play", "send", "check", "find", "search", "get", "text",
];

/// True when the text joins clauses or names at least two action verbs.
pub fn is_compound_query(text: &str) -> bool {
    let lower = text.to_lowercase();
    if CONJUNCTIONS.iter().any(|c| lower.contains(c)) {
        return true;
    }

    let verbs = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| ACTION_VERBS.contains(w))
        .count();
    verbs >= 2
}
