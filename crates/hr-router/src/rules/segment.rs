//! Clause segmentation: one utterance in, one clause per candidate action out.

use regex::Regex;
use std::sync::LazyLock;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// Input is whitespace-normalized first, so single spaces are enough here.
static RE_CLAUSE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i), and | and |,").unwrap());

const TRAILING_PUNCTUATION: &[char] = &['.', '!', '?', ',', ';', ':'];

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

fn trim_clause(piece: &str) -> &str {
    piece
        .trim()
        .trim_end_matches(|c: char| TRAILING_PUNCTUATION.contains(&c) || c.is_whitespace())
        .trim()
}

/// Split user text into action clauses.
///
/// Blank input yields nothing. Otherwise at least one clause is returned:
/// when no fragment survives trimming, the whole normalized text is kept.
pub fn split_clauses(text: &str) -> Vec<String> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Vec::new();
    }

    let clauses: Vec<String> = RE_CLAUSE_BREAK
        .split(&normalized)
        .map(trim_clause)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect();

    if clauses.is_empty() {
        return vec![normalized];
    }
    clauses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_clause_strips_trailing_punctuation() {
        assert_eq!(
            split_clauses("What's the weather in San Francisco?"),
            vec!["What's the weather in San Francisco"]
        );
    }

    #[test]
    fn splits_on_and() {
        assert_eq!(
            split_clauses("Find Bob and send him a message"),
            vec!["Find Bob", "send him a message"]
        );
    }

    #[test]
    fn splits_on_comma_and() {
        assert_eq!(
            split_clauses("Set an alarm for 7 AM, and play some jazz music."),
            vec!["Set an alarm for 7 AM", "play some jazz music"]
        );
    }

    #[test]
    fn splits_on_bare_comma_and_is_case_insensitive() {
        assert_eq!(
            split_clauses("Check the weather in Paris, set a timer for 5 minutes AND play jazz"),
            vec![
                "Check the weather in Paris",
                "set a timer for 5 minutes",
                "play jazz"
            ]
        );
    }

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(
            split_clauses("  Set   a timer\tfor 5\n minutes  "),
            vec!["Set a timer for 5 minutes"]
        );
    }

    #[test]
    fn and_inside_a_word_does_not_split() {
        assert_eq!(
            split_clauses("Text Alexander saying hi"),
            vec!["Text Alexander saying hi"]
        );
    }

    #[test]
    fn blank_input_yields_no_clauses() {
        assert!(split_clauses("").is_empty());
        assert!(split_clauses("   \n\t").is_empty());
    }

    #[test]
    fn all_empty_fragments_fall_back_to_whole_text() {
        assert_eq!(split_clauses(", , ,"), vec![", , ,"]);
        assert_eq!(split_clauses("?!"), vec!["?!"]);
    }
}
