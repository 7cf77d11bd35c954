//! Keyword profiles: the concept vocabulary each tool answers to.

use std::collections::BTreeSet;

use hr_protocol::ToolSchema;
use regex::Regex;
use std::sync::LazyLock;

use super::family::ToolFamily;

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z']+").unwrap());

/// Articles, prepositions, fillers and generic verbs that carry no intent.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "to", "for", "of", "in", "on", "at", "by", "with", "from", "and", "or",
    "is", "are", "be", "me", "my", "it", "this", "that", "what", "what's", "how", "please",
    "can", "could", "would", "you", "your", "get", "set", "do", "make", "some", "name", "given",
];

/// Lower-cased alphabetic word pieces (apostrophes kept), stop words and
/// single letters removed. Order of first appearance is preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    RE_WORD
        .find_iter(&lower)
        .map(|m| m.as_str().trim_matches('\''))
        .filter(|w| w.chars().filter(|c| c.is_alphabetic()).count() > 1)
        .filter(|w| !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Distinct tokens of a piece of text.
pub fn token_set(text: &str) -> BTreeSet<String> {
    tokenize(text).into_iter().collect()
}

/// Keyword set derived from a tool's static fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordProfile {
    keywords: BTreeSet<String>,
}

impl KeywordProfile {
    pub fn for_tool(tool: &ToolSchema) -> Self {
        let mut keywords = token_set(&tool.name.replace('_', " "));
        keywords.extend(tokenize(&tool.description));

        for (param, spec) in &tool.parameters.properties {
            keywords.extend(tokenize(&param.replace('_', " ")));
            keywords.extend(tokenize(&spec.description));
        }

        for family in ToolFamily::all_of(&tool.name) {
            keywords.extend(family.synonyms().iter().map(|s| s.to_string()));
        }

        Self { keywords }
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Number of distinct clause tokens found in this profile.
    pub fn overlap(&self, tokens: &BTreeSet<String>) -> usize {
        tokens.intersection(&self.keywords).count()
    }
}

/// Profiles for a request's tool set, index-aligned with the tools.
#[derive(Debug, Clone)]
pub struct ToolProfiles {
    profiles: Vec<KeywordProfile>,
}

impl ToolProfiles {
    pub fn build(tools: &[ToolSchema]) -> Self {
        Self {
            profiles: tools.iter().map(KeywordProfile::for_tool).collect(),
        }
    }

    pub fn as_slice(&self) -> &[KeywordProfile] {
        &self.profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn tokenize_drops_stop_words_and_digits() {
        assert_eq!(
            tokenize("What's the weather in San Francisco?"),
            vec!["weather", "san", "francisco"]
        );
        assert_eq!(tokenize("Set an alarm for 7 AM"), vec!["alarm", "am"]);
    }

    #[test]
    fn tokenize_keeps_inner_apostrophes() {
        assert_eq!(tokenize("Don't forget Bob's keys"), vec!["don't", "forget", "bob's", "keys"]);
    }

    #[test]
    fn tokenize_drops_single_letters() {
        assert_eq!(tokenize("e.g. 3:00 PM"), vec!["pm"]);
    }

    #[test]
    fn profile_includes_name_description_params_and_synonyms() {
        let profile = KeywordProfile::for_tool(&catalog::get_weather());
        let keywords = profile.keywords();
        assert!(keywords.contains("weather"));
        assert!(keywords.contains("current"));
        assert!(keywords.contains("location"));
        assert!(keywords.contains("city"));
        assert!(keywords.contains("forecast"));
        assert!(!keywords.contains("get"));
        assert!(!keywords.contains("name"));
    }

    #[test]
    fn profile_is_deterministic() {
        let tool = catalog::send_message();
        assert_eq!(KeywordProfile::for_tool(&tool), KeywordProfile::for_tool(&tool));
    }

    #[test]
    fn profile_without_family_has_no_synonyms() {
        let tool = hr_protocol::ToolSchema::new("open_door", "Open the front door");
        let profile = KeywordProfile::for_tool(&tool);
        let expected: BTreeSet<String> =
            ["open", "door", "front"].iter().map(|s| s.to_string()).collect();
        assert_eq!(profile.keywords(), &expected);
    }

    #[test]
    fn overlap_counts_distinct_tokens() {
        let profile = KeywordProfile::for_tool(&catalog::set_alarm());
        let tokens = token_set("alarm alarm am");
        assert_eq!(profile.overlap(&tokens), 2);
    }
}
