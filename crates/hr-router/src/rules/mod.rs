//! Rule-based extraction: clause segmentation, keyword scoring and
//! per-family argument patterns.
//!
//! Deterministic and free of I/O. Runs in well under a millisecond for the
//! small tool sets the router sees, so it is always tried before any model.

pub mod extract;
pub mod family;
pub mod keywords;
pub mod scoring;
pub mod segment;

use hr_protocol::{FunctionCall, Message, ToolSchema, dedup_calls, user_text};
use serde_json::Value;

use family::ToolFamily;
use keywords::{ToolProfiles, token_set};

/// Pattern-matching extractor for function calls.
pub struct RuleExtractor;

impl RuleExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract candidate calls from the user turns, one per matched clause.
    ///
    /// Calls are not validated here; a call may lack required arguments.
    pub fn extract(&self, messages: &[Message], tools: &[ToolSchema]) -> Vec<FunctionCall> {
        let text = user_text(messages);
        let clauses = segment::split_clauses(&text);
        if clauses.is_empty() || tools.is_empty() {
            return Vec::new();
        }

        let profiles = ToolProfiles::build(tools);
        let mut calls = Vec::with_capacity(clauses.len());

        for clause in &clauses {
            let tokens = token_set(clause);
            if tokens.is_empty() {
                continue;
            }
            let Some(hit) = scoring::best_match(&tokens, profiles.as_slice()) else {
                continue;
            };
            let tool = &tools[hit.index];
            calls.push(FunctionCall {
                name: tool.name.clone(),
                arguments: extract::extract_arguments(clause, tool),
            });
        }

        resolve_pronouns(&mut calls);
        dedup_calls(calls)
    }
}

impl Default for RuleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite a `him`/`her` recipient to the most recent contact query before it.
fn resolve_pronouns(calls: &mut [FunctionCall]) {
    let mut last_query: Option<String> = None;
    for call in calls.iter_mut() {
        match ToolFamily::of(&call.name) {
            Some(ToolFamily::Contact) => {
                if let Some(query) = call.str_arg("query") {
                    last_query = Some(query.to_string());
                }
            }
            Some(ToolFamily::Message) => {
                let is_pronoun = call
                    .str_arg("recipient")
                    .is_some_and(|r| r.eq_ignore_ascii_case("him") || r.eq_ignore_ascii_case("her"));
                if is_pronoun && let Some(name) = &last_query {
                    call.arguments
                        .insert("recipient".into(), Value::String(name.clone()));
                }
            }
            _ => {}
        }
    }
}
