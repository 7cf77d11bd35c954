//! Heuristic confidence for a candidate call list.
//!
//! Blends schema validity, coverage of the intents detected in the user text,
//! and a penalty for producing far more calls than intents.

use hr_protocol::{FunctionCall, Message, ToolSchema, user_text};

use crate::rules::family::ToolFamily;
use crate::validate::validate_call;

const SCHEMA_WEIGHT: f64 = 0.5;
const COVERAGE_WEIGHT: f64 = 0.35;
const PRECISION_WEIGHT: f64 = 0.15;

/// Score `calls` for this request, in `[0, 1]`. No calls scores 0.
pub fn score(messages: &[Message], tools: &[ToolSchema], calls: &[FunctionCall]) -> f64 {
    if calls.is_empty() {
        return 0.0;
    }

    let valid = calls.iter().filter(|c| validate_call(c, tools)).count();
    let schema_ratio = valid as f64 / calls.len() as f64;

    let intents = intent_count(&user_text(messages).to_lowercase(), tools);
    let coverage = (calls.len() as f64 / intents as f64).min(1.0);
    let precision_hint = if calls.len() <= intents + 1 { 1.0 } else { 0.7 };

    let blended = SCHEMA_WEIGHT * schema_ratio
        + COVERAGE_WEIGHT * coverage
        + PRECISION_WEIGHT * precision_hint;
    blended.clamp(0.0, 1.0)
}

/// Distinct request tools whose family triggers appear in the text, at least 1.
fn intent_count(lower_text: &str, tools: &[ToolSchema]) -> usize {
    let mut names: Vec<&str> = tools
        .iter()
        .filter(|tool| {
            ToolFamily::of(&tool.name).is_some_and(|family| {
                family.triggers().iter().any(|t| lower_text.contains(t))
            })
        })
        .map(|tool| tool.name.as_str())
        .collect();
    names.sort_unstable();
    names.dedup();
    names.len().max(1)
}
