//! Schema validation of function calls against the request's tool set.

use hr_protocol::{FunctionCall, ParamType, ToolSchema};
use serde_json::Value;
use tracing::debug;

/// Whether `call` names a known tool and satisfies its declared parameters.
///
/// Required arguments must be present, non-null, and non-blank when textual.
/// Declared types are enforced; undeclared arguments pass unchecked.
pub fn validate_call(call: &FunctionCall, tools: &[ToolSchema]) -> bool {
    let Some(tool) = tools.iter().find(|t| t.name == call.name) else {
        return false;
    };

    let required_present = tool.parameters.required.iter().all(|name| {
        match call.arguments.get(name) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    });
    if !required_present {
        return false;
    }

    call.arguments.iter().all(|(name, value)| match tool.param_type(name) {
        Some(kind) => matches_type(value, kind),
        None => true,
    })
}

fn matches_type(value: &Value, kind: ParamType) -> bool {
    match kind {
        ParamType::String => value.is_string(),
        ParamType::Integer => is_whole_number(value),
    }
}

fn is_whole_number(value: &Value) -> bool {
    let Value::Number(n) = value else {
        return false;
    };
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Keep valid calls in order; drop the rest with a debug log.
pub fn filter_valid(calls: Vec<FunctionCall>, tools: &[ToolSchema]) -> Vec<FunctionCall> {
    calls
        .into_iter()
        .filter(|call| {
            let ok = validate_call(call, tools);
            if !ok {
                debug!(tool = %call.name, args = ?call.arguments, "dropping call that fails its schema");
            }
            ok
        })
        .collect()
}
