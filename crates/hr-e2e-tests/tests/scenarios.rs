//! E2E tests for the canonical routing scenarios.

mod helpers;

use serde_json::json;

use helpers::{TestHarness, assert_well_formed, user};
use hr_protocol::{FunctionCall, Source};
use hr_router::RuleExtractor;
use hr_router::catalog;
use hr_router::validate::validate_call;

/// Single weather question is answered by the rules, never leaving the device.
#[tokio::test]
async fn e2e_weather_question_stays_on_device() {
    let h = TestHarness::online().await;
    let tools = vec![catalog::get_weather()];

    let result = h.route("What's the weather in San Francisco?", &tools).await;

    assert_well_formed(&result, &tools);
    assert_eq!(
        result.function_calls,
        vec![FunctionCall::new("get_weather").arg("location", "San Francisco")]
    );
    assert_eq!(result.source, Source::OnDevice);
    assert!(result.confidence >= 0.78);
    assert_eq!(h.ollama_hits().await, 0, "fastpath must skip the edge model");
    assert_eq!(h.gemini_hits().await, 0);
}

/// "him" in the second clause resolves to the contact found in the first.
#[tokio::test]
async fn e2e_find_then_message_resolves_pronoun() {
    let tools = vec![catalog::search_contacts(), catalog::send_message()];
    let calls = RuleExtractor::new().extract(&user("Find Bob and send him a message"), &tools);

    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], FunctionCall::new("search_contacts").arg("query", "Bob"));
    assert_eq!(calls[1].name, "send_message");
    assert_eq!(calls[1].str_arg("recipient"), Some("Bob"));
}

/// The rules alone cannot fill the message body, so the edge model completes it.
#[tokio::test]
async fn e2e_find_then_message_completed_by_edge() {
    let h = TestHarness::online().await;
    let tools = vec![catalog::search_contacts(), catalog::send_message()];
    h.ollama_replies(json!({
        "function_calls": [
            {"name": "search_contacts", "arguments": {"query": "Bob"}},
            {"name": "send_message", "arguments": {"recipient": "Bob", "message": "Hi Bob"}}
        ],
        "confidence": 0.9
    }))
    .await;

    let result = h.route("Find Bob and send him a message", &tools).await;

    assert_well_formed(&result, &tools);
    assert_eq!(result.source, Source::OnDevice);
    assert_eq!(result.function_calls.len(), 2);
    assert_eq!(result.function_calls[1].str_arg("recipient"), Some("Bob"));
    assert_eq!(h.ollama_hits().await, 1);
    assert_eq!(h.gemini_hits().await, 0);
}

/// Clock times become 24-hour integers.
#[tokio::test]
async fn e2e_alarm_time_extraction() {
    let h = TestHarness::offline().await;
    let tools = vec![catalog::set_alarm()];

    let result = h.route("Set an alarm for 7 AM", &tools).await;

    assert_well_formed(&result, &tools);
    assert_eq!(
        result.function_calls,
        vec![FunctionCall::new("set_alarm").arg("hour", 7).arg("minute", 0)]
    );
    assert_eq!(result.source, Source::OnDevice);
}

/// Nothing matches, the edge is off and there is no credential: empty, local, no network.
#[tokio::test]
async fn e2e_unmatched_request_degrades_gracefully() {
    let h = TestHarness::offline().await;
    let tools = catalog::default_tools();

    let result = h.route("Tell me a joke", &tools).await;

    assert_well_formed(&result, &tools);
    assert!(result.function_calls.is_empty());
    assert_eq!(result.source, Source::OnDevice);
    assert!(result.confidence.abs() < 1e-9);
    assert!(result.local_confidence.is_none());
    assert_eq!(h.ollama_hits().await, 0);
    assert_eq!(h.gemini_hits().await, 0);
}

/// A whitespace-only required string never survives validation.
#[tokio::test]
async fn e2e_blank_message_body_is_dropped() {
    let tools = vec![catalog::send_message()];
    let blank = FunctionCall::new("send_message")
        .arg("recipient", "Bob")
        .arg("message", "   ");
    assert!(!validate_call(&blank, &tools));

    let h = TestHarness::edge_only().await;
    h.ollama_replies(json!({
        "function_calls": [{"name": "send_message", "arguments": {"recipient": "Bob", "message": "   "}}],
        "confidence": 0.95
    }))
    .await;

    let result = h.route("Tell Bob nothing", &tools).await;

    assert_well_formed(&result, &tools);
    assert!(result.function_calls.is_empty());
    assert_eq!(result.source, Source::OnDevice);
    assert_eq!(h.gemini_hits().await, 0);
}
