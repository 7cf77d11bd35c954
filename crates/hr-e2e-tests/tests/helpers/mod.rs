//! Shared test harness for E2E router tests.
//!
//! Wires a real `HybridRouter` to real `OllamaEdge` / `GeminiCloud` adapters,
//! each pointed at its own wiremock server, so every request crosses the
//! HTTP boundary exactly as in production.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hr_protocol::{Message, RouteResult, ToolSchema};
use hr_router::backend::{EdgeBackend, GeminiCloud, OllamaEdge};
use hr_router::config::{CloudConfig, EdgeConfig};
use hr_router::validate::validate_call;
use hr_router::{EdgeSession, HybridRouter, RouterConfig};

pub const GEMINI_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

/// Router plus the mock servers standing in for Ollama and Gemini.
pub struct TestHarness {
    pub router: HybridRouter,
    pub session: Arc<EdgeSession>,
    pub ollama: MockServer,
    pub gemini: MockServer,
}

impl TestHarness {
    /// Edge and cloud both reachable; cloud has a credential.
    pub async fn online() -> Self {
        Self::build(RouterConfig::default(), true, Some("test-key")).await
    }

    /// Edge enabled, cloud without a credential.
    pub async fn edge_only() -> Self {
        Self::build(RouterConfig::default(), true, None).await
    }

    /// Edge disabled and no cloud credential.
    pub async fn offline() -> Self {
        Self::build(RouterConfig::default(), false, None).await
    }

    pub async fn build(mut config: RouterConfig, edge_enabled: bool, key: Option<&str>) -> Self {
        let ollama = MockServer::start().await;
        let gemini = MockServer::start().await;

        config.edge = EdgeConfig {
            enabled: edge_enabled,
            host: ollama.uri(),
            timeout_secs: 2,
            ..config.edge
        };
        config.cloud = CloudConfig {
            base_url: gemini.uri(),
            timeout_secs: 2,
            ..config.cloud
        };

        let session = if edge_enabled {
            let edge_config = config.edge.clone();
            Arc::new(EdgeSession::lazy(move || {
                Ok(Arc::new(OllamaEdge::new(edge_config)?) as Arc<dyn EdgeBackend>)
            }))
        } else {
            Arc::new(EdgeSession::disabled())
        };
        let cloud = Arc::new(
            GeminiCloud::with_api_key(config.cloud.clone(), key.map(str::to_string)).unwrap(),
        );

        Self {
            router: HybridRouter::new(config, Arc::clone(&session), cloud),
            session,
            ollama,
            gemini,
        }
    }

    /// Route a single user utterance.
    pub async fn route(&self, text: &str, tools: &[ToolSchema]) -> RouteResult {
        self.router.route(&user(text), tools, None).await
    }

    /// Make Ollama answer every chat with `content`.
    pub async fn ollama_replies(&self, content: Value) {
        let body = json!({
            "model": "functiongemma",
            "message": {"role": "assistant", "content": content.to_string()},
            "done": true
        });
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&self.ollama)
            .await;
    }

    /// Make Gemini answer with these `functionCall` parts.
    pub async fn gemini_replies(&self, calls: Value) {
        let parts: Vec<Value> = calls
            .as_array()
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|c| json!({"functionCall": {"name": c["name"], "args": c["arguments"]}}))
            .collect();
        let body = json!({"candidates": [{"content": {"role": "model", "parts": parts}}]});
        Mock::given(method("POST"))
            .and(path(GEMINI_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&self.gemini)
            .await;
    }

    /// Requests received by the Ollama mock so far.
    pub async fn ollama_hits(&self) -> usize {
        self.ollama.received_requests().await.unwrap_or_default().len()
    }

    /// Requests received by the Gemini mock so far.
    pub async fn gemini_hits(&self) -> usize {
        self.gemini.received_requests().await.unwrap_or_default().len()
    }
}

pub fn user(text: &str) -> Vec<Message> {
    vec![Message::user(text)]
}

/// Invariants every route result must satisfy, whatever tier produced it.
pub fn assert_well_formed(result: &RouteResult, tools: &[ToolSchema]) {
    for call in &result.function_calls {
        assert!(validate_call(call, tools), "invalid call returned: {call:?}");
    }
    assert!(
        (0.0..=1.0).contains(&result.confidence),
        "confidence out of range: {}",
        result.confidence
    );
    assert!(result.total_time_ms >= 0.0);

    let wire = serde_json::to_value(result).unwrap();
    let source = wire["source"].as_str().unwrap();
    assert!(
        ["on-device", "cloud", "cloud (fallback)"].contains(&source),
        "unexpected source {source}"
    );
    assert_eq!(
        wire.get("local_confidence").is_some(),
        source == "cloud (fallback)",
        "local_confidence must appear only on cloud fallback"
    );

    for (i, a) in result.function_calls.iter().enumerate() {
        for b in &result.function_calls[i + 1..] {
            assert_ne!(a, b, "duplicate call returned");
        }
    }
}
