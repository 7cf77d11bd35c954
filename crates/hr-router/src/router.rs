//! Hybrid routing: rules first, then the on-device model, then the cloud.
//!
//! Tiers run strictly in order and each may end the call:
//!
//! 1. **fastpath**: rule extraction at very high confidence.
//! 2. **edge**: the on-device model, validated and re-scored.
//! 3. **rules**: the rule result again, at a lower bar.
//! 4. **confidence floor**: the edge was sure enough of itself to stay local.
//! 5. **credential gate**: no cloud credential, so stay local.
//! 6. **cloud**: the cloud model as a last resort.
//!
//! `route` never fails. Every returned call passes schema validation against
//! the request's tools.

use std::sync::Arc;
use std::time::Instant;

use hr_protocol::{FunctionCall, Message, RouteResult, ToolSchema, dedup_calls, user_text};
use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::backend::session::EdgeSession;
use crate::backend::{BackendOutcome, BackendReply, CloudBackend, EdgeRequest, ToolEnvelope};
use crate::complexity::is_compound_query;
use crate::config::RouterConfig;
use crate::confidence;
use crate::rules::RuleExtractor;
use crate::validate::filter_valid;

/// Rule confidence that skips every backend.
pub const FASTPATH_THRESHOLD: f64 = 0.90;
/// Edge result acceptance bar (computed or self-reported).
pub const LOCAL_ACCEPT: f64 = 0.72;
/// Rule result acceptance bar once the edge has had its turn.
pub const ROUTER_ACCEPT: f64 = 0.78;
/// Minimum reported confidence for accepted rule results.
pub const REPORTED_FLOOR: f64 = 0.78;

/// Tiered router over one shared edge session and one cloud backend.
pub struct HybridRouter {
    config: RouterConfig,
    edge: Arc<EdgeSession>,
    cloud: Arc<dyn CloudBackend>,
    rules: RuleExtractor,
}

/// Tier-2 output carried into the later tiers.
struct EdgeAttempt {
    calls: Vec<FunctionCall>,
    /// Estimator score of `calls`.
    computed: f64,
    /// Backend's own confidence (0 when it failed).
    reported: f64,
}

impl HybridRouter {
    pub fn new(config: RouterConfig, edge: Arc<EdgeSession>, cloud: Arc<dyn CloudBackend>) -> Self {
        Self {
            config,
            edge,
            cloud,
            rules: RuleExtractor::new(),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route one request. `confidence_threshold` overrides the configured
    /// confidence floor for this call only.
    pub async fn route(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        confidence_threshold: Option<f64>,
    ) -> RouteResult {
        let span = info_span!("route", route_id = %Uuid::now_v7());
        self.route_tiers(messages, tools, confidence_threshold)
            .instrument(span)
            .await
    }

    async fn route_tiers(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        confidence_threshold: Option<f64>,
    ) -> RouteResult {
        let started = Instant::now();
        let threshold = confidence_threshold.unwrap_or(self.config.confidence_threshold);
        let compound =
            self.config.compound_escalation && is_compound_query(&user_text(messages));

        // ── Tier 1: fastpath ────────────────────────────────────
        let rule_raw = self.rules.extract(messages, tools);
        let rule_confidence = confidence::score(messages, tools, &rule_raw);
        let rule_calls = filter_valid(rule_raw, tools);

        if !rule_calls.is_empty() && rule_confidence >= FASTPATH_THRESHOLD {
            let reported = rule_confidence.max(REPORTED_FLOOR);
            info!(tier = "fastpath", calls = rule_calls.len(), confidence = reported, "accepted");
            return RouteResult::on_device(rule_calls, reported, elapsed_ms(started));
        }
        debug!(tier = "fastpath", calls = rule_calls.len(), confidence = rule_confidence, "passed");

        // ── Tier 2: on-device model ─────────────────────────────
        let edge = self.edge_attempt(messages, tools).await;
        let edge_trusted = edge.computed >= LOCAL_ACCEPT || edge.reported >= LOCAL_ACCEPT;
        let edge_short = compound && edge.calls.len() < 2;

        if !edge.calls.is_empty() && edge_trusted && !edge_short {
            let reported = edge.computed.max(edge.reported);
            info!(tier = "edge", calls = edge.calls.len(), confidence = reported, "accepted");
            return RouteResult::on_device(edge.calls, reported, elapsed_ms(started));
        }
        debug!(
            tier = "edge",
            calls = edge.calls.len(),
            confidence = edge.computed,
            local_confidence = edge.reported,
            compound,
            "passed"
        );

        // ── Tier 3: rule fallback ───────────────────────────────
        // Extraction is pure, so the tier-1 result is still the answer.
        let rules_short = compound && rule_calls.len() < 2;
        if !rule_calls.is_empty() && rule_confidence >= ROUTER_ACCEPT && !rules_short {
            let reported = rule_confidence.max(REPORTED_FLOOR);
            info!(tier = "rules", calls = rule_calls.len(), confidence = reported, "accepted");
            return RouteResult::on_device(rule_calls, reported, elapsed_ms(started));
        }

        // ── Tier 4: confidence floor ────────────────────────────
        if edge.reported >= threshold {
            info!(
                tier = "confidence_floor",
                calls = edge.calls.len(),
                local_confidence = edge.reported,
                threshold,
                "staying on-device"
            );
            return RouteResult::on_device(edge.calls, edge.computed, elapsed_ms(started));
        }

        // ── Tier 5: credential gate ─────────────────────────────
        if !self.cloud.is_configured() {
            info!(tier = "credential_gate", calls = edge.calls.len(), "no cloud credential, staying on-device");
            return RouteResult::on_device(edge.calls, edge.computed, elapsed_ms(started));
        }

        // ── Tier 6: cloud ───────────────────────────────────────
        let outcome = self.cloud.generate(messages, tools).await;
        if !outcome.is_completed() {
            debug!(tier = "cloud", outcome = outcome.kind(), "cloud produced nothing");
        }
        let cloud_calls = dedup_calls(filter_valid(outcome.into_reply().function_calls, tools));
        let cloud_confidence = confidence::score(messages, tools, &cloud_calls);
        info!(
            tier = "cloud",
            source = "cloud (fallback)",
            calls = cloud_calls.len(),
            confidence = cloud_confidence,
            local_confidence = edge.reported,
            "escalated"
        );
        RouteResult::cloud_fallback(
            cloud_calls,
            cloud_confidence,
            edge.reported,
            elapsed_ms(started),
        )
    }

    async fn edge_attempt(&self, messages: &[Message], tools: &[ToolSchema]) -> EdgeAttempt {
        let outcome = match self.edge.backend() {
            Some(backend) => backend.complete(&self.edge_request(messages, tools)).await,
            None => BackendOutcome::Unavailable("edge backend not available".into()),
        };
        if !outcome.is_completed() {
            debug!(tier = "edge", outcome = outcome.kind(), "edge produced nothing");
        }

        let BackendReply {
            function_calls,
            confidence: reported,
            ..
        } = outcome.into_reply();
        let calls = dedup_calls(filter_valid(function_calls, tools));
        let computed = confidence::score(messages, tools, &calls);
        EdgeAttempt {
            calls,
            computed,
            reported,
        }
    }

    fn edge_request(&self, messages: &[Message], tools: &[ToolSchema]) -> EdgeRequest {
        let edge = &self.config.edge;
        let mut turns = Vec::with_capacity(messages.len() + 1);
        turns.push(Message::system(edge.system_prompt.clone()));
        turns.extend_from_slice(messages);

        EdgeRequest {
            messages: turns,
            tools: tools.iter().cloned().map(ToolEnvelope::function).collect(),
            force_tools: true,
            confidence_threshold: edge.confidence_threshold,
            max_tokens: edge.max_tokens,
            stop_sequences: edge.stop_sequences.clone(),
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
