//! Model backends: the on-device (edge) model and the cloud model.
//!
//! Adapters never return errors or panic towards the router. Every call
//! ends in a [`BackendOutcome`]; failures become `Unavailable` or
//! `Malformed` and the router treats both as "no calls, zero confidence".

pub mod gemini;
pub mod mock;
pub mod ollama;
pub mod session;

use async_trait::async_trait;
use hr_protocol::{FunctionCall, Message, ToolSchema};
use serde::Serialize;

use crate::error::RouterError;

pub use gemini::GeminiCloud;
pub use ollama::OllamaEdge;

/// What a backend produced for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendReply {
    pub function_calls: Vec<FunctionCall>,
    /// Self-reported confidence in `[0, 1]`.
    pub confidence: f64,
    /// Backend's own hint that the request should go to the cloud.
    pub cloud_handoff: bool,
    pub total_time_ms: f64,
}

/// Tagged result of a backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    Completed(BackendReply),
    /// Backend not reachable, not configured, or released.
    Unavailable(String),
    /// Backend answered with something that could not be parsed.
    Malformed(String),
}

impl BackendOutcome {
    /// The reply, or an empty zero-confidence reply for failures.
    pub fn into_reply(self) -> BackendReply {
        match self {
            BackendOutcome::Completed(reply) => reply,
            BackendOutcome::Unavailable(_) | BackendOutcome::Malformed(_) => BackendReply::default(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, BackendOutcome::Completed(_))
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendOutcome::Completed(_) => "completed",
            BackendOutcome::Unavailable(_) => "unavailable",
            BackendOutcome::Malformed(_) => "malformed",
        }
    }
}

impl From<RouterError> for BackendOutcome {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::MalformedOutput(_) | RouterError::Json(_) => {
                BackendOutcome::Malformed(err.to_string())
            }
            RouterError::BackendUnavailable(_)
            | RouterError::CredentialMissing(_)
            | RouterError::Http(_)
            | RouterError::Config(_) => BackendOutcome::Unavailable(err.to_string()),
        }
    }
}

/// OpenAI-style tool wrapper: `{"type": "function", "function": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolEnvelope {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: ToolSchema,
}

impl ToolEnvelope {
    pub fn function(schema: ToolSchema) -> Self {
        Self {
            kind: "function",
            function: schema,
        }
    }
}

/// Everything the edge model needs for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRequest {
    /// System preamble first, then the caller's turns.
    pub messages: Vec<Message>,
    pub tools: Vec<ToolEnvelope>,
    pub force_tools: bool,
    /// Below this self-reported confidence the backend sets `cloud_handoff`.
    pub confidence_threshold: f64,
    pub max_tokens: u32,
    pub stop_sequences: Vec<String>,
}

/// On-device model adapter.
#[async_trait]
pub trait EdgeBackend: Send + Sync {
    async fn complete(&self, request: &EdgeRequest) -> BackendOutcome;

    /// Name of this backend (for logging).
    fn name(&self) -> &str;

    /// Free model resources. Called at most once, by the owning session.
    fn release(&self) {}
}

/// Cloud model adapter.
#[async_trait]
pub trait CloudBackend: Send + Sync {
    /// Whether a credential is present. Checked before any network attempt.
    fn is_configured(&self) -> bool;

    async fn generate(&self, messages: &[Message], tools: &[ToolSchema]) -> BackendOutcome;
}

/// Clamp a self-reported confidence into `[0, 1]`; NaN becomes 0.
pub(crate) fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
