//! On-device model via the local Ollama HTTP API (`/api/chat`).
//!
//! The system preamble asks the model for a JSON object
//! `{"function_calls": [...], "confidence": x}`; models that emit native
//! `tool_calls` are accepted as well.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use hr_protocol::{FunctionCall, Message};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{BackendOutcome, BackendReply, EdgeBackend, EdgeRequest, ToolEnvelope, clamp_confidence};
use crate::config::EdgeConfig;
use crate::error::{RouterError, RouterResult};

/// Confidence assumed for native tool calls that come without a self-report.
const NATIVE_CALL_CONFIDENCE: f64 = 0.85;

/// Ollama chat API request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolEnvelope],
    format: &'a str,
    stream: bool,
    options: ChatOptions<'a>,
}

fn no_tools(tools: &&[ToolEnvelope]) -> bool {
    tools.is_empty()
}

#[derive(Serialize)]
struct ChatOptions<'a> {
    temperature: f64,
    num_predict: u32,
    stop: &'a [String],
}

/// Ollama chat API response (only fields we need).
#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
    #[serde(default)]
    tool_calls: Vec<NativeToolCall>,
}

#[derive(Deserialize)]
struct NativeToolCall {
    function: NativeFunction,
}

#[derive(Deserialize)]
struct NativeFunction {
    name: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

/// JSON object the preamble asks the model to produce.
#[derive(Debug, Deserialize)]
struct RawReply {
    #[serde(default)]
    function_calls: Vec<FunctionCall>,
    confidence: Option<f64>,
    #[serde(default)]
    cloud_handoff: bool,
}

/// Edge backend talking to a local Ollama server.
pub struct OllamaEdge {
    client: reqwest::Client,
    config: EdgeConfig,
}

impl OllamaEdge {
    pub fn new(config: EdgeConfig) -> RouterResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    async fn chat(&self, request: &EdgeRequest) -> RouterResult<BackendReply> {
        let started = Instant::now();
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));

        let tools: &[ToolEnvelope] = if request.force_tools {
            &request.tools
        } else {
            &[]
        };
        let body = ChatRequest {
            model: &self.config.model,
            messages: &request.messages,
            tools,
            format: "json",
            stream: false,
            options: ChatOptions {
                temperature: 0.0,
                num_predict: request.max_tokens,
                stop: &request.stop_sequences,
            },
        };

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(RouterError::BackendUnavailable(format!(
                "ollama returned {}",
                response.status()
            )));
        }

        let text = response.text().await?;
        let chat: ChatResponse = serde_json::from_str(&text)?;
        let message = chat
            .message
            .ok_or_else(|| RouterError::MalformedOutput("response has no message".into()))?;

        let (function_calls, reported, model_handoff) = parse_message(message)?;
        let confidence = clamp_confidence(reported);

        Ok(BackendReply {
            function_calls,
            confidence,
            cloud_handoff: model_handoff || confidence < request.confidence_threshold,
            total_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

/// Calls, self-reported confidence and handoff flag from the assistant turn.
fn parse_message(message: ResponseMessage) -> RouterResult<(Vec<FunctionCall>, f64, bool)> {
    let content = message.content.trim();

    if !message.tool_calls.is_empty() {
        let calls = message
            .tool_calls
            .into_iter()
            .map(|c| FunctionCall {
                name: c.function.name,
                arguments: c.function.arguments,
            })
            .collect();
        let reported = serde_json::from_str::<RawReply>(extract_json(content))
            .ok()
            .and_then(|r| r.confidence)
            .unwrap_or(NATIVE_CALL_CONFIDENCE);
        return Ok((calls, reported, false));
    }

    if content.is_empty() {
        return Err(RouterError::MalformedOutput("empty model output".into()));
    }
    let raw: RawReply = serde_json::from_str(extract_json(content))?;
    Ok((
        raw.function_calls,
        raw.confidence.unwrap_or(0.0),
        raw.cloud_handoff,
    ))
}

/// Extract JSON from model output that may be wrapped in markdown code blocks.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    trimmed
}

#[async_trait]
impl EdgeBackend for OllamaEdge {
    async fn complete(&self, request: &EdgeRequest) -> BackendOutcome {
        match self.chat(request).await {
            Ok(reply) => {
                tracing::debug!(
                    calls = reply.function_calls.len(),
                    confidence = reply.confidence,
                    cloud_handoff = reply.cloud_handoff,
                    elapsed_ms = reply.total_time_ms,
                    "ollama completed"
                );
                BackendOutcome::Completed(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, model = %self.config.model, "ollama request failed");
                e.into()
            }
        }
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
