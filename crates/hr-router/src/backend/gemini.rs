//! Cloud model via the Gemini `generateContent` REST API.
//!
//! The API key is read once, at construction, from the environment variable
//! named in [`CloudConfig::api_key_env`]. Without it the adapter reports
//! itself unconfigured and never touches the network.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use hr_protocol::{FunctionCall, Message, ParamType, ToolSchema, user_text};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{BackendOutcome, BackendReply, CloudBackend};
use crate::config::CloudConfig;
use crate::error::{RouterError, RouterResult};

/// Confidence attached to cloud replies; the router re-scores them anyway.
const CLOUD_CONFIDENCE: f64 = 0.95;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content>,
    tools: Vec<ToolDeclarations<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
struct TextPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations<'a> {
    function_declarations: Vec<FunctionDeclaration<'a>>,
}

#[derive(Serialize)]
struct FunctionDeclaration<'a> {
    name: &'a str,
    description: &'a str,
    parameters: DeclaredObject<'a>,
}

#[derive(Serialize)]
struct DeclaredObject<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    properties: IndexMap<&'a str, DeclaredParam<'a>>,
    required: &'a [String],
}

#[derive(Serialize)]
struct DeclaredParam<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    description: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    function_call: Option<GeminiCall>,
}

#[derive(Deserialize)]
struct GeminiCall {
    name: String,
    #[serde(default)]
    args: Map<String, Value>,
}

fn gemini_type(kind: ParamType) -> &'static str {
    match kind {
        ParamType::String => "STRING",
        ParamType::Integer => "INTEGER",
    }
}

fn declare(tool: &ToolSchema) -> FunctionDeclaration<'_> {
    FunctionDeclaration {
        name: &tool.name,
        description: &tool.description,
        parameters: DeclaredObject {
            kind: "OBJECT",
            properties: tool
                .parameters
                .properties
                .iter()
                .map(|(name, spec)| {
                    (
                        name.as_str(),
                        DeclaredParam {
                            kind: gemini_type(spec.kind),
                            description: &spec.description,
                        },
                    )
                })
                .collect(),
            required: &tool.parameters.required,
        },
    }
}

/// Cloud backend for Google's Gemini models.
pub struct GeminiCloud {
    client: reqwest::Client,
    config: CloudConfig,
    api_key: Option<String>,
}

impl GeminiCloud {
    /// Build from config, reading the key from the configured env var.
    pub fn new(config: CloudConfig) -> RouterResult<Self> {
        let api_key = std::env::var(&config.api_key_env).ok();
        Self::with_api_key(config, api_key)
    }

    /// Build with an explicit key (or none).
    pub fn with_api_key(config: CloudConfig, api_key: Option<String>) -> RouterResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() {
            tracing::info!(env = %config.api_key_env, "no cloud credential, cloud fallback disabled");
        }
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    async fn call_generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> RouterResult<BackendReply> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(RouterError::CredentialMissing(self.config.api_key_env.clone()));
        };
        let started = Instant::now();
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart {
                    text: user_text(messages),
                }],
            }],
            tools: vec![ToolDeclarations {
                function_declarations: tools.iter().map(declare).collect(),
            }],
            generation_config: GenerationConfig { temperature: 0.0 },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RouterError::BackendUnavailable(format!(
                "gemini returned {}",
                response.status()
            )));
        }

        let text = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        let function_calls: Vec<FunctionCall> = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.function_call)
                    .map(|fc| FunctionCall {
                        name: fc.name,
                        arguments: fc.args,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let confidence = if function_calls.is_empty() {
            0.0
        } else {
            CLOUD_CONFIDENCE
        };
        Ok(BackendReply {
            function_calls,
            confidence,
            cloud_handoff: false,
            total_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[async_trait]
impl CloudBackend for GeminiCloud {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, messages: &[Message], tools: &[ToolSchema]) -> BackendOutcome {
        match self.call_generate(messages, tools).await {
            Ok(reply) => {
                tracing::debug!(
                    calls = reply.function_calls.len(),
                    elapsed_ms = reply.total_time_ms,
                    "gemini completed"
                );
                BackendOutcome::Completed(reply)
            }
            Err(e) => {
                tracing::warn!(error = %e, model = %self.config.model, "gemini request failed");
                e.into()
            }
        }
    }
}
