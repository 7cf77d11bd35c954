//! Router configuration, loadable from TOML.

use serde::Deserialize;

use crate::error::{RouterError, RouterResult};

/// Default system preamble sent to the on-device model.
pub const DEFAULT_EDGE_PROMPT: &str = r#"You are a precise function calling assistant.
Call only the tools you are given, with arguments that match their schemas.

Respond with ONLY a JSON object (no markdown, no explanation):
{"function_calls": [{"name": "<tool>", "arguments": {<args>}}], "confidence": <0.0-1.0>}

If no tool fits the request, respond with:
{"function_calls": [], "confidence": 0.0}"#;

/// Top-level configuration for the hybrid router.
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    /// Edge self-reported confidence at or above which the router stays
    /// on-device instead of escalating. Overridable per call.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Refuse tier 2/3 results holding fewer than two calls when the
    /// utterance looks like a compound request.
    #[serde(default)]
    pub compound_escalation: bool,
    /// On-device model settings.
    #[serde(default)]
    pub edge: EdgeConfig,
    /// Cloud model settings.
    #[serde(default)]
    pub cloud: CloudConfig,
}

fn default_confidence_threshold() -> f64 {
    0.99
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            compound_escalation: false,
            edge: EdgeConfig::default(),
            cloud: CloudConfig::default(),
        }
    }
}

impl RouterConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> RouterResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RouterError::Config(format!("cannot read {path}: {e}")))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| RouterError::Config(format!("invalid TOML in {path}: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds outside `[0, 1]`.
    pub fn validate(&self) -> RouterResult<()> {
        let thresholds = [
            ("confidence_threshold", self.confidence_threshold),
            ("edge.confidence_threshold", self.edge.confidence_threshold),
        ];
        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(RouterError::Config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Settings for the on-device (Ollama) model.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeConfig {
    /// Whether the on-device model is consulted at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ollama HTTP API base URL.
    #[serde(default = "default_edge_host")]
    pub host: String,
    /// Model to use for inference.
    #[serde(default = "default_edge_model")]
    pub model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_edge_timeout_secs")]
    pub timeout_secs: u64,
    /// Below this self-reported confidence the backend flags a cloud handoff.
    #[serde(default = "default_edge_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Maximum output tokens.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_stop_sequences")]
    pub stop_sequences: Vec<String>,
    /// System preamble prepended to every edge request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_enabled() -> bool {
    true
}
fn default_edge_host() -> String {
    "http://localhost:11434".into()
}
fn default_edge_model() -> String {
    "functiongemma".into()
}
fn default_edge_timeout_secs() -> u64 {
    5
}
fn default_edge_confidence_threshold() -> f64 {
    0.65
}
fn default_max_tokens() -> u32 {
    256
}
fn default_stop_sequences() -> Vec<String> {
    vec!["<end_of_turn>".into()]
}
fn default_system_prompt() -> String {
    DEFAULT_EDGE_PROMPT.into()
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            host: default_edge_host(),
            model: default_edge_model(),
            timeout_secs: default_edge_timeout_secs(),
            confidence_threshold: default_edge_confidence_threshold(),
            max_tokens: default_max_tokens(),
            stop_sequences: default_stop_sequences(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Settings for the cloud (Gemini) model.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudConfig {
    #[serde(default = "default_cloud_model")]
    pub model: String,
    /// Generative Language API base URL.
    #[serde(default = "default_cloud_base_url")]
    pub base_url: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in seconds.
    #[serde(default = "default_cloud_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_cloud_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_cloud_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_cloud_timeout_secs() -> u64 {
    10
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            model: default_cloud_model(),
            base_url: default_cloud_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_cloud_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RouterConfig::default();
        assert_eq!(config.confidence_threshold, 0.99);
        assert!(!config.compound_escalation);
        assert!(config.edge.enabled);
        assert_eq!(config.edge.host, "http://localhost:11434");
        assert_eq!(config.edge.confidence_threshold, 0.65);
        assert_eq!(config.cloud.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn deserialize_empty_config_uses_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.confidence_threshold, 0.99);
        assert_eq!(config.edge.model, "functiongemma");
        assert_eq!(config.edge.timeout_secs, 5);
        assert_eq!(config.edge.stop_sequences, vec!["<end_of_turn>"]);
        assert_eq!(config.cloud.model, "gemini-2.5-flash");
        assert_eq!(config.cloud.timeout_secs, 10);
    }

    #[test]
    fn deserialize_full_config() {
        let toml = r#"
confidence_threshold = 0.9
compound_escalation = true

[edge]
enabled = false
host = "http://192.168.1.50:11434"
model = "gemma:2b"
timeout_secs = 2
confidence_threshold = 0.5
max_tokens = 128
stop_sequences = ["</s>"]

[cloud]
model = "gemini-2.0-flash"
base_url = "http://localhost:9999"
api_key_env = "MY_KEY"
timeout_secs = 3
"#;
        let config: RouterConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.confidence_threshold, 0.9);
        assert!(config.compound_escalation);
        assert!(!config.edge.enabled);
        assert_eq!(config.edge.model, "gemma:2b");
        assert_eq!(config.edge.max_tokens, 128);
        assert_eq!(config.edge.stop_sequences, vec!["</s>"]);
        assert_eq!(config.edge.system_prompt, DEFAULT_EDGE_PROMPT);
        assert_eq!(config.cloud.base_url, "http://localhost:9999");
        assert_eq!(config.cloud.api_key_env, "MY_KEY");
    }

    #[test]
    fn from_file_missing_path_errors() {
        assert!(matches!(
            RouterConfig::from_file("/nonexistent/router.toml"),
            Err(RouterError::Config(_))
        ));
    }

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("router-{}.toml", uuid::Uuid::now_v7()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn from_file_loads_and_validates() {
        let path = write_temp("confidence_threshold = 0.8\n[edge]\nmodel = \"gemma:2b\"\n");
        let config = RouterConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.confidence_threshold, 0.8);
        assert_eq!(config.edge.model, "gemma:2b");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn from_file_rejects_bad_toml_and_thresholds() {
        let garbage = write_temp("confidence_threshold = [");
        let out_of_range = write_temp("[edge]\nconfidence_threshold = 1.5\n");

        for path in [&garbage, &out_of_range] {
            let err = RouterConfig::from_file(path.to_str().unwrap()).unwrap_err();
            assert!(matches!(err, RouterError::Config(_)), "{err}");
            std::fs::remove_file(path).unwrap();
        }
    }

    #[test]
    fn validate_checks_threshold_range() {
        assert!(RouterConfig::default().validate().is_ok());
        let config = RouterConfig {
            confidence_threshold: -0.1,
            ..RouterConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("confidence_threshold"), "{err}");
    }
}
