//! Router error types.
//!
//! None of these ever reach the caller of `HybridRouter::route`: backend
//! adapters fold them into a `BackendOutcome` at their boundary.

use thiserror::Error;

/// Errors raised inside backend adapters and configuration loading.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("malformed backend output: {0}")]
    MalformedOutput(String),

    #[error("credential missing: {0} is not set")]
    CredentialMissing(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// Convenience alias for router results.
pub type RouterResult<T> = Result<T, RouterError>;
