//! Scripted backends for testing.
//!
//! Both mocks return a fixed outcome and record what they were asked, so
//! router tests can assert which tiers touched which backend.

use async_trait::async_trait;
use hr_protocol::{FunctionCall, Message, ToolSchema};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{BackendOutcome, BackendReply, CloudBackend, EdgeBackend, EdgeRequest};

/// Completed reply with the given calls and self-reported confidence.
pub fn reply(function_calls: Vec<FunctionCall>, confidence: f64) -> BackendOutcome {
    BackendOutcome::Completed(BackendReply {
        function_calls,
        confidence,
        cloud_handoff: false,
        total_time_ms: 1.0,
    })
}

/// Edge backend returning one scripted outcome for every request.
pub struct MockEdge {
    outcome: BackendOutcome,
    /// Every request passed to `complete` (for test assertions).
    requests: Mutex<Vec<EdgeRequest>>,
    releases: AtomicUsize,
}

impl MockEdge {
    pub fn new(outcome: BackendOutcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
            releases: AtomicUsize::new(0),
        }
    }

    /// Edge that is reachable but never produces anything usable.
    pub fn unavailable() -> Self {
        Self::new(BackendOutcome::Unavailable("mock edge offline".into()))
    }

    pub fn requests(&self) -> Vec<EdgeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EdgeBackend for MockEdge {
    async fn complete(&self, request: &EdgeRequest) -> BackendOutcome {
        self.requests.lock().unwrap().push(request.clone());
        self.outcome.clone()
    }

    fn name(&self) -> &str {
        "mock-edge"
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Cloud backend with a scripted outcome and a credential switch.
pub struct MockCloud {
    configured: bool,
    outcome: BackendOutcome,
    calls: AtomicUsize,
}

impl MockCloud {
    pub fn new(outcome: BackendOutcome) -> Self {
        Self {
            configured: true,
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    /// Cloud without a credential. `generate` must never be reached.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            outcome: BackendOutcome::Unavailable("no credential".into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudBackend for MockCloud {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, _messages: &[Message], _tools: &[ToolSchema]) -> BackendOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
