//! Lifetime of the on-device model.
//!
//! The host builds one `EdgeSession` at startup and shares it (behind an
//! `Arc`) with every router. The model is constructed lazily on first use,
//! exactly once even under concurrent callers, and released exactly once:
//! explicitly via [`EdgeSession::release`] or when the session is dropped.

use std::sync::atomic::{AtomicBool, Ordering, fence};
use std::sync::{Arc, Mutex, OnceLock};

use crate::error::RouterResult;

use super::EdgeBackend;

type Init = Box<dyn FnOnce() -> RouterResult<Arc<dyn EdgeBackend>> + Send>;

/// Shared handle to the on-device backend.
pub struct EdgeSession {
    init: Mutex<Option<Init>>,
    /// `None` inside means initialization failed or the session is disabled.
    backend: OnceLock<Option<Arc<dyn EdgeBackend>>>,
    /// Session-level flag: no backend is handed out once set.
    released: AtomicBool,
    /// Backend-level guard: `EdgeBackend::release` has been called.
    backend_released: AtomicBool,
}

impl EdgeSession {
    /// Session that constructs its backend on first use.
    pub fn lazy<F>(init: F) -> Self
    where
        F: FnOnce() -> RouterResult<Arc<dyn EdgeBackend>> + Send + 'static,
    {
        Self::with_state(Some(Box::new(init)), OnceLock::new())
    }

    /// Session around an already-built backend.
    pub fn ready(backend: Arc<dyn EdgeBackend>) -> Self {
        Self::with_state(None, OnceLock::from(Some(backend)))
    }

    /// Session that never yields a backend.
    pub fn disabled() -> Self {
        Self::with_state(None, OnceLock::from(None))
    }

    fn with_state(init: Option<Init>, backend: OnceLock<Option<Arc<dyn EdgeBackend>>>) -> Self {
        Self {
            init: Mutex::new(init),
            backend,
            released: AtomicBool::new(false),
            backend_released: AtomicBool::new(false),
        }
    }

    /// The backend, initializing it on first call.
    ///
    /// `None` once released, when disabled, or when initialization failed.
    pub fn backend(&self) -> Option<Arc<dyn EdgeBackend>> {
        if self.is_released() {
            return None;
        }
        let backend = self
            .backend
            .get_or_init(|| self.initialize())
            .as_ref()
            .map(Arc::clone)?;

        // Pairs with the fence in `release`: at least one side sees the other.
        // `release_backend` runs the backend's release at most once.
        fence(Ordering::SeqCst);
        if self.is_released() {
            tracing::debug!("edge session released during initialization");
            self.release_backend(&backend);
            return None;
        }
        Some(backend)
    }

    fn initialize(&self) -> Option<Arc<dyn EdgeBackend>> {
        let init = self.init.lock().ok()?.take()?;
        match init() {
            Ok(backend) => {
                tracing::info!(backend = backend.name(), "edge backend initialized");
                Some(backend)
            }
            Err(e) => {
                tracing::warn!(error = %e, "edge backend failed to initialize");
                None
            }
        }
    }

    /// Release the backend. Idempotent; only the first call does anything.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        fence(Ordering::SeqCst);
        if let Some(Some(backend)) = self.backend.get() {
            self.release_backend(backend);
        }
    }

    fn release_backend(&self, backend: &Arc<dyn EdgeBackend>) {
        if self.backend_released.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!(backend = backend.name(), "releasing edge backend");
        backend.release();
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl Drop for EdgeSession {
    fn drop(&mut self) {
        self.release();
    }
}
