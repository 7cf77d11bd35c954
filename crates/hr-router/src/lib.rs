//! Hybrid function-call router — library crate.
//!
//! Turns a user utterance plus a small tool set into validated function
//! calls. Cheap rule tiers run first; the on-device model and the cloud
//! model are consulted only when the rules fall short.

pub mod backend;
pub mod catalog;
pub mod complexity;
pub mod confidence;
pub mod config;
pub mod error;
pub mod router;
pub mod rules;
pub mod validate;

pub use backend::session::EdgeSession;
pub use backend::{BackendOutcome, BackendReply, CloudBackend, EdgeBackend};
pub use config::RouterConfig;
pub use error::{RouterError, RouterResult};
pub use router::HybridRouter;
pub use rules::RuleExtractor;
