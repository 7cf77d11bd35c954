//! End-to-end tests for the hybrid router live under `tests/`.
//!
//! This crate has no library code of its own.
