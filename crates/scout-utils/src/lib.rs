//! Shared utilities for stockscout
//!
//! Currently this crate only hosts the tracing/logging setup used by the
//! binaries and integration tests.

pub mod logging;

pub use logging::init_tracing;
