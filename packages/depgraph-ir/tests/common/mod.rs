//! Common test utilities for depgraph-ir
//!
//! Shared class models, program builders and assertions for the integration
//! and property tests.

#![allow(dead_code)]

pub mod builders;
pub mod fixtures;

// Re-export all utilities
pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
