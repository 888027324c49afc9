//! Shared module - Common types and utilities
//!
//! Symbol references, value types and locations used by every feature.
//! No dependency on the analysis engine itself.

pub mod constants;
pub mod models;

// Re-exports for convenience
pub use models::*;

use rustc_hash::FxBuildHasher;

/// Insertion-ordered set with the Fx hasher
pub type FxIndexSet<T> = indexmap::IndexSet<T, FxBuildHasher>;

/// Insertion-ordered map with the Fx hasher
pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, FxBuildHasher>;
