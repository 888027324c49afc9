//! Application layer for the dependency engine
//!
//! The analyzer facade, its node strategies and the read-only result views.

pub mod analyzer;
pub mod queries;
pub mod strategy;

pub use analyzer::DependencyAnalyzer;
pub use queries::ValueDependencyInfo;
pub use strategy::{DispatchStrategy, FastNodes, FastVirtualCall};
