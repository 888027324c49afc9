//! Diagnostics
//!
//! Recoverable problems reported by the dependency analyzer.

pub mod domain;

pub use domain::{Diagnostics, Problem, Severity};
