//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure data types (no engine dependencies)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - Implementations

pub mod call_graph;
pub mod class_model;
pub mod diagnostics;
pub mod program_model;

// Whole-program reachability and type propagation
pub mod dependency;
