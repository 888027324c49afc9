/*
 * depgraph-ir - Whole-program dependency analysis
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (value types, references, locations)
 * - features/    : Vertical slices (class model → program model → dependency → call graph)
 * - config/      : Presets, builder and YAML configuration
 *
 * The analyzer starts from entry points, discovers reachable classes, methods
 * and fields, and computes the runtime types that may flow into every value.
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Graph builder helpers take whole call sites
#![allow(clippy::type_complexity)] // Cached consumer groups per domain
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and constants
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{AnalysisMode, AnalyzerConfig, Preset};
pub use errors::{DepGraphError, Result};
pub use features::call_graph::{CallGraph, DefaultCallGraph};
pub use features::class_model::{
    ClassInfo, ClassModel, ClassSource, ElementModifier, FieldInfo, InMemoryClassSource,
    MethodInfo,
};
pub use features::dependency::{
    AnalysisStats, DependencyAnalyzer, DependencyInfo, DependencyListener, MethodDepId, NodeId,
    ValueDependencyInfo,
};
pub use features::diagnostics::{Diagnostics, Problem, Severity};
pub use features::program_model::{Instruction, Program, ProgramEmitter};
pub use shared::models::{
    CallLocation, FieldReference, MethodDescriptor, MethodReference, TextLocation, ValueType,
};
