//! # Dependency Analysis
//!
//! Whole-program reachability and points-to analysis. Every program value is
//! a node holding the set of runtime types that may flow into it; edges copy
//! types forward through optional class filters, and consumers attached to
//! nodes react to each new type (virtual dispatch, exception routing).
//! Reaching a method builds the graph of its body, so the analysis discovers
//! reachable code and value types together until a fixed point.
//!
//! ## Layout
//! - `domain`: nodes, transitions, type domains, type sets and symbol records
//! - `ports`: consumers, listeners, plugins, substitutors, interruptors, queries
//! - `infrastructure`: propagation, domain merging, linking, dispatch and the
//!   per-method graph builders
//! - `application`: [`DependencyAnalyzer`] facade and result queries

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{DependencyAnalyzer, DispatchStrategy, FastNodes, ValueDependencyInfo};
pub use domain::{
    AnalysisStats, ClassDependency, FieldDependency, MethodDepId, MethodDependency, MissingItem,
    NodeId, TypeIndex,
};
pub use ports::{
    AnalysisInterruptor, BootstrapMethodSubstitutor, CancellationFlag, ConsumerId,
    DependencyConsumer, DependencyInfo, DependencyListener, DependencyPlugin, DynamicCallSite,
};
