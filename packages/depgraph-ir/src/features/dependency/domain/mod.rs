//! Dependency engine domain types

pub mod filter;
pub mod node;
pub mod records;
pub mod stats;
pub mod transition;
pub mod type_domain;
pub mod type_registry;
pub mod type_set;

pub use filter::{FilterId, SuperClassFilter};
pub use node::{DependencyNode, NodeId};
pub use records::{
    ClassDepId, ClassDependency, FieldDepId, FieldDependency, MethodDepId, MethodDependency,
    MissingItem,
};
pub use stats::AnalysisStats;
pub use transition::{Transition, TransitionId};
pub use type_domain::{DomainId, TypeDomain};
pub use type_registry::{DependencyType, TypeIndex, TypeRegistry};
pub use type_set::TypeSet;
