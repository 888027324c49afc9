//! Class model
//!
//! Symbol table consumed by the dependency analyzer: classes with their parent,
//! interfaces, fields and methods, plus hierarchy queries.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{ClassInfo, ElementModifier, FieldInfo, MethodInfo};
pub use infrastructure::{ClassModel, DependencyClassSource, InMemoryClassSource};
pub use ports::ClassSource;
