//! Class source implementations

pub mod dependency_source;
pub mod memory_source;

pub use dependency_source::DependencyClassSource;
pub use memory_source::{ClassModel, InMemoryClassSource};
