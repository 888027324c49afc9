//! Read-only view of analysis results

use crate::features::call_graph::DefaultCallGraph;
use crate::features::dependency::domain::{ClassDependency, FieldDependency, MethodDependency};
use crate::shared::models::{FieldReference, MethodReference};

pub trait DependencyInfo {
    /// Every linked method, in discovery order, missing ones included
    fn reachable_methods(&self) -> Vec<&MethodReference>;

    fn reachable_fields(&self) -> Vec<&FieldReference>;

    fn reachable_classes(&self) -> Vec<&str>;

    fn get_method(&self, method: &MethodReference) -> Option<&MethodDependency>;

    /// Dependency of the implementation a call to `method` runs
    fn get_method_implementation(&self, method: &MethodReference) -> Option<&MethodDependency>;

    fn get_field(&self, field: &FieldReference) -> Option<&FieldDependency>;

    fn get_class(&self, class_name: &str) -> Option<&ClassDependency>;

    fn call_graph(&self) -> &DefaultCallGraph;
}
