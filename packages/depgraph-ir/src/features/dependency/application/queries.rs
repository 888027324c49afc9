//! Result queries
//!
//! Read-only views over a finished (or interrupted) analysis. Type queries
//! honour each node's declared type, so two nodes sharing a domain may answer
//! differently.

use super::analyzer::DependencyAnalyzer;
use crate::features::call_graph::DefaultCallGraph;
use crate::features::class_model::ClassSource;
use crate::features::dependency::domain::{
    ClassDependency, FieldDependency, MethodDependency, NodeId, TypeIndex,
};
use crate::features::dependency::ports::DependencyInfo;
use crate::shared::models::{FieldReference, MethodReference};

impl DependencyInfo for DependencyAnalyzer {
    fn reachable_methods(&self) -> Vec<&MethodReference> {
        self.methods.keys().collect()
    }

    fn reachable_fields(&self) -> Vec<&FieldReference> {
        self.fields.keys().collect()
    }

    fn reachable_classes(&self) -> Vec<&str> {
        self.classes.keys().map(String::as_str).collect()
    }

    fn get_method(&self, method: &MethodReference) -> Option<&MethodDependency> {
        self.methods.get(method)
    }

    fn get_method_implementation(&self, method: &MethodReference) -> Option<&MethodDependency> {
        let resolved = self
            .class_source
            .resolve_implementation(method)
            .unwrap_or_else(|| method.clone());
        self.methods.get(&resolved)
    }

    fn get_field(&self, field: &FieldReference) -> Option<&FieldDependency> {
        let resolved = self
            .class_source
            .resolve_field(field)
            .unwrap_or_else(|| field.clone());
        self.fields.get(&resolved)
    }

    fn get_class(&self, class_name: &str) -> Option<&ClassDependency> {
        self.classes.get(class_name)
    }

    fn call_graph(&self) -> &DefaultCallGraph {
        &self.call_graph
    }
}

impl DependencyAnalyzer {
    /// Type view of one node
    pub fn value(&self, node: NodeId) -> ValueDependencyInfo<'_> {
        ValueDependencyInfo {
            analyzer: self,
            node,
        }
    }
}

/// Types that may flow into one program value
#[derive(Clone, Copy)]
pub struct ValueDependencyInfo<'a> {
    analyzer: &'a DependencyAnalyzer,
    node: NodeId,
}

impl<'a> ValueDependencyInfo<'a> {
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Type indices accepted by the node, in insertion order
    pub fn type_indices(&self) -> Vec<TypeIndex> {
        let analyzer = self.analyzer;
        let Some(domain) = analyzer.nodes[self.node.index()].domain else {
            return Vec::new();
        };
        analyzer.domains[domain.index()]
            .types()
            .to_vec()
            .into_iter()
            .filter(|ty| analyzer.accepts(self.node, *ty))
            .collect()
    }

    /// Type names accepted by the node, in insertion order
    pub fn types(&self) -> Vec<&'a str> {
        let registry = &self.analyzer.types;
        self.type_indices()
            .into_iter()
            .map(|ty| registry.name(ty))
            .collect()
    }

    pub fn has_type(&self, name: &str) -> bool {
        let analyzer = self.analyzer;
        let Some(ty) = analyzer.types.lookup(name) else {
            return false;
        };
        analyzer.contains_type(self.node, ty) && analyzer.accepts(self.node, ty)
    }

    pub fn has_array_type(&self) -> bool {
        self.type_indices()
            .into_iter()
            .any(|ty| self.analyzer.types.is_array(ty))
    }

    pub fn has_more_types_than(&self, limit: usize) -> bool {
        self.type_indices().len() > limit
    }

    pub fn is_empty(&self) -> bool {
        self.type_indices().is_empty()
    }

    /// Item node, if one was ever created for this value
    pub fn array_item(&self) -> Option<ValueDependencyInfo<'a>> {
        let item = self.analyzer.nodes[self.node.index()].array_item?;
        Some(self.analyzer.value(item))
    }

    /// Class value node, if one was ever created for this value
    pub fn class_value_node(&self) -> Option<ValueDependencyInfo<'a>> {
        let class_value = self.analyzer.nodes[self.node.index()].class_value?;
        Some(self.analyzer.value(class_value))
    }

    pub fn tag(&self) -> Option<&'a str> {
        self.analyzer.nodes[self.node.index()].tag.as_deref()
    }
}

impl std::fmt::Debug for ValueDependencyInfo<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueDependencyInfo")
            .field("node", &self.node)
            .field("types", &self.types())
            .finish()
    }
}
