//! Dependency records: symbols bound to their nodes and reachability flags

use super::node::NodeId;
use crate::shared::models::{FieldReference, MethodReference, ValueType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MethodDepId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldDepId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassDepId(pub u32);

macro_rules! impl_index {
    ($($ty:ty),*) => {
        $(impl $ty {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        })*
    };
}

impl_index!(MethodDepId, FieldDepId, ClassDepId);

/// A linked method
#[derive(Debug, Clone)]
pub struct MethodDependency {
    pub reference: MethodReference,
    /// `this`, the parameters, then the remaining program variables once the
    /// body has been analysed
    pub(crate) variables: Vec<NodeId>,
    /// Number of leading `variables` that are `this` plus parameters
    pub(crate) parameter_count: usize,
    pub(crate) result: Option<NodeId>,
    pub(crate) thrown: NodeId,
    pub(crate) missing: bool,
    pub(crate) used: bool,
}

impl MethodDependency {
    pub fn reference(&self) -> &MethodReference {
        &self.reference
    }

    /// `this` is variable 0, parameter `i` is variable `i + 1`
    pub fn variable(&self, index: usize) -> Option<NodeId> {
        self.variables.get(index).copied()
    }

    pub fn variables(&self) -> &[NodeId] {
        &self.variables
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    /// `None` for void methods
    pub fn result(&self) -> Option<NodeId> {
        self.result
    }

    pub fn thrown(&self) -> NodeId {
        self.thrown
    }

    /// The class source has no such method
    pub fn is_missing(&self) -> bool {
        self.missing
    }

    /// Body analysis was requested
    pub fn is_used(&self) -> bool {
        self.used
    }
}

/// A linked field
#[derive(Debug, Clone)]
pub struct FieldDependency {
    pub reference: FieldReference,
    pub field_type: Option<ValueType>,
    pub(crate) value: NodeId,
    pub(crate) missing: bool,
}

impl FieldDependency {
    pub fn reference(&self) -> &FieldReference {
        &self.reference
    }

    pub fn value(&self) -> NodeId {
        self.value
    }

    pub fn is_missing(&self) -> bool {
        self.missing
    }
}

/// A linked class
#[derive(Debug, Clone)]
pub struct ClassDependency {
    pub class_name: String,
    pub(crate) missing: bool,
    pub(crate) initialized: bool,
}

impl ClassDependency {
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn is_missing(&self) -> bool {
        self.missing
    }

    /// Static initialisation was scheduled
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Symbol that could not be found, reported once per location at completion
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MissingItem {
    Class(String),
    Method(MethodReference),
    Field(FieldReference),
}

impl MissingItem {
    pub fn message(&self) -> String {
        match self {
            MissingItem::Class(name) => format!("Class {} was not found", name),
            MissingItem::Method(method) => format!("Method {} was not found", method),
            MissingItem::Field(field) => format!("Field {} was not found", field),
        }
    }
}
