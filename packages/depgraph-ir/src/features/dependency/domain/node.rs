//! Dependency nodes: the points-to set of one program value

use super::filter::FilterId;
use super::transition::TransitionId;
use super::type_domain::DomainId;
use crate::features::dependency::ports::ConsumerId;
use crate::shared::models::ValueType;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a node in the analyzer's node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DependencyNode {
    /// Declared type of the value; `None` accepts everything
    pub type_filter: Option<ValueType>,
    pub(crate) filter: Option<FilterId>,
    /// Type set shared with the other members of the domain
    pub(crate) domain: Option<DomainId>,
    /// Outgoing transitions keyed by destination
    pub(crate) transitions: FxHashMap<NodeId, TransitionId>,
    pub(crate) transition_list: Vec<TransitionId>,
    pub(crate) consumers: Vec<ConsumerId>,
    pub(crate) array_item: Option<NodeId>,
    pub(crate) class_value: Option<NodeId>,
    /// Set on class value nodes: the node whose `Class` objects this node describes
    pub(crate) class_node_parent: Option<NodeId>,
    /// Nesting depth below a program value (array items, class values)
    pub(crate) degree: u32,
    /// An array type reached this node; array item nodes are wired across transitions
    pub(crate) has_array: bool,
    /// `java.lang.Class` reached this node; class value nodes are wired across transitions
    pub(crate) has_class: bool,
    pub(crate) locked: bool,
    pub tag: Option<String>,
    pub(crate) split_count: u32,
    pub(crate) propagate_count: u32,
}

impl DependencyNode {
    pub fn new(type_filter: Option<ValueType>) -> Self {
        Self {
            type_filter,
            ..Self::default()
        }
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn split_count(&self) -> u32 {
        self.split_count
    }

    pub fn propagate_count(&self) -> u32 {
        self.propagate_count
    }

    /// Whether array item nodes may be shared with a node of `other` filter
    pub(crate) fn array_compatible(filter: Option<&ValueType>) -> bool {
        match filter {
            None => true,
            Some(ty) => ty.is_array() || ty.is_object(crate::shared::constants::classes::OBJECT),
        }
    }
}
