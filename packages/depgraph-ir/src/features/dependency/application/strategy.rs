//! Node granularity strategies
//!
//! Precise analysis gives every value its own node. Fast analysis collapses all
//! object values into one instances node and all class values into one classes
//! node, dispatching virtual calls against per-class subtype views of the
//! instances node.

use crate::features::call_graph::CallSiteId;
use crate::features::dependency::domain::NodeId;
use crate::features::dependency::ports::ConsumerId;
use crate::shared::models::MethodReference;
use rustc_hash::FxHashMap;

#[derive(Debug)]
pub enum DispatchStrategy {
    Precise,
    Fast(FastNodes),
}

impl DispatchStrategy {
    pub fn is_fast(&self) -> bool {
        matches!(self, DispatchStrategy::Fast(_))
    }

    pub(crate) fn fast_nodes(&self) -> Option<&FastNodes> {
        match self {
            DispatchStrategy::Fast(nodes) => Some(nodes),
            DispatchStrategy::Precise => None,
        }
    }

    pub(crate) fn fast_nodes_mut(&mut self) -> Option<&mut FastNodes> {
        match self {
            DispatchStrategy::Fast(nodes) => Some(nodes),
            DispatchStrategy::Precise => None,
        }
    }
}

#[derive(Debug)]
pub struct FastNodes {
    /// Every object value of the program
    pub instances: NodeId,
    /// Every class value of the program
    pub classes: NodeId,
    /// Instances filtered to one class and its subtypes
    pub(crate) subtype_nodes: FxHashMap<String, NodeId>,
    /// One coarse virtual call per called method
    pub(crate) virtual_calls: FxHashMap<MethodReference, FastVirtualCall>,
}

impl FastNodes {
    pub fn new(instances: NodeId, classes: NodeId) -> Self {
        Self {
            instances,
            classes,
            subtype_nodes: FxHashMap::default(),
            virtual_calls: FxHashMap::default(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FastVirtualCall {
    pub consumer: ConsumerId,
    pub site: CallSiteId,
}
