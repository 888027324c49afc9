//! Domains: nodes sharing one physical type set
//!
//! A domain is created by the first propagation into a node and absorbs every
//! node that provably always holds the same types (unfiltered edges into a
//! destination whose declared type is no wider than the source's). Domains split
//! when a member has to diverge and merge along such edges.

use super::node::NodeId;
use super::transition::TransitionId;
use super::type_set::TypeSet;
use crate::features::dependency::ports::ConsumerId;
use crate::shared::FxIndexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(pub u32);

impl DomainId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct TypeDomain {
    pub(crate) types: TypeSet,
    /// Node that created (or split off) this domain
    pub(crate) origin: NodeId,
    pub(crate) members: FxIndexSet<NodeId>,
    /// Outgoing transitions of all members leaving the domain
    pub(crate) transitions: Option<Vec<TransitionId>>,
    /// Consumers of all members, grouped by member
    pub(crate) consumers: Option<Vec<(NodeId, Vec<ConsumerId>)>>,
}

impl TypeDomain {
    pub fn new(origin: NodeId) -> Self {
        Self {
            types: TypeSet::new(),
            origin,
            members: FxIndexSet::default(),
            transitions: None,
            consumers: None,
        }
    }

    /// Same types, new origin, no members
    pub fn copy_for(&self, origin: NodeId) -> Self {
        Self {
            types: self.types.clone(),
            ..Self::new(origin)
        }
    }

    pub fn types(&self) -> &TypeSet {
        &self.types
    }

    pub fn origin(&self) -> NodeId {
        self.origin
    }

    pub fn members(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }

    pub(crate) fn invalidate(&mut self) {
        self.transitions = None;
        self.consumers = None;
    }
}
