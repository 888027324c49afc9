//! Directed, optionally filtered edges between nodes

use super::filter::FilterId;
use super::node::NodeId;
use super::type_registry::TypeIndex;
use crate::shared::FxIndexSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionId(pub u32);

impl TransitionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub source: NodeId,
    pub destination: NodeId,
    pub filter: Option<FilterId>,
    /// Negative cache of types the filter rejected
    pub(crate) known_filtered_off: SmallVec<[TypeIndex; 4]>,
    /// `None` until computed: whether every type the destination accepts the source accepts too
    pub(crate) dest_subset_of_src: Option<bool>,
    /// Types waiting for the transition queue; `Some` while queued
    pub(crate) pending_types: Option<FxIndexSet<TypeIndex>>,
}

impl Transition {
    pub fn new(source: NodeId, destination: NodeId, filter: Option<FilterId>) -> Self {
        Self {
            source,
            destination,
            filter,
            known_filtered_off: SmallVec::new(),
            dest_subset_of_src: None,
            pending_types: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_types.is_some()
    }
}
