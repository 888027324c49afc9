//! Consumers: observers attached to a node

use crate::features::dependency::application::DependencyAnalyzer;
use crate::features::dependency::domain::TypeIndex;
use serde::{Deserialize, Serialize};

/// Handle of a registered consumer.
///
/// Attaching the same handle to a node twice is a no-op, so a consumer shared
/// by several nodes (an exception handler table, for instance) is registered
/// once and attached by handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsumerId(pub u32);

impl ConsumerId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Reacts to every type a node commits, including types committed before the
/// consumer was attached.
pub trait DependencyConsumer {
    fn consume(&mut self, analyzer: &mut DependencyAnalyzer, ty: TypeIndex);
}

impl<F> DependencyConsumer for F
where
    F: FnMut(&mut DependencyAnalyzer, TypeIndex),
{
    fn consume(&mut self, analyzer: &mut DependencyAnalyzer, ty: TypeIndex) {
        self(analyzer, ty)
    }
}
