//! Engine internals
//!
//! Each module adds one group of operations to
//! [`DependencyAnalyzer`](crate::features::dependency::application::DependencyAnalyzer):
//! type propagation and domains, linking, dispatch, body analysis and the
//! task scheduler that drives them to a fixed point.

pub(crate) mod domain_merge;
pub(crate) mod dynamic_call;
pub(crate) mod events;
pub(crate) mod fast_graph_builder;
pub(crate) mod graph_builder;
pub(crate) mod linker;
pub(crate) mod propagation;
pub(crate) mod reference_resolver;
pub(crate) mod scheduler;
pub(crate) mod virtual_call;
