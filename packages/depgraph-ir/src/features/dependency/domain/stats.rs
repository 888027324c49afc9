//! Analysis statistics

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub types: usize,
    pub nodes: usize,
    pub transitions: usize,
    pub domains: usize,
    /// Successful type additions
    pub propagations: usize,
    pub domain_merges: usize,
    pub domain_splits: usize,
    pub tasks: usize,
    pub deferred_tasks: usize,
    pub reachable_methods: usize,
    pub reachable_fields: usize,
    pub reachable_classes: usize,
    pub duration_ms: f64,
}
