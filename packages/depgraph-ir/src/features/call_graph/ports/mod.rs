//! Read access to a call graph

use crate::features::call_graph::domain::{CallGraphNode, CallSite, CallSiteId};
use crate::shared::models::MethodReference;

pub trait CallGraph {
    /// Node of a method that was reached, if any
    fn node(&self, method: &MethodReference) -> Option<&CallGraphNode>;

    fn call_site(&self, id: CallSiteId) -> &CallSite;

    /// Reached methods in discovery order
    fn methods(&self) -> Vec<&MethodReference>;

    /// Distinct methods called from `method`, in discovery order
    fn callees(&self, method: &MethodReference) -> Vec<&MethodReference> {
        let Some(node) = self.node(method) else {
            return Vec::new();
        };
        let mut result: Vec<&MethodReference> = Vec::new();
        for id in &node.call_sites {
            for callee in self.call_site(*id).callees() {
                if !result.contains(&callee) {
                    result.push(callee);
                }
            }
        }
        result
    }

    /// Distinct methods calling `method`, in discovery order
    fn callers(&self, method: &MethodReference) -> Vec<&MethodReference> {
        let Some(node) = self.node(method) else {
            return Vec::new();
        };
        let mut result: Vec<&MethodReference> = Vec::new();
        for id in &node.caller_call_sites {
            for caller in self.call_site(*id).callers() {
                if !result.contains(&caller) {
                    result.push(caller);
                }
            }
        }
        result
    }
}
