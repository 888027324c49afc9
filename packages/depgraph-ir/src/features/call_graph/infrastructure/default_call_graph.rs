//! Default call graph
//!
//! Purely additive: sites are created when the analyzer links a call, a field or
//! a class from a reachable method body and never removed.

use crate::features::call_graph::domain::{
    CallGraphNode, CallSite, CallSiteId, ClassAccessSite, FieldAccessSite,
};
use crate::features::call_graph::ports::CallGraph;
use crate::shared::models::{FieldReference, MethodReference, TextLocation};
use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DefaultCallGraph {
    nodes: IndexMap<MethodReference, CallGraphNode>,
    sites: Vec<CallSite>,
    #[serde(skip)]
    direct_sites: FxHashMap<(MethodReference, MethodReference), CallSiteId>,
    #[serde(skip)]
    field_accesses: FxHashMap<FieldReference, Vec<FieldAccessSite>>,
}

impl DefaultCallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node for `method`, created on first request
    pub fn node_mut(&mut self, method: &MethodReference) -> &mut CallGraphNode {
        self.nodes
            .entry(method.clone())
            .or_insert_with(|| CallGraphNode::new(method.clone()))
    }

    /// Record a direct call. Returns `true` when the (caller, callee) edge is new;
    /// the location is recorded either way.
    pub fn add_call_site(
        &mut self,
        caller: &MethodReference,
        callee: &MethodReference,
        location: Option<TextLocation>,
    ) -> bool {
        let key = (caller.clone(), callee.clone());
        let (id, added) = match self.direct_sites.get(&key) {
            Some(id) => (*id, false),
            None => {
                let id = self.push_site(CallSite::direct(caller.clone(), callee.clone()));
                self.direct_sites.insert(key, id);
                self.node_mut(caller).call_sites.push(id);
                self.node_mut(callee).caller_call_sites.push(id);
                (id, true)
            }
        };
        if let Some(location) = location {
            self.sites[id.index()].add_location(location);
        }
        added
    }

    /// New coarse virtual site for `method`
    pub fn create_virtual_call_site(&mut self, method: &MethodReference) -> CallSiteId {
        self.push_site(CallSite::virtual_site(method.clone()))
    }

    /// Returns `true` when `caller` is new to the site
    pub fn add_virtual_caller(
        &mut self,
        site: CallSiteId,
        caller: &MethodReference,
        location: Option<TextLocation>,
    ) -> bool {
        let added = match &mut self.sites[site.index()] {
            CallSite::Virtual { callers, .. } => callers.insert(caller.clone()),
            CallSite::Direct { .. } => false,
        };
        if added {
            self.node_mut(caller).call_sites.push(site);
        }
        if let Some(location) = location {
            self.sites[site.index()].add_location(location);
        }
        added
    }

    /// Returns `true` when `callee` is new to the site
    pub fn add_virtual_callee(&mut self, site: CallSiteId, callee: &MethodReference) -> bool {
        let added = match &mut self.sites[site.index()] {
            CallSite::Virtual { callees, .. } => callees.insert(callee.clone()),
            CallSite::Direct { .. } => false,
        };
        if added {
            self.node_mut(callee).caller_call_sites.push(site);
        }
        added
    }

    /// Returns `true` when the (caller, field, location) access is new
    pub fn add_field_access(
        &mut self,
        caller: &MethodReference,
        field: &FieldReference,
        location: Option<TextLocation>,
    ) -> bool {
        let site = FieldAccessSite {
            caller: caller.clone(),
            field: field.clone(),
            location,
        };
        if !self.node_mut(caller).field_access_sites.insert(site.clone()) {
            return false;
        }
        self.field_accesses
            .entry(field.clone())
            .or_default()
            .push(site);
        true
    }

    /// Returns `true` when the (caller, class, location) access is new
    pub fn add_class_access(
        &mut self,
        caller: &MethodReference,
        class_name: &str,
        location: Option<TextLocation>,
    ) -> bool {
        let site = ClassAccessSite {
            caller: caller.clone(),
            class_name: class_name.to_string(),
            location,
        };
        self.node_mut(caller).class_access_sites.insert(site)
    }

    pub fn field_accesses(&self, field: &FieldReference) -> &[FieldAccessSite] {
        self.field_accesses
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn sites(&self) -> &[CallSite] {
        &self.sites
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Distinct (caller, callee) pairs in discovery order
    pub fn edges(&self) -> Vec<(&MethodReference, &MethodReference)> {
        let mut edges = Vec::new();
        for node in self.nodes.values() {
            for callee in self.callees(&node.method) {
                edges.push((&node.method, callee));
            }
        }
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges().len()
    }

    /// Export into a petgraph directed graph, one node per method
    pub fn to_graph(&self) -> DiGraph<MethodReference, ()> {
        let mut graph = DiGraph::new();
        let mut index: FxHashMap<&MethodReference, NodeIndex> = FxHashMap::default();
        for method in self.nodes.keys() {
            index.insert(method, graph.add_node(method.clone()));
        }
        for (caller, callee) in self.edges() {
            if let (Some(&from), Some(&to)) = (index.get(caller), index.get(callee)) {
                graph.add_edge(from, to, ());
            }
        }
        graph
    }

    /// Groups of mutually recursive methods, including methods calling themselves
    pub fn recursive_groups(&self) -> Vec<Vec<MethodReference>> {
        let graph = self.to_graph();
        tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut group: Vec<MethodReference> =
                    scc.into_iter().map(|idx| graph[idx].clone()).collect();
                group.sort();
                group
            })
            .collect()
    }
}

impl CallGraph for DefaultCallGraph {
    fn node(&self, method: &MethodReference) -> Option<&CallGraphNode> {
        self.nodes.get(method)
    }

    fn call_site(&self, id: CallSiteId) -> &CallSite {
        &self.sites[id.index()]
    }

    fn methods(&self) -> Vec<&MethodReference> {
        self.nodes.keys().collect()
    }
}

impl DefaultCallGraph {
    fn push_site(&mut self, site: CallSite) -> CallSiteId {
        self.sites.push(site);
        CallSiteId((self.sites.len() - 1) as u32)
    }
}
