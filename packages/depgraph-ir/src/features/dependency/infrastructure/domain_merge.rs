//! Domain splitting and merging
//!
//! Nodes connected by unfiltered edges whose destination accepts no more than
//! the source end up holding the same types, so they share one [`TypeDomain`].
//! A member that must receive a type on its own is first split off together
//! with everything that follows it; a transition whose destination domain is
//! covered by the source domain absorbs the destination instead of copying.

use crate::features::dependency::application::DependencyAnalyzer;
use crate::features::dependency::domain::{DomainId, NodeId, TransitionId, TypeDomain, TypeIndex};
use crate::features::dependency::ports::ConsumerId;
use crate::shared::constants::classes;
use crate::shared::FxIndexSet;
use tracing::trace;

/// Move every member of `from` into `into`
#[derive(Debug, Clone, Copy)]
pub(crate) struct MergeAction {
    pub from: DomainId,
    pub into: DomainId,
}

impl DependencyAnalyzer {
    /// Give `node` a domain of its own (shared only with the nodes that must
    /// follow it) before types are added to it
    pub(crate) fn move_to_separate_domain(&mut self, node: NodeId) {
        let Some(current) = self.nodes[node.index()].domain else {
            let members = self.find_domain(node);
            let id = DomainId(self.domains.len() as u32);
            let mut domain = TypeDomain::new(node);
            for member in members {
                self.nodes[member.index()].domain = Some(id);
                domain.members.insert(member);
            }
            self.domains.push(domain);
            return;
        };

        let origin = self.domains[current.index()].origin;
        if origin == node {
            return;
        }
        let members = self.find_domain(node);
        if members.contains(&origin) {
            return;
        }

        let id = DomainId(self.domains.len() as u32);
        let old = &mut self.domains[current.index()];
        for member in &members {
            old.members.swap_remove(member);
        }
        old.invalidate();
        let mut split = old.copy_for(node);
        for member in members {
            let n = &mut self.nodes[member.index()];
            n.domain = Some(id);
            n.split_count += 1;
            split.members.insert(member);
        }
        self.domains.push(split);
        self.stats.domain_splits += 1;
    }

    /// Nodes reachable from `node` over unfiltered transitions into narrower
    /// nodes of the same domain, `node` first
    fn find_domain(&mut self, node: NodeId) -> FxIndexSet<NodeId> {
        let mut visited = FxIndexSet::default();
        if !self.config.domain_merging {
            visited.insert(node);
            return visited;
        }

        let domain = self.nodes[node.index()].domain;
        let limit = self.config.domain_search_limit;
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if visited.len() >= limit {
                break;
            }
            let transitions = self.nodes[current.index()].transition_list.clone();
            for transition in transitions {
                let t = &self.transitions[transition.index()];
                let destination = t.destination;
                if t.filter.is_some()
                    || visited.contains(&destination)
                    || self.nodes[destination.index()].domain != domain
                {
                    continue;
                }
                if self.dest_subset_of_src(transition) {
                    stack.push(destination);
                }
            }
        }
        visited
    }

    /// Whether every type the destination accepts is accepted by the source
    fn dest_subset_of_src(&mut self, transition: TransitionId) -> bool {
        let t = &self.transitions[transition.index()];
        if let Some(known) = t.dest_subset_of_src {
            return known;
        }
        let source = self.nodes[t.source.index()].type_filter.clone();
        let destination = self.nodes[t.destination.index()].type_filter.clone();
        let subset = match (source, destination) {
            (None, _) => true,
            (Some(source), None) => source.is_object(classes::OBJECT),
            (Some(source), Some(destination)) => self
                .class_source
                .cached_is_super_type(&source.type_name(), &destination.type_name()),
        };
        self.transitions[transition.index()].dest_subset_of_src = Some(subset);
        subset
    }

    pub(crate) fn should_merge_domains(&mut self, transition: TransitionId) -> bool {
        if !self.config.domain_merging || self.transitions[transition.index()].filter.is_some() {
            return false;
        }
        if !self.dest_subset_of_src(transition) {
            return false;
        }

        let t = &self.transitions[transition.index()];
        let Some(source_domain) = self.nodes[t.source.index()].domain else {
            return false;
        };
        let Some(destination_domain) = self.nodes[t.destination.index()].domain else {
            return true;
        };
        if source_domain == destination_domain
            || self.domains[destination_domain.index()].origin == t.source
        {
            return false;
        }

        let source_types = &self.domains[source_domain.index()].types;
        let destination_types = &self.domains[destination_domain.index()].types;
        destination_types.len() <= source_types.len()
            && destination_types
                .to_vec()
                .into_iter()
                .all(|ty| source_types.contains(ty))
    }

    /// Absorb the destination's domain into the source's, delivering `types`
    /// to whatever the destination domain was wired to
    pub(crate) fn merge_domains(&mut self, transition: TransitionId, types: &[TypeIndex]) {
        let t = &self.transitions[transition.index()];
        let (source, destination) = (t.source, t.destination);
        self.move_to_separate_domain(destination);
        let (Some(into), Some(from)) = (
            self.nodes[source.index()].domain,
            self.nodes[destination.index()].domain,
        ) else {
            return;
        };
        if into == from {
            return;
        }

        if self.config.log_dependencies {
            trace!(
                "Merging domain of {} into domain of {}",
                self.node_label(destination),
                self.node_label(source)
            );
        }
        self.stats.domain_merges += 1;
        self.schedule_types(destination, types, Some(MergeAction { from, into }));
    }

    pub(crate) fn apply_merge(&mut self, merge: MergeAction) {
        let members = std::mem::take(&mut self.domains[merge.from.index()].members);
        for member in members {
            self.nodes[member.index()].domain = Some(merge.into);
            self.domains[merge.into.index()].members.insert(member);
        }
        let from = &mut self.domains[merge.from.index()];
        from.types = Default::default();
        from.invalidate();
        self.domains[merge.into.index()].invalidate();
    }

    /// Transitions leaving the domain, cached until the domain changes
    pub(crate) fn domain_transitions(&mut self, domain: DomainId) -> Vec<TransitionId> {
        if let Some(cached) = &self.domains[domain.index()].transitions {
            return cached.clone();
        }
        let mut result = Vec::new();
        for member in self.domains[domain.index()].members() {
            for &transition in &self.nodes[member.index()].transition_list {
                let destination = self.transitions[transition.index()].destination;
                if self.nodes[destination.index()].domain != Some(domain) {
                    result.push(transition);
                }
            }
        }
        self.domains[domain.index()].transitions = Some(result.clone());
        result
    }

    /// Consumers of the domain's members, grouped by member
    pub(crate) fn domain_consumers(&mut self, domain: DomainId) -> Vec<(NodeId, Vec<ConsumerId>)> {
        if let Some(cached) = &self.domains[domain.index()].consumers {
            return cached.clone();
        }
        let result: Vec<(NodeId, Vec<ConsumerId>)> = self.domains[domain.index()]
            .members()
            .filter_map(|member| {
                let consumers = &self.nodes[member.index()].consumers;
                (!consumers.is_empty()).then(|| (member, consumers.clone()))
            })
            .collect();
        self.domains[domain.index()].consumers = Some(result.clone());
        result
    }
}
