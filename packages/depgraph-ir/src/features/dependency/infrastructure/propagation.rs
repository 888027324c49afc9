//! Type propagation
//!
//! Nodes, edges and the monotone flow of types across them. A type added to a
//! node is committed to the node's domain, then fanned out to every transition
//! leaving the domain and every consumer attached to a member, in that order.
//!
//! Array item and class value nodes are wired lazily: a node's item node is
//! connected across its outgoing transitions only once an array type has
//! reached the node, and likewise for class values and `java.lang.Class`.

use crate::features::class_model::ClassSource;
use crate::features::dependency::application::DependencyAnalyzer;
use crate::features::dependency::domain::{
    DependencyNode, FilterId, NodeId, SuperClassFilter, Transition, TransitionId, TypeIndex,
};
use crate::features::dependency::infrastructure::domain_merge::MergeAction;
use crate::features::dependency::ports::ConsumerId;
use crate::shared::constants::classes;
use crate::shared::models::ValueType;
use tracing::{trace, warn};

impl DependencyAnalyzer {
    /// New node accepting subtypes of `type_filter`, or everything if `None`
    pub fn create_node(&mut self, type_filter: Option<ValueType>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(DependencyNode::new(type_filter));
        id
    }

    /// Attach a debug tag; the label is only built when tagging is enabled
    pub(crate) fn tag_node(&mut self, node: NodeId, tag: impl FnOnce() -> String) {
        if !self.config.should_tag() {
            return;
        }
        let node = &mut self.nodes[node.index()];
        if node.tag.is_none() {
            node.tag = Some(tag());
        }
    }

    /// Add one type to a node
    pub fn propagate(&mut self, node: NodeId, ty: TypeIndex) {
        self.propagate_types(node, &[ty]);
    }

    /// Add a batch of types to a node; types already present or rejected by
    /// the node's filter are skipped
    pub fn propagate_types(&mut self, node: NodeId, types: &[TypeIndex]) {
        if self.nodes[node.index()].degree as usize > self.config.array_degree_limit {
            return;
        }

        let mut fresh: Vec<TypeIndex> = Vec::with_capacity(types.len());
        for &ty in types {
            if !fresh.contains(&ty) && !self.contains_type(node, ty) && self.node_filter(node, ty) {
                fresh.push(ty);
            }
        }
        if fresh.is_empty() {
            return;
        }

        if self.nodes[node.index()].locked {
            warn!(
                node = %node,
                tag = ?self.nodes[node.index()].tag,
                count = fresh.len(),
                "Types added to locked node ignored"
            );
            return;
        }

        self.nodes[node.index()].propagate_count += 1;
        self.stats.propagations += fresh.len();
        self.move_to_separate_domain(node);
        let Some(domain) = self.nodes[node.index()].domain else {
            return;
        };
        let limit = self.config.small_type_set_limit;
        self.domains[domain.index()].types.extend(&fresh, limit);
        self.schedule_types(node, &fresh, None);
    }

    /// Unfiltered edge `from -> to`
    pub fn connect(&mut self, from: NodeId, to: NodeId) {
        self.connect_filtered(from, to, None);
    }

    /// Edge `from -> to` letting through only subtypes of `filter`.
    ///
    /// Self edges and duplicates are ignored. Types already at `from` flow
    /// immediately.
    pub fn connect_filtered(&mut self, from: NodeId, to: NodeId, filter: Option<FilterId>) {
        if from == to || self.nodes[from.index()].transitions.contains_key(&to) {
            return;
        }
        let transition = TransitionId(self.transitions.len() as u32);
        self.transitions.push(Transition::new(from, to, filter));
        let source = &mut self.nodes[from.index()];
        source.transitions.insert(to, transition);
        source.transition_list.push(transition);

        if self.config.log_dependencies {
            trace!(
                "Connecting {} to {}",
                self.node_label(from),
                self.node_label(to)
            );
        }

        if let Some(domain) = self.nodes[from.index()].domain {
            self.domains[domain.index()].invalidate();
            if self.nodes[to.index()].domain != Some(domain) {
                let types = self.types_for_transition(transition);
                if !types.is_empty() {
                    if self.nodes[to.index()].domain.is_none() {
                        self.propagate_types(to, &types);
                    } else {
                        self.schedule_transition(transition, &types);
                    }
                }
            }
        }

        if self.nodes[from.index()].has_array {
            self.connect_array_item_nodes(from, to);
        }
        if self.nodes[from.index()].has_class {
            if let Some(class_value) = self.wirable_class_value(from) {
                self.connect_class_value(class_value, transition);
            }
        }
    }

    /// Attach a registered consumer to a node; it immediately receives every
    /// type the node already holds
    pub fn add_consumer(&mut self, node: NodeId, consumer: ConsumerId) {
        let n = &mut self.nodes[node.index()];
        if n.consumers.contains(&consumer) {
            return;
        }
        n.consumers.push(consumer);
        let Some(domain) = n.domain else {
            return;
        };
        self.domains[domain.index()].consumers = None;
        let types = self.node_types(node);
        self.schedule_consumer(consumer, types);
    }

    /// Node holding the elements of arrays reaching `node`
    pub fn array_item(&mut self, node: NodeId) -> NodeId {
        if let Some(item) = self.nodes[node.index()].array_item {
            return item;
        }
        let item = match self.strategy.fast_nodes().map(|fast| fast.instances) {
            Some(shared) => shared,
            None => {
                let parent = &self.nodes[node.index()];
                let filter = parent
                    .type_filter
                    .as_ref()
                    .and_then(ValueType::item_type)
                    .filter(|item| !item.is_object(classes::OBJECT))
                    .cloned();
                let degree = parent.degree + 1;
                let item = self.create_node(filter);
                self.nodes[item.index()].degree = degree;
                if self.config.should_tag() {
                    self.nodes[item.index()].tag = Some(format!("{}[", self.node_label(node)));
                }
                item
            }
        };
        self.nodes[node.index()].array_item = Some(item);
        if self.nodes[node.index()].has_array {
            self.wire_array_items(node);
        }
        item
    }

    /// Node holding the classes described by `Class` objects reaching `node`
    pub fn class_value_node(&mut self, node: NodeId) -> NodeId {
        if let Some(class_value) = self.nodes[node.index()].class_value {
            return class_value;
        }
        let class_value = match self.strategy.fast_nodes().map(|fast| fast.classes) {
            Some(shared) => shared,
            None => {
                let degree = self.nodes[node.index()].degree;
                let class_value = self.create_node(None);
                let cv = &mut self.nodes[class_value.index()];
                cv.degree = degree;
                cv.class_node_parent = Some(node);
                cv.class_value = Some(class_value);
                if self.config.should_tag() {
                    self.nodes[class_value.index()].tag = Some(format!("{}@", self.node_label(node)));
                }
                class_value
            }
        };
        self.nodes[node.index()].class_value = Some(class_value);
        if self.nodes[node.index()].has_class {
            self.wire_class_values(node);
        }
        class_value
    }

    /// Interned filter for subtypes of `type_name`
    pub fn super_class_filter(&mut self, type_name: &str) -> FilterId {
        if let Some(filter) = self.filter_index.get(type_name) {
            return *filter;
        }
        let id = FilterId(self.filters.len() as u32);
        let super_type = self.types.intern(type_name);
        self.filters.push(SuperClassFilter::new(type_name, super_type));
        self.filter_index.insert(type_name.to_string(), id);
        id
    }

    /// Unfiltered membership in the node's domain
    pub(crate) fn contains_type(&self, node: NodeId, ty: TypeIndex) -> bool {
        self.nodes[node.index()]
            .domain
            .is_some_and(|d| self.domains[d.index()].types.contains(ty))
    }

    /// Whether the node's declared type admits `ty`
    pub(crate) fn node_filter(&mut self, node: NodeId, ty: TypeIndex) -> bool {
        let filter = match self.nodes[node.index()].filter {
            Some(filter) => filter,
            None => {
                let Some(type_filter) = &self.nodes[node.index()].type_filter else {
                    return true;
                };
                let name = type_filter.type_name();
                let filter = self.super_class_filter(&name);
                self.nodes[node.index()].filter = Some(filter);
                filter
            }
        };
        self.filter_matches(filter, ty)
    }

    pub(crate) fn filter_matches(&mut self, filter: FilterId, ty: TypeIndex) -> bool {
        let f = &self.filters[filter.index()];
        if let Some(hit) = f.cached(ty) {
            return hit;
        }
        let result = if ty == f.super_type {
            true
        } else if !self.types.has_known_subtype(f.super_type) && self.is_linked_class(ty) {
            false
        } else {
            self.class_source
                .cached_is_super_type(&f.super_class, self.types.name(ty))
        };
        self.filters[filter.index()].cache.insert(ty, result);
        result
    }

    /// Read-only variant of [`Self::node_filter`] for queries
    pub(crate) fn accepts(&self, node: NodeId, ty: TypeIndex) -> bool {
        let Some(type_filter) = &self.nodes[node.index()].type_filter else {
            return true;
        };
        if let Some(filter) = self.nodes[node.index()].filter {
            if let Some(hit) = self.filters[filter.index()].cached(ty) {
                return hit;
            }
        }
        self.class_source
            .is_super_type(&type_filter.type_name(), self.types.name(ty))
    }

    pub(crate) fn transition_filter(&mut self, transition: TransitionId, ty: TypeIndex) -> bool {
        let t = &self.transitions[transition.index()];
        let Some(filter) = t.filter else {
            return true;
        };
        if t.known_filtered_off.contains(&ty) {
            return false;
        }
        let matches = self.filter_matches(filter, ty);
        if !matches {
            self.transitions[transition.index()]
                .known_filtered_off
                .push(ty);
        }
        matches
    }

    fn is_linked_class(&self, ty: TypeIndex) -> bool {
        self.classes
            .get(self.types.name(ty))
            .is_some_and(|c| !c.missing)
    }

    /// Types at `node` that pass its filter
    pub(crate) fn node_types(&mut self, node: NodeId) -> Vec<TypeIndex> {
        let Some(domain) = self.nodes[node.index()].domain else {
            return Vec::new();
        };
        let all = self.domains[domain.index()].types.to_vec();
        let mut result = Vec::with_capacity(all.len());
        for ty in all {
            if self.node_filter(node, ty) {
                result.push(ty);
            }
        }
        result
    }

    /// Types the source holds that the destination still lacks and would accept
    fn types_for_transition(&mut self, transition: TransitionId) -> Vec<TypeIndex> {
        let Transition {
            source,
            destination,
            ..
        } = self.transitions[transition.index()];
        let mut result = Vec::new();
        for ty in self.node_types(source) {
            if !self.contains_type(destination, ty)
                && self.transition_filter(transition, ty)
                && self.node_filter(destination, ty)
            {
                result.push(ty);
            }
        }
        result
    }

    /// Deliver types pending on a transition to its destination
    pub(crate) fn consume_transition(&mut self, transition: TransitionId, types: &[TypeIndex]) {
        let Transition {
            source,
            destination,
            ..
        } = self.transitions[transition.index()];
        let source_domain = self.nodes[source.index()].domain;
        if source_domain.is_some() && source_domain == self.nodes[destination.index()].domain {
            return;
        }

        let mut passing = Vec::with_capacity(types.len());
        for &ty in types {
            if !passing.contains(&ty)
                && !self.contains_type(destination, ty)
                && self.transition_filter(transition, ty)
                && self.node_filter(destination, ty)
            {
                passing.push(ty);
            }
        }
        if passing.is_empty() {
            return;
        }

        if self.should_merge_domains(transition) {
            self.merge_domains(transition, &passing);
        } else {
            self.propagate_types(destination, &passing);
        }
    }

    /// Fan freshly committed types out of `node`'s domain.
    ///
    /// Listeners are captured before `merge` runs, so a merge only delivers the
    /// types to what the absorbed domain was wired to.
    pub(crate) fn schedule_types(
        &mut self,
        node: NodeId,
        types: &[TypeIndex],
        merge: Option<MergeAction>,
    ) {
        let Some(domain) = self.nodes[node.index()].domain else {
            return;
        };
        let transitions = self.domain_transitions(domain);
        let consumers = self.domain_consumers(domain);
        let members: Vec<NodeId> = self.domains[domain.index()].members().collect();

        if let Some(merge) = merge {
            self.apply_merge(merge);
        }

        if self.config.log_dependencies {
            for &member in &members {
                for &ty in types {
                    if self.accepts(member, ty) {
                        trace!("{} -> {}", self.node_label(member), self.types.name(ty));
                    }
                }
            }
        }

        for &ty in types {
            let is_array = self.types.is_array(ty);
            let is_class = ty == self.class_type;
            if !is_array && !is_class {
                continue;
            }
            for &member in &members {
                if is_array && !self.nodes[member.index()].has_array && self.node_filter(member, ty) {
                    self.nodes[member.index()].has_array = true;
                    self.wire_array_items(member);
                }
                if is_class && !self.nodes[member.index()].has_class && self.node_filter(member, ty) {
                    self.nodes[member.index()].has_class = true;
                    self.wire_class_values(member);
                }
            }
        }

        for transition in transitions {
            let source = self.transitions[transition.index()].source;
            let mut passing = Vec::with_capacity(types.len());
            for &ty in types {
                if self.node_filter(source, ty) && self.transition_filter(transition, ty) {
                    passing.push(ty);
                }
            }
            self.schedule_transition(transition, &passing);
        }

        for (member, ids) in consumers {
            let mut passing = Vec::with_capacity(types.len());
            for &ty in types {
                if self.node_filter(member, ty) {
                    passing.push(ty);
                }
            }
            if passing.is_empty() {
                continue;
            }
            for id in ids {
                self.schedule_consumer(id, passing.clone());
            }
        }
    }

    fn wire_array_items(&mut self, node: NodeId) {
        if self.nodes[node.index()].array_item.is_none() {
            return;
        }
        let transitions = self.nodes[node.index()].transition_list.clone();
        for transition in transitions {
            let destination = self.transitions[transition.index()].destination;
            self.connect_array_item_nodes(node, destination);
        }
    }

    fn connect_array_item_nodes(&mut self, from: NodeId, to: NodeId) {
        let limit = self.config.array_degree_limit as u32;
        if self.nodes[from.index()].degree > limit || self.nodes[to.index()].degree > limit {
            return;
        }
        let from_filter = self.nodes[from.index()].type_filter.clone();
        let to_filter = self.nodes[to.index()].type_filter.clone();
        if !DependencyNode::array_compatible(from_filter.as_ref())
            || !DependencyNode::array_compatible(to_filter.as_ref())
        {
            return;
        }

        if from_filter == to_filter {
            let from_item = self.nodes[from.index()].array_item;
            let to_item = self.nodes[to.index()].array_item;
            match (from_item, to_item) {
                (Some(item), None) => {
                    self.nodes[to.index()].array_item = Some(item);
                    if self.nodes[to.index()].has_array {
                        self.wire_array_items(to);
                    }
                    return;
                }
                (None, Some(item)) => {
                    self.nodes[from.index()].array_item = Some(item);
                    return;
                }
                (None, None) => {
                    let item = self.array_item(from);
                    if self.nodes[to.index()].array_item.is_none() {
                        self.nodes[to.index()].array_item = Some(item);
                        if self.nodes[to.index()].has_array {
                            self.wire_array_items(to);
                        }
                    }
                    return;
                }
                (Some(_), Some(_)) => {}
            }
        }

        let from_item = self.array_item(from);
        let to_item = self.array_item(to);
        self.connect(from_item, to_item);
        self.connect(to_item, from_item);
    }

    /// Class value node of `node` if class values may flow out of it
    fn wirable_class_value(&mut self, node: NodeId) -> Option<NodeId> {
        let n = &self.nodes[node.index()];
        if n.class_node_parent.is_some() {
            return None;
        }
        let class_value = n.class_value?;
        let class_type = self.class_type;
        self.node_filter(node, class_type).then_some(class_value)
    }

    fn wire_class_values(&mut self, node: NodeId) {
        let Some(class_value) = self.wirable_class_value(node) else {
            return;
        };
        let transitions = self.nodes[node.index()].transition_list.clone();
        for transition in transitions {
            self.connect_class_value(class_value, transition);
        }
    }

    fn connect_class_value(&mut self, class_value: NodeId, transition: TransitionId) {
        let destination = self.transitions[transition.index()].destination;
        let class_type = self.class_type;
        if self.nodes[destination.index()].class_node_parent.is_some()
            || !self.node_filter(destination, class_type)
            || !self.transition_filter(transition, class_type)
        {
            return;
        }
        let destination_value = self.class_value_node(destination);
        self.connect(class_value, destination_value);
    }

    pub(crate) fn node_label(&self, node: NodeId) -> String {
        match &self.nodes[node.index()].tag {
            Some(tag) => tag.clone(),
            None => node.to_string(),
        }
    }
}
