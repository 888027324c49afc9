//! Virtual call dispatch
//!
//! A virtual call site is a consumer on the receiver node: each new receiver
//! type resolves the called method against that type, marks the
//! implementation used and wires arguments, result and exceptions to it.

use crate::features::call_graph::CallSiteId;
use crate::features::dependency::application::{DependencyAnalyzer, FastVirtualCall};
use crate::features::dependency::domain::{FilterId, MethodDepId, NodeId, TypeIndex};
use crate::features::dependency::ports::{ConsumerId, DependencyConsumer};
use crate::shared::constants::classes;
use crate::shared::models::{CallLocation, MethodDescriptor, MethodReference};
use rustc_hash::FxHashSet;
use tracing::trace;

/// Receiver consumer of one precise virtual call site
pub(crate) struct VirtualCallConsumer {
    /// Declared class of the call; receiver types outside it are ignored
    filter: FilterId,
    descriptor: MethodDescriptor,
    /// Receiver first, then the arguments
    arguments: Vec<NodeId>,
    result: Option<NodeId>,
    location: CallLocation,
    exception_consumer: ConsumerId,
    known_types: FxHashSet<TypeIndex>,
    known_methods: FxHashSet<MethodDepId>,
}

impl VirtualCallConsumer {
    pub(crate) fn new(
        filter: FilterId,
        descriptor: MethodDescriptor,
        arguments: Vec<NodeId>,
        result: Option<NodeId>,
        location: CallLocation,
        exception_consumer: ConsumerId,
    ) -> Self {
        Self {
            filter,
            descriptor,
            arguments,
            result,
            location,
            exception_consumer,
            known_types: FxHashSet::default(),
            known_methods: FxHashSet::default(),
        }
    }
}

impl DependencyConsumer for VirtualCallConsumer {
    fn consume(&mut self, analyzer: &mut DependencyAnalyzer, ty: TypeIndex) {
        if !self.known_types.insert(ty) {
            return;
        }

        let (class_name, ty) = dispatch_class(analyzer, ty);
        if analyzer.config.log_dependencies {
            trace!(
                "Virtual call of {} detected on {}",
                self.descriptor,
                class_name
            );
        }
        if !analyzer.filter_matches(self.filter, ty) {
            return;
        }

        let method = MethodReference::new(class_name, self.descriptor.clone());
        let linked = analyzer.link_method(&method, &self.location);
        let Some(dep) = analyzer.recover(linked) else {
            return;
        };
        if analyzer.method_dep(dep).missing || !self.known_methods.insert(dep) {
            return;
        }
        analyzer.use_method(dep);

        let target = analyzer.method_dep(dep);
        let variables: Vec<NodeId> = target
            .variables
            .iter()
            .take(target.parameter_count)
            .copied()
            .collect();
        let (target_result, thrown) = (target.result, target.thrown);
        let owner = target.reference.class_name.clone();

        if let (Some(&instance), Some(&this)) = (self.arguments.first(), variables.first()) {
            let owner_filter = analyzer.super_class_filter(&owner);
            analyzer.connect_filtered(instance, this, Some(owner_filter));
        }
        for (&argument, &parameter) in self.arguments.iter().zip(&variables).skip(1) {
            analyzer.connect(argument, parameter);
        }
        if let (Some(target_result), Some(result)) = (target_result, self.result) {
            analyzer.connect(target_result, result);
        }
        analyzer.add_consumer(thrown, self.exception_consumer);
    }
}

/// Class a receiver type dispatches on: arrays only have `Object`'s methods
fn dispatch_class(analyzer: &DependencyAnalyzer, ty: TypeIndex) -> (String, TypeIndex) {
    let name = analyzer.type_name(ty);
    if name.starts_with('[') {
        (classes::OBJECT.to_string(), analyzer.object_type)
    } else {
        (name.to_string(), ty)
    }
}

/// Receiver consumer shared by every call of one method in fast mode
pub(crate) struct FastVirtualCallConsumer {
    descriptor: MethodDescriptor,
    site: CallSiteId,
    known_types: FxHashSet<TypeIndex>,
    methods: FxHashSet<MethodDepId>,
}

impl FastVirtualCallConsumer {
    pub(crate) fn new(descriptor: MethodDescriptor, site: CallSiteId) -> Self {
        Self {
            descriptor,
            site,
            known_types: FxHashSet::default(),
            methods: FxHashSet::default(),
        }
    }
}

impl DependencyConsumer for FastVirtualCallConsumer {
    fn consume(&mut self, analyzer: &mut DependencyAnalyzer, ty: TypeIndex) {
        if !self.known_types.insert(ty) {
            return;
        }
        let (class_name, _) = dispatch_class(analyzer, ty);
        let method = MethodReference::new(class_name, self.descriptor.clone());
        let linked = analyzer.link_method(&method, &CallLocation::root());
        let Some(dep) = analyzer.recover(linked) else {
            return;
        };
        if !self.methods.insert(dep) {
            return;
        }
        let callee = analyzer.method_dep(dep).reference.clone();
        analyzer.call_graph.add_virtual_callee(self.site, &callee);
        if !analyzer.method_dep(dep).missing {
            analyzer.use_method(dep);
        }
    }
}

impl DependencyAnalyzer {
    /// Coarse virtual call for `method`, created with its consumer on first use
    pub(crate) fn fast_virtual_call(&mut self, method: &MethodReference) -> Option<FastVirtualCall> {
        if let Some(call) = self.strategy.fast_nodes()?.virtual_calls.get(method) {
            return Some(*call);
        }
        let site = self.call_graph.create_virtual_call_site(method);
        let consumer =
            self.register_consumer(FastVirtualCallConsumer::new(method.descriptor.clone(), site));
        let call = FastVirtualCall { consumer, site };
        self.strategy
            .fast_nodes_mut()?
            .virtual_calls
            .insert(method.clone(), call);

        let class_name = method.class_name.clone();
        self.defer(move |analyzer| {
            if let Some(node) = analyzer.subtype_node(&class_name) {
                analyzer.add_consumer(node, consumer);
            }
        });
        Some(call)
    }

    /// Instances of `class_name` and its subtypes, as a filtered view of the
    /// instances node
    pub(crate) fn subtype_node(&mut self, class_name: &str) -> Option<NodeId> {
        let fast = self.strategy.fast_nodes()?;
        if class_name == classes::OBJECT {
            return Some(fast.instances);
        }
        if let Some(node) = fast.subtype_nodes.get(class_name) {
            return Some(*node);
        }
        let instances = fast.instances;
        let node = self.create_node(None);
        self.tag_node(node, || format!("{}!subtypes", class_name));
        self.strategy
            .fast_nodes_mut()?
            .subtype_nodes
            .insert(class_name.to_string(), node);
        let filter = self.super_class_filter(class_name);
        self.connect_filtered(instances, node, Some(filter));
        Some(node)
    }
}
