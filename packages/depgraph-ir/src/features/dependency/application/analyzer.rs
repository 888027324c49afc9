//! Dependency analyzer facade
//!
//! [`DependencyAnalyzer`] is the single context object every engine operation
//! runs against: node, transition and domain arenas, the type registry, the
//! symbol records, the call graph and the scheduler queues. Nothing is global,
//! so independent analyses can coexist in one process.
//!
//! Typical use:
//! 1. `DependencyAnalyzer::new(class_source, config)?`
//! 2. register listeners, plugins and substitutors
//! 3. `add_entry_point(..)` for every root
//! 4. `process_dependencies()?`
//! 5. query through [`DependencyInfo`](crate::features::dependency::ports::DependencyInfo)
//!    and [`DependencyAnalyzer::value`]

use super::strategy::{DispatchStrategy, FastNodes};
use crate::config::{AnalysisMode, AnalyzerConfig};
use crate::errors::{DepGraphError, Result};
use crate::features::call_graph::DefaultCallGraph;
use crate::features::class_model::{
    ClassInfo, ClassSource, DependencyClassSource, ElementModifier, MethodInfo,
};
use crate::features::dependency::domain::{
    AnalysisStats, ClassDependency, DependencyNode, FieldDependency, FilterId, MethodDepId,
    MethodDependency, MissingItem, NodeId, SuperClassFilter, Transition, TypeDomain, TypeIndex,
    TypeRegistry,
};
use crate::features::dependency::infrastructure::events::{Event, EventQueue};
use crate::features::dependency::infrastructure::scheduler::Scheduler;
use crate::features::dependency::ports::{
    AnalysisInterruptor, BootstrapMethodSubstitutor, DependencyConsumer, DependencyListener,
    DependencyPlugin,
};
use crate::features::diagnostics::Diagnostics;
use crate::features::program_model::Program;
use crate::shared::constants::classes;
use crate::shared::models::{CallLocation, FieldReference, MethodReference, ValueType};
use crate::shared::{FxIndexMap, FxIndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use std::time::Instant;
use tracing::{debug, info};

/// Whole-program dependency analyzer
pub struct DependencyAnalyzer {
    pub(crate) config: AnalyzerConfig,
    pub(crate) class_source: DependencyClassSource,
    pub(crate) types: TypeRegistry,
    pub(crate) class_type: TypeIndex,
    pub(crate) object_type: TypeIndex,

    pub(crate) nodes: Vec<DependencyNode>,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) domains: Vec<TypeDomain>,
    /// `None` while the consumer runs or after cleanup
    pub(crate) consumers: Vec<Option<Box<dyn DependencyConsumer>>>,
    pub(crate) filters: Vec<SuperClassFilter>,
    pub(crate) filter_index: FxHashMap<String, FilterId>,

    pub(crate) methods: FxIndexMap<MethodReference, MethodDependency>,
    pub(crate) fields: FxIndexMap<FieldReference, FieldDependency>,
    pub(crate) classes: FxIndexMap<String, ClassDependency>,
    pub(crate) methods_added_by_root: FxHashSet<MethodReference>,
    pub(crate) fields_added_by_root: FxHashSet<FieldReference>,
    pub(crate) classes_added_by_root: FxHashSet<String>,
    pub(crate) missing: FxIndexSet<(MissingItem, CallLocation)>,

    pub(crate) call_graph: DefaultCallGraph,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) scheduler: Scheduler,
    pub(crate) events: EventQueue,
    pub(crate) substitutors: FxHashMap<MethodReference, Box<dyn BootstrapMethodSubstitutor>>,
    pub(crate) interruptor: Option<Box<dyn AnalysisInterruptor>>,
    pub(crate) strategy: DispatchStrategy,

    pub(crate) interrupted: bool,
    pub(crate) completing: bool,
    /// First contract violation raised inside a deferred task or consumer
    pub(crate) failure: Option<DepGraphError>,
    pub(crate) stats: AnalysisStats,
    class_name_suffix: usize,
}

impl DependencyAnalyzer {
    /// Create an analyzer over `class_source`; fails if `config` is invalid
    pub fn new(class_source: impl ClassSource + 'static, config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;

        let mut types = TypeRegistry::new();
        let object_type = types.intern(classes::OBJECT);
        let class_type = types.intern(classes::CLASS);
        let mode = config.mode;

        let mut analyzer = Self {
            config,
            class_source: DependencyClassSource::new(Box::new(class_source)),
            types,
            class_type,
            object_type,
            nodes: Vec::new(),
            transitions: Vec::new(),
            domains: Vec::new(),
            consumers: Vec::new(),
            filters: Vec::new(),
            filter_index: FxHashMap::default(),
            methods: FxIndexMap::default(),
            fields: FxIndexMap::default(),
            classes: FxIndexMap::default(),
            methods_added_by_root: FxHashSet::default(),
            fields_added_by_root: FxHashSet::default(),
            classes_added_by_root: FxHashSet::default(),
            missing: FxIndexSet::default(),
            call_graph: DefaultCallGraph::new(),
            diagnostics: Diagnostics::new(),
            scheduler: Scheduler::default(),
            events: EventQueue::default(),
            substitutors: FxHashMap::default(),
            interruptor: None,
            strategy: DispatchStrategy::Precise,
            interrupted: false,
            completing: false,
            failure: None,
            stats: AnalysisStats::default(),
            class_name_suffix: 0,
        };

        if mode == AnalysisMode::Fast {
            let instances = analyzer.create_node(None);
            let classes_node = analyzer.create_node(None);
            analyzer.tag_node(instances, || "instances".to_string());
            analyzer.tag_node(classes_node, || "classes".to_string());
            analyzer.nodes[instances.index()].class_value = Some(classes_node);
            analyzer.nodes[instances.index()].array_item = Some(instances);
            analyzer.nodes[classes_node.index()].class_value = Some(classes_node);
            analyzer.nodes[classes_node.index()].class_node_parent = Some(instances);
            analyzer.strategy = DispatchStrategy::Fast(FastNodes::new(instances, classes_node));
        }

        debug!(mode = ?mode, preset = ?analyzer.config.preset, "Dependency analyzer created");
        Ok(analyzer)
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn class_source(&self) -> &DependencyClassSource {
        &self.class_source
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn type_registry(&self) -> &TypeRegistry {
        &self.types
    }

    /// Index of the dependency type `name`, interning it on first use
    pub fn type_index(&mut self, name: &str) -> TypeIndex {
        self.types.intern(name)
    }

    pub fn type_name(&self, ty: TypeIndex) -> &str {
        self.types.name(ty)
    }

    /// Global nodes of the fast strategy, `None` in precise mode
    pub fn fast_nodes(&self) -> Option<&FastNodes> {
        self.strategy.fast_nodes()
    }

    pub fn is_completing(&self) -> bool {
        self.completing
    }

    pub fn was_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Unique name for a class generated during analysis
    pub fn generate_class_name(&mut self) -> String {
        let name = format!("$$depgraph_generated_class$${}", self.class_name_suffix);
        self.class_name_suffix += 1;
        name
    }

    pub fn set_interruptor(&mut self, interruptor: impl AnalysisInterruptor + 'static) {
        self.interruptor = Some(Box::new(interruptor));
    }

    /// Register a listener; its `started` callback runs immediately
    pub fn add_listener(&mut self, listener: impl DependencyListener + 'static) {
        let mut listener: Box<dyn DependencyListener> = Box::new(listener);
        listener.started(self);
        self.events.listeners.push(listener);
    }

    /// Attach a plugin to `method`; it runs each time the method is reached
    /// from a new site
    pub fn add_plugin(&mut self, method: MethodReference, plugin: impl DependencyPlugin + 'static) {
        self.events.plugins.insert(method, Box::new(plugin));
    }

    pub fn add_bootstrap_substitutor(
        &mut self,
        bootstrap_method: MethodReference,
        substitutor: impl BootstrapMethodSubstitutor + 'static,
    ) {
        self.substitutors
            .insert(bootstrap_method, Box::new(substitutor));
    }

    /// Root a method: link and use it, then propagate the owner class into
    /// `this` and `argument_types[i]` into variable `i`.
    ///
    /// `argument_types` has one entry for `this` plus one per parameter, each a
    /// dependency type name.
    pub fn add_entry_point(
        &mut self,
        method: &MethodReference,
        argument_types: &[&str],
    ) -> Result<MethodDepId> {
        let expected = method.parameter_count() + 1;
        if argument_types.len() != expected {
            return Err(DepGraphError::EntryPointArity {
                method: method.clone(),
                expected,
                actual: argument_types.len(),
            });
        }

        let root = CallLocation::root();
        let dep = self.link_method(method, &root)?;
        self.use_method(dep);

        let variables = self.methods[dep.index()].variables.clone();
        let owner = self.types.intern(&method.class_name);
        if let Some(this) = variables.first() {
            self.propagate(*this, owner);
        }
        for (i, name) in argument_types.iter().enumerate() {
            if let Some(class_name) = ValueType::from_type_name(name).innermost_class() {
                self.link_class(class_name, &root)?;
            }
            let ty = self.types.intern(name);
            if let Some(node) = variables.get(i) {
                self.propagate(*node, ty);
            }
        }
        info!(entry_point = %method, "Entry point added");
        Ok(dep)
    }

    /// Run to a fixed point, then enter the completion phase: lock reachable
    /// nodes, notify listeners and report missing symbols.
    ///
    /// Returns early without completing when the interruptor stops the run.
    /// The partial graph stays queryable for diagnostics. Calling this again
    /// with an interruptor that lets the run continue drains the remaining
    /// queues and completes as usual; nothing is rolled back in between.
    pub fn process_dependencies(&mut self) -> Result<()> {
        let started = Instant::now();
        info!(
            methods = self.methods.len(),
            classes = self.classes.len(),
            "Processing dependencies"
        );

        self.interrupted = false;
        self.process_queue();

        if self.interrupted {
            info!("Dependency analysis interrupted");
        } else if !self.completing {
            self.completing = true;
            self.lock_all(true);
            debug!("Entering completion phase");
            self.fire(Event::Completing);
            self.process_queue();
            self.report_missing();
        }

        self.stats.duration_ms += started.elapsed().as_secs_f64() * 1000.0;
        info!(
            methods = self.methods.len(),
            fields = self.fields.len(),
            classes = self.classes.len(),
            nodes = self.nodes.len(),
            duration_ms = self.stats.duration_ms,
            "Dependency analysis finished"
        );
        self.take_failure()
    }

    /// Add or replace a class; only allowed before completion
    pub fn submit_class(&mut self, cls: ClassInfo) -> Result<()> {
        if self.completing {
            return Err(DepGraphError::completion_phase("submit class"));
        }
        debug!(class = %cls.name, "Class submitted");
        self.class_source.submit(cls);
        Ok(())
    }

    /// Before completion: add `method` as a new static method with `program`.
    ///
    /// During completion: give the reached native `method` a body and analyse
    /// it immediately. A native method that was reached but never used is
    /// left alone.
    pub fn submit_method(&mut self, method: &MethodReference, program: Program) -> Result<()> {
        if !self.completing {
            let cls = self
                .class_source
                .get(&method.class_name)
                .ok_or_else(|| DepGraphError::ClassNotFound(method.class_name.clone()))?;
            if cls.method(&method.descriptor).is_some() {
                return Err(DepGraphError::MethodAlreadyExists(method.clone()));
            }
            let info = MethodInfo::new(method.descriptor.clone())
                .with_modifier(ElementModifier::Static)
                .with_program(program);
            if let Some(cls) = self.class_source.get_mut(&method.class_name) {
                cls.methods.push(info);
            }
            debug!(method = %method, "Method submitted");
            return Ok(());
        }

        let dep = self
            .methods
            .get_index_of(method)
            .map(|i| MethodDepId(i as u32))
            .ok_or_else(|| DepGraphError::MethodNotReached(method.clone()))?;
        let is_native = self
            .class_source
            .get_method(method)
            .is_some_and(|m| m.has_modifier(ElementModifier::Native));
        if !is_native {
            return Err(DepGraphError::MethodNotNative(method.clone()));
        }
        if !self.methods[dep.index()].used {
            return Ok(());
        }

        if let Some(info) = self
            .class_source
            .get_mut(&method.class_name)
            .and_then(|cls| cls.method_mut(&method.descriptor))
        {
            info.remove_modifier(ElementModifier::Native);
            info.program = Some(program);
        }
        debug!(method = %method, "Native method body submitted");

        self.methods[dep.index()].used = false;
        self.lock_method(dep, false);
        self.defer(move |analyzer| {
            analyzer.build_method_graph(dep);
            analyzer.methods[dep.index()].used = true;
        });
        self.process_queue();
        self.take_failure()
    }

    /// Drop edges, consumers and queues; committed types stay queryable
    pub fn cleanup(&mut self) {
        for node in &mut self.nodes {
            node.transitions = FxHashMap::default();
            node.transition_list = Vec::new();
            node.consumers = Vec::new();
        }
        for domain in &mut self.domains {
            domain.invalidate();
        }
        self.transitions = Vec::new();
        self.consumers = Vec::new();
        self.scheduler = Scheduler::default();
        self.events = EventQueue::default();
        self.substitutors = FxHashMap::default();
        debug!(nodes = self.nodes.len(), "Dependency graph cleaned up");
    }

    /// Snapshot of the analysis statistics
    pub fn stats(&self) -> AnalysisStats {
        AnalysisStats {
            types: self.types.len(),
            nodes: self.nodes.len(),
            transitions: self.transitions.len(),
            domains: self
                .domains
                .iter()
                .filter(|d| !d.members.is_empty())
                .count(),
            reachable_methods: self.methods.len(),
            reachable_fields: self.fields.len(),
            reachable_classes: self.classes.len(),
            ..self.stats.clone()
        }
    }

    /// Whether two nodes currently share one type set
    pub fn same_domain(&self, a: NodeId, b: NodeId) -> bool {
        let da = self.nodes[a.index()].domain;
        da.is_some() && da == self.nodes[b.index()].domain
    }

    #[cfg(test)]
    pub(crate) fn node(&self, node: NodeId) -> &DependencyNode {
        &self.nodes[node.index()]
    }

    pub(crate) fn method_dep(&self, dep: MethodDepId) -> &MethodDependency {
        &self.methods[dep.index()]
    }

    #[cfg(test)]
    pub(crate) fn field_dep(
        &self,
        dep: crate::features::dependency::domain::FieldDepId,
    ) -> &FieldDependency {
        &self.fields[dep.index()]
    }

    /// Store the first contract violation raised where it cannot be returned
    pub(crate) fn recover<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                if self.failure.is_none() {
                    self.failure = Some(err);
                }
                None
            }
        }
    }

    fn take_failure(&mut self) -> Result<()> {
        match self.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn lock_all(&mut self, lock: bool) {
        for i in 0..self.methods.len() {
            self.lock_method(MethodDepId(i as u32), lock);
        }
        for i in 0..self.fields.len() {
            let value = self.fields[i].value;
            self.nodes[value.index()].locked = lock;
        }
    }

    pub(crate) fn lock_method(&mut self, dep: MethodDepId, lock: bool) {
        let dep = &self.methods[dep.index()];
        let nodes: Vec<NodeId> = dep
            .variables
            .iter()
            .copied()
            .chain(dep.result)
            .chain(std::iter::once(dep.thrown))
            .collect();
        for node in nodes {
            self.nodes[node.index()].locked = lock;
        }
    }

    fn report_missing(&mut self) {
        for (item, location) in std::mem::take(&mut self.missing) {
            self.diagnostics.error(location, item.message());
        }
    }
}

impl std::fmt::Debug for DependencyAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyAnalyzer")
            .field("mode", &self.config.mode)
            .field("types", &self.types.len())
            .field("nodes", &self.nodes.len())
            .field("methods", &self.methods.len())
            .field("completing", &self.completing)
            .finish_non_exhaustive()
    }
}
