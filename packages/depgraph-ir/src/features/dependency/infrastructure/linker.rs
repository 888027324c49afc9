//! Symbol linking
//!
//! Resolves class, method and field references against the class source,
//! creates their dependency records on first use and records each reaching
//! site in the call graph. Reachability events fire once per new site;
//! missing symbols are collected and reported when the analysis completes.

use crate::errors::{DepGraphError, Result};
use crate::features::class_model::ClassSource;
use crate::features::dependency::application::DependencyAnalyzer;
use crate::features::dependency::domain::{
    ClassDepId, ClassDependency, FieldDepId, FieldDependency, MethodDepId, MethodDependency,
    MissingItem, NodeId,
};
use crate::features::dependency::infrastructure::events::Event;
use crate::shared::constants::methods;
use crate::shared::models::{
    CallLocation, FieldReference, MethodDescriptor, MethodReference, ValueType,
};
use tracing::{debug, warn};

impl DependencyAnalyzer {
    /// Mark a class reachable from `location`, together with its supertypes.
    ///
    /// Fails during completion if the class was never linked before.
    pub fn link_class(&mut self, class_name: &str, location: &CallLocation) -> Result<ClassDepId> {
        if self.completing && !self.classes.contains_key(class_name) {
            return Err(DepGraphError::completion_phase("link class"));
        }
        let dep = self.class_dependency(class_name)?;

        let added = match &location.method {
            Some(caller) => {
                self.call_graph
                    .add_class_access(caller, class_name, location.source_location.clone())
            }
            None => self.classes_added_by_root.insert(class_name.to_string()),
        };

        if self.classes[dep.index()].missing {
            self.record_missing(MissingItem::Class(class_name.to_string()), location);
        } else if added {
            let (name, reached_from) = (class_name.to_string(), location.clone());
            self.defer(move |analyzer| {
                analyzer.fire(Event::ClassReached {
                    class_name: name,
                    location: reached_from,
                })
            });
            for supertype in self.supertypes_of(class_name) {
                self.link_class(&supertype, location)?;
            }
        }
        Ok(dep)
    }

    fn class_dependency(&mut self, class_name: &str) -> Result<ClassDepId> {
        if let Some(index) = self.classes.get_index_of(class_name) {
            return Ok(ClassDepId(index as u32));
        }
        let missing = self.class_source.get(class_name).is_none();
        let id = ClassDepId(self.classes.len() as u32);
        self.classes.insert(
            class_name.to_string(),
            ClassDependency {
                class_name: class_name.to_string(),
                missing,
                initialized: false,
            },
        );
        if missing {
            return Ok(id);
        }

        let supertypes = self.supertypes_of(class_name);
        for supertype in &supertypes {
            let ty = self.types.intern(supertype);
            self.types.mark_has_known_subtype(ty);
        }
        let root = CallLocation::root();
        for supertype in &supertypes {
            self.link_class(supertype, &root)?;
        }
        Ok(id)
    }

    fn supertypes_of(&self, class_name: &str) -> Vec<String> {
        self.class_source
            .get(class_name)
            .map(|cls| cls.supertypes().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Run the class initializer of a linked class, once
    pub(crate) fn init_class(&mut self, dep: ClassDepId, location: &CallLocation) {
        let cls = &mut self.classes[dep.index()];
        if cls.missing || cls.initialized {
            return;
        }
        cls.initialized = true;
        let initializer = MethodReference::new(
            cls.class_name.clone(),
            MethodDescriptor::void(methods::CLASS_INITIALIZER),
        );
        if self.class_source.get_method(&initializer).is_none() {
            return;
        }
        let location = location.clone();
        self.defer(move |analyzer| {
            let linked = analyzer.link_method(&initializer, &location);
            if let Some(dep) = analyzer.recover(linked) {
                analyzer.use_method(dep);
            }
        });
    }

    /// Link and initialise a class by name from inside deferred work
    pub(crate) fn link_and_init_class(&mut self, class_name: &str, location: &CallLocation) {
        let linked = self.link_class(class_name, location);
        if let Some(dep) = self.recover(linked) {
            self.init_class(dep, location);
        }
    }

    /// Resolve `method` to its implementation and mark it reachable from
    /// `location`. Linking does not analyse the body; see
    /// [`DependencyAnalyzer::use_method`].
    pub fn link_method(
        &mut self,
        method: &MethodReference,
        location: &CallLocation,
    ) -> Result<MethodDepId> {
        let resolved = self
            .class_source
            .cached_implementation(method)
            .unwrap_or_else(|| method.clone());
        if self.completing && !self.methods.contains_key(&resolved) {
            return Err(DepGraphError::completion_phase("link method"));
        }

        self.call_graph.node_mut(&resolved);
        let added = match &location.method {
            Some(caller) => self.call_graph.add_call_site(
                caller,
                &resolved,
                location.source_location.clone(),
            ),
            None => self.methods_added_by_root.insert(resolved.clone()),
        };

        let dep = self.method_dependency(&resolved);
        if self.methods[dep.index()].missing {
            self.record_missing(MissingItem::Method(method.clone()), location);
        } else if added {
            if self.config.log_dependencies {
                debug!(method = %resolved, "Method reached");
            }
            self.fire(Event::MethodReached {
                method: resolved,
                location: location.clone(),
            });
        }
        Ok(dep)
    }

    fn method_dependency(&mut self, method: &MethodReference) -> MethodDepId {
        if let Some(index) = self.methods.get_index_of(method) {
            return MethodDepId(index as u32);
        }
        let missing = self.class_source.get_method(method).is_none();
        let shared = self.strategy.fast_nodes().map(|fast| fast.instances);
        let node = |analyzer: &mut Self, filter: Option<ValueType>, tag: String| -> NodeId {
            match shared {
                Some(instances) => instances,
                None => {
                    let node = analyzer.create_node(filter);
                    analyzer.tag_node(node, || tag);
                    node
                }
            }
        };

        let parameters = method.parameter_types().to_vec();
        let mut variables = Vec::with_capacity(parameters.len() + 1);
        variables.push(node(
            self,
            Some(ValueType::object(&method.class_name)),
            format!("{}:0", method),
        ));
        for (i, parameter) in parameters.into_iter().enumerate() {
            variables.push(node(self, Some(parameter), format!("{}:{}", method, i + 1)));
        }
        let result = match method.result_type() {
            ValueType::Void => None,
            _ => Some(node(self, None, format!("{}:RESULT", method))),
        };
        let thrown = node(self, None, format!("{}:THROWN", method));

        let id = MethodDepId(self.methods.len() as u32);
        let parameter_count = variables.len();
        self.methods.insert(
            method.clone(),
            MethodDependency {
                reference: method.clone(),
                variables,
                parameter_count,
                result,
                thrown,
                missing,
                used: false,
            },
        );

        if !missing {
            let owner = method.class_name.clone();
            let location = CallLocation::in_method(method.clone());
            self.defer(move |analyzer| analyzer.link_and_init_class(&owner, &location));
        }
        id
    }

    /// Schedule analysis of a linked method's body; idempotent
    pub fn use_method(&mut self, dep: MethodDepId) {
        let method = &mut self.methods[dep.index()];
        if method.used {
            return;
        }
        method.used = true;
        if !method.missing {
            self.defer(move |analyzer| analyzer.build_method_graph(dep));
        }
    }

    /// Resolve a field and mark it reachable from `location`
    pub fn link_field(
        &mut self,
        field: &FieldReference,
        location: &CallLocation,
    ) -> Result<FieldDepId> {
        let resolved = self
            .class_source
            .cached_field(field)
            .unwrap_or_else(|| field.clone());
        if self.completing && !self.fields.contains_key(&resolved) {
            return Err(DepGraphError::completion_phase("link field"));
        }

        let added = match &location.method {
            Some(caller) => {
                self.call_graph
                    .add_field_access(caller, field, location.source_location.clone())
            }
            None => self.fields_added_by_root.insert(field.clone()),
        };

        let dep = self.field_dependency(&resolved);
        if self.fields[dep.index()].missing {
            self.record_missing(MissingItem::Field(field.clone()), location);
            return Ok(dep);
        }

        let owner = resolved.class_name.clone();
        let init_location = location.clone();
        self.defer(move |analyzer| analyzer.link_and_init_class(&owner, &init_location));
        if added {
            self.fire(Event::FieldReached {
                field: resolved,
                location: location.clone(),
            });
        }
        Ok(dep)
    }

    fn field_dependency(&mut self, field: &FieldReference) -> FieldDepId {
        if let Some(index) = self.fields.get_index_of(field) {
            return FieldDepId(index as u32);
        }
        let field_type = self
            .class_source
            .get_field(field)
            .map(|info| info.field_type.clone());
        let missing = field_type.is_none();
        let value = match self.strategy.fast_nodes().map(|fast| fast.instances) {
            Some(instances) => instances,
            None => {
                let node = self.create_node(field_type.clone());
                self.tag_node(node, || format!("{}#{}", field.class_name, field.field_name));
                node
            }
        };

        let id = FieldDepId(self.fields.len() as u32);
        self.fields.insert(
            field.clone(),
            FieldDependency {
                reference: field.clone(),
                field_type,
                value,
                missing,
            },
        );
        id
    }

    pub(crate) fn record_missing(&mut self, item: MissingItem, location: &CallLocation) {
        let message = item.message();
        if self.missing.insert((item, location.clone())) {
            warn!(location = %location, "{}", message);
        }
    }
}
