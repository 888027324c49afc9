//! Per-method graph building
//!
//! Turns a used method's body into nodes, edges and consumers. Every program
//! variable gets one node; the first ones are the method's parameter nodes.
//! Each block gets its own exception consumer routing raised types to the
//! first matching handler, in source order, or to the method's thrown node.

use crate::errors::Result;
use crate::features::class_model::{ClassSource, ElementModifier};
use crate::features::dependency::application::DependencyAnalyzer;
use crate::features::dependency::domain::{MethodDepId, NodeId, TypeIndex};
use crate::features::dependency::infrastructure::virtual_call::VirtualCallConsumer;
use crate::features::dependency::ports::{ConsumerId, DependencyConsumer};
use crate::features::program_model::{BasicBlock, Instruction, InvocationType, Program, Variable};
use crate::shared::constants::{classes, methods};
use crate::shared::models::{
    CallLocation, FieldReference, MethodDescriptor, MethodReference, TextLocation, ValueType,
};
use tracing::debug;

/// Declared type of a catch clause
#[derive(Debug, Clone)]
pub(crate) enum CatchType {
    /// `finally`-style handler
    Any,
    Class(String),
    /// Class not found; never matches
    Missing,
}

/// Routes raised types to the first matching handler of one block
pub(crate) struct ExceptionConsumer {
    handlers: Vec<(CatchType, Option<NodeId>)>,
    thrown: NodeId,
}

impl DependencyConsumer for ExceptionConsumer {
    fn consume(&mut self, analyzer: &mut DependencyAnalyzer, ty: TypeIndex) {
        for (catch_type, variable) in &self.handlers {
            let matches = match catch_type {
                CatchType::Any => true,
                CatchType::Class(class_name) => analyzer
                    .class_source
                    .cached_is_super_type(class_name, analyzer.types.name(ty)),
                CatchType::Missing => false,
            };
            if matches {
                if let Some(variable) = variable {
                    analyzer.propagate(*variable, ty);
                }
                return;
            }
        }
        analyzer.propagate(self.thrown, ty);
    }
}

impl DependencyAnalyzer {
    /// Analyse the body of a used method
    pub(crate) fn build_method_graph(&mut self, dep: MethodDepId) {
        let method = self.methods[dep.index()].reference.clone();
        let Some(info) = self.class_source.get_method(&method) else {
            return;
        };
        let Some(mut program) = info.program.clone() else {
            return;
        };
        let synchronized = info.has_modifier(ElementModifier::Synchronized);
        let is_static = info.is_static();
        if program.is_empty() {
            return;
        }

        debug!(method = %method, blocks = program.blocks.len(), "Building method graph");
        let mut changed = self.process_invoke_dynamic(&method, &mut program);
        changed |= self.resolve_references(&method, &mut program);
        if changed {
            if let Some(info) = self
                .class_source
                .get_mut(&method.class_name)
                .and_then(|cls| cls.method_mut(&method.descriptor))
            {
                info.program = Some(program.clone());
            }
        }

        let result = if self.strategy.is_fast() {
            self.build_fast_graph(dep, &method, &program, synchronized, is_static)
        } else {
            MethodGraphBuilder::new(self, dep, method).build(&program, synchronized, is_static)
        };
        self.recover(result);
    }

    /// Link the runtime lock methods a synchronized method calls implicitly;
    /// `monitor` receives the lock object
    pub(crate) fn link_monitor_methods(&mut self, monitor: MonitorArgument) -> Result<()> {
        let root = CallLocation::root();
        for name in [
            methods::MONITOR_ENTER,
            methods::MONITOR_ENTER_SYNC,
            methods::MONITOR_EXIT,
            methods::MONITOR_EXIT_SYNC,
        ] {
            let dep = self.link_method(&monitor_method(name), &root)?;
            self.use_method(dep);
            let Some(lock) = self.methods[dep.index()].variables.get(1).copied() else {
                continue;
            };
            match monitor {
                MonitorArgument::Class => {
                    let class_type = self.class_type;
                    self.propagate(lock, class_type);
                }
                MonitorArgument::Node(node) => self.connect(node, lock),
            }
        }
        Ok(())
    }
}

/// Lock object passed to the monitor methods
#[derive(Debug, Clone, Copy)]
pub(crate) enum MonitorArgument {
    /// Static methods lock their class
    Class,
    Node(NodeId),
}

pub(crate) fn monitor_method(name: &str) -> MethodReference {
    MethodReference::of(
        classes::OBJECT,
        name,
        vec![ValueType::object(classes::OBJECT)],
        ValueType::Void,
    )
}

pub(crate) fn string_constructor() -> MethodReference {
    MethodReference::of(
        classes::STRING,
        methods::CONSTRUCTOR,
        vec![ValueType::array(ValueType::Primitive(
            crate::shared::models::PrimitiveType::Char,
        ))],
        ValueType::Void,
    )
}

pub(crate) fn null_pointer_constructor() -> MethodReference {
    MethodReference::new(
        classes::NULL_POINTER_EXCEPTION,
        MethodDescriptor::void(methods::CONSTRUCTOR),
    )
}

pub(crate) fn clone_method() -> MethodReference {
    MethodReference::of(
        classes::OBJECT,
        methods::CLONE,
        vec![],
        ValueType::object(classes::OBJECT),
    )
}

fn is_get_class(method: &MethodReference) -> bool {
    method.name() == methods::GET_CLASS
        && method.parameter_count() == 0
        && method.result_type().is_object(classes::CLASS)
}

struct MethodGraphBuilder<'a> {
    analyzer: &'a mut DependencyAnalyzer,
    dep: MethodDepId,
    caller: MethodReference,
    nodes: Vec<NodeId>,
    location: Option<TextLocation>,
    handlers: Vec<(CatchType, Option<NodeId>)>,
    exception_consumer: Option<ConsumerId>,
}

impl<'a> MethodGraphBuilder<'a> {
    fn new(analyzer: &'a mut DependencyAnalyzer, dep: MethodDepId, caller: MethodReference) -> Self {
        Self {
            analyzer,
            dep,
            caller,
            nodes: Vec::new(),
            location: None,
            handlers: Vec::new(),
            exception_consumer: None,
        }
    }

    fn build(mut self, program: &Program, synchronized: bool, is_static: bool) -> Result<()> {
        let method = &self.analyzer.methods[self.dep.index()];
        let mut nodes: Vec<NodeId> = method
            .variables
            .iter()
            .take(method.parameter_count)
            .copied()
            .collect();
        for i in nodes.len()..program.variable_count {
            let node = self.analyzer.create_node(None);
            let caller = &self.caller;
            self.analyzer.tag_node(node, || format!("{}:{}", caller, i));
            nodes.push(node);
        }
        self.analyzer.methods[self.dep.index()].variables = nodes.clone();
        self.nodes = nodes;

        for block in &program.blocks {
            self.enter_block(block);
            for instruction in &block.instructions {
                self.visit(instruction)?;
            }
            for phi in &block.phis {
                let Some(receiver) = self.var(phi.receiver) else {
                    continue;
                };
                for incoming in &phi.incomings {
                    if let Some(value) = self.var(incoming.value) {
                        self.analyzer.connect(value, receiver);
                    }
                }
            }
            for try_catch in &block.try_catches {
                if let Some(exception_type) = &try_catch.exception_type {
                    let location = CallLocation::in_method(self.caller.clone());
                    self.analyzer.link_class(exception_type, &location)?;
                }
            }
        }

        if synchronized {
            let monitor = match (is_static, self.nodes.first()) {
                (false, Some(this)) => MonitorArgument::Node(*this),
                _ => MonitorArgument::Class,
            };
            self.analyzer.link_monitor_methods(monitor)?;
        }
        Ok(())
    }

    fn enter_block(&mut self, block: &BasicBlock) {
        self.exception_consumer = None;
        self.handlers = block
            .try_catches
            .iter()
            .map(|try_catch| {
                let catch_type = match &try_catch.exception_type {
                    None => CatchType::Any,
                    Some(name) if self.analyzer.class_source.get(name).is_some() => {
                        CatchType::Class(name.clone())
                    }
                    Some(_) => CatchType::Missing,
                };
                let variable = try_catch.handler_variable.and_then(|v| self.var(v));
                (catch_type, variable)
            })
            .collect();
    }

    fn var(&self, variable: Variable) -> Option<NodeId> {
        self.nodes.get(variable.index()).copied()
    }

    fn call_location(&self) -> CallLocation {
        CallLocation::new(self.caller.clone(), self.location.clone())
    }

    fn exception_consumer(&mut self) -> ConsumerId {
        if let Some(id) = self.exception_consumer {
            return id;
        }
        let thrown = self.analyzer.methods[self.dep.index()].thrown;
        let id = self.analyzer.register_consumer(ExceptionConsumer {
            handlers: self.handlers.clone(),
            thrown,
        });
        self.exception_consumer = Some(id);
        id
    }

    fn link_class(&mut self, class_name: &str) -> Result<()> {
        let location = self.call_location();
        self.analyzer.link_class(class_name, &location)?;
        Ok(())
    }

    fn link_and_init(&mut self, class_name: &str) -> Result<()> {
        let location = self.call_location();
        let dep = self.analyzer.link_class(class_name, &location)?;
        self.analyzer.init_class(dep, &location);
        Ok(())
    }

    fn link_and_use(&mut self, method: &MethodReference) -> Result<MethodDepId> {
        let location = self.call_location();
        let dep = self.analyzer.link_method(method, &location)?;
        self.analyzer.use_method(dep);
        Ok(dep)
    }

    fn visit(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction {
            Instruction::Location { location } => self.location = location.clone(),
            Instruction::NullConstant { .. } | Instruction::Jump { .. } => {}
            Instruction::ClassConstant { receiver, constant } => {
                if let Some(node) = self.var(*receiver) {
                    let class_type = self.analyzer.class_type;
                    self.analyzer.propagate(node, class_type);
                    if constant.is_reference() {
                        let class_value = self.analyzer.class_value_node(node);
                        let ty = self.analyzer.type_index(&constant.type_name());
                        self.analyzer.propagate(class_value, ty);
                    }
                }
                if let Some(class_name) = constant.innermost_class() {
                    self.link_class(class_name)?;
                }
            }
            Instruction::StringConstant { receiver, .. } => {
                if let Some(node) = self.var(*receiver) {
                    let string = self.analyzer.type_index(classes::STRING);
                    self.analyzer.propagate(node, string);
                }
                self.link_and_use(&string_constructor())?;
            }
            Instruction::Assign { receiver, assignee } => {
                if let (Some(from), Some(to)) = (self.var(*assignee), self.var(*receiver)) {
                    self.analyzer.connect(from, to);
                }
            }
            Instruction::Cast {
                receiver,
                value,
                target_type,
            } => {
                let (Some(from), Some(to)) = (self.var(*value), self.var(*receiver)) else {
                    return Ok(());
                };
                let known = match target_type.innermost_class() {
                    Some(class_name) if !target_type.is_array() && class_name == classes::OBJECT => {
                        false
                    }
                    Some(class_name) => self.analyzer.class_source.get(class_name).is_some(),
                    None => target_type.is_array(),
                };
                if known {
                    let filter = self.analyzer.super_class_filter(&target_type.type_name());
                    self.analyzer.connect_filtered(from, to, Some(filter));
                } else {
                    self.analyzer.connect(from, to);
                }
            }
            Instruction::Exit { value } => {
                let result = self.analyzer.methods[self.dep.index()].result;
                if let (Some(value), Some(result)) = (value.and_then(|v| self.var(v)), result) {
                    self.analyzer.connect(value, result);
                }
            }
            Instruction::Raise { exception } => {
                if let Some(node) = self.var(*exception) {
                    let consumer = self.exception_consumer();
                    self.analyzer.add_consumer(node, consumer);
                }
            }
            Instruction::CreateArray {
                receiver,
                item_type,
                ..
            } => {
                if let Some(node) = self.var(*receiver) {
                    let array = ValueType::array(item_type.clone());
                    let ty = self.analyzer.type_index(&array.type_name());
                    self.analyzer.propagate(node, ty);
                }
                if let Some(class_name) = item_type.innermost_class() {
                    self.link_class(class_name)?;
                }
            }
            Instruction::CreateMultiArray {
                receiver,
                array_type,
                dimensions,
            } => {
                if let Some(mut node) = self.var(*receiver) {
                    let mut level = Some(array_type);
                    for _ in 0..dimensions.len() {
                        let Some(current) = level.filter(|t| t.is_array()) else {
                            break;
                        };
                        let ty = self.analyzer.type_index(&current.type_name());
                        self.analyzer.propagate(node, ty);
                        node = self.analyzer.array_item(node);
                        level = current.item_type();
                    }
                }
                if let Some(class_name) = array_type.innermost_class() {
                    self.link_class(class_name)?;
                }
            }
            Instruction::Create {
                receiver,
                class_name,
            } => {
                self.link_class(class_name)?;
                if let Some(node) = self.var(*receiver) {
                    let ty = self.analyzer.type_index(class_name);
                    self.analyzer.propagate(node, ty);
                }
            }
            Instruction::GetField {
                receiver,
                field,
                field_type,
                ..
            } => {
                let value = self.link_field(field)?;
                if field_type.is_reference() {
                    if let Some(receiver) = self.var(*receiver) {
                        self.analyzer.connect(value, receiver);
                    }
                }
                self.link_and_init(&field.class_name)?;
            }
            Instruction::PutField {
                field,
                value,
                field_type,
                ..
            } => {
                let field_node = self.link_field(field)?;
                if field_type.is_reference() {
                    if let Some(value) = self.var(*value) {
                        self.analyzer.connect(value, field_node);
                    }
                }
                self.link_and_init(&field.class_name)?;
            }
            Instruction::CloneArray { receiver, array } => {
                let (Some(array), Some(receiver)) = (self.var(*array), self.var(*receiver)) else {
                    return Ok(());
                };
                let copy = self.analyzer.register_consumer(
                    move |analyzer: &mut DependencyAnalyzer, ty: TypeIndex| {
                        analyzer.propagate(receiver, ty)
                    },
                );
                self.analyzer.add_consumer(array, copy);
                let from_item = self.analyzer.array_item(array);
                let to_item = self.analyzer.array_item(receiver);
                self.analyzer.connect(from_item, to_item);

                let dep = self.link_and_use(&clone_method())?;
                if let Some(this) = self.analyzer.methods[dep.index()].variables.first().copied() {
                    self.analyzer.connect(array, this);
                }
            }
            Instruction::UnwrapArray { receiver, array } => {
                if let (Some(array), Some(receiver)) = (self.var(*array), self.var(*receiver)) {
                    self.analyzer.connect(array, receiver);
                }
            }
            Instruction::GetElement {
                receiver, array, ..
            } => {
                if let (Some(array), Some(receiver)) = (self.var(*array), self.var(*receiver)) {
                    let item = self.analyzer.array_item(array);
                    self.analyzer.connect(item, receiver);
                }
            }
            Instruction::PutElement { array, value, .. } => {
                if let (Some(array), Some(value)) = (self.var(*array), self.var(*value)) {
                    let item = self.analyzer.array_item(array);
                    self.analyzer.connect(value, item);
                }
            }
            Instruction::Invoke {
                receiver,
                instance,
                method,
                arguments,
                invocation,
            } => match (instance, invocation) {
                (Some(instance), InvocationType::Virtual) => {
                    self.invoke_virtual(*receiver, *instance, method, arguments)?
                }
                _ => self.invoke_special(*receiver, *instance, method, arguments)?,
            },
            Instruction::InvokeDynamic { .. } => {}
            Instruction::IsInstance { checked_type, .. } => {
                if let Some(class_name) = checked_type.innermost_class() {
                    self.link_class(class_name)?;
                }
            }
            Instruction::InitClass { class_name } => self.link_and_init(class_name)?,
            Instruction::NullCheck { receiver, value } => {
                if let (Some(value), Some(receiver)) = (self.var(*value), self.var(*receiver)) {
                    self.analyzer.connect(value, receiver);
                }
                self.link_and_use(&null_pointer_constructor())?;
                let npe = self.analyzer.type_index(classes::NULL_POINTER_EXCEPTION);
                let consumer = self.exception_consumer();
                self.analyzer.schedule_consumer(consumer, vec![npe]);
            }
            Instruction::MonitorEnter { object } => {
                self.monitor(*object, &[methods::MONITOR_ENTER, methods::MONITOR_ENTER_SYNC])?
            }
            Instruction::MonitorExit { object } => {
                self.monitor(*object, &[methods::MONITOR_EXIT, methods::MONITOR_EXIT_SYNC])?
            }
        }
        Ok(())
    }

    fn link_field(&mut self, field: &FieldReference) -> Result<NodeId> {
        let location = self.call_location();
        let dep = self.analyzer.link_field(field, &location)?;
        Ok(self.analyzer.fields[dep.index()].value)
    }

    fn monitor(&mut self, object: Variable, names: &[&str]) -> Result<()> {
        let root = CallLocation::root();
        for name in names {
            let dep = self.analyzer.link_method(&monitor_method(name), &root)?;
            self.analyzer.use_method(dep);
            let lock = self.analyzer.methods[dep.index()].variables.get(1).copied();
            if let (Some(object), Some(lock)) = (self.var(object), lock) {
                self.analyzer.connect(object, lock);
            }
        }
        Ok(())
    }

    fn invoke_special(
        &mut self,
        receiver: Option<Variable>,
        instance: Option<Variable>,
        method: &MethodReference,
        arguments: &[Variable],
    ) -> Result<()> {
        self.link_and_init(&method.class_name)?;
        let dep = self.link_and_use(method)?;
        let target = &self.analyzer.methods[dep.index()];
        if target.missing {
            return Ok(());
        }
        let parameters: Vec<NodeId> = target
            .variables
            .iter()
            .take(target.parameter_count)
            .copied()
            .collect();
        let (result, thrown) = (target.result, target.thrown);

        for (argument, parameter) in arguments.iter().zip(parameters.iter().skip(1)) {
            if let Some(argument) = self.var(*argument) {
                self.analyzer.connect(argument, *parameter);
            }
        }
        if let (Some(instance), Some(this)) = (instance.and_then(|v| self.var(v)), parameters.first()) {
            self.analyzer.connect(instance, *this);
        }
        if let (Some(result), Some(receiver)) = (result, receiver.and_then(|v| self.var(v))) {
            self.analyzer.connect(result, receiver);
        }
        let consumer = self.exception_consumer();
        self.analyzer.add_consumer(thrown, consumer);
        Ok(())
    }

    fn invoke_virtual(
        &mut self,
        receiver: Option<Variable>,
        instance: Variable,
        method: &MethodReference,
        arguments: &[Variable],
    ) -> Result<()> {
        let Some(instance_node) = self.var(instance) else {
            return Ok(());
        };
        let mut nodes = Vec::with_capacity(arguments.len() + 1);
        nodes.push(instance_node);
        for argument in arguments {
            match self.var(*argument) {
                Some(node) => nodes.push(node),
                None => return Ok(()),
            }
        }
        let result = receiver.and_then(|v| self.var(v));

        let exception_consumer = self.exception_consumer();
        let filter = self.analyzer.super_class_filter(&method.class_name);
        let consumer = self.analyzer.register_consumer(VirtualCallConsumer::new(
            filter,
            method.descriptor.clone(),
            nodes,
            result,
            self.call_location(),
            exception_consumer,
        ));
        self.analyzer.add_consumer(instance_node, consumer);

        let location = self.call_location();
        for implementation in self.analyzer.class_source.overridden_methods(method) {
            self.analyzer.link_method(&implementation, &location)?;
        }

        if is_get_class(method) {
            if let Some(result) = result {
                let class_value = self.analyzer.class_value_node(result);
                self.analyzer.connect(instance_node, class_value);
                let class_type = self.analyzer.class_type;
                self.analyzer.propagate(result, class_type);
            }
        }
        Ok(())
    }
}
