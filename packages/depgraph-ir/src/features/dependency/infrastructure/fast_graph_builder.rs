//! Coarse graph building
//!
//! In fast mode every object value lives in the shared instances node and
//! every class value in the shared classes node, so data movement inside a
//! body needs no edges at all. What remains is reachability: created types go
//! into the instances node, accessed symbols are linked, and every virtual
//! call joins the single dispatch consumer of its method.

use super::graph_builder::{
    clone_method, monitor_method, null_pointer_constructor, string_constructor, MonitorArgument,
};
use crate::errors::Result;
use crate::features::class_model::ClassSource;
use crate::features::dependency::application::DependencyAnalyzer;
use crate::features::dependency::domain::{MethodDepId, NodeId};
use crate::features::program_model::{Instruction, InvocationType, Program};
use crate::shared::constants::{classes, methods};
use crate::shared::models::{CallLocation, MethodReference, TextLocation, ValueType};

impl DependencyAnalyzer {
    pub(crate) fn build_fast_graph(
        &mut self,
        dep: MethodDepId,
        caller: &MethodReference,
        program: &Program,
        synchronized: bool,
        is_static: bool,
    ) -> Result<()> {
        let Some((instances, classes_node)) =
            self.strategy.fast_nodes().map(|fast| (fast.instances, fast.classes))
        else {
            return Ok(());
        };
        let variables = &mut self.methods[dep.index()].variables;
        variables.resize(program.variable_count.max(variables.len()), instances);

        let mut builder = FastGraphBuilder {
            analyzer: self,
            caller: caller.clone(),
            location: None,
            instances,
            classes: classes_node,
        };
        for block in &program.blocks {
            for instruction in &block.instructions {
                builder.visit(instruction)?;
            }
            for try_catch in &block.try_catches {
                if let Some(exception_type) = &try_catch.exception_type {
                    let location = CallLocation::in_method(caller.clone());
                    builder.analyzer.link_class(exception_type, &location)?;
                }
            }
        }

        if synchronized {
            let monitor = if is_static {
                MonitorArgument::Class
            } else {
                MonitorArgument::Node(instances)
            };
            self.link_monitor_methods(monitor)?;
        }
        Ok(())
    }
}

struct FastGraphBuilder<'a> {
    analyzer: &'a mut DependencyAnalyzer,
    caller: MethodReference,
    location: Option<TextLocation>,
    instances: NodeId,
    classes: NodeId,
}

impl FastGraphBuilder<'_> {
    fn call_location(&self) -> CallLocation {
        CallLocation::new(self.caller.clone(), self.location.clone())
    }

    fn instantiate(&mut self, type_name: &str) {
        let ty = self.analyzer.type_index(type_name);
        self.analyzer.propagate(self.instances, ty);
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

    fn link_and_use(&mut self, method: &MethodReference, location: &CallLocation) -> Result<()> {
        let dep = self.analyzer.link_method(method, location)?;
        self.analyzer.use_method(dep);
        Ok(())
    }

    fn visit(&mut self, instruction: &Instruction) -> Result<()> {
        match instruction {
            Instruction::Location { location } => self.location = location.clone(),
            Instruction::ClassConstant { constant, .. } => {
                self.instantiate(classes::CLASS);
                if constant.is_reference() {
                    let ty = self.analyzer.type_index(&constant.type_name());
                    self.analyzer.propagate(self.classes, ty);
                }
                if let Some(class_name) = constant.innermost_class() {
                    self.link_class(class_name)?;
                }
            }
            Instruction::StringConstant { .. } => {
                self.instantiate(classes::STRING);
                let location = self.call_location();
                self.link_and_use(&string_constructor(), &location)?;
            }
            Instruction::Create { class_name, .. } => {
                self.link_class(class_name)?;
                self.instantiate(class_name);
            }
            Instruction::CreateArray { item_type, .. } => {
                self.instantiate(&ValueType::array(item_type.clone()).type_name());
                if let Some(class_name) = item_type.innermost_class() {
                    self.link_class(class_name)?;
                }
            }
            Instruction::CreateMultiArray {
                array_type,
                dimensions,
                ..
            } => {
                let mut level = Some(array_type);
                for _ in 0..dimensions.len() {
                    let Some(current) = level.filter(|t| t.is_array()) else {
                        break;
                    };
                    self.instantiate(&current.type_name());
                    level = current.item_type();
                }
                if let Some(class_name) = array_type.innermost_class() {
                    self.link_class(class_name)?;
                }
            }
            Instruction::GetField { field, .. } | Instruction::PutField { field, .. } => {
                let location = self.call_location();
                self.analyzer.link_field(field, &location)?;
                self.link_and_init(&field.class_name)?;
            }
            Instruction::CloneArray { .. } => {
                let location = self.call_location();
                self.link_and_use(&clone_method(), &location)?;
            }
            Instruction::Invoke {
                method,
                invocation: InvocationType::Virtual,
                instance: Some(_),
                ..
            } => self.invoke_virtual(method)?,
            Instruction::Invoke { method, .. } => {
                self.link_and_init(&method.class_name)?;
                let location = self.call_location();
                self.link_and_use(method, &location)?;
            }
            Instruction::IsInstance { checked_type, .. } => {
                if let Some(class_name) = checked_type.innermost_class() {
                    self.link_class(class_name)?;
                }
            }
            Instruction::InitClass { class_name } => self.link_and_init(class_name)?,
            Instruction::NullCheck { .. } => {
                let location = self.call_location();
                self.link_and_use(&null_pointer_constructor(), &location)?;
                self.instantiate(classes::NULL_POINTER_EXCEPTION);
            }
            Instruction::MonitorEnter { .. } => {
                self.monitor(&[methods::MONITOR_ENTER, methods::MONITOR_ENTER_SYNC])?
            }
            Instruction::MonitorExit { .. } => {
                self.monitor(&[methods::MONITOR_EXIT, methods::MONITOR_EXIT_SYNC])?
            }
            Instruction::NullConstant { .. }
            | Instruction::Assign { .. }
            | Instruction::Cast { .. }
            | Instruction::Exit { .. }
            | Instruction::Raise { .. }
            | Instruction::UnwrapArray { .. }
            | Instruction::GetElement { .. }
            | Instruction::PutElement { .. }
            | Instruction::InvokeDynamic { .. }
            | Instruction::Jump { .. } => {}
        }
        Ok(())
    }

    fn invoke_virtual(&mut self, method: &MethodReference) -> Result<()> {
        let location = self.call_location();
        if let Some(call) = self.analyzer.fast_virtual_call(method) {
            self.analyzer.call_graph.add_virtual_caller(
                call.site,
                &self.caller,
                location.source_location.clone(),
            );
        }
        for implementation in self.analyzer.class_source.overridden_methods(method) {
            self.analyzer.link_method(&implementation, &location)?;
        }
        if method.name() == methods::GET_CLASS && method.parameter_count() == 0 {
            self.analyzer.connect(self.instances, self.classes);
            self.instantiate(classes::CLASS);
        }
        Ok(())
    }

    fn monitor(&mut self, names: &[&str]) -> Result<()> {
        let root = CallLocation::root();
        for name in names {
            self.link_and_use(&monitor_method(name), &root)?;
        }
        Ok(())
    }
}
