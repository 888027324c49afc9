//! Platform reference check
//!
//! With platform tags configured, instructions referring to a class or method
//! marked unsupported on any of those tags are reported and replaced by a null
//! constant, or dropped when they produce no value.

use crate::features::class_model::ClassSource;
use crate::features::dependency::application::DependencyAnalyzer;
use crate::features::program_model::{Instruction, Program};
use crate::shared::models::{CallLocation, MethodReference, TextLocation};
use tracing::warn;

impl DependencyAnalyzer {
    /// Strip references unsupported on the configured platform; returns whether
    /// anything changed
    pub(crate) fn resolve_references(&mut self, caller: &MethodReference, program: &mut Program) -> bool {
        if self.config.platform_tags.is_empty() {
            return false;
        }

        let mut changed = false;
        for block in &mut program.blocks {
            let mut location: Option<TextLocation> = None;
            let mut index = 0;
            while index < block.instructions.len() {
                let instruction = &block.instructions[index];
                if let Instruction::Location { location: at } = instruction {
                    location = at.clone();
                    index += 1;
                    continue;
                }
                let Some(message) = self.unsupported_reference(instruction) else {
                    index += 1;
                    continue;
                };

                warn!(caller = %caller, "{}", message);
                self.diagnostics
                    .error(CallLocation::new(caller.clone(), location.clone()), message);
                changed = true;
                match instruction.receiver() {
                    Some(receiver) => {
                        block.instructions[index] = Instruction::NullConstant { receiver };
                        index += 1;
                    }
                    None => {
                        block.instructions.remove(index);
                    }
                }
            }
        }
        changed
    }

    /// Diagnostic for the first unsupported symbol `instruction` refers to
    fn unsupported_reference(&mut self, instruction: &Instruction) -> Option<String> {
        let class_name = match instruction {
            Instruction::Create { class_name, .. } | Instruction::InitClass { class_name } => {
                Some(class_name.as_str())
            }
            Instruction::ClassConstant { constant, .. } => constant.innermost_class(),
            Instruction::CreateArray { item_type, .. } => item_type.innermost_class(),
            Instruction::CreateMultiArray { array_type, .. } => array_type.innermost_class(),
            Instruction::GetField { field, .. } | Instruction::PutField { field, .. } => {
                Some(field.class_name.as_str())
            }
            Instruction::Invoke { method, .. } => Some(method.class_name.as_str()),
            _ => None,
        }?;
        if self.is_unsupported_class(class_name) {
            return Some(format!("Class {} is not supported on current target", class_name));
        }

        let Instruction::Invoke { method, .. } = instruction else {
            return None;
        };
        let resolved = self.class_source.cached_method(method)?;
        let tags = &self.config.platform_tags;
        let unsupported = self.is_unsupported_class(&resolved.class_name)
            || self
                .class_source
                .get_method(&resolved)
                .is_some_and(|m| m.is_unsupported_on(tags));
        unsupported.then(|| format!("Method {} is not supported on current target", method))
    }

    fn is_unsupported_class(&self, class_name: &str) -> bool {
        self.class_source
            .get(class_name)
            .is_some_and(|cls| cls.is_unsupported_on(&self.config.platform_tags))
    }
}
