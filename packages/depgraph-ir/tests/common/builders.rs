//! Test data builders
//!
//! Builder for method bodies. Bodies are a single block; registering a catch
//! clause adds an empty handler block after it.

use depgraph_ir::features::program_model::{BasicBlock, InvocationType, TryCatch, Variable};
use depgraph_ir::{FieldReference, Instruction, MethodReference, Program, TextLocation, ValueType};

/// Builder for single-block `Program`s
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    variable_count: usize,
    instructions: Vec<Instruction>,
    catches: Vec<(Option<String>, Option<Variable>)>,
}

/// Shorthand for `Variable(index)`
pub fn var(index: u32) -> Variable {
    Variable(index)
}

impl ProgramBuilder {
    /// Body using variables `0..variable_count`
    pub fn new(variable_count: usize) -> Self {
        Self {
            variable_count,
            ..Self::default()
        }
    }

    pub fn instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    pub fn at(self, file: &str, line: u32) -> Self {
        self.instruction(Instruction::Location {
            location: Some(TextLocation::new(file, line)),
        })
    }

    pub fn create(self, receiver: u32, class_name: &str) -> Self {
        self.instruction(Instruction::Create {
            receiver: var(receiver),
            class_name: class_name.to_string(),
        })
    }

    pub fn assign(self, receiver: u32, assignee: u32) -> Self {
        self.instruction(Instruction::Assign {
            receiver: var(receiver),
            assignee: var(assignee),
        })
    }

    pub fn cast(self, receiver: u32, value: u32, target_type: ValueType) -> Self {
        self.instruction(Instruction::Cast {
            receiver: var(receiver),
            value: var(value),
            target_type,
        })
    }

    pub fn string(self, receiver: u32, value: &str) -> Self {
        self.instruction(Instruction::StringConstant {
            receiver: var(receiver),
            value: value.to_string(),
        })
    }

    pub fn create_array(self, receiver: u32, item_type: ValueType, size: u32) -> Self {
        self.instruction(Instruction::CreateArray {
            receiver: var(receiver),
            item_type,
            size: var(size),
        })
    }

    /// `array_type` has one array level per entry of `dimensions`
    pub fn create_multi_array(self, receiver: u32, array_type: ValueType, dimensions: &[u32]) -> Self {
        self.instruction(Instruction::CreateMultiArray {
            receiver: var(receiver),
            array_type,
            dimensions: dimensions.iter().copied().map(var).collect(),
        })
    }

    pub fn get_element(self, receiver: u32, array: u32, index: u32) -> Self {
        self.instruction(Instruction::GetElement {
            receiver: var(receiver),
            array: var(array),
            index: var(index),
        })
    }

    pub fn put_element(self, array: u32, index: u32, value: u32) -> Self {
        self.instruction(Instruction::PutElement {
            array: var(array),
            index: var(index),
            value: var(value),
        })
    }

    pub fn clone_array(self, receiver: u32, array: u32) -> Self {
        self.instruction(Instruction::CloneArray {
            receiver: var(receiver),
            array: var(array),
        })
    }

    pub fn unwrap_array(self, receiver: u32, array: u32) -> Self {
        self.instruction(Instruction::UnwrapArray {
            receiver: var(receiver),
            array: var(array),
        })
    }

    pub fn get_field(self, receiver: u32, instance: Option<u32>, field: FieldReference, field_type: ValueType) -> Self {
        self.instruction(Instruction::GetField {
            receiver: var(receiver),
            instance: instance.map(var),
            field,
            field_type,
        })
    }

    pub fn put_field(self, instance: Option<u32>, field: FieldReference, value: u32, field_type: ValueType) -> Self {
        self.instruction(Instruction::PutField {
            instance: instance.map(var),
            field,
            value: var(value),
            field_type,
        })
    }

    pub fn invoke_static(self, receiver: Option<u32>, method: MethodReference, arguments: &[u32]) -> Self {
        self.instruction(Instruction::Invoke {
            receiver: receiver.map(var),
            instance: None,
            method,
            arguments: arguments.iter().copied().map(var).collect(),
            invocation: InvocationType::Special,
        })
    }

    pub fn invoke_virtual(
        self,
        receiver: Option<u32>,
        instance: u32,
        method: MethodReference,
        arguments: &[u32],
    ) -> Self {
        self.instruction(Instruction::Invoke {
            receiver: receiver.map(var),
            instance: Some(var(instance)),
            method,
            arguments: arguments.iter().copied().map(var).collect(),
            invocation: InvocationType::Virtual,
        })
    }

    pub fn raise(self, exception: u32) -> Self {
        self.instruction(Instruction::Raise {
            exception: var(exception),
        })
    }

    pub fn exit(self, value: Option<u32>) -> Self {
        self.instruction(Instruction::Exit {
            value: value.map(var),
        })
    }

    /// Catch clause protecting the body; `None` catches everything
    pub fn catch(mut self, exception_type: Option<&str>, handler_variable: Option<u32>) -> Self {
        self.catches
            .push((exception_type.map(str::to_string), handler_variable.map(var)));
        self
    }

    pub fn build(self) -> Program {
        let mut body = BasicBlock::new(self.instructions);
        if self.catches.is_empty() {
            return Program {
                variable_count: self.variable_count,
                blocks: vec![body],
            };
        }

        let handler = 1;
        body.try_catches = self
            .catches
            .into_iter()
            .map(|(exception_type, handler_variable)| TryCatch {
                exception_type,
                handler,
                handler_variable,
            })
            .collect();
        let handler_block = BasicBlock::new(vec![Instruction::Exit { value: None }]);
        Program {
            variable_count: self.variable_count,
            blocks: vec![body, handler_block],
        }
    }
}
