//! Instruction emitter for code generated during analysis

use crate::features::program_model::domain::{Instruction, InvocationType, Program, Variable};
use crate::shared::models::{MethodReference, TextLocation, ValueType};

/// Appends instructions to a block of a program under construction.
///
/// Every emitted block is preceded by a `Location` marker when the location changes.
pub struct ProgramEmitter<'a> {
    program: &'a mut Program,
    block: usize,
    location: Option<TextLocation>,
    emitted_location: Option<Option<TextLocation>>,
}

impl<'a> ProgramEmitter<'a> {
    /// Emit into `block`, which must exist
    pub fn new(program: &'a mut Program, block: usize) -> Self {
        Self {
            program,
            block,
            location: None,
            emitted_location: None,
        }
    }

    pub fn program(&self) -> &Program {
        self.program
    }

    pub fn current_block(&self) -> usize {
        self.block
    }

    /// Continue emitting at the end of another block
    pub fn enter(&mut self, block: usize) {
        self.block = block;
        self.emitted_location = None;
    }

    pub fn create_block(&mut self) -> usize {
        self.program.create_block()
    }

    pub fn set_location(&mut self, location: Option<TextLocation>) {
        self.location = location;
    }

    pub fn new_variable(&mut self) -> Variable {
        self.program.create_variable()
    }

    pub fn add(&mut self, instruction: Instruction) {
        if self.emitted_location.as_ref() != Some(&self.location) {
            self.emitted_location = Some(self.location.clone());
            self.program.blocks[self.block]
                .instructions
                .push(Instruction::Location {
                    location: self.location.clone(),
                });
        }
        self.program.blocks[self.block].instructions.push(instruction);
    }

    pub fn null_constant(&mut self) -> Variable {
        let receiver = self.new_variable();
        self.add(Instruction::NullConstant { receiver });
        receiver
    }

    pub fn string_constant(&mut self, value: impl Into<String>) -> Variable {
        let receiver = self.new_variable();
        self.add(Instruction::StringConstant {
            receiver,
            value: value.into(),
        });
        receiver
    }

    pub fn class_constant(&mut self, constant: ValueType) -> Variable {
        let receiver = self.new_variable();
        self.add(Instruction::ClassConstant { receiver, constant });
        receiver
    }

    pub fn construct(&mut self, class_name: impl Into<String>) -> Variable {
        let receiver = self.new_variable();
        self.add(Instruction::Create {
            receiver,
            class_name: class_name.into(),
        });
        receiver
    }

    pub fn assign(&mut self, receiver: Variable, assignee: Variable) {
        self.add(Instruction::Assign { receiver, assignee });
    }

    /// Statically bound call; returns the result variable for non-void methods
    pub fn invoke_special(
        &mut self,
        instance: Option<Variable>,
        method: MethodReference,
        arguments: Vec<Variable>,
    ) -> Option<Variable> {
        self.invoke(instance, method, arguments, InvocationType::Special)
    }

    pub fn invoke_virtual(
        &mut self,
        instance: Variable,
        method: MethodReference,
        arguments: Vec<Variable>,
    ) -> Option<Variable> {
        self.invoke(Some(instance), method, arguments, InvocationType::Virtual)
    }

    fn invoke(
        &mut self,
        instance: Option<Variable>,
        method: MethodReference,
        arguments: Vec<Variable>,
        invocation: InvocationType,
    ) -> Option<Variable> {
        let receiver = if *method.result_type() == ValueType::Void {
            None
        } else {
            Some(self.new_variable())
        };
        self.add(Instruction::Invoke {
            receiver,
            instance,
            method,
            arguments,
            invocation,
        });
        receiver
    }

    pub fn jump(&mut self, target: usize) {
        self.add(Instruction::Jump { target });
    }
}
