//! Method bodies: blocks, phis and exception handlers

use super::instruction::{Instruction, Variable};
use serde::{Deserialize, Serialize};

/// One incoming value of a phi
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incoming {
    /// Predecessor block index
    pub source: usize,
    pub value: Variable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phi {
    pub receiver: Variable,
    pub incomings: Vec<Incoming>,
}

/// Exception handler protecting a block.
///
/// `exception_type: None` catches everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryCatch {
    #[serde(default)]
    pub exception_type: Option<String>,
    /// Handler block index
    pub handler: usize,
    #[serde(default)]
    pub handler_variable: Option<Variable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicBlock {
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub phis: Vec<Phi>,
    /// Handlers in source order; the first matching one wins
    #[serde(default)]
    pub try_catches: Vec<TryCatch>,
}

impl BasicBlock {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            ..Self::default()
        }
    }
}

/// Decoded method body.
///
/// Variables `0..=parameter_count` hold `this` and the parameters, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub variable_count: usize,
    pub blocks: Vec<BasicBlock>,
}

impl Program {
    pub fn new(variable_count: usize) -> Self {
        Self {
            variable_count,
            blocks: Vec::new(),
        }
    }

    /// Single-block program
    pub fn single_block(variable_count: usize, instructions: Vec<Instruction>) -> Self {
        Self {
            variable_count,
            blocks: vec![BasicBlock::new(instructions)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn create_variable(&mut self) -> Variable {
        let var = Variable(self.variable_count as u32);
        self.variable_count += 1;
        var
    }

    pub fn create_block(&mut self) -> usize {
        self.blocks.push(BasicBlock::default());
        self.blocks.len() - 1
    }

    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.instructions.len()).sum()
    }
}
