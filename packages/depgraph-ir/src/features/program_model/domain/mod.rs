//! Program model domain types

pub mod instruction;
pub mod program;

pub use instruction::{BootstrapArgument, Instruction, InvocationType, Variable};
pub use program::{BasicBlock, Incoming, Phi, Program, TryCatch};
