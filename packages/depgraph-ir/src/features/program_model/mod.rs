//! # Program Model
//!
//! Already-decoded method bodies consumed by the dependency graph builders:
//! basic blocks of reference-moving instructions, phis and exception handlers
//! in source order.
//!
//! [`ProgramEmitter`] lets dynamic call site substitutors append replacement code.

pub mod domain;
pub mod infrastructure;

pub use domain::{
    BasicBlock, BootstrapArgument, Incoming, Instruction, InvocationType, Phi, Program, TryCatch,
    Variable,
};
pub use infrastructure::ProgramEmitter;
