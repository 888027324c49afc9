//! Program model infrastructure

pub mod emitter;

pub use emitter::ProgramEmitter;
