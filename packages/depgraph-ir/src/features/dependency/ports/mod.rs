//! Ports (Interfaces) for the dependency engine
//!
//! Extension points: consumers attached to nodes, listeners and plugins,
//! dynamic call site substitutors, interruptors; plus the read-only
//! [`DependencyInfo`] view of results.

pub mod consumer;
pub mod info;
pub mod interruptor;
pub mod listener;
pub mod substitutor;

pub use consumer::{ConsumerId, DependencyConsumer};
pub use info::DependencyInfo;
pub use interruptor::{AnalysisInterruptor, CancellationFlag};
pub use listener::{DependencyListener, DependencyPlugin};
pub use substitutor::{BootstrapMethodSubstitutor, DynamicCallSite};
