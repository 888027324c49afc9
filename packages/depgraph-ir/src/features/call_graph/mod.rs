//! # Call Graph
//!
//! Caller to callee edges, call sites and field/class access sites recorded
//! while the dependency analyzer discovers reachable code.

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{CallGraphNode, CallSite, CallSiteId, ClassAccessSite, FieldAccessSite};
pub use infrastructure::DefaultCallGraph;
pub use ports::CallGraph;
