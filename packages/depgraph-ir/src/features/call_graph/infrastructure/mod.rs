pub mod default_call_graph;

pub use default_call_graph::DefaultCallGraph;
