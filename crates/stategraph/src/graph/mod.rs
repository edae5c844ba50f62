//! StateGraphBuilder and the compiled StateGraph IR (spec §4.7, §3).

mod builder;
mod state_graph;

pub use builder::{BuilderError, ChainKind, StateGraphBuilder};
pub use state_graph::{StateGraph, StateId, Transition};
