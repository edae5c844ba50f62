//! stategraph - compile a textual state-graph DSL into an executable IR
//!
//! A library for parsing a small domain-specific language describing
//! hierarchical states with `entry`/`handle`/`exit` sections and a
//! prioritized transition table, and assembling it into a [`StateGraph`]
//! that references commands, conditions, and event bindings.
//!
//! # Quick Start
//!
//! ```rust
//! use stategraph::{compile, EventService};
//!
//! let source = "Initial_State s0\nFinal_State s0\nstate s0 { }\n";
//! let graph = compile(source, &EventService::new()).unwrap();
//! assert_eq!(graph.state_count(), 1);
//! ```
//!
//! # Advanced Usage
//!
//! For more control over event resolution, register events on an
//! [`EventService`] before compiling:
//!
//! ```rust
//! use stategraph::prelude::*;
//!
//! let mut events = EventService::new();
//! events.register("tick", vec![]);
//!
//! let source = "Initial_State s0\nFinal_State s0\nstate s0 { entry { emit(\"tick\") } }\n";
//! let graph = compile(source, &events).unwrap();
//! assert_eq!(graph.entry_chain(graph.init()).len(), 1);
//! ```

pub mod command;
pub mod condition;
pub mod core;
pub mod event;
pub mod graph;
pub mod parser;
pub mod property;
pub mod value;

pub use core::{CompileError, GrammarMismatch};
pub use event::EventService;
pub use graph::{StateGraph, StateGraphBuilder, StateId};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::command::{Command, CommandParser, ValueChangeParser};
    pub use crate::condition::{Condition, ConditionParser};
    pub use crate::core::{CompileError, GrammarMismatch};
    pub use crate::event::{EventHandle, EventProcessor, EventService};
    pub use crate::graph::{StateGraph, StateGraphBuilder, StateId};
    pub use crate::value::{Value, ValueParser};
}

/// Compile `source` into a [`StateGraph`], consulting `events` to resolve
/// event names referenced by `emit`/`connect` statements.
///
/// This is the crate's single entry point (spec §4.8 `StateGraphParser`);
/// see [`parser::parse`] for the underlying driver.
///
/// # Example
/// ```rust
/// use stategraph::{compile, EventService};
///
/// let graph = compile(
///     "Initial_State s0\nFinal_State s0\nstate s0 { }\n",
///     &EventService::new(),
/// )
/// .unwrap();
/// assert_eq!(graph.state_count(), 1);
/// ```
pub fn compile(source: &str, events: &EventService) -> Result<StateGraph, CompileError> {
    parser::parse(source, events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_minimal_graph() {
        let graph = compile(
            "Initial_State s0\nFinal_State s0\nstate s0 { }\n",
            &EventService::new(),
        )
        .unwrap();
        assert_eq!(graph.state_count(), 1);
    }

    #[test]
    fn reports_syntax_errors_with_line_numbers() {
        let err = compile("state a { }\n", &EventService::new()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
