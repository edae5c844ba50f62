//! Integration-level coverage of [`StateGraphBuilder`] assembling a graph
//! with multiple chains and cross-referenced states, as distinct from the
//! unit tests colocated with the builder itself.

use stategraph::condition::Condition;
use stategraph::graph::{BuilderError, StateGraphBuilder};

#[test]
fn entry_handle_exit_chains_are_independent() {
    use stategraph::command::Command;

    let mut b = StateGraphBuilder::new();
    let s = b.new_state("s");
    b.start_state(s);

    b.select_entry_node().unwrap();
    b.set_command(Command::Nop).unwrap();
    b.connect_to_next(Condition::TRUE).unwrap();

    b.select_handle_node().unwrap();
    b.set_command(Command::Nop).unwrap();
    b.connect_to_next(Condition::TRUE).unwrap();
    b.set_command(Command::Nop).unwrap();
    b.connect_to_next(Condition::TRUE).unwrap();

    b.select_exit_node().unwrap();
    // no commands in exit

    b.end_state().unwrap();
    b.init_state(s);
    b.final_state(s);
    let graph = b.finish().unwrap();

    assert_eq!(graph.entry_chain(s).len(), 1);
    assert_eq!(graph.handle_chain(s).len(), 2);
    assert!(graph.exit_chain(s).is_empty());
}

#[test]
fn transitions_accumulate_in_priority_order() {
    let mut b = StateGraphBuilder::new();
    let a = b.new_state("a");
    let b_id = b.new_state("b");
    b.start_state(a);
    b.end_state().unwrap();
    b.start_state(b_id);
    b.end_state().unwrap();

    b.transition_set(a, b_id, Condition::TRUE, 2).unwrap();
    b.transition_set(a, a, Condition::TRUE, 1).unwrap();
    b.transition_set(a, b_id, Condition::TRUE, 0).unwrap();

    b.init_state(a);
    b.final_state(b_id);
    let graph = b.finish().unwrap();

    let ranks: Vec<i64> = graph.transitions(a).iter().map(|t| t.rank).collect();
    assert_eq!(ranks, vec![2, 1, 0]);
}

#[test]
fn connect_to_next_without_pending_command_is_an_error() {
    let mut b = StateGraphBuilder::new();
    let s = b.new_state("s");
    b.start_state(s);
    b.select_entry_node().unwrap();
    assert!(matches!(
        b.connect_to_next(Condition::TRUE),
        Err(BuilderError::NoPendingCommand)
    ));
}

#[test]
fn finish_requires_init_and_final_endpoints() {
    let mut b = StateGraphBuilder::new();
    let s = b.new_state("s");
    b.start_state(s);
    b.end_state().unwrap();
    assert!(b.finish().is_err());
}
