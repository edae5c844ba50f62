//! StateGraphBuilder (spec §4.7): the mutable IR under construction.
//!
//! Grounded in the original `StateGraph`/`StateInterface` pair: `newState`
//! creates an undefined node addressed by an arena index (design note §9);
//! `startState` marks it defined and opens a cursor; `selectEntryNode` /
//! `selectHandleNode` / `selectExitNode` choose which chain subsequent
//! commands append to. `connectToNext` and `proceedToNext` both finalize
//! the pending command against a guard and ready the cursor for the next
//! statement — the original calls them from different call sites but with
//! identical observable effect on the chain, so this crate models them as
//! one operation (`append_edge`) exposed under both names for fidelity to
//! the §4.7 contract.

use crate::command::Command;
use crate::condition::Condition;
use crate::graph::state_graph::{StateGraph, StateId, StateNode, Transition};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    Entry,
    Handle,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    #[error("no chain selected; call select_entry_node/select_handle_node/select_exit_node first")]
    NoChainSelected,
    #[error("no state is currently open; call start_state first")]
    NoCurrentState,
    #[error("set_command called again before the pending command was connected")]
    PendingCommand,
    #[error("connect_to_next called with no pending command")]
    NoPendingCommand,
    #[error("duplicate transition rank {rank} in state \"{state}\"")]
    DuplicateRank { state: String, rank: i64 },
    #[error("state \"{0}\" is not defined")]
    StateNotDefined(String),
    #[error("state set is empty")]
    NoStates,
}

/// Incrementally assembled state graph IR (spec §4.7).
#[derive(Debug, Default)]
pub struct StateGraphBuilder {
    states: Vec<StateNode>,
    names: HashMap<String, StateId>,
    current: Option<StateId>,
    chain: Option<ChainKind>,
    pending: Option<Command>,
    init: Option<StateId>,
    fini: Option<StateId>,
}

impl StateGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an undefined state symbol, or returns the existing one.
    /// Idempotent for the same name.
    pub fn new_state(&mut self, name: &str) -> StateId {
        if let Some(id) = self.names.get(name) {
            return *id;
        }
        let id = StateId(self.states.len());
        self.states.push(StateNode::new(name.to_string()));
        self.names.insert(name.to_string(), id);
        id
    }

    pub fn is_defined(&self, id: StateId) -> bool {
        self.states[id.0].defined
    }

    pub fn state_name(&self, id: StateId) -> &str {
        &self.states[id.0].name
    }

    /// Looks up a state by name without creating it.
    pub fn find_state(&self, name: &str) -> Option<StateId> {
        self.names.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The state the cursor is currently positioned in, if any.
    pub fn current(&self) -> Option<StateId> {
        self.current
    }

    /// All known `(name, id)` pairs, for the "finished" validation pass.
    pub fn state_entries(&self) -> Vec<(String, StateId)> {
        self.names
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect()
    }

    /// Opens `state` for definition, resetting the chain cursor.
    pub fn start_state(&mut self, state: StateId) {
        self.states[state.0].defined = true;
        self.current = Some(state);
        self.chain = None;
        self.pending = None;
    }

    /// Closes the currently open state.
    pub fn end_state(&mut self) -> Result<(), BuilderError> {
        self.current.ok_or(BuilderError::NoCurrentState)?;
        self.current = None;
        self.chain = None;
        self.pending = None;
        Ok(())
    }

    pub fn select_entry_node(&mut self) -> Result<(), BuilderError> {
        self.current.ok_or(BuilderError::NoCurrentState)?;
        self.chain = Some(ChainKind::Entry);
        Ok(())
    }

    pub fn select_handle_node(&mut self) -> Result<(), BuilderError> {
        self.current.ok_or(BuilderError::NoCurrentState)?;
        self.chain = Some(ChainKind::Handle);
        Ok(())
    }

    pub fn select_exit_node(&mut self) -> Result<(), BuilderError> {
        self.current.ok_or(BuilderError::NoCurrentState)?;
        self.chain = Some(ChainKind::Exit);
        Ok(())
    }

    /// Stores the pending command at the cursor. Errors if no chain is
    /// selected, or if a previous pending command was never connected.
    pub fn set_command(&mut self, cmd: Command) -> Result<(), BuilderError> {
        self.chain.ok_or(BuilderError::NoChainSelected)?;
        if self.pending.is_some() {
            return Err(BuilderError::PendingCommand);
        }
        self.pending = Some(cmd);
        Ok(())
    }

    fn chain_mut(&mut self) -> Result<&mut Vec<(Command, Condition)>, BuilderError> {
        let current = self.current.ok_or(BuilderError::NoCurrentState)?;
        let chain = self.chain.ok_or(BuilderError::NoChainSelected)?;
        let node = &mut self.states[current.0];
        Ok(match chain {
            ChainKind::Entry => &mut node.entry,
            ChainKind::Handle => &mut node.handle,
            ChainKind::Exit => &mut node.exit,
        })
    }

    /// Appends an edge from the cursor to a freshly-allocated next node,
    /// taking the pending command set via [`Self::set_command`].
    pub fn connect_to_next(&mut self, guard: Condition) -> Result<(), BuilderError> {
        let cmd = self.pending.take().ok_or(BuilderError::NoPendingCommand)?;
        self.chain_mut()?.push((cmd, guard));
        Ok(())
    }

    /// Advances the cursor, using `guard` if given or [`Condition::TRUE`]
    /// otherwise. A no-op if no command is pending (a pure declaration
    /// produced no command).
    pub fn proceed_to_next(&mut self, guard: Option<Condition>) -> Result<(), BuilderError> {
        let Some(cmd) = self.pending.take() else {
            return Ok(());
        };
        self.chain_mut()?
            .push((cmd, guard.unwrap_or(Condition::TRUE)));
        Ok(())
    }

    /// Records an outbound transition with the given priority.
    pub fn transition_set(
        &mut self,
        state: StateId,
        target: StateId,
        guard: Condition,
        rank: i64,
    ) -> Result<(), BuilderError> {
        let node = &mut self.states[state.0];
        if node.transitions.iter().any(|t| t.rank == rank) {
            return Err(BuilderError::DuplicateRank {
                state: node.name.clone(),
                rank,
            });
        }
        node.transitions.push(Transition {
            guard,
            target,
            rank,
        });
        Ok(())
    }

    pub fn init_state(&mut self, state: StateId) {
        self.init = Some(state);
    }

    pub fn final_state(&mut self, state: StateId) {
        self.fini = Some(state);
    }

    /// Validates endpoints and definedness, then consumes the builder into
    /// a finished [`StateGraph`] (spec §4.8 action 12, "finished").
    pub fn finish(self) -> Result<StateGraph, BuilderError> {
        if self.states.is_empty() {
            return Err(BuilderError::NoStates);
        }
        let init = self.init.ok_or(BuilderError::NoStates)?;
        let fini = self.fini.ok_or(BuilderError::NoStates)?;
        if !self.states[init.0].defined {
            return Err(BuilderError::StateNotDefined(self.states[init.0].name.clone()));
        }
        if !self.states[fini.0].defined {
            return Err(BuilderError::StateNotDefined(self.states[fini.0].name.clone()));
        }
        for node in &self.states {
            if !node.defined {
                return Err(BuilderError::StateNotDefined(node.name.clone()));
            }
        }
        Ok(StateGraph {
            states: self.states,
            init,
            fini,
        })
    }
}
