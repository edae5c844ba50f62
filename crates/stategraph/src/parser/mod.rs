//! StateGraphParser (spec §4.8): the top-level grammar driver.
//!
//! Orchestrates the [`crate::value::ValueParser`], [`crate::condition::ConditionParser`],
//! [`crate::command::CommandParser`]/[`crate::command::ValueChangeParser`], and
//! [`crate::event::EventService`] sub-parsers against a [`crate::core::Cursor`],
//! emitting [`StateGraphBuilder`] calls in the order described by
//! `StateGraphParser.cxx`'s semantic actions.

use crate::command::{Command, CommandParser, ValueChangeParser};
use crate::condition::{Condition, ConditionParser};
use crate::core::{CompileError, Cursor};
use crate::event::{EventHandle, EventService};
use crate::graph::{StateGraph, StateGraphBuilder, StateId};
use crate::value::ValueParser;
use std::collections::HashMap;

/// Strips an optional leading `do` keyword, as seen in the connect-event
/// sink position (spec §8 scenario 6: `connect h ("e", do nop)`), where the
/// sink is written with the same `do`-prefixed surface syntax as a plain
/// `docommand` even though the grammar's `command` nonterminal alone does
/// not include it.
fn strip_leading_do(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("do") {
        Some(rest) if rest.chars().next().map(char::is_whitespace).unwrap_or(true) => {
            rest.trim_start()
        }
        _ => trimmed,
    }
}

/// Compiles `src` into a [`StateGraph`], consulting `events` to resolve
/// event names used in `emit`/`connect` statements.
pub fn parse(src: &str, events: &EventService) -> Result<StateGraph, CompileError> {
    StateGraphParser::new(src, events).parse()
}

struct StateGraphParser<'src, 'ev> {
    cursor: Cursor<'src>,
    events: &'ev EventService,
    builder: StateGraphBuilder,
    handles: HashMap<String, EventHandle>,
    minit: String,
    mfini: String,
    rank: i64,
}

impl<'src, 'ev> StateGraphParser<'src, 'ev> {
    fn new(src: &'src str, events: &'ev EventService) -> Self {
        Self {
            cursor: Cursor::new(src),
            events,
            builder: StateGraphBuilder::new(),
            handles: HashMap::new(),
            minit: String::new(),
            mfini: String::new(),
            rank: 0,
        }
    }

    fn line(&self) -> usize {
        self.cursor.line()
    }

    fn expected(&self, descriptor: &str) -> CompileError {
        CompileError::expected(descriptor, self.line())
    }

    fn semantic(&self, message: impl Into<String>) -> CompileError {
        CompileError::semantic(message, self.line())
    }

    fn expect_ident(&mut self) -> Result<String, CompileError> {
        self.cursor
            .parse_identifier()
            .ok_or_else(|| self.expected("Expected a valid identifier."))
    }

    fn expect_open_brace(&mut self) -> Result<(), CompileError> {
        if self.cursor.consume_char('{') {
            Ok(())
        } else {
            Err(self.expected("Open brace expected."))
        }
    }

    fn expect_close_brace(&mut self) -> Result<(), CompileError> {
        if self.cursor.consume_char('}') {
            Ok(())
        } else {
            Err(self.expected(
                "Ending brace expected ( or could not find out what this line means ).",
            ))
        }
    }

    /// A line ends at a literal newline, at end-of-input, at the upcoming
    /// close-brace of whichever block encloses this line (every §8 scenario
    /// closes a section and its enclosing `state { ... }` on the same
    /// physical line), or at the start of the next recognized section
    /// keyword (`entry`/`exit`/`handle`/`transitions` back-to-back on one
    /// line, as in the `entry { ... } exit { ... }` scenarios). The brace
    /// and keyword are only peeked at, never consumed, so the caller that
    /// actually owns them still sees and consumes them.
    fn expect_newline(&mut self) -> Result<(), CompileError> {
        const SECTION_KEYWORDS: &[&str] = &["entry", "exit", "handle", "transitions"];
        if self.cursor.peek_punct('}') || SECTION_KEYWORDS.iter().any(|kw| self.cursor.peek_keyword(kw)) {
            return Ok(());
        }
        if self.cursor.expect_newline() {
            Ok(())
        } else {
            Err(CompileError::syntax(self.line()))
        }
    }

    /// Top-level driver: `production := varline* state*`, then `finished`.
    fn parse(mut self) -> Result<StateGraph, CompileError> {
        self.cursor.skip_blank_lines();
        self.parse_varlines()?;
        self.cursor.skip_blank_lines();
        while self.cursor.peek_keyword("state") {
            self.parse_state()?;
            self.cursor.skip_blank_lines();
        }
        if !self.cursor.is_eof() {
            return Err(CompileError::syntax(self.line()));
        }
        self.finished()
    }

    fn parse_varlines(&mut self) -> Result<(), CompileError> {
        loop {
            self.cursor.skip_blank_lines();
            if self.cursor.consume_keyword("Event_Handle") {
                let name = self.expect_ident()?;
                self.handledecl(&name)?;
            } else if self.cursor.consume_keyword("Initial_State") {
                let name = self.expect_ident()?;
                self.minit = name;
            } else if self.cursor.consume_keyword("Final_State") {
                let name = self.expect_ident()?;
                self.mfini = name;
            } else {
                return Ok(());
            }
            self.expect_newline()?;
        }
    }

    fn handledecl(&mut self, name: &str) -> Result<(), CompileError> {
        if self.handles.contains_key(name) {
            return Err(self.semantic(format!("Event Handle {name} redefined.")));
        }
        self.handles.insert(name.to_string(), EventHandle::new(name));
        Ok(())
    }

    /// `state := newline* "state" IDENT newline? "{" content "}" newline`
    fn parse_state(&mut self) -> Result<(), CompileError> {
        self.cursor.consume_keyword("state");
        let name = self.expect_ident()?;
        let state = self.statedef(&name)?;
        self.builder.start_state(state);

        self.cursor.skip_inline_ws();
        if self.cursor.peek_char() == Some('\n') {
            self.cursor.bump();
        }
        self.expect_open_brace()?;

        loop {
            self.cursor.skip_blank_lines();
            if self.cursor.peek_punct('}') {
                break;
            }
            self.parse_content_line()?;
        }
        self.expect_close_brace()?;
        self.expect_newline()?;

        self.builder
            .end_state()
            .map_err(|e| self.semantic(e.to_string()))?;
        Ok(())
    }

    fn statedef(&mut self, name: &str) -> Result<StateId, CompileError> {
        if self.minit.is_empty() {
            return Err(self.semantic(
                "Initial State not set. Write on top : Initial_State statename",
            ));
        }
        if self.mfini.is_empty() {
            return Err(self.semantic(
                "Final State not set. Write on top : Final_State statename",
            ));
        }
        let id = self.builder.new_state(name);
        if self.builder.is_defined(id) {
            return Err(self.semantic(format!("state {name} redefined.")));
        }
        Ok(id)
    }

    /// `line := ( statevars | entry | handle | transitions | exit )? newline`
    fn parse_content_line(&mut self) -> Result<(), CompileError> {
        if self.cursor.peek_keyword("entry") {
            self.parse_entry_exit_section(true)?;
        } else if self.cursor.peek_keyword("exit") {
            self.parse_entry_exit_section(false)?;
        } else if self.cursor.peek_keyword("handle") {
            self.parse_handle_section()?;
        } else if self.cursor.peek_keyword("transitions") {
            self.parse_transitions_section()?;
        } else {
            self.parse_content_statevars()?;
        }
        self.expect_newline()
    }

    /// Like [`Self::try_parse_statevars`], but a grammar mismatch is
    /// reported as the "expected one of" typed assertion from the
    /// original grammar's `expect_state`/`expect_handle`/`expect_transition`
    /// family (spec §6): at this position the line was neither a section
    /// header nor a recognized statevars form.
    fn parse_content_statevars(&mut self) -> Result<(), CompileError> {
        self.cursor.skip_ws_and_comments();
        if matches!(self.cursor.peek_char(), None | Some('\n')) {
            return Ok(());
        }
        let text = self.cursor.take_until_one_of(&["}"]);
        if text.is_empty() {
            return Ok(());
        }
        let change = ValueChangeParser::parse(&text)
            .map_err(|_| CompileError::expected_section(self.line()))?;
        self.seenvaluechange(change.assign_command())
    }

    /// Attempts to parse a bare `statevars` statement on the remainder of
    /// the current physical line. A blank remainder is the empty
    /// alternative the grammar allows.
    fn try_parse_statevars(&mut self) -> Result<bool, CompileError> {
        self.cursor.skip_ws_and_comments();
        if matches!(self.cursor.peek_char(), None | Some('\n')) {
            return Ok(false);
        }
        let text = self.cursor.take_until_one_of(&["}"]);
        if text.is_empty() {
            return Ok(false);
        }
        let change = ValueChangeParser::parse(&text)
            .map_err(|_| CompileError::syntax(self.line()))?;
        self.seenvaluechange(change.assign_command())?;
        Ok(true)
    }

    fn seenvaluechange(&mut self, cmd: Option<Command>) -> Result<(), CompileError> {
        if let Some(cmd) = cmd {
            self.builder
                .set_command(cmd)
                .map_err(|e| self.semantic(e.to_string()))?;
            self.builder
                .proceed_to_next(Some(Condition::TRUE))
                .map_err(|e| self.semantic(e.to_string()))?;
        }
        Ok(())
    }

    fn parse_entry_exit_section(&mut self, is_entry: bool) -> Result<(), CompileError> {
        self.cursor
            .consume_keyword(if is_entry { "entry" } else { "exit" });
        if is_entry {
            self.builder
                .select_entry_node()
                .map_err(|e| self.semantic(e.to_string()))?;
        } else {
            self.builder
                .select_exit_node()
                .map_err(|e| self.semantic(e.to_string()))?;
        }
        self.expect_open_brace()?;
        loop {
            self.cursor.skip_blank_lines();
            if self.cursor.peek_punct('}') {
                break;
            }
            self.parse_eeline()?;
        }
        self.expect_close_brace()
    }

    /// `eeline := ( statevars | eecommand )? newline`
    fn parse_eeline(&mut self) -> Result<(), CompileError> {
        if self.cursor.peek_keyword("disconnect") {
            self.parse_disconnectevent()?;
        } else if self.cursor.peek_keyword("connect") {
            self.parse_connectevent()?;
        } else if self.cursor.peek_keyword("do") {
            self.parse_docommand()?;
        } else if self.cursor.peek_keyword("emit") {
            self.parse_emitcommand()?;
        } else {
            self.try_parse_statevars()?;
        }
        self.expect_newline()
    }

    fn parse_handle_section(&mut self) -> Result<(), CompileError> {
        self.cursor.consume_keyword("handle");
        self.builder
            .select_handle_node()
            .map_err(|e| self.semantic(e.to_string()))?;
        self.expect_open_brace()?;
        loop {
            self.cursor.skip_blank_lines();
            if self.cursor.peek_punct('}') {
                break;
            }
            self.parse_handleline()?;
        }
        self.expect_close_brace()
    }

    /// `handleline := ( statevars | handlecommand )? newline`,
    /// `handlecommand := docommand | statecommand`
    fn parse_handleline(&mut self) -> Result<(), CompileError> {
        if self.cursor.peek_keyword("do") {
            self.parse_docommand()?;
        } else if self.cursor.peek_keyword("emit") {
            self.parse_emitcommand()?;
        } else {
            self.try_parse_statevars()?;
        }
        self.expect_newline()
    }

    fn parse_docommand(&mut self) -> Result<(), CompileError> {
        self.cursor.consume_keyword("do");
        let text = self.cursor.take_until_one_of(&["}"]);
        let cmd = CommandParser::parse(&text).map_err(|_| self.expected("Expected a command."))?;
        self.seencommand(cmd)
    }

    fn seencommand(&mut self, cmd: Command) -> Result<(), CompileError> {
        self.builder
            .set_command(cmd)
            .map_err(|e| self.semantic(e.to_string()))?;
        self.builder
            .connect_to_next(Condition::TRUE)
            .map_err(|e| self.semantic(e.to_string()))?;
        Ok(())
    }

    fn parse_emitcommand(&mut self) -> Result<(), CompileError> {
        self.cursor.consume_keyword("emit");
        if !self.cursor.consume_char('(') {
            return Err(self.expected("Open brace expected."));
        }
        let text = self.cursor.take_until_one_of(&[")"]);
        let value =
            ValueParser::parse(&text).map_err(|_| self.expected("Expected a value."))?;
        if !self.cursor.consume_char(')') {
            return Err(self.expected(
                "Ending brace expected ( or could not find out what this line means ).",
            ));
        }
        self.seenemit(value)
    }

    fn seenemit(&mut self, value: crate::value::Value) -> Result<(), CompileError> {
        let name = value.as_str().ok_or_else(|| {
            self.semantic("Please specify a string containing the Event's name. e.g. \"eventname\".")
        })?;
        if !self.events.is_registered(name) {
            return Err(self.semantic(format!(
                "Event \"{name}\" can not be emitted because it is not created yet."
            )));
        }
        let cmd = self
            .events
            .make_emit_action(name, &[])
            .map_err(|e| self.semantic(e.to_string()))?;
        self.seencommand(cmd)
    }

    fn parse_connectevent(&mut self) -> Result<(), CompileError> {
        self.cursor.consume_keyword("connect");
        let handle_name = self.expect_ident()?;
        self.selecthandler(&handle_name)?;

        if !self.cursor.consume_char('(') {
            return Err(self.expected("Open brace expected."));
        }
        let event_text = self.cursor.take_until_one_of(&[","]);
        let event_value =
            ValueParser::parse(&event_text).map_err(|_| self.expected("Expected a value."))?;
        let event_name = self.eventselected(event_value)?;

        if !self.cursor.consume_char(',') {
            return Err(self.expected("Expected a comma separator."));
        }
        let sink_text = self.cursor.take_until_one_of(&[")"]);
        let sink = CommandParser::parse(strip_leading_do(&sink_text))
            .map_err(|_| self.expected("Expected a command."))?;
        if !self.cursor.consume_char(')') {
            return Err(self.expected(
                "Ending brace expected ( or could not find out what this line means ).",
            ));
        }
        self.seenconnect(&handle_name, &event_name, sink)
    }

    fn selecthandler(&mut self, name: &str) -> Result<(), CompileError> {
        if !self.handles.contains_key(name) {
            return Err(self.semantic(format!("Event Handle {name} not declared.")));
        }
        Ok(())
    }

    fn eventselected(&mut self, value: crate::value::Value) -> Result<String, CompileError> {
        let name = value.as_str().ok_or_else(|| {
            self.semantic("Please specify a string containing the Event's name. e.g. \"eventname\".")
        })?;
        if !self.events.is_registered(name) {
            return Err(self.semantic(format!("Event {name} not known.")));
        }
        Ok(name.to_string())
    }

    fn seenconnect(
        &mut self,
        handle_name: &str,
        event_name: &str,
        sink: Command,
    ) -> Result<(), CompileError> {
        let handle = self
            .handles
            .get_mut(handle_name)
            .expect("checked by selecthandler");
        handle.init(event_name, sink);
        let connect_cmd = handle
            .create_connect(self.events)
            .map_err(|e| self.semantic(e.to_string()))?;
        self.seencommand(connect_cmd)
    }

    fn parse_disconnectevent(&mut self) -> Result<(), CompileError> {
        self.cursor.consume_keyword("disconnect");
        let handle_name = self.expect_ident()?;
        self.selecthandler(&handle_name)?;
        let handle = self
            .handles
            .get(&handle_name)
            .expect("checked by selecthandler");
        let disconnect_cmd = handle.create_disconnect();
        self.seencommand(disconnect_cmd)
    }

    fn parse_transitions_section(&mut self) -> Result<(), CompileError> {
        self.cursor.consume_keyword("transitions");
        self.expect_open_brace()?;
        loop {
            self.cursor.skip_blank_lines();
            if self.cursor.peek_punct('}') {
                break;
            }
            self.parse_transline()?;
        }
        self.expect_close_brace()
    }

    /// `transline := selectcommand? newline`,
    /// `selectcommand := brancher | selector`
    fn parse_transline(&mut self) -> Result<(), CompileError> {
        if self.cursor.peek_keyword("if") {
            self.parse_brancher()?;
        } else if self.cursor.peek_keyword("select") {
            self.parse_selector(None)?;
        }
        self.expect_newline()
    }

    fn parse_brancher(&mut self) -> Result<(), CompileError> {
        self.cursor.consume_keyword("if");
        let cond_text = self.cursor.take_until_one_of(&["then"]);
        let condition = ConditionParser::parse(&cond_text)
            .map_err(|_| self.expected("Expected a boolean condition."))?;
        if !self.cursor.consume_keyword("then") {
            return Err(self.expected("Wrongly formatted \"if ... then select\" clause."));
        }
        self.cursor.skip_inline_ws();
        if self.cursor.peek_char() == Some('\n') {
            self.cursor.bump();
        }
        if !self.cursor.peek_keyword("select") {
            return Err(self.expected("Wrongly formatted \"if ... then select\" clause."));
        }
        self.parse_selector(Some(condition))
    }

    fn parse_selector(&mut self, condition: Option<Condition>) -> Result<(), CompileError> {
        self.cursor.consume_keyword("select");
        let name = self.expect_ident()?;
        self.selecting(&name, condition)
    }

    fn selecting(&mut self, name: &str, condition: Option<Condition>) -> Result<(), CompileError> {
        let current = self
            .builder
            .current()
            .expect("transitions only appear inside an open state");
        let target = self.builder.new_state(name);
        let guard = condition.unwrap_or(Condition::TRUE);
        self.builder
            .transition_set(current, target, guard, self.rank)
            .map_err(|e| self.semantic(e.to_string()))?;
        self.rank -= 1;
        Ok(())
    }

    /// *finished* (spec §4.8 action 12): end-of-input validation.
    fn finished(&mut self) -> Result<StateGraph, CompileError> {
        if self.builder.is_empty() {
            return Err(self.semantic("No states found in this file !"));
        }

        match self.builder.find_state(&self.minit) {
            Some(id) if self.builder.is_defined(id) => self.builder.init_state(id),
            _ => {
                let name = self.minit.clone();
                return Err(self.semantic(format!("Initial State {name} not defined.")));
            }
        }

        for (name, id) in self.builder.state_entries() {
            if !self.builder.is_defined(id) {
                return Err(self.semantic(format!("State {name} not defined, but referenced to.")));
            }
        }

        match self.builder.find_state(&self.mfini) {
            Some(id) if self.builder.is_defined(id) => self.builder.final_state(id),
            _ => {
                let name = self.mfini.clone();
                return Err(self.semantic(format!("Final State {name} not defined.")));
            }
        }

        let builder = std::mem::replace(&mut self.builder, StateGraphBuilder::new());
        builder.finish().map_err(|e| self.semantic(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events_with_e() -> EventService {
        let mut es = EventService::new();
        es.register("e", vec![]);
        es
    }

    #[test]
    fn minimal_graph() {
        let src = "Initial_State s0\nFinal_State s0\nstate s0 { }\n";
        let graph = parse(src, &EventService::new()).unwrap();
        assert_eq!(graph.state_count(), 1);
        assert_eq!(graph.state_name(graph.init()), "s0");
        assert_eq!(graph.init(), graph.fini());
    }

    #[test]
    fn entry_exit_with_valuechange() {
        let src = "Initial_State s0\nFinal_State s0\nstate s0 { entry { const x = 1 } exit { } }\n";
        let graph = parse(src, &EventService::new()).unwrap();
        let s0 = graph.init();
        assert_eq!(graph.entry_chain(s0).len(), 1);
        assert!(graph.exit_chain(s0).is_empty());
    }

    #[test]
    fn prioritized_transitions() {
        let src = "Initial_State a\nFinal_State b\nstate a { transitions { if cond1 then select b\nselect a\n} }\nstate b { }\n";
        let graph = parse(src, &EventService::new()).unwrap();
        let a = graph.state_id("a").unwrap();
        let transitions = graph.transitions(a);
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].rank, 0);
        assert_eq!(transitions[1].rank, -1);
    }

    #[test]
    fn forward_reference_then_definition() {
        let src = "Initial_State a\nFinal_State b\nstate a { transitions { select b\n} }\nstate b { }\n";
        let graph = parse(src, &EventService::new()).unwrap();
        assert_eq!(graph.state_count(), 2);
    }

    #[test]
    fn redefinition_is_an_error() {
        let src = "Initial_State a\nFinal_State a\nstate a { }\nstate a { }\n";
        let err = parse(src, &EventService::new()).unwrap_err();
        assert!(err.to_string().contains("redefined"));
    }

    #[test]
    fn event_handle_lifecycle() {
        let src = "Event_Handle h\nInitial_State a\nFinal_State a\nstate a { entry { connect h (\"e\", do nop) } exit { disconnect h } }\n";
        let graph = parse(src, &events_with_e()).unwrap();
        let a = graph.init();
        assert_eq!(graph.entry_chain(a).len(), 1);
        assert_eq!(graph.exit_chain(a).len(), 1);
    }

    #[test]
    fn missing_initial_state_declaration_is_an_error() {
        let src = "state a { }\n";
        let err = parse(src, &EventService::new()).unwrap_err();
        assert!(err.to_string().contains("Initial State not set"));
    }

    #[test]
    fn undeclared_event_handle_is_an_error() {
        let src =
            "Initial_State a\nFinal_State a\nstate a { entry { connect h (\"e\", do nop) } }\n";
        let err = parse(src, &events_with_e()).unwrap_err();
        assert!(err.to_string().contains("not declared"));
    }
}
