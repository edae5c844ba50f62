//! Diagnostic coverage for the compiler's error paths (spec §6/§7),
//! exercised end-to-end through [`stategraph::compile`] rather than by
//! constructing [`stategraph::CompileError`] values directly.

use stategraph::{compile, EventService};

fn compile_err(source: &str) -> String {
    compile(source, &EventService::new())
        .unwrap_err()
        .to_string()
}

#[test]
fn missing_initial_state_is_reported() {
    let message = compile_err("state a { }\n");
    assert!(message.contains("Initial State not set"));
}

#[test]
fn missing_final_state_is_reported() {
    let message = compile_err("Initial_State a\nstate a { }\n");
    assert!(message.contains("Final State not set"));
}

#[test]
fn state_redefinition_is_reported() {
    let message = compile_err(
        "Initial_State a\nFinal_State a\nstate a { }\nstate a { }\n",
    );
    assert!(message.contains("state a redefined."));
}

#[test]
fn event_handle_redefinition_is_reported() {
    let message = compile_err("Event_Handle h\nEvent_Handle h\nInitial_State a\nFinal_State a\nstate a { }\n");
    assert!(message.contains("Event Handle h redefined."));
}

#[test]
fn referenced_but_undefined_state_is_reported() {
    let message = compile_err(
        "Initial_State a\nFinal_State a\nstate a { transitions { select b\n} }\n",
    );
    assert!(message.contains("State b not defined, but referenced to."));
}

#[test]
fn undefined_final_state_is_reported() {
    let message = compile_err("Initial_State a\nFinal_State b\nstate a { }\n");
    assert!(message.contains("Final State b not defined."));
}

#[test]
fn empty_source_reports_no_states() {
    let message = compile_err("Initial_State a\nFinal_State a\n");
    assert!(message.contains("No states found in this file !"));
}

#[test]
fn malformed_brace_reports_a_line_number() {
    let message = compile_err("Initial_State a\nFinal_State a\nstate a {\n");
    assert!(message.contains("line 4") || message.contains("line 3"));
}

#[test]
fn unregistered_emit_target_is_reported() {
    let message = compile_err(
        "Initial_State a\nFinal_State a\nstate a { entry { emit(\"missing\") } }\n",
    );
    assert!(message.contains("not created yet"));
}

#[test]
fn undeclared_event_handle_in_connect_is_reported() {
    let message = compile_err(
        "Initial_State a\nFinal_State a\nstate a { entry { connect h (\"e\", do nop) } }\n",
    );
    assert!(message.contains("Event Handle h not declared."));
}

#[test]
fn unknown_event_in_connect_is_reported() {
    let message = compile_err(
        "Event_Handle h\nInitial_State a\nFinal_State a\nstate a { entry { connect h (\"e\", do nop) } }\n",
    );
    assert!(message.contains("Event e not known."));
}
