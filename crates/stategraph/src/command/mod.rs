//! CommandParser (spec §4.4) and ValueChangeParser (spec §4.5).
//!
//! Both produce [`Command`] values — opaque actions the builder stores in
//! a state's chains and the (external, non-goal) graph runtime executes.
//! Per the §9 redesign note, `parse` returns the constructed value
//! directly; there is no `getCommand()`/`reset()` pair.

mod value_change;

pub use value_change::ValueChangeParser;

use crate::core::chumsky_utils::{identifier, inline_whitespace};
use crate::core::GrammarMismatch;
use crate::value::Value;
use chumsky::prelude::*;

/// Declared type tag for a `var` declaration, e.g. `var int x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Int,
    Float,
    Bool,
    String,
}

impl TypeTag {
    fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "int" => Some(Self::Int),
            "float" | "double" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "string" => Some(Self::String),
            _ => None,
        }
    }
}

/// A closed sum type over the concrete command kinds the grammar can
/// produce (design note §9: "Inheritance of command/condition in the
/// source becomes a closed sum type ... with an execute method per
/// variant"). Execution is performed by the external graph runtime, not
/// by this crate; `execute` is provided only as the seam that runtime
/// hangs off of.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Does nothing when executed.
    Nop,
    /// A call to a named imperative operation with positional arguments,
    /// e.g. `do log("hello")`.
    Call { name: String, args: Vec<Value> },
    /// `const NAME = VALUE` — a pure declaration; the assignment itself
    /// has already happened at compile time so this never reaches the
    /// chain (see [`ValueChangeParser::assign_command`]). Kept here so
    /// `Command` remains the single sum type §9 calls for.
    ConstDef { name: String, value: Value },
    /// `var [TYPE] NAME [= VALUE]`.
    VarDef {
        name: String,
        ty: Option<TypeTag>,
        init: Option<Value>,
    },
    /// `alias NAME = TARGET`.
    AliasDef { name: String, target: String },
    /// `NAME = VALUE`, a runtime assignment.
    Assign { name: String, value: Value },
    /// Emits a registered event (built via
    /// [`crate::event::EventService::make_emit_action`]).
    EmitEvent { event: String },
    /// Installs a callback subscription for a declared event handle (built
    /// via [`crate::event::EventService::make_callback_bind`] or
    /// [`crate::event::EventService::make_callback_bind_async`]). `sink` is
    /// the callback to invoke; `processor` names the event processor an
    /// asynchronous binding dispatches `sink` through, `None` for a
    /// synchronous binding.
    Connect {
        handle: String,
        event: String,
        sink: Box<Command>,
        processor: Option<String>,
    },
    /// Removes a callback subscription for a declared event handle.
    Disconnect { handle: String },
}

impl Command {
    /// Placeholder execution seam: the compiled graph's runtime (external
    /// to this crate, spec §1 non-goals) is responsible for interpreting
    /// these variants. This crate only assembles and validates them.
    pub fn execute(&self) -> Result<(), ExecError> {
        Err(ExecError::NotImplemented)
    }
}

/// Raised if anything tries to actually run a [`Command`] inside this
/// crate; execution belongs to the external graph runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("command execution is performed by the external graph runtime")]
    NotImplemented,
}

/// Parses imperative commands, e.g. `log("starting")`, `nop`.
pub struct CommandParser;

impl CommandParser {
    /// Parse a bare command (the part after `do`, or the sink command
    /// inside a `connect` binding). Returns the command; the original
    /// grammar's implicit termination condition is intentionally
    /// discarded (spec §4.4: "an optional implicit termination condition
    /// (discarded by this core)").
    pub fn parse(text: &str) -> Result<Command, GrammarMismatch> {
        Self::grammar()
            .then_ignore(end())
            .parse(text.trim())
            .into_result()
            .map_err(|_| GrammarMismatch::new("Expected a command."))
    }

    fn args<'src>() -> impl Parser<'src, &'src str, Vec<Value>, extra::Err<Rich<'src, char>>> + Clone
    {
        let value = crate::core::chumsky_utils::quoted_string()
            .map(Value::Str)
            .or(identifier().map(Value::Ref))
            .or({
                let digits = one_of('0'..='9').repeated().at_least(1).collect::<String>();
                just('-')
                    .or_not()
                    .then(digits)
                    .map(|(sign, digits)| {
                        let sign = if sign.is_some() { "-" } else { "" };
                        Value::Int(format!("{sign}{digits}").parse().unwrap())
                    })
            });

        just('(')
            .then_ignore(inline_whitespace())
            .ignore_then(
                value
                    .then_ignore(inline_whitespace())
                    .separated_by(just(',').then_ignore(inline_whitespace()))
                    .allow_trailing()
                    .collect::<Vec<_>>(),
            )
            .then_ignore(inline_whitespace())
            .then_ignore(just(')'))
    }

    fn grammar<'src>() -> impl Parser<'src, &'src str, Command, extra::Err<Rich<'src, char>>> + Clone
    {
        let nop = just("nop").to(Command::Nop);

        let call = identifier()
            .then_ignore(inline_whitespace())
            .then(Self::args().or_not())
            .map(|(name, args)| Command::Call {
                name,
                args: args.unwrap_or_default(),
            });

        nop.or(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nop() {
        assert_eq!(CommandParser::parse("nop").unwrap(), Command::Nop);
    }

    #[test]
    fn parses_call_with_args() {
        assert_eq!(
            CommandParser::parse("log(\"hi\", 3)").unwrap(),
            Command::Call {
                name: "log".to_string(),
                args: vec![Value::Str("hi".to_string()), Value::Int(3)],
            }
        );
    }

    #[test]
    fn parses_call_with_no_args() {
        assert_eq!(
            CommandParser::parse("tick").unwrap(),
            Command::Call {
                name: "tick".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn execute_is_a_stub() {
        assert!(Command::Nop.execute().is_err());
    }
}
