//! EventService (spec §4.6): typed event registry and callback-binding
//! surface consulted while parsing.
//!
//! Grounded in `EventService`/`EventHandle`/`Event<void(...)>` from the
//! original framework (see `eventservice_test.cpp`): events carry a fixed
//! positional signature of 0-3 arguments, each either `string`, `double`,
//! or `bool`. This crate never dispatches an event — it only resolves
//! names, checks arity/types, and assembles the [`Command`] values the
//! (external) runtime executes.

use crate::command::Command;
use crate::value::Value;
use std::collections::HashMap;

/// The type of one positional event argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    String,
    Double,
    Bool,
}

fn value_matches(arg: &ArgType, value: &Value) -> bool {
    match (arg, value) {
        (ArgType::String, Value::Str(_)) => true,
        (ArgType::Double, Value::Float(_)) | (ArgType::Double, Value::Int(_)) => true,
        (ArgType::Bool, Value::Bool(_)) => true,
        _ => false,
    }
}

/// A registered event's fixed signature, e.g. `(string, double)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSignature(pub Vec<ArgType>);

/// A resolved reference to a registered event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRef {
    pub name: String,
    pub signature: EventSignature,
}

/// The event processor an asynchronous callback binding dispatches
/// through, identified by name (spec §4.6 `makeCallbackBind(name, sink,
/// processor)`; spec §5: "merely recorded into the constructed command; no
/// dispatch occurs at parse time").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventProcessor(pub String);

impl EventProcessor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("Event \"{0}\" not known.")]
    UnknownEvent(String),
    #[error("event \"{name}\" expects {expected} argument(s), got {actual}")]
    ArgMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Registry of events available while compiling a state graph. The
/// compiled graph itself never touches this type again — it is consulted
/// only at parse time, per spec §4.6.
#[derive(Debug, Default)]
pub struct EventService {
    events: HashMap<String, EventSignature>,
}

impl EventService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an event under `name` with the given positional
    /// signature. Re-registering an existing name overwrites it (the
    /// parser never calls this directly; it is how a host application
    /// seeds the service before compiling).
    pub fn register(&mut self, name: impl Into<String>, signature: Vec<ArgType>) {
        self.events.insert(name.into(), EventSignature(signature));
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.events.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<EventRef, EventError> {
        self.events
            .get(name)
            .map(|sig| EventRef {
                name: name.to_string(),
                signature: sig.clone(),
            })
            .ok_or_else(|| EventError::UnknownEvent(name.to_string()))
    }

    /// Builds an emit [`Command`] for `name`, binding positional `args`.
    /// Arity and element types must match the event's signature.
    pub fn make_emit_action(&self, name: &str, args: &[Value]) -> Result<Command, EventError> {
        let event = self.resolve(name)?;
        if args.len() != event.signature.0.len() {
            return Err(EventError::ArgMismatch {
                name: name.to_string(),
                expected: event.signature.0.len(),
                actual: args.len(),
            });
        }
        for (arg_ty, value) in event.signature.0.iter().zip(args) {
            if !value_matches(arg_ty, value) {
                return Err(EventError::ArgMismatch {
                    name: name.to_string(),
                    expected: event.signature.0.len(),
                    actual: args.len(),
                });
            }
        }
        Ok(Command::EmitEvent {
            event: name.to_string(),
        })
    }

    /// Builds a synchronous callback-binding command (spec §4.6,
    /// `makeCallbackBind(name, sink)`): the returned command, when executed
    /// by the (external) runtime, installs `sink` against `name` and
    /// produces a handle usable to connect/disconnect later.
    pub fn make_callback_bind(&self, name: &str, sink: Command) -> Result<Command, EventError> {
        self.resolve(name)?;
        Ok(Command::Connect {
            handle: String::new(),
            event: name.to_string(),
            sink: Box::new(sink),
            processor: None,
        })
    }

    /// Builds an asynchronous callback-binding command (spec §4.6,
    /// `makeCallbackBind(name, sink, processor)`): identical to
    /// [`Self::make_callback_bind`], except `processor` is recorded into
    /// the constructed command so the runtime dispatches `sink` through it
    /// rather than invoking it directly. No dispatch happens here (spec
    /// §5: "merely recorded into the constructed command; no dispatch
    /// occurs at parse time").
    pub fn make_callback_bind_async(
        &self,
        name: &str,
        sink: Command,
        processor: EventProcessor,
    ) -> Result<Command, EventError> {
        self.resolve(name)?;
        Ok(Command::Connect {
            handle: String::new(),
            event: name.to_string(),
            sink: Box::new(sink),
            processor: Some(processor.0),
        })
    }
}

/// A named binding between an event and a sink [`Command`], connectable
/// and disconnectable at runtime (original: `EventHandle::init`,
/// `createConnect`, `createDisconnect`). `createConnect` itself is built
/// via [`EventService::make_callback_bind`]; this type only remembers the
/// declared handle name and stamps it onto the command the service builds.
#[derive(Debug, Default, Clone)]
pub struct EventHandle {
    name: String,
    bound: Option<(String, Box<Command>)>,
}

impl EventHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
        }
    }

    /// Binds this handle to `event` with `sink` as the callback command
    /// invoked when the event fires.
    pub fn init(&mut self, event: &str, sink: Command) {
        self.bound = Some((event.to_string(), Box::new(sink)));
    }

    /// The command the graph stores to install the subscription at
    /// runtime, built via [`EventService::make_callback_bind`] and stamped
    /// with this handle's declared name.
    pub fn create_connect(&self, events: &EventService) -> Result<Command, EventError> {
        let (event, sink) = match &self.bound {
            Some((event, sink)) => (event.clone(), (**sink).clone()),
            None => (String::new(), Command::Nop),
        };
        match events.make_callback_bind(&event, sink)? {
            Command::Connect {
                event,
                sink,
                processor,
                ..
            } => Ok(Command::Connect {
                handle: self.name.clone(),
                event,
                sink,
                processor,
            }),
            other => Ok(other),
        }
    }

    /// The command the graph stores to remove the subscription at
    /// runtime.
    pub fn create_disconnect(&self) -> Command {
        Command::Disconnect {
            handle: self.name.clone(),
        }
    }
}
