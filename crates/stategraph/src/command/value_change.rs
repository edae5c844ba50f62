//! ValueChangeParser (spec §4.5): constant/variable/alias definitions and
//! assignment.

use super::{Command, TypeTag};
use crate::core::chumsky_utils::identifier;
use crate::core::GrammarMismatch;
use crate::value::{Value, ValueParser};

/// One of the four `statevars` forms the grammar recognizes.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueChange {
    /// `const NAME = VALUE`
    ConstDef { name: String, value: Value },
    /// `var [TYPE] NAME [= VALUE]`
    VarDef {
        name: String,
        ty: Option<TypeTag>,
        init: Option<Value>,
    },
    /// `alias NAME = TARGET`
    AliasDef { name: String, target: String },
    /// `NAME = VALUE`
    Assign { name: String, value: Value },
}

impl ValueChange {
    /// The command to execute for this value change, or `None` for a pure
    /// declaration that carries no runtime action (spec §4.5:
    /// `assignCommand()` returns either `nil` ... or a command").
    ///
    /// A plain `var` declaration with no initializer is the only pure
    /// declaration; every other form (including `var` *with* an
    /// initializer) produces an assignment command.
    pub fn assign_command(&self) -> Option<Command> {
        match self {
            ValueChange::ConstDef { name, value } => Some(Command::ConstDef {
                name: name.clone(),
                value: value.clone(),
            }),
            ValueChange::VarDef { name, ty, init } => init.as_ref().map(|v| Command::VarDef {
                name: name.clone(),
                ty: *ty,
                init: Some(v.clone()),
            }),
            ValueChange::AliasDef { name, target } => Some(Command::AliasDef {
                name: name.clone(),
                target: target.clone(),
            }),
            ValueChange::Assign { name, value } => Some(Command::Assign {
                name: name.clone(),
                value: value.clone(),
            }),
        }
    }
}

/// Parses the four `statevars` forms.
pub struct ValueChangeParser;

impl ValueChangeParser {
    /// Parse one `statevars` line. The text has already had its trailing
    /// newline stripped by the caller.
    pub fn parse(text: &str) -> Result<ValueChange, GrammarMismatch> {
        let text = text.trim();

        if let Some(rest) = strip_keyword(text, "const") {
            return Self::parse_const(rest);
        }
        if let Some(rest) = strip_keyword(text, "var") {
            return Self::parse_var(rest);
        }
        if let Some(rest) = strip_keyword(text, "alias") {
            return Self::parse_alias(rest);
        }
        Self::parse_assignment(text)
    }

    fn parse_const(rest: &str) -> Result<ValueChange, GrammarMismatch> {
        let (name, value_text) = split_on_eq(rest)
            .ok_or_else(|| GrammarMismatch::new("Expected 'const NAME = VALUE'."))?;
        let name = validate_identifier(name)?;
        let value = ValueParser::parse(value_text)
            .map_err(|_| GrammarMismatch::new("Expected a value after '='."))?;
        Ok(ValueChange::ConstDef { name, value })
    }

    fn parse_var(rest: &str) -> Result<ValueChange, GrammarMismatch> {
        let (decl, init_text) = match split_on_eq(rest) {
            Some((decl, value_text)) => (decl, Some(value_text)),
            None => (rest, None),
        };

        let mut tokens = decl.split_whitespace();
        let first = tokens
            .next()
            .ok_or_else(|| GrammarMismatch::new("Expected a variable name."))?;
        let (ty, name) = match tokens.next() {
            Some(second) => {
                let ty = TypeTag::from_keyword(first)
                    .ok_or_else(|| GrammarMismatch::new("Unknown type tag."))?;
                (Some(ty), second.to_string())
            }
            None => (None, first.to_string()),
        };
        let name = validate_identifier(&name)?;

        let init = match init_text {
            Some(value_text) => Some(
                ValueParser::parse(value_text)
                    .map_err(|_| GrammarMismatch::new("Expected a value after '='."))?,
            ),
            None => None,
        };

        Ok(ValueChange::VarDef { name, ty, init })
    }

    fn parse_alias(rest: &str) -> Result<ValueChange, GrammarMismatch> {
        let (name, target_text) = split_on_eq(rest)
            .ok_or_else(|| GrammarMismatch::new("Expected 'alias NAME = TARGET'."))?;
        let name = validate_identifier(name)?;
        let target = validate_identifier(target_text.trim())?;
        Ok(ValueChange::AliasDef { name, target })
    }

    fn parse_assignment(text: &str) -> Result<ValueChange, GrammarMismatch> {
        let (name, value_text) =
            split_on_eq(text).ok_or_else(|| GrammarMismatch::new("Expected 'NAME = VALUE'."))?;
        let name = validate_identifier(name)?;
        let value = ValueParser::parse(value_text)
            .map_err(|_| GrammarMismatch::new("Expected a value after '='."))?;
        Ok(ValueChange::Assign { name, value })
    }
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    let boundary_ok = rest
        .chars()
        .next()
        .map(|c| c.is_whitespace())
        .unwrap_or(false);
    boundary_ok.then(|| rest.trim_start())
}

fn split_on_eq(text: &str) -> Option<(&str, &str)> {
    // Avoid splitting on `==` (comparison) by requiring the char after `=`
    // not to also be `=`, and the char before not to be `!`/`<`/`>`.
    let bytes = text.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'=' {
            let prev_ok = i == 0 || !matches!(bytes[i - 1], b'!' | b'<' | b'>' | b'=');
            let next_ok = i + 1 >= bytes.len() || bytes[i + 1] != b'=';
            if prev_ok && next_ok {
                return Some((text[..i].trim(), text[i + 1..].trim()));
            }
        }
    }
    None
}

fn validate_identifier(text: &str) -> Result<String, GrammarMismatch> {
    identifier()
        .then(chumsky::prelude::end())
        .parse(text)
        .into_result()
        .map(|(name, ())| name)
        .map_err(|_| GrammarMismatch::new("Expected a valid identifier."))
}
