//! ValueParser (spec §4.2): literal and aliased value expressions.
//!
//! Per the redesign note in §9 of the specification ("each sub-parser's
//! `parse` returns the constructed object directly as a result value; the
//! *reset* step disappears"), [`ValueParser::parse`] simply returns a
//! [`Value`] rather than stashing it behind a `lastParsed()`/`clear()`
//! pair. Callers that need "the last parsed value" (emit/connect event
//! names) just hold on to the returned value themselves.

use crate::core::chumsky_utils::{identifier, quoted_string};
use crate::core::GrammarMismatch;
use chumsky::prelude::*;

/// A parsed value literal or alias reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A bare identifier referring to a previously declared constant,
    /// variable, or alias.
    Ref(String),
}

impl Value {
    /// The underlying type is a string — used by callers that require a
    /// string value (event names in `connect`/`emit`).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Parses value literals and named references.
pub struct ValueParser;

impl ValueParser {
    /// Parse a value expression fragment. The fragment must be consumed
    /// in full (trailing garbage is a mismatch), matching how the caller
    /// extracts an isolated slice of the source line before invoking this
    /// sub-parser.
    pub fn parse(text: &str) -> Result<Value, GrammarMismatch> {
        Self::grammar()
            .then_ignore(end())
            .parse(text.trim())
            .into_result()
            .map_err(|_| GrammarMismatch::new("Expected a value (string, number, boolean, or identifier)."))
    }

    fn number<'src>() -> impl Parser<'src, &'src str, Value, extra::Err<Rich<'src, char>>> + Clone {
        let digits = one_of('0'..='9').repeated().at_least(1).collect::<String>();

        just('-')
            .or_not()
            .then(digits.clone())
            .then(just('.').ignore_then(digits).or_not())
            .map(|((sign, int_part), frac_part)| {
                let sign = if sign.is_some() { "-" } else { "" };
                match frac_part {
                    Some(frac) => Value::Float(format!("{sign}{int_part}.{frac}").parse().unwrap()),
                    None => Value::Int(format!("{sign}{int_part}").parse().unwrap()),
                }
            })
    }

    fn grammar<'src>() -> impl Parser<'src, &'src str, Value, extra::Err<Rich<'src, char>>> + Clone {
        let boolean = just("true")
            .to(Value::Bool(true))
            .or(just("false").to(Value::Bool(false)));

        let string_literal = quoted_string().map(Value::Str);
        let number = Self::number();
        let alias_ref = identifier().map(Value::Ref);

        string_literal.or(boolean).or(number).or(alias_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_literal() {
        assert_eq!(
            ValueParser::parse("\"eventname\"").unwrap(),
            Value::Str("eventname".to_string())
        );
    }

    #[test]
    fn parses_integer() {
        assert_eq!(ValueParser::parse("42").unwrap(), Value::Int(42));
        assert_eq!(ValueParser::parse("-7").unwrap(), Value::Int(-7));
    }

    #[test]
    fn parses_float() {
        assert_eq!(ValueParser::parse("3.5").unwrap(), Value::Float(3.5));
    }

    #[test]
    fn parses_boolean() {
        assert_eq!(ValueParser::parse("true").unwrap(), Value::Bool(true));
        assert_eq!(ValueParser::parse("false").unwrap(), Value::Bool(false));
    }

    #[test]
    fn parses_alias_reference() {
        assert_eq!(
            ValueParser::parse("my_alias").unwrap(),
            Value::Ref("my_alias".to_string())
        );
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!(ValueParser::parse("42 43").is_err());
    }

    #[test]
    fn as_str_only_for_string_values() {
        assert_eq!(Value::Str("e".into()).as_str(), Some("e"));
        assert_eq!(Value::Int(1).as_str(), None);
    }
}
