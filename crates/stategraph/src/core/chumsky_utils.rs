//! Shared chumsky parser combinators used by the value/condition/command
//! sub-grammars (§4.1 CommonLexemes: identifier, skip, newline atoms).

use chumsky::prelude::*;

/// An ASCII identifier: a letter or underscore followed by letters,
/// digits, or underscores.
pub fn identifier<'src>() -> impl Parser<'src, &'src str, String, extra::Err<Rich<'src, char>>> + Clone
{
    any()
        .filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_')
                .repeated()
                .collect::<String>(),
        )
        .map(|(head, tail)| format!("{head}{tail}"))
        .labelled("identifier")
}

/// Inline whitespace only (spaces and tabs, no newlines) — used inside a
/// single logical line, where a literal newline is a distinct grammar
/// token rather than insignificant whitespace.
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, (), extra::Err<Rich<'src, char>>> + Clone
{
    one_of(" \t").repeated().ignored()
}

/// Required inline whitespace (at least one space or tab).
pub fn inline_whitespace_required<'src>(
) -> impl Parser<'src, &'src str, (), extra::Err<Rich<'src, char>>> + Clone {
    one_of(" \t").repeated().at_least(1).ignored()
}

/// A quoted string literal, e.g. `"eventname"`. No escape handling beyond
/// `\"`, matching the grammar's sole use for naming events and constants.
pub fn quoted_string<'src>(
) -> impl Parser<'src, &'src str, String, extra::Err<Rich<'src, char>>> + Clone {
    just('"')
        .ignore_then(
            choice((just("\\\"").to('"'), none_of('"')))
                .repeated()
                .collect::<String>(),
        )
        .then_ignore(just('"'))
        .labelled("string literal")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_accepts_leading_underscore() {
        let parser = identifier().then_ignore(end());
        assert_eq!(parser.parse("_foo1").into_result().unwrap(), "_foo1");
    }

    #[test]
    fn identifier_rejects_leading_digit() {
        let parser = identifier().then_ignore(end());
        assert!(parser.parse("1foo").into_result().is_err());
    }

    #[test]
    fn quoted_string_parses_simple_literal() {
        let parser = quoted_string().then_ignore(end());
        assert_eq!(
            parser.parse("\"hello\"").into_result().unwrap(),
            "hello".to_string()
        );
    }

    #[test]
    fn quoted_string_handles_escaped_quote() {
        let parser = quoted_string().then_ignore(end());
        assert_eq!(
            parser.parse("\"a\\\"b\"").into_result().unwrap(),
            "a\"b".to_string()
        );
    }
}
