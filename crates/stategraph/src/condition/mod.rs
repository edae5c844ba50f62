//! ConditionParser (spec §4.3): boolean guard expressions.
//!
//! Produces a [`Condition`] — an opaque guard value the builder stores and
//! the (external, non-goal) graph runtime later evaluates. As with
//! [`crate::value::ValueParser`], `parse` returns the constructed
//! `Condition` directly rather than going through a `getParseResult()`/
//! `reset()` pair.

use crate::core::chumsky_utils::{identifier, inline_whitespace, inline_whitespace_required};
use crate::core::GrammarMismatch;
use crate::value::Value;
use chumsky::prelude::*;

/// Comparison operator used inside a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// An opaque boolean guard. The concrete kinds needed by the (external)
/// state machine runtime, per design note §9 ("a closed sum type ... with
/// an execute method per variant"); evaluation itself is out of scope for
/// this crate (spec §1 non-goals).
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// The default guard: always true.
    True,
    /// A bare boolean variable/alias reference.
    Var(String),
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Compare {
        op: CompareOp,
        lhs: Value,
        rhs: Value,
    },
}

impl Condition {
    /// The default guard used when a bare `select` appears without a
    /// preceding `if`, and as the implicit edge guard for entry/handle/exit
    /// statement chaining.
    pub const TRUE: Condition = Condition::True;
}

/// Parses boolean expressions into a [`Condition`].
pub struct ConditionParser;

impl ConditionParser {
    /// Parse a condition expression fragment in full.
    pub fn parse(text: &str) -> Result<Condition, GrammarMismatch> {
        Self::grammar()
            .then_ignore(end())
            .parse(text.trim())
            .into_result()
            .map_err(|_| GrammarMismatch::new("Expected a boolean condition."))
    }

    fn value_atom<'src>() -> impl Parser<'src, &'src str, Value, extra::Err<Rich<'src, char>>> + Clone
    {
        let digits = one_of('0'..='9').repeated().at_least(1).collect::<String>();
        let number = just('-')
            .or_not()
            .then(digits.clone())
            .then(just('.').ignore_then(digits).or_not())
            .map(|((sign, int_part), frac_part)| {
                let sign = if sign.is_some() { "-" } else { "" };
                match frac_part {
                    Some(frac) => Value::Float(format!("{sign}{int_part}.{frac}").parse().unwrap()),
                    None => Value::Int(format!("{sign}{int_part}").parse().unwrap()),
                }
            });
        let string_lit = crate::core::chumsky_utils::quoted_string().map(Value::Str);
        let reference = identifier().map(Value::Ref);

        string_lit
            .or(number)
            .or(reference)
            .then_ignore(inline_whitespace())
            .labelled("value")
    }

    fn comparison<'src>() -> impl Parser<'src, &'src str, Condition, extra::Err<Rich<'src, char>>> + Clone
    {
        let op = choice((
            just("==").to(CompareOp::Eq),
            just("!=").to(CompareOp::Ne),
            just("<=").to(CompareOp::Le),
            just(">=").to(CompareOp::Ge),
            just('<').to(CompareOp::Lt),
            just('>').to(CompareOp::Gt),
        ));

        Self::value_atom()
            .then_ignore(inline_whitespace())
            .then(op)
            .then_ignore(inline_whitespace())
            .then(Self::value_atom())
            .map(|((lhs, op), rhs)| Condition::Compare { op, lhs, rhs })
    }

    fn grammar<'src>() -> impl Parser<'src, &'src str, Condition, extra::Err<Rich<'src, char>>> + Clone
    {
        recursive(|condition| {
            let parenthesized = just('(')
                .then_ignore(inline_whitespace())
                .ignore_then(condition)
                .then_ignore(inline_whitespace())
                .then_ignore(just(')'));

            let atom = parenthesized
                .or(Self::comparison())
                .or(identifier().map(Condition::Var));

            let unary = just("not")
                .then_ignore(inline_whitespace_required())
                .repeated()
                .collect::<Vec<_>>()
                .then(atom)
                .map(|(nots, inner)| {
                    nots.into_iter()
                        .fold(inner, |acc, _| Condition::Not(Box::new(acc)))
                });

            let and_expr = unary
                .clone()
                .then(
                    inline_whitespace_required()
                        .ignore_then(just("and"))
                        .ignore_then(inline_whitespace_required())
                        .ignore_then(unary)
                        .repeated()
                        .collect::<Vec<_>>(),
                )
                .map(|(first, rest)| {
                    rest.into_iter()
                        .fold(first, |acc, next| Condition::And(Box::new(acc), Box::new(next)))
                });

            and_expr
                .clone()
                .then(
                    inline_whitespace_required()
                        .ignore_then(just("or"))
                        .ignore_then(inline_whitespace_required())
                        .ignore_then(and_expr)
                        .repeated()
                        .collect::<Vec<_>>(),
                )
                .map(|(first, rest)| {
                    rest.into_iter()
                        .fold(first, |acc, next| Condition::Or(Box::new(acc), Box::new(next)))
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_variable() {
        assert_eq!(
            ConditionParser::parse("cond1").unwrap(),
            Condition::Var("cond1".to_string())
        );
    }

    #[test]
    fn parses_negation() {
        assert_eq!(
            ConditionParser::parse("not ready").unwrap(),
            Condition::Not(Box::new(Condition::Var("ready".to_string())))
        );
    }

    #[test]
    fn parses_and_or_precedence() {
        let parsed = ConditionParser::parse("a and b or c").unwrap();
        assert_eq!(
            parsed,
            Condition::Or(
                Box::new(Condition::And(
                    Box::new(Condition::Var("a".into())),
                    Box::new(Condition::Var("b".into()))
                )),
                Box::new(Condition::Var("c".into()))
            )
        );
    }

    #[test]
    fn parses_comparison() {
        assert_eq!(
            ConditionParser::parse("count >= 3").unwrap(),
            Condition::Compare {
                op: CompareOp::Ge,
                lhs: Value::Ref("count".into()),
                rhs: Value::Int(3),
            }
        );
    }

    #[test]
    fn parses_parenthesized_expression() {
        assert_eq!(
            ConditionParser::parse("(a or b) and c").unwrap(),
            Condition::And(
                Box::new(Condition::Or(
                    Box::new(Condition::Var("a".into())),
                    Box::new(Condition::Var("b".into()))
                )),
                Box::new(Condition::Var("c".into()))
            )
        );
    }
}
