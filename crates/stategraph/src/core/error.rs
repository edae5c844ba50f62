//! Diagnostic types for the state-graph compiler
//!
//! Three error categories: a typed assertion failure (an expected
//! construct was missing) and a semantic error (a name is unknown,
//! redefined, or otherwise ill-formed). Lexical alternation failures never
//! reach here; they are recoverable and drive grammar backtracking instead
//! (see [`GrammarMismatch`]).

use thiserror::Error;

/// Top-level compile error, carrying the 1-based source line a diagnostic
/// applies to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The parser could not make sense of the input at all and no more
    /// specific descriptor is available.
    #[error("Syntax error at line {line}")]
    Syntax { line: usize },

    /// A specific grammar construct was expected but not found.
    #[error("Parse error at line {line}: {descriptor}")]
    Expected { descriptor: String, line: usize },

    /// The line did not match any of entry/handle/exit/transitions.
    #[error("Parse error at line {line}: expected one of : entry, handle, exit, transitions")]
    ExpectedSection { line: usize },

    /// A name was unknown, redefined, or otherwise semantically invalid.
    #[error("Parse error at line {line}: {message}")]
    Semantic { message: String, line: usize },
}

impl CompileError {
    pub fn syntax(line: usize) -> Self {
        Self::Syntax { line }
    }

    pub fn expected(descriptor: impl Into<String>, line: usize) -> Self {
        Self::Expected {
            descriptor: descriptor.into(),
            line,
        }
    }

    pub fn expected_section(line: usize) -> Self {
        Self::ExpectedSection { line }
    }

    pub fn semantic(message: impl Into<String>, line: usize) -> Self {
        Self::Semantic {
            message: message.into(),
            line,
        }
    }

    /// The line this diagnostic applies to, regardless of variant.
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line } => *line,
            Self::Expected { line, .. } => *line,
            Self::ExpectedSection { line } => *line,
            Self::Semantic { line, .. } => *line,
        }
    }
}

/// Recoverable mismatch inside a grammar alternative. Never shown to the
/// user directly; the surrounding production either tries another
/// alternative or promotes it to a [`CompileError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarMismatch {
    pub descriptor: String,
}

impl GrammarMismatch {
    pub fn new(descriptor: impl Into<String>) -> Self {
        Self {
            descriptor: descriptor.into(),
        }
    }
}

impl std::fmt::Display for GrammarMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.descriptor)
    }
}

impl std::error::Error for GrammarMismatch {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_message() {
        let err = CompileError::syntax(5);
        assert_eq!(format!("{err}"), "Syntax error at line 5");
    }

    #[test]
    fn expected_error_message() {
        let err = CompileError::expected("Open brace expected.", 12);
        assert_eq!(
            format!("{err}"),
            "Parse error at line 12: Open brace expected."
        );
    }

    #[test]
    fn expected_section_message() {
        let err = CompileError::expected_section(3);
        assert_eq!(
            format!("{err}"),
            "Parse error at line 3: expected one of : entry, handle, exit, transitions"
        );
    }

    #[test]
    fn semantic_error_message() {
        let err = CompileError::semantic("state a redefined.", 7);
        assert_eq!(format!("{err}"), "Parse error at line 7: state a redefined.");
    }

    #[test]
    fn line_accessor_covers_all_variants() {
        assert_eq!(CompileError::syntax(1).line(), 1);
        assert_eq!(CompileError::expected("x", 2).line(), 2);
        assert_eq!(CompileError::expected_section(3).line(), 3);
        assert_eq!(CompileError::semantic("y", 4).line(), 4);
    }
}
