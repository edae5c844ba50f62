//! Core abstractions shared by every sub-parser and by the builder.

pub mod chumsky_utils;
mod cursor;
mod error;
pub mod logging;

pub use cursor::Cursor;
pub use error::{CompileError, GrammarMismatch};
