//! Compiler error types.

use std::io;

/// Error type covering every way a compilation unit can fail.
///
/// All variants except `Io` carry the 1-based source line they were
/// detected on, so batch reporting can print `file: line N: message`
/// without re-reading the source.
#[derive(Debug)]
pub enum CompileError {
    /// Lexical error: unterminated string or block comment, malformed or
    /// out-of-range integer literal.
    Lex { line: usize, message: String },
    /// Token mismatch against the set the grammar expected at this point.
    Syntax {
        line: usize,
        expected: String,
        found: String,
    },
    /// Name resolution failure: a variable used where one must exist, or a
    /// duplicate definition within one scope.
    Resolution { line: usize, message: String },
    /// Input file unreadable or output file unwritable.
    Io(io::Error),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Lex { line, message } => {
                write!(f, "line {}: {}", line, message)
            }
            CompileError::Syntax {
                line,
                expected,
                found,
            } => {
                write!(f, "line {}: expected {}, found '{}'", line, expected, found)
            }
            CompileError::Resolution { line, message } => {
                write!(f, "line {}: {}", line, message)
            }
            CompileError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<io::Error> for CompileError {
    fn from(e: io::Error) -> Self {
        CompileError::Io(e)
    }
}
