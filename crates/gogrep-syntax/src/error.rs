//! Error types for parsing and pattern compilation.
//!
//! Ordinary user-facing failures (an unreadable pattern, a Go file the parser
//! cannot handle) are reported through these enums. Internal invariant
//! violations in the matcher are not represented here; they panic.

use thiserror::Error;

/// Errors raised while setting up or running the Go parser.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyntaxError {
    /// Failed to initialise the Tree-sitter parser with the Go grammar.
    #[error("failed to initialise Go parser: {message}")]
    ParserInitError {
        /// Description of the failure.
        message: String,
    },

    /// Tree-sitter did not produce a tree for the input.
    #[error("failed to parse Go source: {message}")]
    ParseError {
        /// Description of the failure.
        message: String,
    },
}

impl SyntaxError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInitError {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }
}

/// Errors raised by [`crate::Pattern::compile`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// The pattern contains a malformed `$` wildcard.
    #[error("invalid wildcard at offset {offset}: {message}")]
    Wildcard {
        /// Byte offset of the offending `$` in the pattern text.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// The pattern is not valid Go in any of the accepted positions.
    #[error("pattern does not parse at {line}:{column} near {context:?}: {message}")]
    Parse {
        /// One-based line within the pattern text.
        line: u32,
        /// One-based column within the pattern text.
        column: u32,
        /// Pattern text around the error.
        context: String,
        /// Description reported by the parser.
        message: String,
    },

    /// The pattern parses but contains a shape no instruction can express.
    #[error("unsupported pattern construct {construct:?}: {message}")]
    Unsupported {
        /// The pattern text of the offending fragment.
        construct: String,
        /// Why the fragment cannot be compiled.
        message: String,
    },

    /// The parser itself could not be used.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl PatternError {
    /// Creates a wildcard syntax error.
    #[must_use]
    pub fn wildcard(offset: usize, message: impl Into<String>) -> Self {
        Self::Wildcard {
            offset,
            message: message.into(),
        }
    }

    /// Creates an unsupported construct error.
    #[must_use]
    pub fn unsupported(construct: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unsupported {
            construct: construct.into(),
            message: message.into(),
        }
    }
}
