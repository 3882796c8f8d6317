//! Error types for filter compilation.

use thiserror::Error;

/// Errors raised by [`crate::parse`] and [`crate::Info::check_vars`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FilterError {
    /// The filter text is not a well-formed expression.
    #[error("filter syntax error at offset {offset}: {message}")]
    Syntax {
        /// Byte offset of the offending token.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// A variable method that the operation table does not know.
    #[error("unknown predicate `{receiver}.{method}()`")]
    UnknownPredicate {
        /// The receiver as written, such as `$x`.
        receiver: String,
        /// The method name.
        method: String,
    },

    /// A method call on something other than `$var`, `file` or `function`.
    #[error("unsupported receiver `{receiver}`, expected `$var`, `file` or `function`")]
    UnknownReceiver {
        /// The receiver as written.
        receiver: String,
    },

    /// A file predicate inside an `||` expression.
    #[error("file predicate `file.{name}()` cannot be part of an `||` expression")]
    FileInDisjunction {
        /// The predicate name.
        name: String,
    },

    /// A string where a condition is expected, or the reverse.
    #[error("type mismatch at offset {offset}: {message}")]
    TypeMismatch {
        /// Byte offset of the offending operand.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// A `$name` that the pattern never declares.
    #[error("filter references `${name}`, which the pattern does not declare")]
    UndeclaredVariable {
        /// The variable name, without the `$`.
        name: String,
    },
}

impl FilterError {
    /// Creates a syntax error.
    #[must_use]
    pub fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(offset: usize, message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            offset,
            message: message.into(),
        }
    }
}
