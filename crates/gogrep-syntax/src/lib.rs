//! Structural search over Go syntax trees.
//!
//! This crate holds the core of `gogrep`:
//!
//! - **Parsing** via [`Parser`], a thin wrapper over the Tree-sitter Go
//!   grammar
//! - **Pattern compilation** via [`Pattern::compile`], which turns Go source
//!   containing `$` wildcards into an immutable matching [`Program`]
//! - **Matching** via [`Pattern::match_node`], which tests one node at a time
//!   against the program and reports named [`Capture`]s
//!
//! # Pattern Language
//!
//! - `$x` matches any single node and captures it as `x`
//! - `$_` matches any single node without capturing
//! - `$*xs` matches a possibly empty run of nodes
//! - `$*_` matches a possibly empty run of nodes without capturing
//!
//! A repeated name must match equal code each time. Literals compare by
//! value (`0xA` matches `10`) unless [`CompileConfig::strict`] is set. A
//! pattern ending in `;` only matches standalone statements, and a pattern of
//! several statements matches consecutive statements in a block.
//!
//! # Example
//!
//! ```
//! use gogrep_syntax::{CompileConfig, Parser, Pattern};
//!
//! let mut parser = Parser::new()?;
//! let parsed = parser.parse("package p\n\nfunc f() { _ = a == a }\n")?;
//!
//! let pattern = Pattern::compile("$x == $x", &CompileConfig::default())?;
//! let matches = pattern.find_all(&parsed);
//! assert_eq!(matches.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod compiler;
mod error;
mod imports;
mod kinds;
mod lexer;
mod literal;
mod matcher;
mod parser;
mod pattern;
mod position;
mod program;
mod sequence;
mod walk;

pub use error::{PatternError, SyntaxError};
pub use imports::{FileImports, ImportResolver};
pub use kinds::{
    is_identifier, is_leaf, is_literal, is_statement_container, is_string_literal, leaf_class,
};
pub use lexer::{ROOT_VAR, WildcardToken};
pub use literal::leaves_equal;
pub use matcher::{Capture, CaptureValue, MatchData, MatchResult, MatcherState};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo, go_language};
pub use pattern::{CompileConfig, Pattern};
pub use position::{line_at_offset, line_bounds, point_to_one_based};
pub use program::{Instruction, Op, Program, Slot};
pub use sequence::{Child, ChildList, NodeSequence, NodeSlice};
pub use walk::walk;

#[cfg(test)]
mod tests;
