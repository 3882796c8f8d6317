//! Filter expressions for `gogrep` matches.
//!
//! A filter is a boolean expression over the captures of a match, written
//! in a small Go-like language:
//!
//! ```text
//! $x.IsPure() && !$y.IsConst() && $x.Text() != "nil"
//! ```
//!
//! [`parse`] compiles the text into an [`Expr`] and an [`Info`] side table.
//! Predicates on `file` describe the file a match lives in; they are hoisted
//! into [`Info`] so that callers can skip whole files before matching.
//! Predicates on `function` are answered per match by the caller through
//! [`MatchContext`].
//!
//! Variable predicates are resolved through an [`OperationTable`], which
//! callers build once and share between threads.

mod error;
mod eval;
mod expr;
mod info;
mod lexer;
mod lower;
mod parser;
mod table;

pub use error::FilterError;
pub use eval::MatchContext;
pub use expr::{Expr, ExprDisplay};
pub use info::{Info, SpecialPredicate};
pub use lower::parse;
pub use table::{OperationTable, VarPredicate};
