//! Compiling the filter argument for the command line.
//!
//! The filter engine hoists `file.*()` predicates out of the expression; the
//! CLI decides them once per file before matching. `function.*()` predicates
//! need per-function facts the CLI does not collect, so they are rejected.

use std::path::Path;
use std::str::FromStr;

use gogrep_filters::{Expr, Info, OperationTable, parse};
use gogrep_syntax::ParseResult;
use strum::{Display, EnumString};

use crate::errors::CliError;

/// File predicates the CLI can decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub(crate) enum FilePredicate {
    /// The file carries a `// Code generated ... DO NOT EDIT.` marker.
    IsAutogen,
    /// The file name ends in `_test.go`.
    IsTest,
    /// The file declares `package main`.
    IsMain,
}

impl FilePredicate {
    fn holds(self, path: &Path, parsed: &ParseResult) -> bool {
        match self {
            Self::IsAutogen => parsed.source().lines().any(is_generated_marker),
            Self::IsTest => path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with("_test.go")),
            Self::IsMain => package_name(parsed) == Some("main"),
        }
    }
}

fn is_generated_marker(line: &str) -> bool {
    line.starts_with("// Code generated ") && line.trim_end().ends_with(" DO NOT EDIT.")
}

fn package_name(parsed: &ParseResult) -> Option<&str> {
    let root = parsed.root_node();
    let mut cursor = root.walk();
    let clause = root
        .named_children(&mut cursor)
        .find(|node| node.kind() == "package_clause")?;
    let mut clause_cursor = clause.walk();
    let name = clause
        .named_children(&mut clause_cursor)
        .find(|node| node.kind() == "package_identifier")?;
    parsed.source().get(name.byte_range())
}

/// A compiled filter split into per-file and per-match parts.
#[derive(Debug, Clone)]
pub(crate) struct FilterPlan {
    /// Evaluated per match.
    pub(crate) expr: Expr,
    files: Vec<(FilePredicate, bool)>,
}

impl FilterPlan {
    /// Compiles `text` for a pattern declaring `vars`.
    pub(crate) fn compile(text: &str, vars: &[String]) -> Result<Self, CliError> {
        let table = OperationTable::standard();
        let (expr, info) = parse(&table, text)?;
        info.check_vars(vars)?;
        reject_function_predicates(&expr, &info)?;
        let files = info
            .file_predicates
            .iter()
            .map(|predicate| {
                FilePredicate::from_str(&predicate.name)
                    .map(|known| (known, !predicate.negated))
                    .map_err(|_| CliError::UnsupportedFilePredicate(predicate.name.clone()))
            })
            .collect::<Result<_, _>>()?;
        tracing::debug!(filter = %expr.display(&table), %info, "filter compiled");
        Ok(Self { expr, files })
    }

    /// Whether a file can contain accepted matches at all.
    pub(crate) fn accepts_file(&self, path: &Path, parsed: &ParseResult) -> bool {
        self.files
            .iter()
            .all(|(predicate, expected)| predicate.holds(path, parsed) == *expected)
    }
}

fn reject_function_predicates(expr: &Expr, info: &Info) -> Result<(), CliError> {
    if let Some(predicate) = info.function_predicates.first() {
        return Err(CliError::UnsupportedFunctionPredicate(predicate.name.clone()));
    }
    match expr {
        Expr::FunctionPredicate(name) => Err(CliError::UnsupportedFunctionPredicate(name.clone())),
        Expr::Not(inner) => reject_function_predicates(inner, info),
        Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) | Expr::Eq(lhs, rhs) | Expr::NotEq(lhs, rhs) => {
            reject_function_predicates(lhs, info)?;
            reject_function_predicates(rhs, info)
        }
        _ => Ok(()),
    }
}
