//! Facts about a filter that callers can act on before matching.

use std::fmt;

use gogrep_syntax::ROOT_VAR;

use crate::error::FilterError;

/// A `file.Name()` or `function.Name()` predicate and its polarity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecialPredicate {
    /// Method name, such as `IsTest`.
    pub name: String,
    /// Whether the predicate appears under an odd number of `!`.
    pub negated: bool,
}

impl SpecialPredicate {
    fn render(&self, receiver: &str) -> String {
        let bang = if self.negated { "!" } else { "" };
        format!("{bang}{receiver}.{}()", self.name)
    }
}

/// The side table produced with a compiled filter.
///
/// File predicates are conditions on the whole file that every accepted
/// match must satisfy. Function predicates outside `||` are recorded the
/// same way so callers can skip whole functions; they also stay in the
/// expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Info {
    /// Hoisted `file.Name()` predicates, in source order.
    pub file_predicates: Vec<SpecialPredicate>,
    /// Distinct `function.Name()` predicates outside `||`, in source order.
    pub function_predicates: Vec<SpecialPredicate>,
    /// Referenced variable names in order of first use; `$` for `$$`.
    pub vars: Vec<String>,
}

impl Info {
    /// Checks that every referenced variable is one `declared` by the
    /// pattern. `$$` is always declared.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UndeclaredVariable`] for the first variable
    /// the pattern does not declare.
    pub fn check_vars<S: AsRef<str>>(&self, declared: &[S]) -> Result<(), FilterError> {
        let missing = self.vars.iter().find(|var| {
            var.as_str() != ROOT_VAR && !declared.iter().any(|name| name.as_ref() == var.as_str())
        });
        missing.map_or(Ok(()), |name| {
            Err(FilterError::UndeclaredVariable { name: name.clone() })
        })
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .file_predicates
            .iter()
            .map(|p| p.render("file"))
            .chain(self.function_predicates.iter().map(|p| p.render("function")))
            .chain(self.vars.iter().map(|var| format!("${var}")))
            .collect();
        f.write_str(&parts.join(" "))
    }
}
