//! Compiled structural patterns for Go code.
//!
//! A pattern is Go source with wildcards in place of the parts that may vary:
//!
//! - `$x` matches any single node and captures it as `x`
//! - `$_` matches any single node without capturing
//! - `$*xs` matches zero or more nodes and captures them as `xs`
//! - `$*_` matches zero or more nodes without capturing
//!
//! Repeating a name requires every occurrence to match equal code, so
//! `$x == $x` finds self-comparisons. A trailing `;` restricts a pattern to
//! standalone statements.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::compiler::compile;
use crate::error::PatternError;
use crate::program::Program;

/// Options that shape how a pattern is compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileConfig {
    /// Compare literals by spelling rather than by value.
    pub strict: bool,
    /// Resolve package qualifiers through each file's imports.
    pub with_types: bool,
    /// Import paths for package aliases used in the pattern, keyed by alias.
    pub imports: BTreeMap<String, String>,
}

impl CompileConfig {
    /// Declares that `alias` in the pattern refers to the package at `path`.
    #[must_use]
    pub fn with_import(mut self, alias: impl Into<String>, path: impl Into<String>) -> Self {
        self.imports.insert(alias.into(), path.into());
        self
    }
}

/// A compiled structural pattern.
///
/// Cloning is cheap: clones share one immutable program and can be handed to
/// other threads, each pairing its clone with its own
/// [`MatcherState`](crate::MatcherState).
#[derive(Debug, Clone)]
pub struct Pattern {
    source: Arc<str>,
    program: Arc<Program>,
    vars: Arc<[String]>,
}

impl Pattern {
    /// Compiles pattern text.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::Wildcard`] for malformed `$` tokens,
    /// [`PatternError::Parse`] when the text is not Go in any accepted
    /// position, and [`PatternError::Unsupported`] when a wildcard sits
    /// somewhere no instruction can express.
    ///
    /// # Examples
    ///
    /// ```
    /// use gogrep_syntax::{CompileConfig, Pattern};
    ///
    /// let pattern = Pattern::compile("$x == $x", &CompileConfig::default())?;
    /// assert_eq!(pattern.vars(), ["x"]);
    /// # Ok::<(), gogrep_syntax::PatternError>(())
    /// ```
    pub fn compile(source: &str, config: &CompileConfig) -> Result<Self, PatternError> {
        let compiled = compile(source, config)?;
        Ok(Self {
            source: Arc::from(source),
            program: Arc::new(compiled.program),
            vars: compiled.vars.into(),
        })
    }

    /// Returns the pattern text as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the distinct variable names in order of first appearance.
    #[must_use]
    pub fn vars(&self) -> &[String] {
        &self.vars
    }

    /// Returns the compiled program.
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Whether the pattern matches runs of statements.
    #[must_use]
    pub fn is_run(&self) -> bool {
        self.program.is_run()
    }

    /// Renders the compiled program for diagnostics.
    #[must_use]
    pub fn dump(&self) -> String {
        self.program.dump()
    }
}
