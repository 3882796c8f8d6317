//! Error types for the CLI runtime.

use std::io;
use std::path::PathBuf;

use gogrep_filters::FilterError;
use gogrep_syntax::{PatternError, SyntaxError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Everything that stops a search with exit status 2.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CliError {
    /// Command-line arguments could not be parsed.
    #[error("{0}")]
    Usage(clap::Error),
    /// The targets argument names nothing.
    #[error("target can't be empty")]
    EmptyTarget,
    /// The pattern argument is empty.
    #[error("pattern can't be empty")]
    EmptyPattern,
    /// The pattern does not compile.
    #[error("compile pattern: {0}")]
    Pattern(#[from] PatternError),
    /// The filter does not compile.
    #[error("compile filter: {0}")]
    Filter(#[from] FilterError),
    /// A file predicate the CLI cannot decide.
    #[error("compile filter: unsupported file predicate `file.{0}()`")]
    UnsupportedFilePredicate(String),
    /// Function predicates need information the CLI does not collect.
    #[error("compile filter: unsupported function predicate `function.{0}()`")]
    UnsupportedFunctionPredicate(String),
    /// The `--exclude` expression is not a valid regular expression.
    #[error("invalid exclude regexp: {0}")]
    Exclude(#[from] regex::Error),
    /// The `--format` template is malformed.
    #[error("invalid output format: {0}")]
    Template(String),
    /// A target could not be walked.
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        /// The target being walked.
        path: PathBuf,
        /// The underlying failure.
        source: walkdir::Error,
    },
    /// The Go parser could not be created.
    #[error(transparent)]
    Parser(#[from] SyntaxError),
    /// The worker pool could not be started.
    #[error("failed to start workers: {0}")]
    Workers(#[from] rayon::ThreadPoolBuildError),
    /// `--abs` could not resolve a filename.
    #[error("abs({}): {source}", path.display())]
    AbsolutePath {
        /// The relative path.
        path: PathBuf,
        /// The underlying failure.
        source: io::Error,
    },
    /// Matches could not be written.
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
    /// Logging could not be configured.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}
