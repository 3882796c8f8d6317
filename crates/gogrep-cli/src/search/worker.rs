//! Per-thread search state.

use std::fs;
use std::path::Path;

use gogrep_syntax::{MatcherState, Parser, Pattern, walk};
use tracing::{debug, warn};

use crate::errors::CliError;
use crate::filter::FilterPlan;
use crate::output::FoundMatch;

/// Matches found in one file.
#[derive(Debug, Default)]
pub(crate) struct FileMatches {
    /// Accepted matches, counted even when not kept.
    pub(crate) count: u64,
    /// The kept matches; empty in count mode.
    pub(crate) found: Vec<FoundMatch>,
}

/// What every worker shares.
#[derive(Debug)]
pub(crate) struct SearchJob<'a> {
    pub(crate) pattern: &'a Pattern,
    pub(crate) filter: &'a FilterPlan,
    pub(crate) capture_names: &'a [String],
    pub(crate) keep_matches: bool,
}

/// A parser and pattern owned by one rayon worker.
pub(crate) struct Worker<'a> {
    job: &'a SearchJob<'a>,
    pattern: Pattern,
    parser: Parser,
}

impl<'a> Worker<'a> {
    pub(crate) fn new(job: &'a SearchJob<'a>) -> Result<Self, CliError> {
        Ok(Self {
            job,
            pattern: job.pattern.clone(),
            parser: Parser::new()?,
        })
    }

    /// Searches one file. Unreadable or unparsable files are logged and
    /// yield no matches.
    pub(crate) fn grep(&mut self, path: &Path) -> FileMatches {
        debug!(file = %path.display(), "searching");
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(error) => {
                warn!(file = %path.display(), %error, "read file failed");
                return FileMatches::default();
            }
        };
        let parsed = match self.parser.parse(&source) {
            Ok(parsed) if !parsed.has_errors() => parsed,
            Ok(parsed) => {
                let first = parsed.errors().into_iter().next();
                warn!(
                    file = %path.display(),
                    error = ?first,
                    "file has syntax errors, skipping"
                );
                return FileMatches::default();
            }
            Err(error) => {
                warn!(file = %path.display(), %error, "parse failed");
                return FileMatches::default();
            }
        };
        if !self.job.filter.accepts_file(path, &parsed) {
            debug!(file = %path.display(), "file rejected by file predicates");
            return FileMatches::default();
        }

        let mut results = FileMatches::default();
        let mut state = MatcherState::new();
        let pattern = &self.pattern;
        let job = self.job;
        walk(parsed.root_node(), |node| {
            pattern.match_node(&mut state, node, parsed.source(), |data| {
                if !job.filter.expr.evaluate(data) {
                    return;
                }
                results.count += 1;
                if job.keep_matches {
                    results
                        .found
                        .push(FoundMatch::new(path, data, job.capture_names));
                }
            });
        });
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gogrep_syntax::CompileConfig;
    use std::io::Write;

    fn write_temp(source: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".go")
            .tempfile()
            .unwrap_or_else(|err| panic!("tempfile: {err}"));
        file.write_all(source.as_bytes())
            .unwrap_or_else(|err| panic!("write: {err}"));
        file
    }

    fn grep(pattern: &str, filter: &str, source: &str, keep: bool) -> FileMatches {
        let pattern = Pattern::compile(pattern, &CompileConfig::default())
            .unwrap_or_else(|err| panic!("pattern: {err}"));
        let filter = FilterPlan::compile(filter, pattern.vars())
            .unwrap_or_else(|err| panic!("filter: {err}"));
        let job = SearchJob {
            pattern: &pattern,
            filter: &filter,
            capture_names: &[],
            keep_matches: keep,
        };
        let file = write_temp(source);
        let mut worker = Worker::new(&job).unwrap_or_else(|err| panic!("worker: {err}"));
        worker.grep(file.path())
    }

    const SOURCE: &str = "package p\n\nfunc f() {\n\tg(1)\n\tg(x)\n\tg(2)\n}\n";

    #[test]
    fn filters_reject_matches() {
        let results = grep("g($x)", "$x.IsIntLit()", SOURCE, true);
        assert_eq!(results.count, 2);
        assert_eq!(results.found.len(), 2);
    }

    #[test]
    fn count_mode_keeps_nothing() {
        let results = grep("g($_)", "", SOURCE, false);
        assert_eq!(results.count, 3);
        assert!(results.found.is_empty());
    }

    #[test]
    fn files_with_syntax_errors_are_skipped() {
        let results = grep("g($_)", "", "package p\n\nfunc f( {\n\tg(1)\n", true);
        assert_eq!(results.count, 0);
    }

    #[test]
    fn file_predicates_skip_whole_files() {
        let results = grep("g($_)", "file.IsMain()", SOURCE, true);
        assert_eq!(results.count, 0);
    }

    #[test]
    fn missing_files_yield_nothing() {
        let pattern = Pattern::compile("g($_)", &CompileConfig::default())
            .unwrap_or_else(|err| panic!("pattern: {err}"));
        let filter = FilterPlan::compile("", &[]).unwrap_or_else(|err| panic!("filter: {err}"));
        let job = SearchJob {
            pattern: &pattern,
            filter: &filter,
            capture_names: &[],
            keep_matches: true,
        };
        let mut worker = Worker::new(&job).unwrap_or_else(|err| panic!("worker: {err}"));
        assert_eq!(worker.grep(Path::new("/no/such/file.go")).count, 0);
    }
}
