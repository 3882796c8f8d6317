//! Finding Go files and searching them in parallel.
//!
//! Targets are walked up front, then the file list is fanned out over a
//! rayon pool. Each pool thread owns a [`worker::Worker`] with its own
//! parser and pattern clone. A shared counter stops new files from being
//! searched once the match limit is exceeded; files already in progress
//! run to completion. Results keep file order.

mod worker;

use std::path::{self, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use gogrep_syntax::Parser;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::CliError;
use crate::output::FoundMatch;
pub(crate) use worker::SearchJob;
use worker::{FileMatches, Worker};

/// The result of searching every file.
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    /// Accepted matches across all searched files.
    pub(crate) total: u64,
    /// Kept matches in file order.
    pub(crate) found: Vec<FoundMatch>,
}

/// Lists the Go files under comma-separated `targets`, in walk order,
/// leaving out anything whose absolute path matches `exclude`.
pub(crate) fn discover(targets: &str, exclude: Option<&Regex>) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for target in targets.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let walker = WalkDir::new(target)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_excluded(entry.path(), exclude));
        for item in walker {
            let entry = item.map_err(|source| CliError::Walk {
                path: PathBuf::from(target),
                source,
            })?;
            if entry.file_type().is_file() && is_go_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    debug!(files = files.len(), "targets walked");
    Ok(files)
}

fn is_go_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
}

fn is_excluded(path: &Path, exclude: Option<&Regex>) -> bool {
    let Some(exclude) = exclude else {
        return false;
    };
    match path::absolute(path) {
        Ok(absolute) => exclude.is_match(&absolute.to_string_lossy()),
        Err(error) => {
            warn!(path = %path.display(), %error, "cannot resolve absolute path");
            exclude.is_match(&path.to_string_lossy())
        }
    }
}

/// Searches `files` on `workers` threads.
pub(crate) fn search(
    files: &[PathBuf],
    job: &SearchJob<'_>,
    workers: usize,
    limit: u64,
) -> Result<Outcome, CliError> {
    check_parser()?;
    let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;
    let matched = AtomicU64::new(0);

    let per_file: Vec<FileMatches> = pool.install(|| {
        files
            .par_iter()
            .map_init(
                || started(Worker::new(job)),
                |slot, path| {
                    if matched.load(Ordering::Relaxed) > limit {
                        return FileMatches::default();
                    }
                    let Some(worker) = slot.as_mut() else {
                        debug!(file = %path.display(), "skipped, no search worker");
                        return FileMatches::default();
                    };
                    let results = worker.grep(path);
                    matched.fetch_add(results.count, Ordering::Relaxed);
                    results
                },
            )
            .collect()
    });

    let mut outcome = Outcome::default();
    for results in per_file {
        outcome.total += results.count;
        outcome.found.extend(results.found);
    }
    Ok(outcome)
}

/// Fails the whole search up front when the Go grammar cannot be loaded.
fn check_parser() -> Result<(), CliError> {
    Parser::new()?;
    Ok(())
}

/// Keeps a pool thread's worker, or logs why the thread has none. A thread
/// without a worker searches none of the files rayon hands it.
fn started(worker: Result<Worker<'_>, CliError>) -> Option<Worker<'_>> {
    match worker {
        Ok(worker) => Some(worker),
        Err(error) => {
            warn!(%error, "cannot start search worker; its files are skipped");
            None
        }
    }
}

/// The worker count to use: `requested`, or the number of cores, capped at
/// four threads per core.
pub(crate) fn worker_count(requested: Option<usize>) -> usize {
    let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
    requested.map_or(cores, |n| n.clamp(1, cores.saturating_mul(4)))
}
