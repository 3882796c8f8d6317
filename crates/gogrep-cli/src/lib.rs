//! Command-line runtime for `gogrep`.
//!
//! The runtime parses arguments, compiles the pattern and filter once,
//! searches the targets in parallel and prints matches through an output
//! template. It follows grep's exit status convention: 0 when something
//! matched, 1 when nothing did and 2 on error. The interface can be driven
//! from the binary or from tests with substituted output streams.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser as _;
use clap::error::ErrorKind;
use gogrep_syntax::{CompileConfig, Pattern};
use regex::Regex;
use tracing::{debug, info};

mod cli;
mod errors;
mod filter;
mod output;
mod search;
mod telemetry;

use cli::Cli;
pub use errors::CliError;
use filter::FilterPlan;
pub use output::Color;
use output::{Palette, Renderer, Template};
use search::SearchJob;
pub use telemetry::{LogFormat, TelemetryError};

const EXIT_NOT_MATCHED: u8 = 1;
const EXIT_ERROR: u8 = 2;

/// Upper bound on printed matches; more usually means the pattern is too
/// generic.
const MAX_PRINTED: u64 = 100_000;

/// Runs `gogrep` with `args`, writing matches to `stdout` and argument
/// errors to `stderr`. Logs go to the process's stderr.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => return report(&CliError::Usage(error), stderr),
    };

    match execute(&cli, stdout) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_NOT_MATCHED),
        Err(error) => report(&error, stderr),
    }
}

fn report<E: Write>(error: &CliError, stderr: &mut E) -> ExitCode {
    match error {
        CliError::Usage(usage) => {
            let _ = write!(stderr, "{usage}");
        }
        other => {
            let _ = writeln!(stderr, "error: {other}");
        }
    }
    ExitCode::from(EXIT_ERROR)
}

/// Runs the search, returning whether anything matched.
fn execute<W: Write>(cli: &Cli, stdout: &mut W) -> Result<bool, CliError> {
    telemetry::initialise(cli.log_filter(), cli.log_format)?;
    debug!(
        targets = %cli.targets,
        pattern = %cli.pattern,
        filter = cli.filter.as_deref().unwrap_or_default(),
        "arguments parsed"
    );

    if cli.targets.split(',').all(|target| target.trim().is_empty()) {
        return Err(CliError::EmptyTarget);
    }
    if cli.pattern.is_empty() {
        return Err(CliError::EmptyPattern);
    }
    let limit = effective_limit(cli.limit, cli.count);

    let config = CompileConfig {
        strict: cli.strict_syntax,
        ..CompileConfig::default()
    };
    let pattern = Pattern::compile(&cli.pattern, &config)?;
    let filter = FilterPlan::compile(cli.filter.as_deref().unwrap_or_default(), pattern.vars())?;
    let exclude = cli.exclude.as_deref().map(Regex::new).transpose()?;
    let renderer = renderer(cli, &pattern)?;
    let capture_names: Vec<String> = renderer
        .template
        .capture_names()
        .map(str::to_owned)
        .collect();

    let files = search::discover(&cli.targets, exclude.as_ref())?;
    let job = SearchJob {
        pattern: &pattern,
        filter: &filter,
        capture_names: &capture_names,
        keep_matches: !cli.count,
    };
    let outcome = search::search(&files, &job, search::worker_count(cli.workers), limit)?;

    if cli.count {
        info!("found {} matches", outcome.total);
        return Ok(outcome.total > 0);
    }

    let shown = usize::try_from(limit).unwrap_or(usize::MAX);
    for found in outcome.found.iter().take(shown) {
        let line = renderer.render(found)?;
        writeln!(stdout, "{line}").map_err(CliError::Output)?;
    }
    if outcome.found.len() > shown {
        info!("results limited to {limit} matches");
    } else {
        info!("found {} matches", outcome.found.len());
    }
    Ok(outcome.total > 0)
}

/// Count mode treats 0 as unlimited; printing is always capped.
const fn effective_limit(limit: u64, count_mode: bool) -> u64 {
    if count_mode {
        if limit == 0 { u64::MAX } else { limit }
    } else if limit == 0 || limit > MAX_PRINTED {
        MAX_PRINTED
    } else {
        limit
    }
}

fn renderer(cli: &Cli, pattern: &Pattern) -> Result<Renderer, CliError> {
    let template = Template::parse(&cli.format)?;
    if let Some(unknown) = template
        .capture_names()
        .find(|name| !pattern.vars().iter().any(|var| var == name))
    {
        return Err(CliError::Template(format!(
            "`{{{{.{unknown}}}}}` is not captured by the pattern"
        )));
    }
    let palette = if cli.no_color {
        None
    } else {
        colored::control::set_override(true);
        Some(Palette {
            filename: cli.color_filename,
            line: cli.color_line,
            matched: cli.color_match,
        })
    };
    Ok(Renderer {
        template,
        palette,
        multiline: cli.multiline,
        absolute: cli.abs,
    })
}

#[cfg(test)]
mod tests;
