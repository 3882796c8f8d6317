//! CLI entrypoint for `gogrep`.
//!
//! The binary delegates to [`gogrep_cli::run`], which parses arguments,
//! searches the targets and prints matches to stdout.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    gogrep_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
