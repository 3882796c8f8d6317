//! Tests for the command-line runtime.

use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{EXIT_ERROR, EXIT_NOT_MATCHED, MAX_PRINTED, effective_limit, run};

const MAIN_GO: &str = "\
package main

import \"os\"

func main() {
\tif err := run(); err != nil {
\t\tos.Exit(1)
\t}
\tos.Exit(0)
}
";

const LIB_TEST_GO: &str = "\
package lib

func TestX() {
\tos.Exit(2)
}
";

#[fixture]
fn project() -> TempDir {
    let dir = tempfile::tempdir().unwrap_or_else(|err| panic!("tempdir: {err}"));
    fs::write(dir.path().join("main.go"), MAIN_GO)
        .unwrap_or_else(|err| panic!("write: {err}"));
    fs::write(dir.path().join("lib_test.go"), LIB_TEST_GO)
        .unwrap_or_else(|err| panic!("write: {err}"));
    dir
}

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn gogrep(args: &[&str]) -> Outcome {
    let argv: Vec<OsString> = std::iter::once("gogrep")
        .chain(["--no-color"])
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = run(argv, &mut stdout, &mut stderr);
    Outcome {
        exit,
        stdout: String::from_utf8(stdout).unwrap_or_else(|err| panic!("stdout utf8: {err}")),
        stderr: String::from_utf8(stderr).unwrap_or_else(|err| panic!("stderr utf8: {err}")),
    }
}

fn target(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

#[rstest]
fn matches_use_the_output_template(project: TempDir) {
    let main = target(&project, "main.go");
    let out = gogrep(&[
        "--format",
        "{{.Line}} {{.Match}} [{{.code}}]",
        &main,
        "os.Exit($code)",
    ]);
    assert_eq!(out.exit, ExitCode::SUCCESS);
    assert_eq!(out.stdout, "7 os.Exit(1) [1]\n9 os.Exit(0) [0]\n");
}

#[rstest]
fn default_template_prints_file_line_and_source_line(project: TempDir) {
    let main = target(&project, "main.go");
    let out = gogrep(&[&main, "os.Exit(0)"]);
    assert_eq!(out.stdout, format!("{main}:9: \tos.Exit(0)\n"));
}

#[rstest]
fn filters_and_file_predicates_apply(project: TempDir) {
    let root = target(&project, "");
    let out = gogrep(&[
        "--format",
        "{{.Match}}",
        &root,
        "os.Exit($c)",
        r#"!file.IsTest() && $c.Text() != "0""#,
    ]);
    assert_eq!(out.stdout, "os.Exit(1)\n");
}

#[rstest]
fn nothing_matched_exits_with_one(project: TempDir) {
    let root = target(&project, "");
    let out = gogrep(&[&root, "panic($_)"]);
    assert_eq!(out.exit, ExitCode::from(EXIT_NOT_MATCHED));
    assert!(out.stdout.is_empty());
}

#[rstest]
fn count_mode_prints_nothing(project: TempDir) {
    let root = target(&project, "");
    let out = gogrep(&["-c", &root, "os.Exit($_)"]);
    assert_eq!(out.exit, ExitCode::SUCCESS);
    assert!(out.stdout.is_empty());
}

#[rstest]
fn limit_caps_printed_matches(project: TempDir) {
    let root = target(&project, "");
    let out = gogrep(&[
        "--limit",
        "1",
        "--workers",
        "1",
        "--format",
        "{{.Match}}",
        &root,
        "os.Exit($_)",
    ]);
    assert_eq!(out.stdout.lines().count(), 1);
}

#[rstest]
#[case(&["--format", "{{.nope}}"], &["os.Exit($c)"], "not captured by the pattern")]
#[case(&["--format", "{{if .c}}x{{end}}"], &["os.Exit($c)"], "invalid output format")]
#[case(&[], &["os.Exit($c)", "$d.IsPure()"], "compile filter")]
#[case(&[], &["os.Exit($c)", "function.IsHot()"], "unsupported function predicate")]
#[case(&[], &["os.Exit($c)", "file.IsVendor()"], "unsupported file predicate")]
#[case(&["--exclude", "("], &["os.Exit($c)"], "invalid exclude regexp")]
#[case(&[], &["os.Exit("], "compile pattern")]
fn setup_errors_exit_with_two(
    project: TempDir,
    #[case] flags: &[&str],
    #[case] rest: &[&str],
    #[case] message: &str,
) {
    let root = target(&project, "");
    let argv: Vec<&str> = flags
        .iter()
        .copied()
        .chain([root.as_str()])
        .chain(rest.iter().copied())
        .collect();
    let out = gogrep(&argv);
    assert_eq!(out.exit, ExitCode::from(EXIT_ERROR));
    assert!(out.stderr.contains(message), "{:?}", out.stderr);
}

#[test]
fn empty_pattern_is_an_error() {
    let out = gogrep(&["src", ""]);
    assert_eq!(out.exit, ExitCode::from(EXIT_ERROR));
    assert!(out.stderr.contains("pattern can't be empty"));
}

#[test]
fn empty_targets_are_an_error() {
    let out = gogrep(&[" , ", "f()"]);
    assert_eq!(out.exit, ExitCode::from(EXIT_ERROR));
    assert!(out.stderr.contains("target can't be empty"));
}

#[test]
fn missing_arguments_are_usage_errors() {
    let out = gogrep(&[]);
    assert_eq!(out.exit, ExitCode::from(EXIT_ERROR));
    assert!(out.stderr.contains("Usage"), "{:?}", out.stderr);
}

#[test]
fn help_goes_to_stdout() {
    let out = gogrep(&["--help"]);
    assert_eq!(out.exit, ExitCode::SUCCESS);
    assert!(out.stdout.contains("Exit status"));
}

#[rstest]
#[case(0, true, u64::MAX)]
#[case(10, true, 10)]
#[case(0, false, MAX_PRINTED)]
#[case(MAX_PRINTED + 1, false, MAX_PRINTED)]
#[case(1000, false, 1000)]
fn limits_are_normalised(#[case] limit: u64, #[case] count: bool, #[case] expected: u64) {
    assert_eq!(effective_limit(limit, count), expected);
}
