//! Unit tests for gogrep-syntax.

use rstest::rstest;

use crate::{CompileConfig, Parser, Pattern, PatternError};

// =============================================================================
// Parser Tests
// =============================================================================

#[rstest]
#[case("package p\n\nfunc main() {}\n", false)]
#[case("package p\n\nfunc broken() {\n", true)]
#[case("package p\n\nvar x = 1 +\n", true)]
fn parser_detects_errors(#[case] source: &str, #[case] has_errors: bool) {
    let mut parser = Parser::new().expect("parser init");
    let result = parser.parse(source).expect("parse");
    assert_eq!(result.has_errors(), has_errors);
}

#[test]
fn parser_reports_error_location() {
    let mut parser = Parser::new().expect("parser init");
    let result = parser
        .parse("package p\n\nfunc f() {\n\tx := \n}\n")
        .expect("parse");
    let errors = result.errors();
    let first = errors.first().expect("at least one error");
    assert!(first.line >= 4, "unexpected error line {}", first.line);
}

// =============================================================================
// Pattern Compilation Tests
// =============================================================================

#[rstest]
#[case("$x + $y", &["x", "y"])]
#[case("$x == $x", &["x"])]
#[case("f($_, $*_)", &[])]
#[case("f($*args); return $err", &["args", "err"])]
#[case("\"$notvar\" + $v", &["v"])]
fn pattern_reports_its_variables(#[case] source: &str, #[case] expected: &[&str]) {
    let pattern = Pattern::compile(source, &CompileConfig::default()).expect("compile");
    assert_eq!(pattern.vars(), expected);
}

#[rstest]
#[case("$")]
#[case("$ + 1")]
#[case("$*")]
#[case("$$ == 1")]
fn malformed_wildcards_are_rejected(#[case] source: &str) {
    let err = Pattern::compile(source, &CompileConfig::default()).expect_err("should fail");
    assert!(
        matches!(err, PatternError::Wildcard { offset: 0, .. }),
        "unexpected error {err:?}"
    );
}

#[rstest]
#[case("$x +")]
#[case("func {")]
#[case("f(")]
fn unparsable_patterns_are_rejected(#[case] source: &str) {
    let err = Pattern::compile(source, &CompileConfig::default()).expect_err("should fail");
    assert!(
        matches!(err, PatternError::Parse { .. }),
        "unexpected error {err:?}"
    );
}

#[rstest]
#[case("$x", false)]
#[case("$x;", false)]
#[case("a := 1; b := 2", true)]
#[case("type T struct{}", false)]
fn multi_statement_patterns_compile_to_runs(#[case] source: &str, #[case] is_run: bool) {
    let pattern = Pattern::compile(source, &CompileConfig::default()).expect("compile");
    assert_eq!(pattern.is_run(), is_run);
}

#[rstest]
#[case("[]int")]
#[case("map[$k]$v")]
#[case("struct{ $*_ }")]
#[case("func($*_) error")]
#[case("var $x = $y")]
#[case("func $name($*_) { $*_ }")]
#[case("case $x: $*_")]
#[case("$key: $value")]
#[case("for $k, $v := range $xs { $*_ }")]
#[case("switch $x { case 1: }")]
fn grammar_positions_compile(#[case] source: &str) {
    Pattern::compile(source, &CompileConfig::default())
        .unwrap_or_else(|err| panic!("{source}: {err}"));
}

#[test]
fn compiled_patterns_are_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Pattern>();
}
