//! Compiling filter text end to end.

use gogrep_filters::{FilterError, OperationTable, VarPredicate, parse};
use gogrep_syntax::{CompileConfig, Parser, Pattern};
use rstest::{fixture, rstest};

#[fixture]
fn table() -> OperationTable {
    OperationTable::standard()
}

#[rstest]
#[case("file.IsTest()", "Nop", "file.IsTest()")]
#[case("!file.IsTest()", "Nop", "!file.IsTest()")]
#[case("!(!file.IsTest())", "Nop", "file.IsTest()")]
#[case("file.IsAutogen()", "Nop", "file.IsAutogen()")]
#[case("function.IsHot()", r#"(FunctionVarFunc "IsHot")"#, "function.IsHot()")]
#[case(
    "!function.IsHot()",
    r#"(Not (FunctionVarFunc "IsHot"))"#,
    "!function.IsHot()"
)]
#[case(
    "function.IsHot() && file.IsMain()",
    r#"(FunctionVarFunc "IsHot")"#,
    "file.IsMain() function.IsHot()"
)]
#[case(
    "file.IsMain() && function.IsHot()",
    r#"(FunctionVarFunc "IsHot")"#,
    "file.IsMain() function.IsHot()"
)]
#[case(
    "function.IsHot() && $x.IsPure()",
    r#"(And (FunctionVarFunc "IsHot") (%IsPure "x"))"#,
    "function.IsHot() $x"
)]
#[case(
    "$x.IsPure() && function.IsHot()",
    r#"(And (%IsPure "x") (FunctionVarFunc "IsHot"))"#,
    "function.IsHot() $x"
)]
#[case(
    "$x.IsPure() || function.IsHot()",
    r#"(Or (%IsPure "x") (FunctionVarFunc "IsHot"))"#,
    "$x"
)]
#[case(
    "!($x.IsPure() || function.IsHot())",
    r#"(Not (Or (%IsPure "x") (FunctionVarFunc "IsHot")))"#,
    "$x"
)]
#[case("$x.IsPure()", r#"(%IsPure "x")"#, "$x")]
#[case(
    "$x.IsPure() || $y.IsPure()",
    r#"(Or (%IsPure "x") (%IsPure "y"))"#,
    "$x $y"
)]
#[case(
    "!file.IsAutogen() && (!$x.IsPure() || !$y.IsPure())",
    r#"(Or (Not (%IsPure "x")) (Not (%IsPure "y")))"#,
    "!file.IsAutogen() $x $y"
)]
#[case(
    "(file.IsAutogen()) && !file.IsTest()",
    "Nop",
    "file.IsAutogen() !file.IsTest()"
)]
#[case("file.IsTest() && $c.IsConst()", r#"(%IsConst "c")"#, "file.IsTest() $c")]
#[case("$c.IsConst() && file.IsTest()", r#"(%IsConst "c")"#, "file.IsTest() $c")]
#[case(
    "$x.IsConst() && !($y.IsConst() && file.IsTest())",
    r#"(And (%IsConst "x") (Not (%IsConst "y")))"#,
    "!file.IsTest() $x $y"
)]
#[case("$$.IsPure()", r#"(%IsPure "$")"#, "$$")]
#[case(
    r#"$x.Text() == "String""#,
    r#"(Eq (%Text "x") (String "String"))"#,
    "$x"
)]
#[case(
    r#""String" == $x.Text()"#,
    r#"(Eq (%Text "x") (String "String"))"#,
    "$x"
)]
#[case(
    r#"$x.Text() != "String""#,
    r#"(NotEq (%Text "x") (String "String"))"#,
    "$x"
)]
#[case(
    r#""String" != $x.Text()"#,
    r#"(NotEq (%Text "x") (String "String"))"#,
    "$x"
)]
#[case("", "Nop", "")]
fn compiles_to_canonical_form(
    table: OperationTable,
    #[case] input: &str,
    #[case] expr: &str,
    #[case] info: &str,
) {
    let (compiled, compiled_info) =
        parse(&table, input).unwrap_or_else(|err| panic!("compile {input:?}: {err}"));
    assert_eq!(compiled_info.to_string(), info, "info for {input:?}");
    assert_eq!(
        compiled.display(&table).to_string(),
        expr,
        "expression for {input:?}"
    );
}

#[rstest]
fn repeated_function_predicates_are_recorded_once(table: OperationTable) {
    let (_, info) = parse(&table, "function.IsHot() && !$x.IsPure() && function.IsHot()")
        .unwrap_or_else(|err| panic!("compile: {err}"));
    assert_eq!(info.to_string(), "function.IsHot() $x");
}

#[rstest]
fn custom_tables_rename_predicates() {
    let table = OperationTable::new([("Pure", VarPredicate::IsPure)]);
    let (expr, _) = parse(&table, "$x.Pure()").unwrap_or_else(|err| panic!("compile: {err}"));
    assert_eq!(expr.display(&table).to_string(), r#"(%Pure "x")"#);
    assert!(matches!(
        parse(&table, "$x.IsConst()"),
        Err(FilterError::UnknownPredicate { .. })
    ));
}

#[rstest]
#[case("file.IsTest() || $x.IsPure()")]
#[case("$x.IsPure() || !file.IsTest()")]
#[case("!($x.IsPure() || (file.IsMain() && $y.IsPure()))")]
fn file_predicates_cannot_be_disjuncts(table: OperationTable, #[case] input: &str) {
    assert!(
        matches!(
            parse(&table, input),
            Err(FilterError::FileInDisjunction { .. })
        ),
        "{input:?}"
    );
}

#[rstest]
#[case(r#""a""#)]
#[case("$x.Text()")]
#[case(r#"$x.IsPure() == "a""#)]
#[case(r#"$x.Text() == $y.IsConst()"#)]
#[case(r#"!"a""#)]
fn strings_and_conditions_do_not_mix(table: OperationTable, #[case] input: &str) {
    assert!(
        matches!(parse(&table, input), Err(FilterError::TypeMismatch { .. })),
        "{input:?}"
    );
}

#[rstest]
#[case("$x.IsPure(")]
#[case("$x.IsPure() &&")]
#[case("$x.IsPure() & $y.IsPure()")]
#[case(r#"$x.Text() == "open"#)]
#[case("($x.IsPure()")]
fn malformed_text_is_a_syntax_error(table: OperationTable, #[case] input: &str) {
    assert!(
        matches!(parse(&table, input), Err(FilterError::Syntax { .. })),
        "{input:?}"
    );
}

#[rstest]
fn unknown_receivers_are_rejected(table: OperationTable) {
    assert_eq!(
        parse(&table, "pkg.IsTest()"),
        Err(FilterError::UnknownReceiver {
            receiver: "pkg".to_owned()
        })
    );
}

#[rstest]
fn filters_evaluate_against_matches(table: OperationTable) {
    let mut parser = Parser::new().unwrap_or_else(|err| panic!("parser: {err}"));
    let parsed = parser
        .parse("package p\n\nfunc f() {\n\tg(1, x)\n\tg(y, \"s\")\n\tg(h(), 2)\n}\n")
        .unwrap_or_else(|err| panic!("parse: {err}"));
    let pattern = Pattern::compile("g($a, $b)", &CompileConfig::default())
        .unwrap_or_else(|err| panic!("pattern: {err}"));
    let matches = pattern.find_all(&parsed);
    assert_eq!(matches.len(), 3);

    let accepted = |filter: &str| -> Vec<&str> {
        let (expr, info) =
            parse(&table, filter).unwrap_or_else(|err| panic!("compile {filter:?}: {err}"));
        info.check_vars(pattern.vars())
            .unwrap_or_else(|err| panic!("vars {filter:?}: {err}"));
        matches
            .iter()
            .filter(|m| expr.evaluate(*m))
            .map(|m| m.text())
            .collect()
    };

    assert_eq!(accepted("$a.IsConst()"), ["g(1, x)"]);
    assert_eq!(accepted("$a.IsPure() && $b.IsPure()"), ["g(1, x)", "g(y, \"s\")"]);
    assert_eq!(accepted("!$a.IsPure() || $b.IsStringLit()"), ["g(y, \"s\")", "g(h(), 2)"]);
    assert_eq!(accepted(r#"$a.Text() == "y""#), ["g(y, \"s\")"]);
    assert_eq!(accepted(r#""x" != $b.Text()"#), ["g(y, \"s\")", "g(h(), 2)"]);
    assert_eq!(accepted("$$.IsPure()"), Vec::<&str>::new());
    assert_eq!(accepted("file.IsTest()").len(), 3);
}

#[rstest]
fn undeclared_variables_are_reported(table: OperationTable) {
    let (_, info) = parse(&table, "$x.IsPure() && $y.IsPure()")
        .unwrap_or_else(|err| panic!("compile: {err}"));
    assert_eq!(
        info.check_vars(&["x"]),
        Err(FilterError::UndeclaredVariable {
            name: "y".to_owned()
        })
    );
}
