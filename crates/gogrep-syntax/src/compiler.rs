//! Lowers pattern text into a matching [`Program`].
//!
//! A pattern is tried as an expression, a type, a keyed element, a statement
//! list, a declaration list and finally a switch case, wrapping it in just
//! enough Go to make each form parse. The first form that parses without
//! errors is lowered; if none does, the statement-list parse error is
//! reported.

use std::sync::Arc;

use tracing::debug;
use tree_sitter::Node;

use crate::error::PatternError;
use crate::kinds::{is_identifier, is_leaf, tokens, tokens_match};
use crate::lexer::{LexedPattern, WildcardToken, lex_pattern};
use crate::parser::{ParseResult, Parser, SyntaxErrorInfo};
use crate::pattern::CompileConfig;
use crate::position::{line_at_offset, line_bounds};
use crate::program::{Instruction, Op, Program, Slot};
use crate::sequence::{Child, ChildList, NodeSequence};

/// Wrappers whose lone sequence wildcard child stands for the wrapper itself.
const SEQ_WRAPPERS: &[&str] = &[
    "field_declaration",
    "parameter_declaration",
    "type_elem",
    "literal_element",
];

/// Statements whose header fields may be absorbed by a sequence wildcard.
const HEADER_KINDS: &[&str] = &[
    "if_statement",
    "expression_switch_statement",
    "type_switch_statement",
];

/// Output of a successful compilation.
#[derive(Debug)]
pub(crate) struct Compiled {
    pub(crate) program: Program,
    pub(crate) vars: Vec<String>,
}

/// Compiles `pattern` under `config`.
pub(crate) fn compile(pattern: &str, config: &CompileConfig) -> Result<Compiled, PatternError> {
    let lexed = lex_pattern(pattern)?;
    let mut parser = Parser::new()?;
    let mut reported = None;

    for wrap in Wrap::ALL {
        if !wrap.applies(lexed.text()) {
            continue;
        }
        let source = wrap.wrap(lexed.text());
        let parsed = parser.parse(&source)?;
        if parsed.has_errors() {
            if wrap == Wrap::Statements {
                reported = parsed.errors().into_iter().next();
            }
            continue;
        }
        let Some(root) = wrap.extract(&parsed) else {
            continue;
        };
        debug!(form = wrap.name(), "pattern parsed");

        let mut lowerer = Lowerer {
            pattern,
            lexed: &lexed,
            source: &source,
            prefix_len: wrap.prefix().len(),
            config,
            out: Vec::new(),
        };
        lowerer.lower_root(root)?;
        return Ok(Compiled {
            program: Program::new(lowerer.out, config.strict),
            vars: lexed.vars(),
        });
    }

    Err(parse_error(
        pattern,
        &lexed,
        Wrap::Statements.prefix().len(),
        reported.as_ref(),
    ))
}

/// The syntactic forms a pattern may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wrap {
    Expression,
    Type,
    KeyedElement,
    Statements,
    Declarations,
    Case,
}

/// What a successful parse yields: one node, or a run of statements.
enum Root<'t> {
    Node(Node<'t>),
    Run(Vec<Child<'t>>),
}

impl Wrap {
    const ALL: [Self; 6] = [
        Self::Expression,
        Self::Type,
        Self::KeyedElement,
        Self::Statements,
        Self::Declarations,
        Self::Case,
    ];

    const fn name(self) -> &'static str {
        match self {
            Self::Expression => "expression",
            Self::Type => "type",
            Self::KeyedElement => "keyed element",
            Self::Statements => "statements",
            Self::Declarations => "declarations",
            Self::Case => "case clause",
        }
    }

    const fn prefix(self) -> &'static str {
        match self {
            Self::Expression => "package p\nvar _ = ",
            Self::Type => "package p\ntype _ ",
            Self::KeyedElement => "package p\nvar _ = T{",
            Self::Statements => "package p\nfunc _() {\n",
            Self::Declarations => "package p\n",
            Self::Case => "package p\nfunc _() {\nswitch {\n",
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            Self::Expression | Self::Type | Self::Declarations => "\n",
            Self::KeyedElement => "}\n",
            Self::Statements => "\n}\n",
            Self::Case => "\n}\n}\n",
        }
    }

    /// A trailing `;` asks for statement matching, so the expression form is
    /// skipped.
    fn applies(self, text: &str) -> bool {
        self != Self::Expression || !text.trim_end().ends_with(';')
    }

    fn wrap(self, text: &str) -> String {
        format!("{}{text}{}", self.prefix(), self.suffix())
    }

    /// Picks the pattern out of a clean parse of the wrapped text. The file
    /// must hold exactly the wrapper's declaration; recovery can otherwise
    /// leave a parse where the pattern was split across top-level siblings.
    fn extract(self, parsed: &ParseResult) -> Option<Root<'_>> {
        let file = parsed.root_node();
        match self {
            Self::Expression => {
                let value = blank_var_value(file)?;
                Some(Root::Node(single_or_list(value)))
            }
            Self::Type => {
                let spec = only_child(lone_declaration(file, "type_declaration")?, "type_spec")?;
                if !is_blank(spec.child_by_field_name("name")?, parsed.source())
                    || spec.child_by_field_name("type_parameters").is_some()
                {
                    return None;
                }
                spec.child_by_field_name("type").map(Root::Node)
            }
            Self::KeyedElement => {
                let literal = only_child(blank_var_value(file)?, "composite_literal")?;
                let body = literal.child_by_field_name("body")?;
                only_child(body, "keyed_element").map(Root::Node)
            }
            Self::Statements => {
                let body = ChildList::of(wrapper_body(file)?);
                statements_root(body.children().to_vec())
            }
            Self::Declarations => {
                let decls: Vec<Child<'_>> = ChildList::of(file)
                    .children()
                    .iter()
                    .filter(|child| child.node.kind() != "package_clause")
                    .copied()
                    .collect();
                if decls
                    .iter()
                    .any(|child| !DECLARATION_KINDS.contains(&child.node.kind()))
                {
                    return None;
                }
                statements_root(decls)
            }
            Self::Case => {
                let switch = only_child(wrapper_body(file)?, "expression_switch_statement")?;
                let clauses = ChildList::of(switch);
                match clauses.children() {
                    [only] if matches!(only.node.kind(), "expression_case" | "default_case") => {
                        Some(Root::Node(only.node))
                    }
                    _ => None,
                }
            }
        }
    }
}

/// Top-level kinds a declaration-list pattern may contain.
const DECLARATION_KINDS: &[&str] = &[
    "function_declaration",
    "method_declaration",
    "import_declaration",
    "const_declaration",
    "var_declaration",
    "type_declaration",
];

fn statements_root(children: Vec<Child<'_>>) -> Option<Root<'_>> {
    match children.len() {
        0 => None,
        1 => children.first().map(|only| Root::Node(only.node)),
        _ => Some(Root::Run(children)),
    }
}

/// A one-element expression list stands for its element.
fn single_or_list(list: Node<'_>) -> Node<'_> {
    let children = ChildList::of(list);
    match children.children() {
        [only] => only.node,
        _ => list,
    }
}

/// The single non-comment child of `node`, if it has exactly one and it is
/// of `kind`.
fn only_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    match ChildList::of(node).children() {
        [only] if only.node.kind() == kind => Some(only.node),
        _ => None,
    }
}

/// The declaration of `kind` following the package clause, when the file
/// holds nothing else.
fn lone_declaration<'t>(file: Node<'t>, kind: &str) -> Option<Node<'t>> {
    match ChildList::of(file).children() {
        [package, decl] if package.node.kind() == "package_clause" && decl.node.kind() == kind => {
            Some(decl.node)
        }
        _ => None,
    }
}

/// The value list of a file holding only `var _ = ...`.
fn blank_var_value(file: Node<'_>) -> Option<Node<'_>> {
    let spec = only_child(lone_declaration(file, "var_declaration")?, "var_spec")?;
    if spec.child_by_field_name("type").is_some() {
        return None;
    }
    match ChildList::of(spec).children() {
        [name, value] if name.field == Some("name") && value.field == Some("value") => {
            Some(value.node)
        }
        _ => None,
    }
}

/// The body of the lone `func _() { ... }` wrapper.
fn wrapper_body(file: Node<'_>) -> Option<Node<'_>> {
    lone_declaration(file, "function_declaration")?.child_by_field_name("body")
}

fn is_blank(node: Node<'_>, source: &str) -> bool {
    source.get(node.byte_range()) == Some("_")
}

fn parse_error(
    pattern: &str,
    lexed: &LexedPattern,
    prefix_len: usize,
    info: Option<&SyntaxErrorInfo>,
) -> PatternError {
    let wrapped = info.map_or(0, |i| i.byte_range.start.saturating_sub(prefix_len));
    let offset = lexed.original_offset(wrapped).min(pattern.len());
    let line_start = pattern
        .get(..offset)
        .and_then(|head| head.rfind('\n'))
        .map_or(0, |pos| pos.saturating_add(1));
    let column = u32::try_from(offset.saturating_sub(line_start).saturating_add(1))
        .unwrap_or(u32::MAX);
    PatternError::Parse {
        line: line_at_offset(pattern, offset),
        column,
        context: pattern
            .get(line_bounds(pattern, offset..offset))
            .unwrap_or_default()
            .to_owned(),
        message: info.map_or_else(|| "syntax error".to_owned(), |i| i.message.clone()),
    }
}

/// Classification of one child while lowering its parent.
enum Item<'a> {
    Seq(&'a WildcardToken, Slot),
    Node,
}

struct Lowerer<'a> {
    pattern: &'a str,
    lexed: &'a LexedPattern,
    source: &'a str,
    prefix_len: usize,
    config: &'a CompileConfig,
    out: Vec<Instruction>,
}

impl<'a> Lowerer<'a> {
    fn emit(&mut self, op: Op, field: Option<&'static str>) {
        self.out.push(Instruction { op, field });
    }

    fn text(&self, node: Node<'_>) -> &'a str {
        self.source
            .get(node.byte_range())
            .unwrap_or_default()
    }

    /// The pattern text a node was parsed from, with wildcards restored.
    fn construct(&self, node: Node<'_>) -> String {
        let start = self
            .lexed
            .original_offset(node.start_byte().saturating_sub(self.prefix_len));
        let end = self
            .lexed
            .original_offset(node.end_byte().saturating_sub(self.prefix_len));
        self.pattern.get(start..end).unwrap_or_default().to_owned()
    }

    fn wildcard(&self, node: Node<'_>) -> Option<&'a WildcardToken> {
        if !is_identifier(node.kind()) {
            return None;
        }
        let offset = node.start_byte().checked_sub(self.prefix_len)?;
        self.lexed.wildcard_at(offset)
    }

    /// A wildcard written where the grammar wants a wrapper node, such as a
    /// statement or a parameter, stands for the wrapper.
    fn wrapped_wildcard(&self, node: Node<'_>) -> Option<&'a WildcardToken> {
        let statement = node.kind() == "expression_statement";
        if !statement && !SEQ_WRAPPERS.contains(&node.kind()) {
            return None;
        }
        if !tokens_match(node, &[]) {
            return None;
        }
        let children = ChildList::of(node);
        let [only] = children.children() else {
            return None;
        };
        let token = self.wildcard(only.node)?;
        (statement || token.sequence).then_some(token)
    }

    fn placeholder(&self, node: Node<'_>) -> Option<&'a WildcardToken> {
        self.wildcard(node).or_else(|| self.wrapped_wildcard(node))
    }

    /// An expression list made only of sequence wildcards may be absent
    /// altogether, as in `return $*_`.
    fn is_optional_list(&self, node: Node<'_>) -> bool {
        if node.kind() != "expression_list" {
            return false;
        }
        let children = ChildList::of(node);
        !children.is_empty()
            && children.children().iter().all(|c| {
                self.wildcard(c.node).is_some_and(|token| token.sequence)
            })
    }

    fn lower_root(&mut self, root: Root<'_>) -> Result<(), PatternError> {
        match root {
            Root::Node(node) => match self.wildcard(node) {
                Some(token) if token.sequence => Err(PatternError::unsupported(
                    self.construct(node),
                    "a sequence wildcard cannot be the whole pattern",
                )),
                Some(token) => {
                    self.emit(Op::Wildcard { var: var_of(token) }, None);
                    Ok(())
                }
                None => self.lower(node, None, ""),
            },
            Root::Run(statements) => {
                self.emit(Op::Run, None);
                for statement in &statements {
                    match self.placeholder(statement.node) {
                        Some(token) if token.sequence => self.emit(
                            Op::SeqWildcard {
                                var: var_of(token),
                                slot: Slot::Any,
                            },
                            None,
                        ),
                        _ => self.lower(statement.node, None, "")?,
                    }
                }
                self.emit(Op::End, None);
                Ok(())
            }
        }
    }

    fn lower(
        &mut self,
        node: Node<'_>,
        field: Option<&'static str>,
        parent: &str,
    ) -> Result<(), PatternError> {
        if let Some(token) = self.placeholder(node) {
            if token.sequence {
                return Err(PatternError::unsupported(
                    self.construct(node),
                    "a sequence wildcard cannot stand for a single node",
                ));
            }
            self.emit(Op::Wildcard { var: var_of(token) }, field);
            return Ok(());
        }
        if let Some(path) = self.package_path(node, field, parent) {
            let alias = self.text(node).to_owned();
            self.emit(Op::Package { alias, path }, field);
            return Ok(());
        }
        if is_leaf(node) {
            let text = self.text(node).to_owned();
            self.emit(
                Op::Leaf {
                    kind: node.kind(),
                    text,
                },
                field,
            );
            return Ok(());
        }
        let optional = self.is_optional_list(node);
        self.lower_node(node, field, optional)
    }

    fn lower_node(
        &mut self,
        node: Node<'_>,
        field: Option<&'static str>,
        optional: bool,
    ) -> Result<(), PatternError> {
        let children = ChildList::of(node);
        let kind = node.kind();
        let has_initializer = children
            .children()
            .iter()
            .any(|c| c.field == Some("initializer"));

        let mut items = Vec::with_capacity(children.len());
        for child in children.children() {
            let item = match self.placeholder(child.node) {
                Some(token) if token.sequence => {
                    let slot = seq_slot(kind, child.field, has_initializer).ok_or_else(|| {
                        PatternError::unsupported(
                            self.construct(child.node),
                            format!(
                                "a sequence wildcard cannot fill the `{}` of a {kind}",
                                child.field.unwrap_or("child")
                            ),
                        )
                    })?;
                    Item::Seq(token, slot)
                }
                _ => Item::Node,
            };
            items.push(item);
        }

        let sequential = optional
            || items.iter().any(|item| matches!(item, Item::Seq(..)))
            || children
                .children()
                .iter()
                .any(|c| self.is_optional_list(c.node));
        let toks = tokens(node);
        if sequential {
            self.emit(
                Op::List {
                    kind,
                    tokens: toks,
                    optional,
                },
                field,
            );
        } else {
            self.emit(
                Op::Node {
                    kind,
                    tokens: toks,
                    arity: children.len(),
                },
                field,
            );
        }

        for (child, item) in children.children().iter().zip(items) {
            match item {
                Item::Seq(token, slot) => self.emit(
                    Op::SeqWildcard {
                        var: var_of(token),
                        slot,
                    },
                    child.field,
                ),
                Item::Node => self.lower(child.node, child.field, kind)?,
            }
        }
        if sequential {
            self.emit(Op::End, None);
        }
        Ok(())
    }

    /// Import path for a package qualifier in type-aware mode. Aliases not
    /// declared in the configuration stand for a package of the same name.
    fn package_path(
        &self,
        node: Node<'_>,
        field: Option<&'static str>,
        parent: &str,
    ) -> Option<String> {
        if !self.config.with_types {
            return None;
        }
        let qualifier = matches!(
            (parent, field),
            ("selector_expression", Some("operand")) | ("qualified_type", Some("package"))
        );
        if !qualifier || !is_identifier(node.kind()) {
            return None;
        }
        let alias = self.text(node);
        Some(
            self.config
                .imports
                .get(alias)
                .cloned()
                .unwrap_or_else(|| alias.to_owned()),
        )
    }
}

/// Fields a sequence wildcard may absorb in a `parent` node, or `None` when
/// the position only ever holds one node.
fn seq_slot(parent: &str, field: Option<&'static str>, has_initializer: bool) -> Option<Slot> {
    let header = HEADER_KINDS.contains(&parent);
    match field {
        None => Some(Slot::Any),
        Some("initializer") if header => Some(Slot::Fields(vec!["initializer"])),
        Some(f @ ("condition" | "value")) if header => {
            let fields = if has_initializer {
                vec![f]
            } else {
                vec!["initializer", f]
            };
            Some(Slot::Fields(fields))
        }
        Some(f @ ("name" | "type")) => Some(Slot::Fields(vec![f])),
        Some(_) => None,
    }
}

fn var_of(token: &WildcardToken) -> Option<Arc<str>> {
    token.name.as_deref().map(Arc::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dump(pattern: &str) -> String {
        compile(pattern, &CompileConfig::default())
            .expect("compile")
            .program
            .dump()
    }

    #[test]
    fn call_with_trailing_sequence() {
        let expected = "\
Node(call_expression)
  function: Leaf(identifier f)
  arguments: List(argument_list)
    SeqVar(xs)
    End
";
        assert_eq!(dump("f($*xs)"), expected);
    }

    #[test]
    fn binary_operator_is_a_token() {
        let expected = "\
Node(binary_expression) ==
  left: Var(x)
  right: Var(x)
";
        assert_eq!(dump("$x == $x"), expected);
    }

    #[test]
    fn trailing_semicolon_anchors_to_statements() {
        let expected = "\
Node(expression_statement)
  Node(call_expression)
    function: Leaf(identifier f)
    arguments: Node(argument_list)
";
        assert_eq!(dump("f();"), expected);
    }

    #[test]
    fn several_statements_become_a_run() {
        let program = compile("$x = 1; $*_", &CompileConfig::default())
            .expect("compile")
            .program;
        assert!(program.is_run());
        let last = program.instructions().iter().rev().nth(1).expect("seq");
        assert!(matches!(last.op, Op::SeqWildcard { var: None, .. }));
    }

    #[test]
    fn bare_return_values_are_optional() {
        let expected = "\
List(return_statement) return
  List(expression_list)?
    AnySeq
    End
  End
";
        assert_eq!(dump("return $*_"), expected);
    }

    #[test]
    fn if_header_sequence_may_absorb_initializer() {
        let program = dump("if $*_ { $*_ }");
        assert!(program.contains("condition: AnySeq [initializer|condition]"));
    }

    #[rstest]
    #[case("if $*_ {}", "List(if_statement) if\n")]
    #[case("if x {}", "Node(if_statement) if\n")]
    #[case("for $*_ { $*_ }", "List(for_statement) for\n")]
    #[case("switch $*x {}", "List(expression_switch_statement) switch\n")]
    #[case("defer $x()", "Node(defer_statement) defer\n")]
    #[case("go $x()", "Node(go_statement) go\n")]
    #[case("var $_ = $_", "Node(var_declaration) var\n")]
    #[case("const $_ = $_", "Node(const_declaration) const\n")]
    fn keyword_statements_compile_whole(#[case] pattern: &str, #[case] head: &str) {
        let program = dump(pattern);
        assert!(program.starts_with(head), "{pattern}:\n{program}");
    }

    #[rstest]
    #[case("a()\nb()", 2)]
    #[case("$x; $x", 2)]
    #[case("x := 1\nreturn x\n$*_", 3)]
    fn every_statement_is_kept(#[case] pattern: &str, #[case] expected: usize) {
        let program = compile(pattern, &CompileConfig::default())
            .expect("compile")
            .program;
        assert!(program.is_run(), "{}", program.dump());
        let dump = program.dump();
        let statements = dump
            .lines()
            .filter(|line| line.starts_with("  ") && !line.starts_with("   "))
            .filter(|line| line.trim() != "End")
            .count();
        assert_eq!(statements, expected, "{dump}");
    }

    #[test]
    fn switch_bodies_only_hold_case_clauses() {
        let err =
            compile("switch $*_ { $*_ }", &CompileConfig::default()).expect_err("parse error");
        assert!(matches!(err, PatternError::Parse { .. }), "{err}");
    }

    #[test]
    fn vars_are_reported_once_in_order() {
        let compiled = compile("$b($a, $b, $_)", &CompileConfig::default()).expect("compile");
        assert_eq!(compiled.vars, vec!["b".to_owned(), "a".to_owned()]);
    }

    #[test]
    fn package_qualifiers_resolve_when_typed() {
        let config = CompileConfig {
            with_types: true,
            ..CompileConfig::default()
        }
        .with_import("rand", "crypto/rand");
        let program = compile("rand.Read($_)", &config).expect("compile").program;
        assert!(program.dump().contains("operand: Package(rand \"crypto/rand\")"));

        let builtin = compile(
            "fmt.Println($*_)",
            &CompileConfig {
                with_types: true,
                ..CompileConfig::default()
            },
        )
        .expect("compile")
        .program;
        assert!(builtin.dump().contains("operand: Package(fmt \"fmt\")"));

        let untyped = dump("rand.Read($_)");
        assert!(untyped.contains("operand: Leaf(identifier rand)"));
    }

    #[rstest]
    #[case("$*_")]
    #[case("$*x + 1")]
    #[case("f($x)[$*_]")]
    fn sequence_in_single_position_is_unsupported(#[case] pattern: &str) {
        let err = compile(pattern, &CompileConfig::default()).expect_err("unsupported");
        assert!(matches!(err, PatternError::Unsupported { .. }), "{err}");
    }

    #[test]
    fn unparsable_pattern_reports_position() {
        let err = compile("f(", &CompileConfig::default()).expect_err("parse error");
        let PatternError::Parse { line, context, .. } = err else {
            panic!("expected parse error, got {err}");
        };
        assert_eq!(line, 1);
        assert_eq!(context, "f(");
    }
}
