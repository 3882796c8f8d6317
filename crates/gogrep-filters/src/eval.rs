//! Evaluating compiled filters against matches.

use gogrep_syntax::{Capture, ChildList, MatchData, MatchResult, is_identifier, is_literal};
use tree_sitter::Node;

use crate::expr::Expr;
use crate::table::VarPredicate;

/// What a filter can ask about the match it is judging.
pub trait MatchContext {
    /// Looks up a capture by variable name; `$` names the whole match.
    fn capture(&self, name: &str) -> Option<&Capture<'_>>;

    /// Returns the source text of a capture.
    fn text(&self, name: &str) -> Option<&str> {
        self.capture(name).map(Capture::text)
    }

    /// Answers `function.Name()` for the function enclosing the match.
    fn function_predicate(&self, _name: &str) -> bool {
        false
    }

    /// Whether a profile marks the captured code as hot.
    fn is_hot(&self, _capture: &Capture<'_>) -> bool {
        false
    }
}

impl MatchContext for MatchData<'_, '_> {
    fn capture(&self, name: &str) -> Option<&Capture<'_>> {
        Self::capture(self, name)
    }
}

impl MatchContext for MatchResult<'_> {
    fn capture(&self, name: &str) -> Option<&Capture<'_>> {
        Self::capture(self, name)
    }
}

impl Expr {
    /// Decides whether the match described by `ctx` passes the filter.
    ///
    /// # Panics
    ///
    /// Panics when a string operand appears in a condition position, which
    /// [`crate::parse`] never produces.
    pub fn evaluate<C: MatchContext + ?Sized>(&self, ctx: &C) -> bool {
        match self {
            Self::Nop => true,
            Self::Not(inner) => !inner.evaluate(ctx),
            Self::And(lhs, rhs) => lhs.evaluate(ctx) && rhs.evaluate(ctx),
            Self::Or(lhs, rhs) => lhs.evaluate(ctx) || rhs.evaluate(ctx),
            Self::Eq(lhs, rhs) => texts_equal(lhs, rhs, ctx),
            Self::NotEq(lhs, rhs) => !texts_equal(lhs, rhs, ctx),
            Self::FunctionPredicate(name) => ctx.function_predicate(name),
            Self::VarPredicate { op, var } => {
                ctx.capture(var).is_some_and(|capture| holds(*op, capture, ctx))
            }
            Self::String(value) => {
                panic!("string operand {value:?} evaluated as a condition")
            }
        }
    }

    fn text<'c, C: MatchContext + ?Sized>(&'c self, ctx: &'c C) -> Option<&'c str> {
        match self {
            Self::String(value) => Some(value),
            Self::VarPredicate {
                op: VarPredicate::Text,
                var,
            } => ctx.text(var),
            _ => None,
        }
    }
}

fn texts_equal<C: MatchContext + ?Sized>(lhs: &Expr, rhs: &Expr, ctx: &C) -> bool {
    matches!((lhs.text(ctx), rhs.text(ctx)), (Some(a), Some(b)) if a == b)
}

fn holds<C: MatchContext + ?Sized>(op: VarPredicate, capture: &Capture<'_>, ctx: &C) -> bool {
    if op == VarPredicate::IsHot {
        return ctx.is_hot(capture);
    }
    let Some(node) = capture.node() else {
        return false;
    };
    match op {
        VarPredicate::IsConst => is_const(node),
        VarPredicate::IsPure => is_pure(node, capture.source()),
        VarPredicate::IsStringLit => {
            matches!(node.kind(), "interpreted_string_literal" | "raw_string_literal")
        }
        VarPredicate::IsRuneLit => node.kind() == "rune_literal",
        VarPredicate::IsIntLit => node.kind() == "int_literal",
        VarPredicate::IsFloatLit => node.kind() == "float_literal",
        VarPredicate::IsComplexLit => node.kind() == "imaginary_literal",
        VarPredicate::IsHot | VarPredicate::Text => false,
    }
}

/// Literals and operators applied to literals.
fn is_const(node: Node<'_>) -> bool {
    match node.kind() {
        "unary_expression" => node.child_by_field_name("operand").is_some_and(is_const),
        "binary_expression" => {
            field_is(node, "left", is_const) && field_is(node, "right", is_const)
        }
        kind => is_literal(kind),
    }
}

fn field_is(node: Node<'_>, field: &str, check: impl Fn(Node<'_>) -> bool) -> bool {
    node.child_by_field_name(field).is_some_and(check)
}

/// Expressions known to have no side effects.
///
/// This is a whitelist: anything not listed, including every call but a
/// few builtins, is treated as impure.
fn is_pure(node: Node<'_>, source: &str) -> bool {
    let pure = |child: Node<'_>| is_pure(child, source);
    let optional = |field: &str| node.child_by_field_name(field).is_none_or(pure);
    match node.kind() {
        "true" | "false" | "nil" | "iota" => true,
        "unary_expression" => {
            node.child_by_field_name("operator")
                .is_some_and(|op| op.kind() != "<-")
                && optional("operand")
        }
        "binary_expression" => optional("left") && optional("right"),
        "selector_expression" | "type_assertion_expression" => optional("operand"),
        "index_expression" => optional("operand") && optional("index"),
        "slice_expression" => {
            optional("operand") && optional("start") && optional("end") && optional("capacity")
        }
        "parenthesized_expression" | "literal_element" | "literal_value" | "keyed_element" => {
            ChildList::of(node).children().iter().all(|c| pure(c.node))
        }
        "composite_literal" => optional("body"),
        "call_expression" => {
            let builtin = node.child_by_field_name("function").is_some_and(|f| {
                f.kind() == "identifier"
                    && matches!(
                        source.get(f.byte_range()),
                        Some("len" | "cap" | "real" | "imag")
                    )
            });
            builtin
                && node
                    .child_by_field_name("arguments")
                    .is_some_and(|args| ChildList::of(args).children().iter().all(|c| pure(c.node)))
        }
        kind => is_identifier(kind) || is_literal(kind),
    }
}
