//! Compiled filter expressions and their canonical rendering.

use std::fmt;

use crate::table::{OperationTable, VarPredicate};

/// A compiled filter.
///
/// File predicates never appear here; they are hoisted into
/// [`crate::Info`] and leave a [`Expr::Nop`] behind, which no-op reduction
/// then removes from conjunctions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Always true.
    Nop,
    /// A string operand of `==` or `!=`.
    String(String),
    /// Logical negation.
    Not(Box<Expr>),
    /// Logical conjunction.
    And(Box<Expr>, Box<Expr>),
    /// Logical disjunction.
    Or(Box<Expr>, Box<Expr>),
    /// Text equality.
    Eq(Box<Expr>, Box<Expr>),
    /// Text inequality.
    NotEq(Box<Expr>, Box<Expr>),
    /// `function.Name()`, answered by the caller per match.
    FunctionPredicate(String),
    /// `$var.Method()`.
    VarPredicate {
        /// The predicate the method resolved to.
        op: VarPredicate,
        /// The variable name; `$` for `$$`.
        var: String,
    },
}

impl Expr {
    /// Whether this is the always-true filter.
    #[must_use]
    pub const fn is_nop(&self) -> bool {
        matches!(self, Self::Nop)
    }

    /// Renders the expression in its canonical s-expression form, naming
    /// variable predicates as `table` does.
    #[must_use]
    pub const fn display<'a>(&'a self, table: &'a OperationTable) -> ExprDisplay<'a> {
        ExprDisplay { expr: self, table }
    }
}

/// Canonical rendering of an [`Expr`], from [`Expr::display`].
#[derive(Debug, Clone, Copy)]
pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    table: &'a OperationTable,
}

impl ExprDisplay<'_> {
    const fn nested<'b>(&'b self, expr: &'b Expr) -> ExprDisplay<'b> {
        ExprDisplay {
            expr,
            table: self.table,
        }
    }

    fn binary(&self, f: &mut fmt::Formatter<'_>, name: &str, lhs: &Expr, rhs: &Expr) -> fmt::Result {
        write!(f, "({name} {} {})", self.nested(lhs), self.nested(rhs))
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr {
            Expr::Nop => f.write_str("Nop"),
            Expr::String(value) => write!(f, "(String {value:?})"),
            Expr::Not(inner) => write!(f, "(Not {})", self.nested(inner)),
            Expr::And(lhs, rhs) => self.binary(f, "And", lhs, rhs),
            Expr::Or(lhs, rhs) => self.binary(f, "Or", lhs, rhs),
            Expr::Eq(lhs, rhs) => self.binary(f, "Eq", lhs, rhs),
            Expr::NotEq(lhs, rhs) => self.binary(f, "NotEq", lhs, rhs),
            Expr::FunctionPredicate(name) => write!(f, "(FunctionVarFunc {name:?})"),
            Expr::VarPredicate { op, var } => {
                let name = self
                    .table
                    .name_of(*op)
                    .unwrap_or_else(|| <&'static str>::from(*op));
                write!(f, "(%{name} {var:?})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_expressions() {
        let expr = Expr::And(
            Box::new(Expr::Not(Box::new(Expr::FunctionPredicate(
                "IsHot".to_owned(),
            )))),
            Box::new(Expr::Eq(
                Box::new(Expr::VarPredicate {
                    op: VarPredicate::Text,
                    var: "x".to_owned(),
                }),
                Box::new(Expr::String("a\"b".to_owned())),
            )),
        );
        assert_eq!(
            expr.display(&OperationTable::standard()).to_string(),
            r#"(And (Not (FunctionVarFunc "IsHot")) (Eq (%Text "x") (String "a\"b")))"#
        );
    }

    #[test]
    fn nop_renders_bare() {
        assert_eq!(
            Expr::Nop.display(&OperationTable::standard()).to_string(),
            "Nop"
        );
        assert!(Expr::Nop.is_nop());
    }
}
