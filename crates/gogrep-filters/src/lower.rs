//! Lowering parsed filters into [`Expr`] trees.
//!
//! Lowering resolves method names through the operation table, checks that
//! strings and conditions are used where they belong, hoists file
//! predicates into [`Info`] and finally strips the no-ops that hoisting
//! leaves behind.

use std::collections::HashSet;

use tracing::debug;

use crate::error::FilterError;
use crate::expr::Expr;
use crate::info::{Info, SpecialPredicate};
use crate::parser::{Receiver, Syntax, parse_syntax};
use crate::table::{OperationTable, VarPredicate};

/// Compiles filter text into an expression and its [`Info`].
///
/// Empty or blank text compiles to [`Expr::Nop`].
///
/// # Errors
///
/// Returns a [`FilterError`] when the text is malformed, calls an unknown
/// predicate, mixes strings and conditions, or puts a file predicate inside
/// `||`.
pub fn parse(table: &OperationTable, text: &str) -> Result<(Expr, Info), FilterError> {
    if text.trim().is_empty() {
        return Ok((Expr::Nop, Info::default()));
    }
    let syntax = parse_syntax(text)?;
    let mut lowerer = Lowerer {
        table,
        info: Info::default(),
        seen_functions: HashSet::new(),
        inside_or: false,
        inside_not: false,
    };
    let lowered = lowerer.condition(&syntax)?;
    let expr = remove_nops(lowered);
    debug!(filter = text, info = %lowerer.info, "filter compiled");
    Ok((expr, lowerer.info))
}

struct Lowerer<'a> {
    table: &'a OperationTable,
    info: Info,
    seen_functions: HashSet<SpecialPredicate>,
    inside_or: bool,
    inside_not: bool,
}

impl Lowerer<'_> {
    /// Lowers `syntax` in a position that needs a truth value.
    fn condition(&mut self, syntax: &Syntax) -> Result<Expr, FilterError> {
        match syntax {
            Syntax::Not(inner) => {
                let outer = self.inside_not;
                self.inside_not = !outer;
                let lowered = self.condition(inner);
                self.inside_not = outer;
                Ok(Expr::Not(Box::new(lowered?)))
            }
            Syntax::And(lhs, rhs) => {
                let left = self.condition(lhs)?;
                let right = self.condition(rhs)?;
                Ok(Expr::And(Box::new(left), Box::new(right)))
            }
            Syntax::Or(lhs, rhs) => {
                let outer = self.inside_or;
                self.inside_or = true;
                let lowered = self.disjunction(lhs, rhs);
                self.inside_or = outer;
                lowered
            }
            Syntax::Eq(lhs, rhs) | Syntax::NotEq(lhs, rhs) => {
                let (left, right) = self.comparison(lhs, rhs)?;
                Ok(if matches!(syntax, Syntax::Eq(..)) {
                    Expr::Eq(Box::new(left), Box::new(right))
                } else {
                    Expr::NotEq(Box::new(left), Box::new(right))
                })
            }
            Syntax::Str { offset, .. } => Err(FilterError::type_mismatch(
                *offset,
                "a string cannot be used as a condition",
            )),
            Syntax::Call {
                receiver,
                method,
                offset,
            } => self.call(receiver, method, *offset),
        }
    }

    fn disjunction(&mut self, lhs: &Syntax, rhs: &Syntax) -> Result<Expr, FilterError> {
        let left = self.condition(lhs)?;
        let right = self.condition(rhs)?;
        Ok(Expr::Or(Box::new(left), Box::new(right)))
    }

    fn call(
        &mut self,
        receiver: &Receiver,
        method: &str,
        offset: usize,
    ) -> Result<Expr, FilterError> {
        match receiver {
            Receiver::File => self.file_predicate(method),
            Receiver::Function => Ok(self.function_predicate(method)),
            Receiver::Var(var) => {
                let op = self.var_predicate(var, method)?;
                if op.yields_text() {
                    return Err(FilterError::type_mismatch(
                        offset,
                        format!("`${var}.{method}()` is text, compare it with a string"),
                    ));
                }
                Ok(Expr::VarPredicate {
                    op,
                    var: var.clone(),
                })
            }
        }
    }

    fn file_predicate(&mut self, method: &str) -> Result<Expr, FilterError> {
        if self.inside_or {
            return Err(FilterError::FileInDisjunction {
                name: method.to_owned(),
            });
        }
        self.info.file_predicates.push(SpecialPredicate {
            name: method.to_owned(),
            negated: self.inside_not,
        });
        Ok(Expr::Nop)
    }

    fn function_predicate(&mut self, method: &str) -> Expr {
        if !self.inside_or {
            let predicate = SpecialPredicate {
                name: method.to_owned(),
                negated: self.inside_not,
            };
            if self.seen_functions.insert(predicate.clone()) {
                self.info.function_predicates.push(predicate);
            }
        }
        Expr::FunctionPredicate(method.to_owned())
    }

    fn var_predicate(&mut self, var: &str, method: &str) -> Result<VarPredicate, FilterError> {
        if !self.info.vars.iter().any(|seen| seen == var) {
            self.info.vars.push(var.to_owned());
        }
        self.table
            .lookup(method)
            .ok_or_else(|| FilterError::UnknownPredicate {
                receiver: format!("${var}"),
                method: method.to_owned(),
            })
    }

    /// Lowers the operands of `==` or `!=`, moving a string literal on the
    /// left to the right.
    fn comparison(&mut self, lhs: &Syntax, rhs: &Syntax) -> Result<(Expr, Expr), FilterError> {
        let (left, right) = match (lhs, rhs) {
            (Syntax::Str { .. }, other) if !matches!(other, Syntax::Str { .. }) => (rhs, lhs),
            _ => (lhs, rhs),
        };
        Ok((self.value(left)?, self.value(right)?))
    }

    /// Lowers `syntax` in a position that needs text.
    fn value(&mut self, syntax: &Syntax) -> Result<Expr, FilterError> {
        match syntax {
            Syntax::Str { value, .. } => Ok(Expr::String(value.clone())),
            Syntax::Call {
                receiver: Receiver::Var(var),
                method,
                offset,
            } => {
                let op = self.var_predicate(var, method)?;
                if !op.yields_text() {
                    return Err(FilterError::type_mismatch(
                        *offset,
                        format!("`${var}.{method}()` is a condition, not text"),
                    ));
                }
                Ok(Expr::VarPredicate {
                    op,
                    var: var.clone(),
                })
            }
            other => Err(FilterError::type_mismatch(
                other.offset(),
                "only strings and text predicates can be compared",
            )),
        }
    }
}

/// Folds away the no-ops left by hoisted file predicates.
fn remove_nops(expr: Expr) -> Expr {
    match expr {
        Expr::And(lhs, rhs) => match (remove_nops(*lhs), remove_nops(*rhs)) {
            (Expr::Nop, kept) | (kept, Expr::Nop) => kept,
            (left, right) => Expr::And(Box::new(left), Box::new(right)),
        },
        Expr::Not(inner) => match remove_nops(*inner) {
            Expr::Nop => Expr::Nop,
            kept => Expr::Not(Box::new(kept)),
        },
        Expr::Or(lhs, rhs) => Expr::Or(Box::new(remove_nops(*lhs)), Box::new(remove_nops(*rhs))),
        Expr::Eq(lhs, rhs) => Expr::Eq(Box::new(remove_nops(*lhs)), Box::new(remove_nops(*rhs))),
        Expr::NotEq(lhs, rhs) => {
            Expr::NotEq(Box::new(remove_nops(*lhs)), Box::new(remove_nops(*rhs)))
        }
        leaf => leaf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conjunction_with_nop_collapses() {
        let expr = remove_nops(Expr::And(
            Box::new(Expr::Nop),
            Box::new(Expr::Not(Box::new(Expr::Nop))),
        ));
        assert_eq!(expr, Expr::Nop);
    }

    #[test]
    fn disjunctions_keep_their_branches() {
        let var = || Expr::VarPredicate {
            op: VarPredicate::IsPure,
            var: "x".to_owned(),
        };
        let expr = remove_nops(Expr::Or(Box::new(var()), Box::new(var())));
        assert_eq!(expr, Expr::Or(Box::new(var()), Box::new(var())));
    }
}
