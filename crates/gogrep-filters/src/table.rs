//! The table of predicates callable on pattern variables.

use std::collections::BTreeMap;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// A predicate evaluated against one captured variable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString,
    IntoStaticStr,
)]
pub enum VarPredicate {
    /// The capture is a constant expression built from literals.
    IsConst,
    /// The capture is an expression without side effects.
    IsPure,
    /// The capture is a string literal.
    IsStringLit,
    /// The capture is a rune literal.
    IsRuneLit,
    /// The capture is an integer literal.
    IsIntLit,
    /// The capture is a floating-point literal.
    IsFloatLit,
    /// The capture is an imaginary literal.
    IsComplexLit,
    /// The caller's profile marks the captured code as hot.
    IsHot,
    /// The captured source text, for comparison with a string.
    Text,
}

impl VarPredicate {
    /// Whether the predicate produces text rather than a truth value.
    #[must_use]
    pub const fn yields_text(self) -> bool {
        matches!(self, Self::Text)
    }
}

/// Maps method names in filter text to predicates.
///
/// The table is built once by the caller and shared read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationTable {
    by_name: BTreeMap<String, VarPredicate>,
}

impl OperationTable {
    /// Builds a table from `(method name, predicate)` pairs.
    #[must_use]
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, VarPredicate)>,
        S: Into<String>,
    {
        Self {
            by_name: entries
                .into_iter()
                .map(|(name, op)| (name.into(), op))
                .collect(),
        }
    }

    /// The table with every predicate under its own name.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(VarPredicate::iter().map(|op| (<&'static str>::from(op), op)))
    }

    /// Looks up a method name.
    #[must_use]
    pub fn lookup(&self, method: &str) -> Option<VarPredicate> {
        self.by_name.get(method).copied()
    }

    /// Returns the method name `op` is registered under, preferring the
    /// alphabetically first when there are several.
    #[must_use]
    pub fn name_of(&self, op: VarPredicate) -> Option<&str> {
        self.by_name
            .iter()
            .find(|(_, registered)| **registered == op)
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn standard_table_knows_every_predicate() {
        let table = OperationTable::standard();
        for op in VarPredicate::iter() {
            assert_eq!(table.name_of(op), Some(op.to_string().as_str()));
            assert_eq!(VarPredicate::from_str(&op.to_string()), Ok(op));
        }
        assert_eq!(table.lookup("IsPure"), Some(VarPredicate::IsPure));
        assert_eq!(table.lookup("isPure"), None);
    }

    #[test]
    fn custom_tables_rename_predicates() {
        let table = OperationTable::new([("Pure", VarPredicate::IsPure)]);
        assert_eq!(table.lookup("Pure"), Some(VarPredicate::IsPure));
        assert_eq!(table.lookup("IsPure"), None);
        assert_eq!(table.name_of(VarPredicate::IsPure), Some("Pure"));
        assert_eq!(table.name_of(VarPredicate::Text), None);
    }
}
