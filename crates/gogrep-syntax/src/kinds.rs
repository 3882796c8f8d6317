//! Classification of Go grammar node kinds.
//!
//! The matcher compares nodes by kind, by their operator and keyword tokens,
//! and by their named children. The helpers here decide which kinds count as
//! identifiers or literals, which anonymous tokens are mere punctuation, and
//! which wrapper nodes are transparent.

/// Kinds that hold a name and compare by spelling regardless of which
/// identifier flavour the grammar assigned.
const IDENTIFIER_KINDS: &[&str] = &[
    "identifier",
    "type_identifier",
    "field_identifier",
    "package_identifier",
    "label_name",
];

/// Kinds of basic literals.
const LITERAL_KINDS: &[&str] = &[
    "int_literal",
    "float_literal",
    "imaginary_literal",
    "rune_literal",
    "interpreted_string_literal",
    "raw_string_literal",
];

/// Anonymous tokens that never distinguish two shapes of the same kind.
const PUNCTUATION: &[&str] = &[",", ";", "\n", "(", ")", "{", "}", "[", "]", ":", "."];

/// Nodes whose children are spliced into their parent's child list.
const TRANSPARENT_KINDS: &[&str] = &["statement_list"];

/// Nodes whose children form a statement sequence.
const STATEMENT_CONTAINERS: &[&str] = &[
    "block",
    "expression_case",
    "default_case",
    "type_case",
    "communication_case",
    "source_file",
];

/// Returns whether `kind` is one of the identifier flavours.
#[must_use]
pub fn is_identifier(kind: &str) -> bool {
    IDENTIFIER_KINDS.contains(&kind)
}

/// Returns whether `kind` is a basic literal.
#[must_use]
pub fn is_literal(kind: &str) -> bool {
    LITERAL_KINDS.contains(&kind)
}

/// Returns whether `kind` is a string literal of either quoting style.
#[must_use]
pub fn is_string_literal(kind: &str) -> bool {
    matches!(kind, "interpreted_string_literal" | "raw_string_literal")
}

/// Returns whether `kind` holds a statement sequence.
#[must_use]
pub fn is_statement_container(kind: &str) -> bool {
    STATEMENT_CONTAINERS.contains(&kind)
}

pub(crate) fn is_transparent(kind: &str) -> bool {
    TRANSPARENT_KINDS.contains(&kind)
}

pub(crate) fn is_punctuation(kind: &str) -> bool {
    PUNCTUATION.contains(&kind)
}

/// Returns whether a node is compared by its text rather than its children.
///
/// Literals are always leaves, even though the grammar gives strings inner
/// structure. Any other node is a leaf only when it has no children at all.
#[must_use]
pub fn is_leaf(node: tree_sitter::Node<'_>) -> bool {
    node.child_count() == 0 || is_literal(node.kind())
}

/// Returns whether a leaf spells the predeclared `any`.
pub(crate) fn is_any(kind: &str, text: &str) -> bool {
    is_identifier(kind) && text == "any"
}

/// Returns whether `node` denotes the empty interface, spelled either
/// `interface{}` or `any`.
pub(crate) fn is_empty_interface(node: tree_sitter::Node<'_>, source: &str) -> bool {
    if node.kind() == "interface_type" {
        let mut cursor = node.walk();
        let empty = node.named_children(&mut cursor).all(|child| child.is_extra());
        return empty;
    }
    is_any(node.kind(), source.get(node.byte_range()).unwrap_or_default())
}

/// Returns the class two leaves must share to be comparable.
///
/// All identifier flavours share one class and both string quoting styles
/// share another; every other kind is its own class.
#[must_use]
pub fn leaf_class(kind: &'static str) -> &'static str {
    if is_identifier(kind) {
        "identifier"
    } else if is_string_literal(kind) {
        "string"
    } else {
        kind
    }
}

/// Collects the operator and keyword tokens of `node`, skipping punctuation.
pub(crate) fn tokens(node: tree_sitter::Node<'_>) -> Vec<&'static str> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| !child.is_named() && !child.is_extra() && !is_punctuation(child.kind()))
        .map(|child| child.kind())
        .collect()
}

/// Checks the operator and keyword tokens of `node` against `expected`
/// without allocating.
pub(crate) fn tokens_match(node: tree_sitter::Node<'_>, expected: &[&'static str]) -> bool {
    let mut cursor = node.walk();
    let mut actual = node
        .children(&mut cursor)
        .filter(|child| !child.is_named() && !child.is_extra() && !is_punctuation(child.kind()))
        .map(|child| child.kind());
    let mut wanted = expected.iter();
    loop {
        match (actual.next(), wanted.next()) {
            (None, None) => return true,
            (Some(a), Some(w)) if a == *w => {}
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("identifier", "identifier")]
    #[case("field_identifier", "identifier")]
    #[case("raw_string_literal", "string")]
    #[case("interpreted_string_literal", "string")]
    #[case("int_literal", "int_literal")]
    fn leaf_class_groups_equivalent_kinds(#[case] kind: &'static str, #[case] class: &str) {
        assert_eq!(leaf_class(kind), class);
    }

    #[test]
    fn punctuation_excludes_operators() {
        assert!(is_punctuation(","));
        assert!(!is_punctuation("=="));
        assert!(!is_punctuation("<-"));
        assert!(!is_punctuation("..."));
    }
}
