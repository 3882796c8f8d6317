//! Structural equality between captured subtrees.
//!
//! Two subtrees are equal when they have the same kind, the same operator and
//! keyword tokens, and pairwise equal children in the same fields. Leaves
//! compare under the literal equivalence rules, so `x == 0x1` binds equal
//! `$v` on both sides of `$v == 1`. Outside strict mode `any` and
//! `interface{}` are the same type.

use tree_sitter::Node;

use crate::kinds::{is_empty_interface, is_leaf, tokens};
use crate::literal::leaves_equal;
use crate::sequence::ChildList;

/// A node paired with the source it was parsed from.
#[derive(Debug, Clone, Copy)]
pub(super) struct Sourced<'t> {
    pub(super) node: Node<'t>,
    pub(super) source: &'t str,
}

impl<'t> Sourced<'t> {
    pub(super) const fn new(node: Node<'t>, source: &'t str) -> Self {
        Self { node, source }
    }

    fn text(self) -> &'t str {
        self.source.get(self.node.byte_range()).unwrap_or_default()
    }
}

/// Compares two runs of nodes element by element.
pub(super) fn sequences_equal(
    left: &[Node<'_>],
    left_source: &str,
    right: &[Node<'_>],
    right_source: &str,
    strict: bool,
) -> bool {
    left.len() == right.len()
        && left.iter().zip(right).all(|(a, b)| {
            nodes_equal(
                Sourced::new(*a, left_source),
                Sourced::new(*b, right_source),
                strict,
            )
        })
}

/// Compares two subtrees structurally.
pub(super) fn nodes_equal(a: Sourced<'_>, b: Sourced<'_>, strict: bool) -> bool {
    if !strict && is_empty_interface(a.node, a.source) && is_empty_interface(b.node, b.source) {
        return true;
    }
    match (is_leaf(a.node), is_leaf(b.node)) {
        (true, true) => {
            return leaves_equal((a.node.kind(), a.text()), (b.node.kind(), b.text()), strict);
        }
        (false, false) => {}
        _ => return false,
    }
    if a.node.kind() != b.node.kind() || tokens(a.node) != tokens(b.node) {
        return false;
    }

    let left = ChildList::of(a.node);
    let right = ChildList::of(b.node);
    left.children().len() == right.children().len()
        && left
            .children()
            .iter()
            .zip(right.children())
            .all(|(x, y)| {
                x.field == y.field
                    && nodes_equal(
                        Sourced::new(x.node, a.source),
                        Sourced::new(y.node, b.source),
                        strict,
                    )
            })
}
