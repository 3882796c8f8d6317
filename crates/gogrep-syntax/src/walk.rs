//! Pre-order traversal of syntax trees.

use tree_sitter::Node;

/// Visits every named, non-comment node under `root` in pre-order,
/// starting with `root` itself.
pub fn walk<'t, F>(root: Node<'t>, mut visit: F)
where
    F: FnMut(Node<'t>),
{
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_named() && !node.is_extra() {
            visit(node);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}
