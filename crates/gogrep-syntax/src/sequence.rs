//! Uniform view over the ordered children of a syntax node.
//!
//! Argument lists, statement lists, field lists, parameter lists, spec lists
//! and every other ordered collection in the Go grammar are presented through
//! one interface so the matcher's backtracking is written once. Children are
//! the named, non-comment children of a node; transparent wrappers such as
//! `statement_list` are spliced into their parent. Every child remembers the
//! grammar field it occupies.

use tree_sitter::Node;

use crate::kinds::is_transparent;

/// A child node together with the grammar field it occupies in its parent.
#[derive(Debug, Clone, Copy)]
pub struct Child<'t> {
    /// The child node.
    pub node: Node<'t>,
    /// Field name, if the grammar assigns one.
    pub field: Option<&'static str>,
}

/// Read-only access to an ordered run of child nodes.
pub trait NodeSequence<'t> {
    /// Number of nodes in the sequence.
    fn len(&self) -> usize;

    /// Whether the sequence has no nodes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node at `index`, if in bounds.
    fn at(&self, index: usize) -> Option<Node<'t>>;

    /// Start byte of the sequence; the gap position when empty.
    fn pos(&self) -> usize;

    /// End byte of the sequence; the gap position when empty.
    fn end(&self) -> usize;

    /// Zero-copy view of `from..to`, clamped to the sequence bounds.
    fn slice(&self, from: usize, to: usize) -> NodeSlice<'_, 't>;
}

/// The children of one node, collected once.
#[derive(Debug, Clone)]
pub struct ChildList<'t> {
    parent: Node<'t>,
    children: Vec<Child<'t>>,
}

impl<'t> ChildList<'t> {
    /// Collects the children of `parent`.
    #[must_use]
    pub fn of(parent: Node<'t>) -> Self {
        let mut children = Vec::new();
        collect_children(parent, &mut children);
        Self { parent, children }
    }

    /// Collects the children of `parent` that occupy no grammar field.
    ///
    /// For statement containers these are the statements themselves, without
    /// a case clause's values or a type switch's types.
    #[must_use]
    pub fn unlabelled(parent: Node<'t>) -> Self {
        let mut list = Self::of(parent);
        list.children.retain(|child| child.field.is_none());
        list
    }

    /// Returns the node the children belong to.
    #[must_use]
    pub const fn parent(&self) -> Node<'t> {
        self.parent
    }

    /// Returns the children with their field names.
    #[must_use]
    pub fn children(&self) -> &[Child<'t>] {
        &self.children
    }

    /// Returns a view over all children.
    #[must_use]
    pub fn view(&self) -> NodeSlice<'_, 't> {
        NodeSlice {
            items: &self.children,
            offset: 0,
            anchor: self.parent.start_byte(),
        }
    }
}

impl<'t> NodeSequence<'t> for ChildList<'t> {
    fn len(&self) -> usize {
        self.children.len()
    }

    fn at(&self, index: usize) -> Option<Node<'t>> {
        self.children.get(index).map(|child| child.node)
    }

    fn pos(&self) -> usize {
        self.view().pos()
    }

    fn end(&self) -> usize {
        self.view().end()
    }

    fn slice(&self, from: usize, to: usize) -> NodeSlice<'_, 't> {
        self.view().sub(from, to)
    }
}

/// A borrowed sub-range of a [`ChildList`].
#[derive(Debug, Clone, Copy)]
pub struct NodeSlice<'a, 't> {
    items: &'a [Child<'t>],
    offset: usize,
    anchor: usize,
}

impl<'a, 't> NodeSlice<'a, 't> {
    /// Returns the child (with field) at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<Child<'t>> {
        self.items.get(index).copied()
    }

    /// Returns the children in this view.
    #[must_use]
    pub const fn children(&self) -> &'a [Child<'t>] {
        self.items
    }

    /// Index of the first element of this view within the full child list.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Iterates over the nodes in this view.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'t>> + 'a {
        self.items.iter().map(|child| child.node)
    }

    /// The view with its first `count` elements removed.
    #[must_use]
    pub fn skip(&self, count: usize) -> Self {
        self.sub(count, self.items.len())
    }

    fn sub(&self, from: usize, to: usize) -> Self {
        let end = to.min(self.items.len());
        let start = from.min(end);
        let anchor = match (self.items.get(start), start.checked_sub(1)) {
            (Some(next), _) => next.node.start_byte(),
            (None, Some(prev)) => self
                .items
                .get(prev)
                .map_or(self.anchor, |child| child.node.end_byte()),
            (None, None) => self.anchor,
        };
        Self {
            items: self.items.get(start..end).unwrap_or_default(),
            offset: self.offset + start,
            anchor,
        }
    }
}

impl<'t> NodeSequence<'t> for NodeSlice<'_, 't> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn at(&self, index: usize) -> Option<Node<'t>> {
        self.items.get(index).map(|child| child.node)
    }

    fn pos(&self) -> usize {
        self.items
            .first()
            .map_or(self.anchor, |child| child.node.start_byte())
    }

    fn end(&self) -> usize {
        self.items
            .last()
            .map_or(self.anchor, |child| child.node.end_byte())
    }

    fn slice(&self, from: usize, to: usize) -> NodeSlice<'_, 't> {
        self.sub(from, to)
    }
}

fn collect_children<'t>(parent: Node<'t>, out: &mut Vec<Child<'t>>) {
    let mut cursor = parent.walk();
    if !cursor.goto_first_child() {
        return;
    }
    loop {
        let node = cursor.node();
        if node.is_named() && !node.is_extra() {
            if is_transparent(node.kind()) {
                collect_children(node, out);
            } else {
                out.push(Child {
                    node,
                    field: cursor.field_name(),
                });
            }
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
}
