//! Capture types and the reusable matcher state.
//!
//! Captures bind wildcard names to the code they matched. The state keeps
//! them on a stack so a failed branch can be unwound to a mark.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use tree_sitter::Node;

use crate::imports::ImportResolver;

/// What a wildcard captured.
#[derive(Debug, Clone)]
pub enum CaptureValue<'t> {
    /// A single node, from `$name`.
    Node(Node<'t>),
    /// A possibly empty run of sibling nodes, from `$*name`.
    ///
    /// A sequence wildcard that stood for an optional list the code left
    /// out, such as the results of a bare `return`, is still bound: it
    /// captures no nodes and an empty range at the spot the list would
    /// occupy. A later `$*name` must then also be empty.
    Sequence {
        /// The nodes in order.
        nodes: Vec<Node<'t>>,
        /// Byte range covered; empty runs sit at the gap they matched.
        range: Range<usize>,
    },
}

impl<'t> CaptureValue<'t> {
    /// Returns the captured nodes in order.
    #[must_use]
    pub fn nodes(&self) -> &[Node<'t>] {
        match self {
            Self::Node(node) => std::slice::from_ref(node),
            Self::Sequence { nodes, .. } => nodes,
        }
    }

    /// Returns the byte range of the capture.
    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        match self {
            Self::Node(node) => node.byte_range(),
            Self::Sequence { range, .. } => range.clone(),
        }
    }

    /// Whether the capture came from a sequence wildcard.
    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Self::Sequence { .. })
    }
}

/// A named binding produced by a match.
#[derive(Debug, Clone)]
pub struct Capture<'t> {
    name: Arc<str>,
    value: CaptureValue<'t>,
    source: &'t str,
}

impl<'t> Capture<'t> {
    pub(crate) const fn new(name: Arc<str>, value: CaptureValue<'t>, source: &'t str) -> Self {
        Self {
            name,
            value,
            source,
        }
    }

    /// Returns the wildcard name, without the `$`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the captured value.
    #[must_use]
    pub const fn value(&self) -> &CaptureValue<'t> {
        &self.value
    }

    /// Returns the single captured node, if this is not a sequence.
    #[must_use]
    pub const fn node(&self) -> Option<Node<'t>> {
        match self.value {
            CaptureValue::Node(node) => Some(node),
            CaptureValue::Sequence { .. } => None,
        }
    }

    /// Returns the byte range of the capture.
    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        self.value.byte_range()
    }

    /// Returns the captured source text.
    #[must_use]
    pub fn text(&self) -> &'t str {
        self.source.get(self.byte_range()).unwrap_or_default()
    }

    /// Returns the source the captured nodes belong to.
    #[must_use]
    pub const fn source(&self) -> &'t str {
        self.source
    }
}

/// Mutable scratch space for matching.
///
/// One state serves many matches in sequence; it must not be shared by two
/// matches running at once. Presets are bindings supplied before matching
/// that every match must agree with.
#[derive(Clone, Default)]
pub struct MatcherState<'t> {
    pub(super) captures: Vec<Capture<'t>>,
    presets: Vec<Capture<'t>>,
    pub(super) resolver: Option<Arc<dyn ImportResolver + Send + Sync>>,
}

impl fmt::Debug for MatcherState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherState")
            .field("captures", &self.captures)
            .field("presets", &self.presets)
            .field("typed", &self.resolver.is_some())
            .finish()
    }
}

impl<'t> MatcherState<'t> {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an import resolver, enabling package-aware matching for
    /// patterns compiled with types.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ImportResolver + Send + Sync>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Replaces the import resolver, typically once per searched file.
    pub fn set_resolver(&mut self, resolver: Option<Arc<dyn ImportResolver + Send + Sync>>) {
        self.resolver = resolver;
    }

    /// Binds `name` before matching; matches must capture equal code for it.
    pub fn preset(&mut self, name: &str, node: Node<'t>, source: &'t str) {
        self.presets.retain(|capture| capture.name() != name);
        self.presets
            .push(Capture::new(Arc::from(name), CaptureValue::Node(node), source));
    }

    /// Removes all preset bindings.
    pub fn clear_presets(&mut self) {
        self.presets.clear();
    }

    pub(super) fn reset(&mut self) {
        self.captures.clear();
    }

    pub(super) const fn mark(&self) -> usize {
        self.captures.len()
    }

    pub(super) fn rollback(&mut self, mark: usize) {
        self.captures.truncate(mark);
    }

    /// Finds an existing binding for `name`, captures before presets.
    pub(super) fn bound(&self, name: &str) -> Option<&Capture<'t>> {
        self.captures
            .iter()
            .rev()
            .chain(self.presets.iter())
            .find(|capture| capture.name() == name)
    }

    pub(super) fn push(&mut self, capture: Capture<'t>) {
        self.captures.push(capture);
    }
}
