//! Interpreter for compiled matching programs.
//!
//! Each instruction consumes one child, an optional child, or a contiguous
//! run of children. Sequence wildcards try every split length from zero
//! upwards and the first split that lets the rest of the list match wins.
//! Every branch that can fail after binding captures unwinds the capture
//! stack to the mark it took.

use std::sync::Arc;

use tree_sitter::Node;

use super::capture::{Capture, CaptureValue, MatcherState};
use super::equality::sequences_equal;
use crate::kinds::{is_any, is_empty_interface, is_identifier, is_leaf, tokens_match};
use crate::literal::leaves_equal;
use crate::program::{Instruction, Op, Program};
use crate::sequence::{Child, ChildList, NodeSequence, NodeSlice};

pub(super) struct Machine<'s, 'p, 't> {
    program: &'p Program,
    state: &'s mut MatcherState<'t>,
    source: &'t str,
    run_end: usize,
}

impl<'s, 'p, 't> Machine<'s, 'p, 't> {
    pub(super) const fn new(
        program: &'p Program,
        state: &'s mut MatcherState<'t>,
        source: &'t str,
    ) -> Self {
        Self {
            program,
            state,
            source,
            run_end: 0,
        }
    }

    pub(super) const fn state(&self) -> &MatcherState<'t> {
        self.state
    }

    pub(super) fn reset(&mut self) {
        self.state.reset();
    }

    /// Matches the whole program against `node`.
    pub(super) fn root(&mut self, node: Node<'t>) -> bool {
        let matched = self.node(0, node);
        if !matched {
            self.state.reset();
        }
        matched
    }

    /// Matches a statement-run program against a prefix of `items`,
    /// returning the index just past the last statement consumed.
    pub(super) fn run_from(&mut self, items: NodeSlice<'_, 't>) -> Option<usize> {
        let mark = self.state.mark();
        if self.list(1, items, true) {
            Some(self.run_end)
        } else {
            self.state.rollback(mark);
            None
        }
    }

    fn instruction(&self, pc: usize) -> &'p Instruction {
        let program = self.program;
        program
            .get(pc)
            .unwrap_or_else(|| panic!("matching program has no instruction at {pc}"))
    }

    fn text(&self, node: Node<'_>) -> &'t str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    fn node(&mut self, pc: usize, node: Node<'t>) -> bool {
        let instruction = self.instruction(pc);
        match &instruction.op {
            Op::Wildcard { var } => {
                node.kind() != "variadic_argument" && self.bind(var.as_ref(), CaptureValue::Node(node))
            }
            Op::Leaf { kind, text } => {
                (is_leaf(node)
                    && leaves_equal(
                        (*kind, text.as_str()),
                        (node.kind(), self.text(node)),
                        self.program.strict(),
                    ))
                    || (is_any(kind, text) && self.loose_empty_interface(node))
            }
            Op::Package { alias, path } => self.package(node, alias, path),
            Op::Node {
                kind,
                tokens,
                arity,
            } => {
                (node.kind() == *kind && tokens_match(node, tokens) && self.fixed(pc, node, *arity))
                    || (*kind == "interface_type" && *arity == 0 && self.loose_empty_interface(node))
            }
            Op::List { kind, tokens, .. } => {
                if node.kind() != *kind || !tokens_match(node, tokens) {
                    return false;
                }
                let children = ChildList::of(node);
                self.list(pc + 1, children.view(), false)
            }
            Op::SeqWildcard { .. } | Op::End | Op::Run => panic!(
                "internal invariant violated: {:?} at {pc} cannot match a single node",
                instruction.op
            ),
        }
    }

    fn child(&mut self, pc: usize, child: Child<'t>) -> bool {
        self.instruction(pc).field == child.field && self.node(pc, child.node)
    }

    fn fixed(&mut self, pc: usize, node: Node<'t>, arity: usize) -> bool {
        let children = ChildList::of(node);
        if children.len() != arity {
            return false;
        }
        let mut next = pc + 1;
        for child in children.children() {
            if !self.child(next, *child) {
                return false;
            }
            next = self.program.skip(next);
        }
        true
    }

    fn list(&mut self, pc: usize, items: NodeSlice<'_, 't>, prefix: bool) -> bool {
        let instruction = self.instruction(pc);
        match &instruction.op {
            Op::End if prefix => {
                self.run_end = items.offset();
                true
            }
            Op::End => items.is_empty(),
            Op::SeqWildcard { var, slot } => {
                let admissible = items
                    .children()
                    .iter()
                    .take_while(|child| slot.admits(child.field))
                    .count();
                for len in 0..=admissible {
                    let mark = self.state.mark();
                    let taken = items.slice(0, len);
                    let value = CaptureValue::Sequence {
                        nodes: taken.nodes().collect(),
                        range: taken.pos()..taken.end(),
                    };
                    if self.bind(var.as_ref(), value) && self.list(pc + 1, items.skip(len), prefix)
                    {
                        return true;
                    }
                    self.state.rollback(mark);
                }
                false
            }
            Op::List { optional: true, .. } => self.optional(pc, items, prefix),
            _ => {
                let Some(first) = items.child(0) else {
                    return false;
                };
                let mark = self.state.mark();
                if self.child(pc, first) && self.list(self.program.skip(pc), items.skip(1), prefix) {
                    return true;
                }
                self.state.rollback(mark);
                false
            }
        }
    }

    /// A list that may be absent: try it against the next child, then try
    /// skipping it with its named sequences bound to nothing.
    fn optional(&mut self, pc: usize, items: NodeSlice<'_, 't>, prefix: bool) -> bool {
        let next = self.program.skip(pc);
        let mark = self.state.mark();
        if let Some(first) = items.child(0) {
            if self.child(pc, first) && self.list(next, items.skip(1), prefix) {
                return true;
            }
            self.state.rollback(mark);
        }

        let gap = items.pos();
        let absent = self.program.seq_vars(pc).iter().all(|name| {
            self.bind(
                Some(name),
                CaptureValue::Sequence {
                    nodes: Vec::new(),
                    range: gap..gap,
                },
            )
        });
        if absent && self.list(next, items, prefix) {
            return true;
        }
        self.state.rollback(mark);
        false
    }

    /// `any` and `interface{}` stand for each other outside strict mode.
    fn loose_empty_interface(&self, node: Node<'t>) -> bool {
        !self.program.strict() && is_empty_interface(node, self.source)
    }

    fn package(&self, node: Node<'t>, alias: &str, path: &str) -> bool {
        if !is_identifier(node.kind()) {
            return false;
        }
        let resolved = self
            .state
            .resolver
            .as_deref()
            .and_then(|resolver| resolver.resolve(node, self.source));
        resolved.map_or_else(|| self.text(node) == alias, |found| found == path)
    }

    fn bind(&mut self, var: Option<&Arc<str>>, value: CaptureValue<'t>) -> bool {
        let Some(name) = var else {
            return true;
        };
        if let Some(existing) = self.state.bound(name) {
            return sequences_equal(
                existing.value().nodes(),
                existing.source(),
                value.nodes(),
                self.source,
                self.program.strict(),
            );
        }
        self.state
            .push(Capture::new(Arc::clone(name), value, self.source));
        true
    }
}
