//! Matching engine for compiled patterns.
//!
//! [`Pattern::match_node`] tests one node and never walks the tree; callers
//! drive it from a traversal they own, such as [`crate::walk`].
//! [`Pattern::find_all`] is the convenience driver that walks a whole parse
//! result in pre-order.

mod capture;
mod equality;
mod machine;

use std::ops::Range;
use std::sync::Arc;

use tree_sitter::Node;

use crate::kinds::is_statement_container;
use crate::lexer::ROOT_VAR;
use crate::parser::ParseResult;
use crate::pattern::Pattern;
use crate::position::point_to_one_based;
use crate::sequence::{ChildList, NodeSequence};
use crate::walk::walk;

pub use capture::{Capture, CaptureValue, MatcherState};
use machine::Machine;

/// One successful match, valid for the duration of the callback.
#[derive(Debug)]
pub struct MatchData<'m, 't> {
    root: Node<'t>,
    whole: Capture<'t>,
    state: &'m MatcherState<'t>,
}

impl<'t> MatchData<'_, 't> {
    /// Returns the matched node; for statement runs, the first statement.
    #[must_use]
    pub const fn node(&self) -> Node<'t> {
        self.root
    }

    /// Returns the byte range of the match.
    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        self.whole.byte_range()
    }

    /// Returns the matched source text.
    #[must_use]
    pub fn text(&self) -> &'t str {
        self.whole.text()
    }

    /// Returns the source the match belongs to.
    #[must_use]
    pub const fn source(&self) -> &'t str {
        self.whole.source()
    }

    /// Looks up a capture by name; `$` names the whole match.
    #[must_use]
    pub fn capture(&self, name: &str) -> Option<&Capture<'t>> {
        if name == ROOT_VAR {
            return Some(&self.whole);
        }
        self.state.bound(name)
    }

    /// Returns the captures made by this match, in binding order.
    #[must_use]
    pub fn captures(&self) -> &[Capture<'t>] {
        &self.state.captures
    }

    /// Copies the match out of the callback.
    #[must_use]
    pub fn to_result(&self) -> MatchResult<'t> {
        MatchResult {
            root: self.root,
            whole: self.whole.clone(),
            captures: self.state.captures.clone(),
        }
    }
}

/// An owned match, as collected by [`Pattern::find_all`].
#[derive(Debug, Clone)]
pub struct MatchResult<'t> {
    root: Node<'t>,
    whole: Capture<'t>,
    captures: Vec<Capture<'t>>,
}

impl<'t> MatchResult<'t> {
    /// Returns the matched node; for statement runs, the first statement.
    #[must_use]
    pub const fn node(&self) -> Node<'t> {
        self.root
    }

    /// Returns the byte range of the match.
    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        self.whole.byte_range()
    }

    /// Returns the matched source text.
    #[must_use]
    pub fn text(&self) -> &'t str {
        self.whole.text()
    }

    /// Returns the one-based (line, column) where the match starts.
    #[must_use]
    pub fn start_position(&self) -> (u32, u32) {
        point_to_one_based(self.root.start_position())
    }

    /// Looks up a capture by name; `$` names the whole match.
    #[must_use]
    pub fn capture(&self, name: &str) -> Option<&Capture<'t>> {
        if name == ROOT_VAR {
            return Some(&self.whole);
        }
        self.captures.iter().rev().find(|c| c.name() == name)
    }

    /// Returns all captures in binding order.
    #[must_use]
    pub fn captures(&self) -> &[Capture<'t>] {
        &self.captures
    }
}

impl Pattern {
    /// Tests the pattern against `node` and calls `on_match` for each match.
    ///
    /// Single-node patterns match at most once. Statement-run patterns match
    /// only at statement containers and report one match per start position
    /// where a run of statements fits.
    ///
    /// # Panics
    ///
    /// Panics if the compiled program is malformed, which indicates a bug in
    /// the compiler rather than a property of the input.
    pub fn match_node<'t, F>(
        &self,
        state: &mut MatcherState<'t>,
        node: Node<'t>,
        source: &'t str,
        mut on_match: F,
    ) where
        F: FnMut(&MatchData<'_, 't>),
    {
        state.reset();
        let mut machine = Machine::new(self.program(), state, source);
        if !self.is_run() {
            if machine.root(node) {
                let data = MatchData {
                    root: node,
                    whole: whole_node(node, source),
                    state: machine.state(),
                };
                on_match(&data);
            }
            return;
        }

        if !is_statement_container(node.kind()) {
            return;
        }
        let statements = ChildList::unlabelled(node);
        let all = statements.view();
        for start in 0..all.len() {
            let Some(end) = machine.run_from(all.skip(start)) else {
                continue;
            };
            if let Some(first) = all.at(start).filter(|_| end > start) {
                let run = all.slice(start, end);
                let data = MatchData {
                    root: first,
                    whole: Capture::new(
                        Arc::from(ROOT_VAR),
                        CaptureValue::Sequence {
                            nodes: run.nodes().collect(),
                            range: run.pos()..run.end(),
                        },
                        source,
                    ),
                    state: machine.state(),
                };
                on_match(&data);
            }
            machine.reset();
        }
    }

    /// Finds every match in a parse result, in pre-order.
    #[must_use]
    pub fn find_all<'t>(&self, parsed: &'t ParseResult) -> Vec<MatchResult<'t>> {
        let mut state = MatcherState::new();
        self.find_all_with(&mut state, parsed)
    }

    /// Like [`Self::find_all`], reusing a caller-supplied state so presets
    /// and an import resolver apply.
    #[must_use]
    pub fn find_all_with<'t>(
        &self,
        state: &mut MatcherState<'t>,
        parsed: &'t ParseResult,
    ) -> Vec<MatchResult<'t>> {
        let mut results = Vec::new();
        walk(parsed.root_node(), |node| {
            self.match_node(state, node, parsed.source(), |m| {
                results.push(m.to_result());
            });
        });
        results
    }
}

fn whole_node<'t>(node: Node<'t>, source: &'t str) -> Capture<'t> {
    Capture::new(Arc::from(ROOT_VAR), CaptureValue::Node(node), source)
}
