//! Parsing Go source with the Tree-sitter Go grammar.
//!
//! Searched files and wrapped pattern fragments both go through [`Parser`].
//! Tree-sitter recovers from bad input by inserting ERROR nodes and
//! zero-width MISSING tokens; a parse is only usable as a pattern or a search
//! target when it contains neither.

use std::ops::Range;

use tree_sitter::Node;

use crate::error::SyntaxError;
use crate::position::point_to_one_based;

/// Longest source excerpt kept in a [`SyntaxErrorInfo`].
const CONTEXT_CHARS: usize = 48;

/// Returns the Tree-sitter language for Go.
#[must_use]
pub fn go_language() -> tree_sitter::Language {
    tree_sitter_go::LANGUAGE.into()
}

/// A Go syntax tree together with the source it was parsed from.
#[derive(Debug)]
pub struct ParseResult {
    tree: tree_sitter::Tree,
    source: String,
}

impl ParseResult {
    /// Returns the syntax tree.
    #[must_use]
    pub const fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns the parsed source.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the `source_file` node.
    #[must_use]
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Whether recovery inserted any ERROR node or MISSING token.
    ///
    /// MISSING tokens do not always mark their ancestors with
    /// [`Node::has_error`], so the whole tree is scanned.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !scan_problems(self.root_node(), |_| false)
    }

    /// Lists the recovery nodes in source order. The contents of an ERROR
    /// node are not reported separately.
    #[must_use]
    pub fn errors(&self) -> Vec<SyntaxErrorInfo> {
        let mut errors = Vec::new();
        scan_problems(self.root_node(), |node| {
            errors.push(SyntaxErrorInfo::new(node, &self.source));
            true
        });
        errors
    }
}

/// One ERROR node or MISSING token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxErrorInfo {
    /// Bytes covered by the node; empty for a MISSING token.
    pub byte_range: Range<usize>,
    /// One-based line of the node start.
    pub line: u32,
    /// One-based column of the node start.
    pub column: u32,
    /// The offending text, shortened to a few dozen characters.
    pub context: String,
    /// What went wrong, such as ``missing `}` ``.
    pub message: String,
}

impl SyntaxErrorInfo {
    fn new(node: Node<'_>, source: &str) -> Self {
        let text = source.get(node.byte_range()).unwrap_or_default();
        let context = if text.chars().count() > CONTEXT_CHARS {
            let head: String = text.chars().take(CONTEXT_CHARS).collect();
            format!("{head}...")
        } else {
            text.to_owned()
        };
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else if text.is_empty() {
            "unexpected end of input".to_owned()
        } else {
            format!("unexpected `{}`", context.lines().next().unwrap_or_default())
        };
        let (line, column) = point_to_one_based(node.start_position());
        Self {
            byte_range: node.byte_range(),
            line,
            column,
            context,
            message,
        }
    }
}

/// Visits ERROR and MISSING nodes in pre-order, anonymous tokens included,
/// while `visit` returns `true`. ERROR nodes are not descended into.
/// Returns whether the scan reached the end of the tree.
fn scan_problems<'t, F>(root: Node<'t>, mut visit: F) -> bool
where
    F: FnMut(Node<'t>) -> bool,
{
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        let problem = node.is_error() || node.is_missing();
        if problem && !visit(node) {
            return false;
        }
        if !problem && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return true;
            }
        }
    }
}

/// A Tree-sitter parser for Go.
///
/// Not thread-safe; each search worker owns one.
pub struct Parser {
    inner: tree_sitter::Parser,
}

impl Parser {
    /// Creates a parser for Go.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::ParserInitError`] when the grammar ABI does not
    /// match the linked Tree-sitter runtime.
    pub fn new() -> Result<Self, SyntaxError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&go_language())
            .map_err(|e| SyntaxError::parser_init(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Parses `source`. Syntax errors are part of the result, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::ParseError`] when Tree-sitter yields no tree.
    pub fn parse(&mut self, source: &str) -> Result<ParseResult, SyntaxError> {
        let tree = self
            .inner
            .parse(source, None)
            .ok_or_else(|| SyntaxError::parse("parser returned no tree"))?;
        Ok(ParseResult {
            tree,
            source: source.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(source: &str) -> ParseResult {
        Parser::new()
            .expect("parser init")
            .parse(source)
            .expect("parse")
    }

    #[rstest]
    #[case("package p\n\nfunc main() {}\n")]
    #[case("package p\n\nvar x = []int{1, 2, 3}\n")]
    #[case("package p\n\ntype T struct{ a, b int }\n")]
    fn clean_sources_have_no_errors(#[case] source: &str) {
        let result = parse(source);
        assert!(!result.has_errors());
        assert!(result.errors().is_empty());
        assert_eq!(result.source(), source);
    }

    #[rstest]
    #[case("package p\n\nfunc broken( {\n")]
    #[case("package p\n\nvar = \n")]
    #[case("package p\ntype _ if x {}\n")]
    #[case("package p\nvar _ = var x = 1\n")]
    fn recovered_sources_report_errors(#[case] source: &str) {
        let result = parse(source);
        assert!(result.has_errors(), "{source:?}");
        assert!(!result.errors().is_empty(), "{source:?}");
    }

    #[test]
    fn zero_width_missing_tokens_are_errors() {
        let result = parse("package p\ntype _ if x {}\n");
        let missing = result
            .errors()
            .into_iter()
            .find(|error| error.byte_range.is_empty())
            .expect("missing token");
        assert!(missing.message.starts_with("missing"), "{missing:?}");
    }

    #[test]
    fn errors_carry_one_based_positions() {
        let result = parse("package p\n\nfunc f() {\n\tx := \n}\n");
        let first = result.errors().into_iter().next().expect("error");
        assert!(first.line >= 4, "{first:?}");
        assert!(first.column >= 1);
    }
}
