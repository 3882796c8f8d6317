//! Shared position helpers.
//!
//! Tree-sitter positions are zero-based and the matcher works in byte
//! offsets. For user-facing output we prefer one-based line numbers and the
//! text of the whole source line around a match.

use std::ops::Range;

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}

/// Returns the one-based line number containing `offset`.
#[must_use]
pub fn line_at_offset(source: &str, offset: usize) -> u32 {
    let prefix = source.get(..offset).unwrap_or(source);
    let newlines = prefix.bytes().filter(|b| *b == b'\n').count();
    u32::try_from(newlines.saturating_add(1)).unwrap_or(u32::MAX)
}

/// Extends `range` outwards to the enclosing line boundaries.
///
/// The returned range starts after the previous `\n` or `\r` (or at the
/// beginning of the source) and ends before the next one (or at the end of
/// the source). Multi-line ranges therefore cover every line they touch.
#[must_use]
pub fn line_bounds(source: &str, range: Range<usize>) -> Range<usize> {
    let is_newline = |b: &u8| *b == b'\n' || *b == b'\r';
    let bytes = source.as_bytes();
    let start = bytes
        .get(..range.start)
        .and_then(|head| head.iter().rposition(is_newline))
        .map_or(0, |pos| pos.saturating_add(1));
    let end = bytes
        .get(range.end..)
        .and_then(|tail| tail.iter().position(is_newline))
        .map_or(source.len(), |pos| range.end.saturating_add(pos));
    start..end
}
