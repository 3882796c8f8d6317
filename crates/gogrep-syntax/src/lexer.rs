//! Wildcard lexer for pattern text.
//!
//! Patterns are Go fragments with `$_`, `$name`, `$*_` and `$*name` tokens.
//! The lexer finds those tokens, replaces each with a plain Go identifier so
//! the fragment can be parsed by the Go grammar, and records where each
//! placeholder landed. Placeholders are looked up by byte offset, never by
//! spelling, so the compiler does not need to recover names from identifiers.
//!
//! `$` characters inside string, rune and raw-string literals and inside
//! comments are copied through untouched.

use crate::error::PatternError;

/// Name reserved for the whole-match sentinel `$$`.
pub const ROOT_VAR: &str = "$";

/// A wildcard token found in pattern text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardToken {
    /// Variable name, or `None` for the anonymous `_` forms.
    pub name: Option<String>,
    /// Whether the token is a sequence wildcard (`$*`).
    pub sequence: bool,
    /// Byte offset of the `$` in the original pattern text.
    pub offset: usize,
}

/// Pattern text with wildcards replaced by identifiers.
#[derive(Debug, Clone)]
pub(crate) struct LexedPattern {
    text: String,
    placeholders: Vec<Placeholder>,
}

#[derive(Debug, Clone)]
struct Placeholder {
    start: usize,
    len: usize,
    token: WildcardToken,
}

impl LexedPattern {
    /// Returns the parse-ready text.
    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    /// Returns the wildcard whose placeholder starts at `offset` in
    /// [`Self::text`].
    pub(crate) fn wildcard_at(&self, offset: usize) -> Option<&WildcardToken> {
        self.placeholders
            .binary_search_by_key(&offset, |p| p.start)
            .ok()
            .and_then(|idx| self.placeholders.get(idx))
            .map(|p| &p.token)
    }

    /// Returns the distinct variable names in order of first appearance.
    pub(crate) fn vars(&self) -> Vec<String> {
        let mut vars: Vec<String> = Vec::new();
        for name in self.placeholders.iter().filter_map(|p| p.token.name.as_ref()) {
            if !vars.contains(name) {
                vars.push(name.clone());
            }
        }
        vars
    }

    /// Maps an offset in [`Self::text`] back to the original pattern text.
    pub(crate) fn original_offset(&self, offset: usize) -> usize {
        let mut original = offset;
        for placeholder in self.placeholders.iter().take_while(|p| p.start < offset) {
            original = original
                .saturating_sub(placeholder.len)
                .saturating_add(token_len(&placeholder.token));
        }
        original
    }
}

fn token_len(token: &WildcardToken) -> usize {
    let name_len = token.name.as_ref().map_or(1, String::len);
    1 + usize::from(token.sequence) + name_len
}

fn placeholder_for(index: usize) -> String {
    format!("gogrep_wildcard_{index}")
}

/// Scans `pattern` and replaces wildcard tokens with placeholder identifiers.
pub(crate) fn lex_pattern(pattern: &str) -> Result<LexedPattern, PatternError> {
    let mut lexer = Lexer {
        src: pattern,
        pos: 0,
        out: String::with_capacity(pattern.len() + 16),
        placeholders: Vec::new(),
    };
    lexer.run()?;
    Ok(LexedPattern {
        text: lexer.out,
        placeholders: lexer.placeholders,
    })
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    out: String,
    placeholders: Vec<Placeholder>,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) -> Result<(), PatternError> {
        while let Some(ch) = self.peek() {
            match ch {
                '"' => self.copy_quoted('"'),
                '\'' => self.copy_quoted('\''),
                '`' => self.copy_raw(),
                '/' if self.rest().starts_with("//") => self.copy_line_comment(),
                '/' if self.rest().starts_with("/*") => self.copy_block_comment(),
                '$' => self.wildcard()?,
                _ => self.copy_char(),
            }
        }
        Ok(())
    }

    fn rest(&self) -> &'a str {
        self.src.get(self.pos..).unwrap_or_default()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn copy_char(&mut self) {
        if let Some(ch) = self.peek() {
            self.out.push(ch);
            self.pos += ch.len_utf8();
        }
    }

    fn copy_until(&mut self, len: usize) {
        let end = (self.pos + len).min(self.src.len());
        self.out.push_str(self.src.get(self.pos..end).unwrap_or_default());
        self.pos = end;
    }

    fn copy_quoted(&mut self, quote: char) {
        let rest = self.rest();
        let mut escaped = false;
        let mut len = rest.len();
        for (idx, ch) in rest.char_indices().skip(1) {
            if escaped {
                escaped = false;
                continue;
            }
            if ch == '\\' {
                escaped = true;
            } else if ch == quote || ch == '\n' {
                len = idx + ch.len_utf8();
                break;
            }
        }
        self.copy_until(len);
    }

    fn copy_raw(&mut self) {
        let rest = self.rest();
        let len = rest
            .get(1..)
            .and_then(|body| body.find('`'))
            .map_or(rest.len(), |idx| idx + 2);
        self.copy_until(len);
    }

    fn copy_line_comment(&mut self) {
        let rest = self.rest();
        let len = rest.find('\n').unwrap_or(rest.len());
        self.copy_until(len);
    }

    fn copy_block_comment(&mut self) {
        let rest = self.rest();
        let len = rest
            .get(2..)
            .and_then(|body| body.find("*/"))
            .map_or(rest.len(), |idx| idx + 4);
        self.copy_until(len);
    }

    fn wildcard(&mut self) -> Result<(), PatternError> {
        let offset = self.pos;
        let mut cursor = offset + 1;
        let after = self.src.get(cursor..).unwrap_or_default();
        if after.starts_with('$') {
            return Err(PatternError::wildcard(
                offset,
                "the whole-match variable `$$` can only be used in filters",
            ));
        }

        let sequence = after.starts_with('*');
        if sequence {
            cursor += 1;
        }

        let name_src = self.src.get(cursor..).unwrap_or_default();
        let name_len = identifier_len(name_src);
        if name_len == 0 {
            return Err(PatternError::wildcard(
                offset,
                "expected `_` or an identifier after `$`",
            ));
        }
        let name = name_src.get(..name_len).unwrap_or_default();

        let placeholder = placeholder_for(self.placeholders.len());
        self.placeholders.push(Placeholder {
            start: self.out.len(),
            len: placeholder.len(),
            token: WildcardToken {
                name: (name != "_").then(|| name.to_owned()),
                sequence,
                offset,
            },
        });
        self.out.push_str(&placeholder);
        self.pos = cursor + name_len;
        Ok(())
    }
}

/// Returns the byte length of the Go identifier at the start of `text`.
fn identifier_len(text: &str) -> usize {
    let mut len = 0;
    for (idx, ch) in text.char_indices() {
        let valid = if idx == 0 {
            ch == '_' || ch.is_alphabetic()
        } else {
            ch == '_' || ch.is_alphanumeric()
        };
        if !valid {
            break;
        }
        len = idx + ch.len_utf8();
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn lex(pattern: &str) -> LexedPattern {
        lex_pattern(pattern).expect("lex")
    }

    #[test]
    fn replaces_every_wildcard_form() {
        let lexed = lex("f($x, $_, $*_, $*rest)");
        assert_eq!(
            lexed.text(),
            "f(gogrep_wildcard_0, gogrep_wildcard_1, gogrep_wildcard_2, gogrep_wildcard_3)"
        );

        let first = lexed.wildcard_at(2).expect("first wildcard");
        assert_eq!(first.name.as_deref(), Some("x"));
        assert!(!first.sequence);

        let anon_seq = lexed
            .wildcard_at(2 + 2 * "gogrep_wildcard_0, ".len())
            .expect("third wildcard");
        assert_eq!(anon_seq.name, None);
        assert!(anon_seq.sequence);
    }

    #[test]
    fn vars_are_distinct_and_ordered() {
        let lexed = lex("$y + $x == $y + $_");
        assert_eq!(lexed.vars(), vec!["y".to_owned(), "x".to_owned()]);
    }

    #[rstest]
    #[case(r#""$x""#)]
    #[case("'$'")]
    #[case("`$x $y`")]
    #[case("x // $x")]
    #[case("x /* $y */")]
    #[case(r#""a\"$x""#)]
    fn leaves_dollars_in_literals_and_comments(#[case] pattern: &str) {
        let lexed = lex(pattern);
        assert_eq!(lexed.text(), pattern);
        assert!(lexed.vars().is_empty());
    }

    #[rstest]
    #[case("$")]
    #[case("$ x")]
    #[case("$*")]
    #[case("$$")]
    #[case("f($1)")]
    fn rejects_malformed_wildcards(#[case] pattern: &str) {
        let err = lex_pattern(pattern).expect_err("malformed wildcard");
        assert!(matches!(err, PatternError::Wildcard { .. }));
    }

    #[test]
    fn original_offset_accounts_for_placeholder_growth() {
        let lexed = lex("$x + y");
        let y_offset = lexed.text().find('y').expect("y");
        assert_eq!(lexed.original_offset(y_offset), 5);
    }
}
