//! Tokenizer for filter expressions.
//!
//! `$name` and `$$` are single tokens, so receivers never need to be
//! disguised as Go identifiers.

use std::str::Chars;

use gogrep_syntax::ROOT_VAR;

use crate::error::FilterError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    LParen,
    RParen,
    Dot,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Str(String),
    Ident(String),
    Var(String),
    Eof,
}

impl Token {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::LParen => "`(`".to_owned(),
            Self::RParen => "`)`".to_owned(),
            Self::Dot => "`.`".to_owned(),
            Self::Bang => "`!`".to_owned(),
            Self::AndAnd => "`&&`".to_owned(),
            Self::OrOr => "`||`".to_owned(),
            Self::EqEq => "`==`".to_owned(),
            Self::NotEq => "`!=`".to_owned(),
            Self::Str(s) => format!("string {s:?}"),
            Self::Ident(name) => format!("`{name}`"),
            Self::Var(name) => format!("`${name}`"),
            Self::Eof => "end of input".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spanned {
    pub(crate) token: Token,
    pub(crate) offset: usize,
}

pub(crate) fn tokenize(text: &str) -> Result<Vec<Spanned>, FilterError> {
    let mut lexer = Lexer { text, pos: 0 };
    let mut tokens = Vec::new();
    loop {
        let spanned = lexer.next_token()?;
        let done = spanned.token == Token::Eof;
        tokens.push(spanned);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        self.text.get(self.pos..).unwrap_or_default()
    }

    fn next_token(&mut self) -> Result<Spanned, FilterError> {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
        let offset = self.pos;
        let Some(ch) = trimmed.chars().next() else {
            return Ok(Spanned {
                token: Token::Eof,
                offset,
            });
        };

        let (token, len) = match ch {
            '(' => (Token::LParen, 1),
            ')' => (Token::RParen, 1),
            '.' => (Token::Dot, 1),
            '!' if trimmed.starts_with("!=") => (Token::NotEq, 2),
            '!' => (Token::Bang, 1),
            '&' if trimmed.starts_with("&&") => (Token::AndAnd, 2),
            '|' if trimmed.starts_with("||") => (Token::OrOr, 2),
            '=' if trimmed.starts_with("==") => (Token::EqEq, 2),
            '"' => {
                let (value, len) = interpreted_string(trimmed)
                    .ok_or_else(|| FilterError::syntax(offset, "malformed string literal"))?;
                (Token::Str(value), len)
            }
            '`' => {
                let end = trimmed
                    .get(1..)
                    .and_then(|body| body.find('`'))
                    .ok_or_else(|| FilterError::syntax(offset, "unterminated raw string"))?;
                let body = trimmed.get(1..=end).unwrap_or_default();
                (Token::Str(body.replace('\r', "")), end + 2)
            }
            '$' => variable(trimmed, offset)?,
            c if c == '_' || c.is_alphabetic() => {
                let len = identifier_len(trimmed);
                let name = trimmed.get(..len).unwrap_or_default().to_owned();
                (Token::Ident(name), len)
            }
            other => {
                return Err(FilterError::syntax(
                    offset,
                    format!("unexpected character {other:?}"),
                ));
            }
        };
        self.pos += len;
        Ok(Spanned { token, offset })
    }
}

fn variable(text: &str, offset: usize) -> Result<(Token, usize), FilterError> {
    let after = text.get(1..).unwrap_or_default();
    if after.starts_with('$') {
        return Ok((Token::Var(ROOT_VAR.to_owned()), 2));
    }
    match identifier_len(after) {
        0 => Err(FilterError::syntax(offset, "expected a variable name after `$`")),
        len => {
            let name = after.get(..len).unwrap_or_default().to_owned();
            Ok((Token::Var(name), len + 1))
        }
    }
}

fn identifier_len(text: &str) -> usize {
    text.char_indices()
        .take_while(|(idx, ch)| *ch == '_' || ch.is_alphabetic() || (*idx > 0 && ch.is_numeric()))
        .map(|(idx, ch)| idx + ch.len_utf8())
        .last()
        .unwrap_or(0)
}

/// Decodes a Go interpreted string literal at the start of `text`,
/// returning the value and the literal's byte length.
fn interpreted_string(text: &str) -> Option<(String, usize)> {
    let mut chars = text.get(1..)?.chars();
    let mut value = String::new();
    loop {
        let consumed = text.len() - chars.as_str().len();
        match chars.next()? {
            '"' => return Some((value, consumed + 1)),
            '\n' => return None,
            '\\' => value.push(escape(&mut chars)?),
            ch => value.push(ch),
        }
    }
}

fn escape(chars: &mut Chars<'_>) -> Option<char> {
    let ch = match chars.next()? {
        'a' => '\u{7}',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{b}',
        '\\' => '\\',
        '"' => '"',
        'x' => char::from(u8::try_from(hex(chars, 2)?).ok()?),
        'u' => char::from_u32(hex(chars, 4)?)?,
        'U' => char::from_u32(hex(chars, 8)?)?,
        _ => return None,
    };
    Some(ch)
}

fn hex(chars: &mut Chars<'_>, digits: usize) -> Option<u32> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        value = value.checked_mul(16)?.checked_add(chars.next()?.to_digit(16)?)?;
    }
    Some(value)
}
