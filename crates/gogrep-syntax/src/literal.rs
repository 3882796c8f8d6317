//! Literal equivalence rules.
//!
//! In the default mode two literals match when they denote the same value:
//! `10`, `0xA`, `0o12` and `1_0` are one integer, `"a"` and `` `a` `` are one
//! string, `'\n'` and `'\x0a'` are one rune. Strict mode compares the token
//! kind and spelling instead.

use std::str::Chars;

use crate::kinds::{is_literal, leaf_class};

/// Compares two leaf tokens under the literal equivalence rules.
///
/// Identifier flavours compare by spelling; literals compare by decoded value
/// unless `strict` is set. Tokens of unrelated kinds never match.
#[must_use]
pub fn leaves_equal(
    (kind_a, text_a): (&'static str, &str),
    (kind_b, text_b): (&'static str, &str),
    strict: bool,
) -> bool {
    if strict {
        return leaf_class(kind_a) == leaf_class(kind_b)
            && (kind_a == kind_b || !is_literal(kind_a))
            && text_a == text_b;
    }
    if leaf_class(kind_a) != leaf_class(kind_b) {
        return false;
    }
    if text_a == text_b {
        return true;
    }

    match leaf_class(kind_a) {
        "int_literal" => values_equal(parse_int(text_a), parse_int(text_b)),
        "float_literal" => values_equal(parse_float(text_a), parse_float(text_b)),
        "imaginary_literal" => values_equal(parse_imaginary(text_a), parse_imaginary(text_b)),
        "rune_literal" => values_equal(decode_rune(text_a), decode_rune(text_b)),
        "string" => values_equal(
            decode_string(kind_a, text_a),
            decode_string(kind_b, text_b),
        ),
        _ => false,
    }
}

fn values_equal<T: PartialEq>(a: Option<T>, b: Option<T>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x == y)
}

/// A numeric literal value in a form that compares exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Number {
    Int(u128),
    Float(u64),
}

/// Parses a Go integer literal in any base.
fn parse_int(text: &str) -> Option<u128> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, lower.get(1..).unwrap_or_default())
    } else {
        (10, lower.as_str())
    };
    u128::from_str_radix(body, radix).ok()
}

/// Parses a decimal Go float literal. Hexadecimal floats only compare by
/// spelling.
fn parse_float(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    if digits.starts_with("0x") || digits.starts_with("0X") {
        return None;
    }
    digits.parse::<f64>().ok().map(f64::to_bits)
}

fn parse_imaginary(text: &str) -> Option<Number> {
    let body = text.strip_suffix('i')?;
    let lower = body.to_ascii_lowercase();
    if ["0x", "0b", "0o"].iter().any(|p| lower.starts_with(p)) {
        return parse_int(body).map(Number::Int);
    }
    // `0123i` is decimal for backwards compatibility, which the float parser
    // already does.
    parse_float(body).map(Number::Float)
}

/// One decoded unit of a quoted literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Char(char),
    Byte(u8),
}

/// Decodes a rune literal into its code point.
fn decode_rune(text: &str) -> Option<u32> {
    let body = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = body.chars();
    let unit = next_unit(&mut chars, '\'')?;
    if chars.next().is_some() {
        return None;
    }
    Some(match unit {
        Unit::Char(ch) => u32::from(ch),
        Unit::Byte(byte) => u32::from(byte),
    })
}

/// Decodes an interpreted or raw string literal into its bytes.
fn decode_string(kind: &str, text: &str) -> Option<Vec<u8>> {
    if kind == "raw_string_literal" {
        let body = text.strip_prefix('`')?.strip_suffix('`')?;
        return Some(body.bytes().filter(|b| *b != b'\r').collect());
    }

    let body = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut chars = body.chars();
    let mut out = Vec::with_capacity(body.len());
    while !chars.as_str().is_empty() {
        match next_unit(&mut chars, '"')? {
            Unit::Char(ch) => {
                let mut buf = [0_u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            }
            Unit::Byte(byte) => out.push(byte),
        }
    }
    Some(out)
}

fn next_unit(chars: &mut Chars<'_>, quote: char) -> Option<Unit> {
    let ch = chars.next()?;
    if ch != '\\' {
        return Some(Unit::Char(ch));
    }
    let escape = chars.next()?;
    let simple = match escape {
        'a' => Some('\u{7}'),
        'b' => Some('\u{8}'),
        'f' => Some('\u{c}'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        'v' => Some('\u{b}'),
        '\\' => Some('\\'),
        c if c == quote => Some(c),
        _ => None,
    };
    if let Some(c) = simple {
        return Some(Unit::Char(c));
    }
    match escape {
        'x' => read_radix(chars, 2, 16)
            .and_then(|v| u8::try_from(v).ok())
            .map(Unit::Byte),
        'u' => read_radix(chars, 4, 16).and_then(char::from_u32).map(Unit::Char),
        'U' => read_radix(chars, 8, 16).and_then(char::from_u32).map(Unit::Char),
        '0'..='7' => {
            let first = escape.to_digit(8)?;
            let rest = read_radix(chars, 2, 8)?;
            u8::try_from(first * 64 + rest).ok().map(Unit::Byte)
        }
        _ => None,
    }
}

fn read_radix(chars: &mut Chars<'_>, count: usize, radix: u32) -> Option<u32> {
    let mut value: u32 = 0;
    for _ in 0..count {
        let digit = chars.next()?.to_digit(radix)?;
        value = value.checked_mul(radix)?.checked_add(digit)?;
    }
    Some(value)
}
