//! Recursive-descent parser for filter expressions.
//!
//! Precedence, loosest first: `||`, `&&`, `==`/`!=`, unary `!`, then
//! primaries. Binary operators associate to the left.

use crate::error::FilterError;
use crate::lexer::{Spanned, Token, tokenize};

/// Who a predicate method is called on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Receiver {
    Var(String),
    File,
    Function,
}

/// Parsed filter text, before predicates are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Syntax {
    Not(Box<Syntax>),
    And(Box<Syntax>, Box<Syntax>),
    Or(Box<Syntax>, Box<Syntax>),
    Eq(Box<Syntax>, Box<Syntax>),
    NotEq(Box<Syntax>, Box<Syntax>),
    Str {
        value: String,
        offset: usize,
    },
    Call {
        receiver: Receiver,
        method: String,
        offset: usize,
    },
}

impl Syntax {
    pub(crate) fn offset(&self) -> usize {
        match self {
            Self::Not(inner) => inner.offset(),
            Self::And(lhs, _) | Self::Or(lhs, _) | Self::Eq(lhs, _) | Self::NotEq(lhs, _) => {
                lhs.offset()
            }
            Self::Str { offset, .. } | Self::Call { offset, .. } => *offset,
        }
    }
}

/// Parses non-empty filter text into a syntax tree.
pub(crate) fn parse_syntax(text: &str) -> Result<Syntax, FilterError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let tree = parser.or()?;
    parser.expect(&Token::Eof)?;
    Ok(tree)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map_or(&Token::Eof, |s| &s.token)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(0, |s| s.offset)
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == token {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), FilterError> {
        if self.eat(token) {
            return Ok(());
        }
        Err(self.unexpected(&format!("expected {}", token.describe())))
    }

    fn unexpected(&self, context: &str) -> FilterError {
        FilterError::syntax(
            self.offset(),
            format!("{context}, found {}", self.peek().describe()),
        )
    }

    fn or(&mut self) -> Result<Syntax, FilterError> {
        let mut lhs = self.and()?;
        while self.eat(&Token::OrOr) {
            let rhs = self.and()?;
            lhs = Syntax::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Syntax, FilterError> {
        let mut lhs = self.comparison()?;
        while self.eat(&Token::AndAnd) {
            let rhs = self.comparison()?;
            lhs = Syntax::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Syntax, FilterError> {
        let mut lhs = self.unary()?;
        loop {
            if self.eat(&Token::EqEq) {
                let rhs = self.unary()?;
                lhs = Syntax::Eq(Box::new(lhs), Box::new(rhs));
            } else if self.eat(&Token::NotEq) {
                let rhs = self.unary()?;
                lhs = Syntax::NotEq(Box::new(lhs), Box::new(rhs));
            } else {
                return Ok(lhs);
            }
        }
    }

    fn unary(&mut self) -> Result<Syntax, FilterError> {
        if self.eat(&Token::Bang) {
            let inner = self.unary()?;
            return Ok(Syntax::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Syntax, FilterError> {
        let offset = self.offset();
        match self.peek() {
            Token::LParen => {
                self.bump();
                let inner = self.or()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Str(_) => match self.bump() {
                Token::Str(value) => Ok(Syntax::Str { value, offset }),
                _ => Err(FilterError::syntax(offset, "expected a string")),
            },
            Token::Var(_) | Token::Ident(_) => {
                let receiver = match self.bump() {
                    Token::Var(name) => Receiver::Var(name),
                    Token::Ident(name) if name == "file" => Receiver::File,
                    Token::Ident(name) if name == "function" => Receiver::Function,
                    Token::Ident(name) => {
                        return Err(FilterError::UnknownReceiver { receiver: name });
                    }
                    _ => return Err(FilterError::syntax(offset, "expected a receiver")),
                };
                self.method_call(receiver, offset)
            }
            _ => Err(self.unexpected("expected an operand")),
        }
    }

    fn method_call(&mut self, receiver: Receiver, offset: usize) -> Result<Syntax, FilterError> {
        self.expect(&Token::Dot)?;
        let method = match self.bump() {
            Token::Ident(name) => name,
            _ => {
                self.pos = self.pos.saturating_sub(1);
                return Err(self.unexpected("expected a method name"));
            }
        };
        self.expect(&Token::LParen)?;
        self.expect(&Token::RParen)?;
        Ok(Syntax::Call {
            receiver,
            method,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn call(var: &str, method: &str, offset: usize) -> Box<Syntax> {
        Box::new(Syntax::Call {
            receiver: Receiver::Var(var.to_owned()),
            method: method.to_owned(),
            offset,
        })
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let tree = parse_syntax("$a.IsPure() || $b.IsPure() && $c.IsPure()").expect("parse");
        assert_eq!(
            tree,
            Syntax::Or(
                call("a", "IsPure", 0),
                Box::new(Syntax::And(call("b", "IsPure", 15), call("c", "IsPure", 30))),
            )
        );
    }

    #[test]
    fn negation_binds_tighter_than_comparison() {
        let tree = parse_syntax("!$a.Text() == \"x\"").expect("parse");
        assert!(matches!(tree, Syntax::Eq(lhs, _) if matches!(*lhs, Syntax::Not(_))));
    }

    #[test]
    fn parentheses_group() {
        let tree = parse_syntax("!($a.IsPure() || $b.IsPure())").expect("parse");
        assert!(matches!(tree, Syntax::Not(inner) if matches!(*inner, Syntax::Or(..))));
    }

    #[rstest]
    #[case("$x.IsPure(")]
    #[case("$x.IsPure() &&")]
    #[case("($x.IsPure()")]
    #[case("$x.IsPure() $y.IsPure()")]
    #[case("$x.")]
    #[case("$x")]
    #[case("&& $x.IsPure()")]
    fn malformed_expressions_are_syntax_errors(#[case] text: &str) {
        let err = parse_syntax(text).expect_err("should fail");
        assert!(matches!(err, FilterError::Syntax { .. }), "{err:?}");
    }

    #[test]
    fn unknown_receivers_are_reported() {
        let err = parse_syntax("pkg.IsMain()").expect_err("should fail");
        assert_eq!(
            err,
            FilterError::UnknownReceiver {
                receiver: "pkg".to_owned()
            }
        );
    }
}
