//! Parser for template expressions.
//!
//! A hand-written Pratt parser over the token stream produced by the
//! `lexer` module. Unlike a lossless IDE parser it stops at the first error:
//! a malformed field is reported once and replaced by the caller.

mod expressions;

use smol_str::SmolStr;
use text_size::TextSize;
use thiserror::Error;

use crate::ast::Expr;
use crate::lexer::{lex, Token, TokenKind};

/// Error produced while parsing a template or an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    /// Description of the problem.
    pub message: SmolStr,
    /// Byte offset into the template source.
    pub offset: u32,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<SmolStr>, offset: u32) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Parses a standalone expression such as `states('sensor.x') | round(1)`.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    parse_expression_at(source, 0)
}

/// Parses an expression that starts at `base` inside a larger template, so
/// error offsets point into the template source.
pub(crate) fn parse_expression_at(source: &str, base: u32) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(source, base);
    let expr = parser.parse_expression()?;
    parser.finish()?;
    Ok(expr)
}

/// The parser state.
pub(crate) struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    base: u32,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(source: &'src str, base: u32) -> Self {
        let tokens = lex(source)
            .into_iter()
            .filter(|token| !token.kind.is_trivia())
            .collect();
        Self {
            source,
            tokens,
            pos: 0,
            base,
        }
    }

    pub(crate) fn current(&self) -> TokenKind {
        self.nth(0)
    }

    pub(crate) fn nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    /// Text of the current token, empty at the end of input.
    pub(crate) fn current_text(&self) -> &'src str {
        self.tokens
            .get(self.pos)
            .map_or("", |token| token.text(self.source))
    }

    pub(crate) fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(crate) fn offset(&self) -> u32 {
        let local = self.tokens.get(self.pos).map_or_else(
            || TextSize::of(self.source),
            |token| token.range.start(),
        );
        self.base + u32::from(local)
    }

    pub(crate) fn error(&self, message: impl Into<SmolStr>) -> ParseError {
        ParseError::new(message, self.offset())
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.at(kind) {
            self.bump();
            return Ok(());
        }
        Err(self.error(format!(
            "expected {}, found {}",
            kind.describe(),
            self.current().describe()
        )))
    }

    /// Fails unless every token was consumed.
    pub(crate) fn finish(&self) -> Result<(), ParseError> {
        if self.at(TokenKind::Eof) {
            return Ok(());
        }
        Err(self.error(format!("unexpected {}", self.current().describe())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_offsets_are_relative_to_base() {
        let err = parse_expression_at("1 +", 10).unwrap_err();
        assert_eq!(err.offset, 13);
        assert_eq!(err.message, "expected expression, found end of expression");
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = parse_expression("a b").unwrap_err();
        assert_eq!(err.message, "unexpected identifier");
        assert_eq!(err.offset, 2);
    }
}
