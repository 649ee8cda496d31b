//! Expression parsing using Pratt parsing.
//!
//! Operator precedence (low to high):
//! - `a if cond else b`
//! - or (1-2)
//! - and (3-4)
//! - not (5, prefix)
//! - ==, !=, <, <=, >, >=, in, not in (7-8)
//! - ~ (9-10)
//! - +, - (11-12)
//! - *, /, % (13-14)
//! - unary - (15)
//! - | filter (17, postfix)

use smol_str::SmolStr;

use crate::ast::{Arguments, BinaryOp, Expr, Literal, UnaryOp};
use crate::lexer::TokenKind;

use super::{ParseError, Parser};

const NOT_BP: u8 = 5;
const NEG_BP: u8 = 15;
const FILTER_BP: u8 = 17;

fn infix_binding_power(kind: TokenKind) -> Option<(BinaryOp, u8, u8)> {
    let entry = match kind {
        TokenKind::KwOr => (BinaryOp::Or, 1, 2),
        TokenKind::KwAnd => (BinaryOp::And, 3, 4),
        TokenKind::EqEq => (BinaryOp::Eq, 7, 8),
        TokenKind::NotEq => (BinaryOp::NotEq, 7, 8),
        TokenKind::Lt => (BinaryOp::Lt, 7, 8),
        TokenKind::LtEq => (BinaryOp::LtEq, 7, 8),
        TokenKind::Gt => (BinaryOp::Gt, 7, 8),
        TokenKind::GtEq => (BinaryOp::GtEq, 7, 8),
        TokenKind::KwIn => (BinaryOp::In, 7, 8),
        TokenKind::Tilde => (BinaryOp::Concat, 9, 10),
        TokenKind::Plus => (BinaryOp::Add, 11, 12),
        TokenKind::Minus => (BinaryOp::Sub, 11, 12),
        TokenKind::Star => (BinaryOp::Mul, 13, 14),
        TokenKind::Slash => (BinaryOp::Div, 13, 14),
        TokenKind::Percent => (BinaryOp::Rem, 13, 14),
        _ => return None,
    };
    Some(entry)
}

impl Parser<'_> {
    /// Parse a full expression, including the inline conditional.
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let value = self.parse_expr_bp(0)?;
        if !self.at(TokenKind::KwIf) {
            return Ok(value);
        }
        self.bump();
        let condition = self.parse_expr_bp(0)?;
        let otherwise = if self.at(TokenKind::KwElse) {
            self.bump();
            self.parse_expression()?
        } else {
            Expr::Literal(Literal::None)
        };
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(value),
            otherwise: Box::new(otherwise),
        })
    }

    /// Parse expression with minimum binding power.
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = match self.current() {
            TokenKind::KwNot => {
                self.bump();
                let expr = self.parse_expr_bp(NOT_BP)?;
                Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(expr),
                }
            }
            TokenKind::Minus => {
                self.bump();
                let expr = self.parse_expr_bp(NEG_BP)?;
                Expr::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(expr),
                }
            }
            _ => self.parse_primary_expr()?,
        };

        loop {
            if self.at(TokenKind::Pipe) {
                if FILTER_BP < min_bp {
                    break;
                }
                self.bump();
                lhs = self.parse_filter(lhs)?;
                continue;
            }

            // `a not in b`
            if self.at(TokenKind::KwNot) && self.nth(1) == TokenKind::KwIn {
                if 7 < min_bp {
                    break;
                }
                self.bump();
                self.bump();
                let rhs = self.parse_expr_bp(8)?;
                lhs = Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(Expr::Binary {
                        op: BinaryOp::In,
                        left: Box::new(lhs),
                        right: Box::new(rhs),
                    }),
                };
                continue;
            }

            let Some((op, l_bp, r_bp)) = infix_binding_power(self.current()) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            self.bump(); // operator
            let rhs = self.parse_expr_bp(r_bp)?;
            lhs = Expr::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        let expr = match self.current() {
            TokenKind::IntLiteral => {
                let value = self
                    .current_text()
                    .parse::<i64>()
                    .map_err(|_| self.error("integer literal out of range"))?;
                self.bump();
                Expr::Literal(Literal::Int(value))
            }
            TokenKind::FloatLiteral => {
                let value = self
                    .current_text()
                    .parse::<f64>()
                    .map_err(|_| self.error("invalid float literal"))?;
                self.bump();
                Expr::Literal(Literal::Float(value))
            }
            TokenKind::StringLiteral => {
                let value = unescape(self.current_text());
                self.bump();
                Expr::Literal(Literal::Str(value))
            }
            TokenKind::KwTrue => {
                self.bump();
                Expr::Literal(Literal::Bool(true))
            }
            TokenKind::KwFalse => {
                self.bump();
                Expr::Literal(Literal::Bool(false))
            }
            TokenKind::KwNone => {
                self.bump();
                Expr::Literal(Literal::None)
            }
            TokenKind::Ident => {
                let name = SmolStr::new(self.current_text());
                self.bump();
                if self.at(TokenKind::LParen) {
                    let args = self.parse_arg_list()?;
                    Expr::Call {
                        function: name,
                        args,
                    }
                } else {
                    Expr::Name(name)
                }
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                inner
            }
            TokenKind::LBracket => {
                self.bump();
                let mut items = Vec::new();
                while !self.at(TokenKind::RBracket) {
                    items.push(self.parse_expression()?);
                    if !self.at(TokenKind::Comma) {
                        break;
                    }
                    self.bump();
                }
                self.expect(TokenKind::RBracket)?;
                Expr::List(items)
            }
            other => {
                return Err(self.error(format!("expected expression, found {}", other.describe())));
            }
        };
        Ok(expr)
    }

    fn parse_filter(&mut self, value: Expr) -> Result<Expr, ParseError> {
        if !self.at(TokenKind::Ident) {
            return Err(self.error(format!(
                "expected filter name, found {}",
                self.current().describe()
            )));
        }
        let name = SmolStr::new(self.current_text());
        self.bump();
        let args = if self.at(TokenKind::LParen) {
            self.parse_arg_list()?
        } else {
            Arguments::default()
        };
        Ok(Expr::Filter {
            value: Box::new(value),
            name,
            args,
        })
    }

    /// Parse `(a, b, key=value)`.
    fn parse_arg_list(&mut self) -> Result<Arguments, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Arguments::default();
        while !self.at(TokenKind::RParen) {
            if self.at(TokenKind::Ident) && self.nth(1) == TokenKind::Assign {
                let name = SmolStr::new(self.current_text());
                self.bump();
                self.bump();
                let value = self.parse_expression()?;
                args.keyword.push((name, value));
            } else {
                if !args.keyword.is_empty() {
                    return Err(self.error("positional argument follows keyword argument"));
                }
                args.positional.push(self.parse_expression()?);
            }
            if !self.at(TokenKind::Comma) {
                break;
            }
            self.bump();
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }
}

/// Strips the quotes from a string literal and resolves backslash escapes.
fn unescape(literal: &str) -> SmolStr {
    let inner = &literal[1..literal.len() - 1];
    if !inner.contains('\\') {
        return SmolStr::new(inner);
    }
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(escaped @ ('\\' | '\'' | '"')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    SmolStr::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;

    fn sexpr(source: &str) -> String {
        parse_expression(source).unwrap().to_string()
    }

    #[test]
    fn precedence_of_arithmetic() {
        assert_eq!(sexpr("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(sexpr("(1 + 2) * 3"), "(* (+ 1 2) 3)");
    }

    #[test]
    fn not_binds_looser_than_comparison() {
        assert_eq!(sexpr("not a == b"), "(not (== a b))");
        assert_eq!(sexpr("not a and b"), "(and (not a) b)");
    }

    #[test]
    fn not_in_is_negated_membership() {
        assert_eq!(sexpr("x not in ['a', 'b']"), r#"(not (in x (list "a" "b")))"#);
    }

    #[test]
    fn filter_binds_tighter_than_negation() {
        assert_eq!(sexpr("-x | round"), "(neg (filter round x))");
    }

    #[test]
    fn conditional_without_else_defaults_to_none() {
        assert_eq!(sexpr("'on' if x"), r#"(if x "on" none)"#);
    }

    #[test]
    fn escapes_in_strings() {
        assert_eq!(
            parse_expression(r"'it\'s'").unwrap(),
            Expr::Literal(Literal::Str(SmolStr::new("it's")))
        );
    }

    #[test]
    fn keyword_before_positional_is_rejected() {
        let err = parse_expression("f(a=1, 2)").unwrap_err();
        assert_eq!(err.message, "positional argument follows keyword argument");
    }
}
