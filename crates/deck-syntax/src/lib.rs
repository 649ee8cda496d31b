//! `deck-syntax` - Lexer and parser for button template expressions.
//!
//! Button fields may embed small Jinja-style templates that are evaluated
//! against live entity state at render time:
//!
//! - **Lexer**: Tokenizes the text between template delimiters
//! - **Parser**: Builds an expression tree with Pratt parsing
//! - **Template**: Splits source into text, `{{ }}` outputs and `{% %}` blocks
//!
//! Evaluation lives in `deck-render`; this crate only knows syntax.
//!
//! # Example
//!
//! ```
//! use deck_syntax::parse_template;
//!
//! let template = parse_template("{{ self_states(with_unit=true) }}").unwrap();
//! let expr = template.single_expression().unwrap();
//! assert_eq!(expr.to_string(), "(call self_states with_unit=true)");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod template;

pub use ast::{Arguments, BinaryOp, Expr, Literal, Node, Template, UnaryOp};
pub use lexer::{lex, Lexer, Token, TokenKind};
pub use parser::{parse_expression, ParseError};
pub use template::{contains_template, parse_template};
