//! Token definitions for template expressions.
//!
//! Only the text between template delimiters (`{{ ... }}`, `{% ... %}`) is
//! tokenized; literal text around the delimiters never reaches the lexer.

use logos::Logos;

/// All token kinds that can appear inside a template delimiter.
///
/// Token kinds are divided into categories:
/// - Trivia (whitespace)
/// - Punctuation and operators
/// - Keywords
/// - Literals and identifiers
/// - Special tokens (errors, end of input)
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    /// Whitespace (spaces, tabs, newlines)
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// `[`
    #[token("[")]
    LBracket,

    /// `]`
    #[token("]")]
    RBracket,

    /// `,`
    #[token(",")]
    Comma,

    /// `|` (filter application)
    #[token("|")]
    Pipe,

    /// `=` (keyword argument)
    #[token("=")]
    Assign,

    // =========================================================================
    // OPERATORS
    // =========================================================================
    /// `~` (string concatenation)
    #[token("~")]
    Tilde,

    /// `+`
    #[token("+")]
    Plus,

    /// `-`
    #[token("-")]
    Minus,

    /// `*`
    #[token("*")]
    Star,

    /// `/`
    #[token("/")]
    Slash,

    /// `%`
    #[token("%")]
    Percent,

    /// `==`
    #[token("==")]
    EqEq,

    /// `!=`
    #[token("!=")]
    NotEq,

    /// `<`
    #[token("<")]
    Lt,

    /// `<=`
    #[token("<=")]
    LtEq,

    /// `>`
    #[token(">")]
    Gt,

    /// `>=`
    #[token(">=")]
    GtEq,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    /// `and`
    #[token("and")]
    KwAnd,

    /// `or`
    #[token("or")]
    KwOr,

    /// `not`
    #[token("not")]
    KwNot,

    /// `in`
    #[token("in")]
    KwIn,

    /// `if`
    #[token("if")]
    KwIf,

    /// `elif`
    #[token("elif")]
    KwElif,

    /// `else`
    #[token("else")]
    KwElse,

    /// `endif`
    #[token("endif")]
    KwEndif,

    /// `true` / `True`
    #[token("true")]
    #[token("True")]
    KwTrue,

    /// `false` / `False`
    #[token("false")]
    #[token("False")]
    KwFalse,

    /// `none` / `None`
    #[token("none")]
    #[token("None")]
    KwNone,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// Integer literal: 42
    #[regex(r"[0-9]+")]
    IntLiteral,

    /// Float literal: 21.5, 1.0e3
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    FloatLiteral,

    /// Quoted string: 'light.kitchen' or "light.kitchen"
    #[regex(r#"'([^'\\]|\\.)*'"#)]
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLiteral,

    // =========================================================================
    // IDENTIFIERS
    // =========================================================================
    /// Identifier: starts with letter or underscore, contains letters, digits, underscores
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // =========================================================================
    // SPECIAL TOKENS
    // =========================================================================
    /// Lexer error - unrecognized character
    Error,

    /// End of input (never produced by the lexer, used by the parser)
    Eof,
}

impl TokenKind {
    /// Returns `true` if this token is trivia (whitespace).
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// Human-readable description used in parse errors.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::Comma => "','",
            Self::Pipe => "'|'",
            Self::Assign => "'='",
            Self::Tilde => "'~'",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Percent => "'%'",
            Self::EqEq => "'=='",
            Self::NotEq => "'!='",
            Self::Lt => "'<'",
            Self::LtEq => "'<='",
            Self::Gt => "'>'",
            Self::GtEq => "'>='",
            Self::KwAnd => "'and'",
            Self::KwOr => "'or'",
            Self::KwNot => "'not'",
            Self::KwIn => "'in'",
            Self::KwIf => "'if'",
            Self::KwElif => "'elif'",
            Self::KwElse => "'else'",
            Self::KwEndif => "'endif'",
            Self::KwTrue | Self::KwFalse => "boolean literal",
            Self::KwNone => "'none'",
            Self::IntLiteral => "integer literal",
            Self::FloatLiteral => "float literal",
            Self::StringLiteral => "string literal",
            Self::Ident => "identifier",
            Self::Error => "unrecognized character",
            Self::Eof => "end of expression",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        TokenKind::lexer(source)
            .map(|kind| kind.unwrap_or(TokenKind::Error))
            .filter(|kind| !kind.is_trivia())
            .collect()
    }

    #[test]
    fn keywords_win_over_identifiers() {
        assert_eq!(
            kinds("and android not nothing"),
            vec![
                TokenKind::KwAnd,
                TokenKind::Ident,
                TokenKind::KwNot,
                TokenKind::Ident
            ]
        );
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(
            kinds("42 21.5 1.0e3"),
            vec![
                TokenKind::IntLiteral,
                TokenKind::FloatLiteral,
                TokenKind::FloatLiteral
            ]
        );
    }

    #[test]
    fn both_quote_styles_with_escapes() {
        assert_eq!(
            kinds(r#"'it\'s' "say \"hi\"""#),
            vec![TokenKind::StringLiteral, TokenKind::StringLiteral]
        );
    }

    #[test]
    fn python_style_constants() {
        assert_eq!(
            kinds("True false None"),
            vec![TokenKind::KwTrue, TokenKind::KwFalse, TokenKind::KwNone]
        );
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            kinds("== != <= >= < >"),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Lt,
                TokenKind::Gt
            ]
        );
    }

    #[test]
    fn unknown_characters_are_errors() {
        assert_eq!(kinds("a ? b")[1], TokenKind::Error);
    }
}
