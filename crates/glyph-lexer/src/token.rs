//! Token types for the Glyph lexer.
//!
//! S-expression syntax needs very few token kinds: parentheses, the quote
//! mark, numbers, symbols, and instruction literals. Whether a symbol names
//! an instruction alias is decided by the parser, not here.

use glyph_types::Span;
use std::fmt;

/// A single token produced by the Glyph lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// Source location.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Every token kind in Glyph source.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `'`
    Quote,
    /// Numeric literal: `42`, `-0.25`, `1e-6`
    Number(f64),
    /// Symbol text, including operator aliases: `x`, `+`, `axis-set`
    Symbol(String),
    /// A scalar from the reserved instruction range, assigned or not.
    Instruction(char),
    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Quote => write!(f, "'"),
            TokenKind::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            TokenKind::Symbol(s) => write!(f, "{s}"),
            TokenKind::Instruction(c) => write!(f, "U+{:04X}", *c as u32),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_construction() {
        let span = Span::new(1, 1, 1, 1);
        let token = Token::new(TokenKind::LParen, span);
        assert_eq!(token.kind, TokenKind::LParen);
        assert_eq!(token.span, span);
    }

    #[test]
    fn test_display_punctuation() {
        assert_eq!(TokenKind::LParen.to_string(), "(");
        assert_eq!(TokenKind::RParen.to_string(), ")");
        assert_eq!(TokenKind::Quote.to_string(), "'");
    }

    #[test]
    fn test_display_literals() {
        assert_eq!(TokenKind::Number(42.0).to_string(), "42");
        assert_eq!(TokenKind::Number(-0.5).to_string(), "-0.5");
        assert_eq!(TokenKind::Symbol("axis-set".into()).to_string(), "axis-set");
    }

    #[test]
    fn test_display_instruction_uses_code_point() {
        assert_eq!(TokenKind::Instruction('\u{E000}').to_string(), "U+E000");
        assert_eq!(TokenKind::Instruction('\u{E5FF}').to_string(), "U+E5FF");
    }

    #[test]
    fn test_display_eof() {
        assert_eq!(TokenKind::Eof.to_string(), "end of input");
    }
}
