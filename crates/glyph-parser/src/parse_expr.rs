//! Expression parsing.
//!
//! Grammar:
//! ```text
//! Expr  = Atom | List | "'" Expr
//! List  = "(" { Expr } ")"
//! Atom  = Number | Symbol | Instruction
//! ```
//!
//! Symbols that spell an instruction alias and instruction literals both
//! resolve to [`ExprKind::Op`] here, so `(+ 1 2)` and `(\u{E000} 1 2)`
//! produce identical trees.

use glyph_lexer::token::TokenKind;
use glyph_types::ast::{Expr, ExprKind};
use glyph_types::{ErrorCode, Opcode};

use crate::parser::{Parser, MAX_NESTING};

impl<'src> Parser<'src> {
    /// Parse one expression.
    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        let span = self.current_span();
        match self.peek_kind().clone() {
            TokenKind::LParen => self.parse_list(),
            TokenKind::Quote => self.parse_quote(),
            TokenKind::Number(n) => {
                self.advance();
                Some(Expr::new(ExprKind::Number(n), span))
            }
            TokenKind::Symbol(name) => {
                self.advance();
                let kind = match Opcode::from_name(&name) {
                    Some(op) => ExprKind::Op(op),
                    None => ExprKind::Symbol(name),
                };
                Some(Expr::new(kind, span))
            }
            TokenKind::Instruction(c) => {
                self.advance();
                let kind = match Opcode::from_char(c) {
                    Ok(Some(op)) => ExprKind::Op(op),
                    Ok(None) => ExprKind::Symbol(c.to_string()),
                    Err(_) => ExprKind::Reserved(c),
                };
                Some(Expr::new(kind, span))
            }
            TokenKind::RParen => {
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "unexpected ')'");
                self.advance();
                None
            }
            TokenKind::Eof => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "expected expression, got end of input",
                );
                None
            }
        }
    }

    /// `List = "(" { Expr } ")"`
    fn parse_list(&mut self) -> Option<Expr> {
        let open = self.current_span();
        if self.depth >= MAX_NESTING {
            self.error_at(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("maximum list nesting depth is {MAX_NESTING}"),
                open,
            );
            self.skip_balanced();
            return None;
        }

        self.advance(); // consume '('
        self.depth += 1;
        let mut items = Vec::new();
        let result = loop {
            match self.peek_kind() {
                TokenKind::RParen => {
                    let close = self.advance();
                    break Some(Expr::new(ExprKind::List(items), open.merge(close)));
                }
                TokenKind::Eof => {
                    self.error_with_suggestion(
                        ErrorCode::UNCLOSED_PAREN,
                        "unclosed '('",
                        open,
                        "add a matching ')'",
                    );
                    break None;
                }
                _ => {
                    if let Some(expr) = self.parse_expression() {
                        items.push(expr);
                    } else if self.too_many_errors() {
                        break None;
                    }
                }
            }
        };
        self.depth -= 1;
        result
    }

    /// `"'" Expr`
    ///
    /// Each quote counts as one nesting level, shared with lists.
    fn parse_quote(&mut self) -> Option<Expr> {
        if self.depth >= MAX_NESTING {
            self.error_at(
                ErrorCode::NESTING_LIMIT_EXCEEDED,
                format!("maximum list nesting depth is {MAX_NESTING}"),
                self.current_span(),
            );
            self.skip_datum();
            return None;
        }

        let quote = self.advance();
        if matches!(self.peek_kind(), TokenKind::RParen | TokenKind::Eof) {
            self.error_at(
                ErrorCode::DANGLING_QUOTE,
                "quote must be followed by a datum",
                quote,
            );
            return None;
        }
        self.depth += 1;
        let datum = self.parse_expression();
        self.depth -= 1;
        let datum = datum?;
        let span = quote.merge(datum.span);
        Some(Expr::new(ExprKind::Quote(Box::new(datum)), span))
    }

    /// Skip a run of quotes and the datum they apply to.
    fn skip_datum(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Quote) {
            self.advance();
        }
        match self.peek_kind() {
            TokenKind::LParen => self.skip_balanced(),
            TokenKind::RParen | TokenKind::Eof => {}
            _ => {
                self.advance();
            }
        }
    }

    /// Skip one balanced list starting at the current `(`.
    fn skip_balanced(&mut self) {
        let mut open = 0u32;
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::LParen => open += 1,
                TokenKind::RParen => {
                    open = open.saturating_sub(1);
                    if open == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }
}
