//! AST node types for Glyph source.
//!
//! Glyph source is a sequence of S-expressions. Every node carries a
//! [`Span`] for error reporting. Textual operator aliases and their
//! instruction literals both resolve to [`ExprKind::Op`] at parse time, so
//! the evaluator never sees the difference.

use crate::{Opcode, Span};
use std::fmt;

/// A spanned expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Numeric literal: `42`, `-0.5`, `1e-3`
    Number(f64),
    /// Any non-instruction atom: `x`, `theta`, `else`
    Symbol(String),
    /// An instruction, written as a literal (`\u{E000}`) or alias (`+`).
    Op(Opcode),
    /// A reserved code point with no assigned instruction.
    Reserved(char),
    /// `( ... )`
    List(Vec<Expr>),
    /// `'datum`
    Quote(Box<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn number(n: f64) -> Self {
        Self::new(ExprKind::Number(n), Span::synthetic())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Symbol(name.into()), Span::synthetic())
    }

    pub fn op(op: Opcode) -> Self {
        Self::new(ExprKind::Op(op), Span::synthetic())
    }

    pub fn list(items: Vec<Expr>) -> Self {
        Self::new(ExprKind::List(items), Span::synthetic())
    }

    /// The symbol name, if this is a symbol atom.
    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// The list items, if this is a list form.
    pub fn as_list(&self) -> Option<&[Expr]> {
        match &self.kind {
            ExprKind::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Number(n) => write!(f, "{n}"),
            ExprKind::Symbol(s) => f.write_str(s),
            ExprKind::Op(op) => f.write_str(op.name()),
            ExprKind::Reserved(c) => write!(f, "{c}"),
            ExprKind::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            ExprKind::Quote(inner) => write!(f, "'{inner}"),
        }
    }
}
