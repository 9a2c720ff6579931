//! Core parser infrastructure: token cursor, error reporting, helpers.

use glyph_lexer::token::{Token, TokenKind};
use glyph_types::ast::Expr;
use glyph_types::{CompileErrors, ErrorCode, GlyphError, SourceFile, Span};

/// Maximum list nesting depth accepted by the parser.
pub const MAX_NESTING: u32 = 128;

/// The Glyph parser.
///
/// Consumes a token stream produced by the lexer and builds one [`Expr`]
/// per top-level form. Collects errors and resumes at the next form when
/// possible.
pub struct Parser<'src> {
    /// The token stream.
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    /// Source file for error context.
    source_file: &'src SourceFile,
    /// Collected errors.
    errors: CompileErrors,
    /// Current list nesting depth.
    pub(crate) depth: u32,
}

/// Result of parsing.
pub struct ParseResult {
    pub exprs: Vec<Expr>,
    pub errors: CompileErrors,
}

impl<'src> Parser<'src> {
    /// Create a new parser from a token stream and source file.
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
            depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).or_else(|| self.tokens.last())
    }

    /// Returns the kind of the current token.
    pub(crate) fn peek_kind(&self) -> &TokenKind {
        self.peek().map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    /// Advance the cursor by one and return the consumed token's span.
    pub(crate) fn advance(&mut self) -> Span {
        let span = self.current_span();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        span
    }

    /// Returns the span of the current token.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or_else(|| Span::point(1, 1))
    }

    /// Returns `true` if the current token is `Eof`.
    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Check if the current token matches the given kind exactly.
    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    /// Report an error at the current token position.
    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    /// Report an error at a specific span.
    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        self.push_error(GlyphError::new(
            &self.source_file.name,
            code,
            message,
            span,
            self.source_line(span),
        ));
    }

    /// Report an error at a specific span with a fix-it hint.
    pub(crate) fn error_with_suggestion(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        suggestion: impl Into<String>,
    ) {
        let error = GlyphError::new(
            &self.source_file.name,
            code,
            message,
            span,
            self.source_line(span),
        )
        .with_suggestion(suggestion);
        self.push_error(error);
    }

    pub(crate) fn push_error(&mut self, error: GlyphError) {
        self.errors.push_error(error);
    }

    pub(crate) fn source_line(&self, span: Span) -> String {
        self.source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string()
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.total_errors >= glyph_types::MAX_ERRORS
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into top-level expressions.
    pub fn parse(mut self) -> ParseResult {
        let mut exprs = Vec::new();
        while !self.at_end() && !self.too_many_errors() {
            if self.check_exact(&TokenKind::RParen) {
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "unexpected ')'");
                self.advance();
                continue;
            }
            if let Some(expr) = self.parse_expression() {
                exprs.push(expr);
            }
        }
        ParseResult {
            exprs,
            errors: self.errors,
        }
    }
}
