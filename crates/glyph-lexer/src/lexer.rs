//! Core Glyph lexer: converts source text to a token stream.
//!
//! Features:
//! - Scans Unicode scalar values, so columns count characters, not bytes
//! - Each scalar in the reserved instruction range is its own token, even
//!   when written directly against other text
//! - `;` line comments are stripped
//! - Error recovery: collects up to 20 errors instead of stopping at the first

use glyph_types::opcode::is_reserved;
use glyph_types::{CompileErrors, ErrorCode, GlyphError, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// The Glyph lexer.
///
/// Converts source text into a vector of [`Token`]s, collecting up to
/// [`glyph_types::MAX_ERRORS`] errors along the way.
pub struct Lexer<'src> {
    /// The full source text as scalar values.
    chars: Vec<char>,
    /// Source file for error reporting.
    source_file: &'src SourceFile,
    /// Current index into `chars`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// Collected errors.
    errors: CompileErrors,
}

/// Result of lexing: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    /// Errors encountered during lexing.
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source file.
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            chars: source_file.source.chars().collect(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    /// Lex the entire source file into a token stream.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();

        loop {
            if self.errors.total_errors >= glyph_types::MAX_ERRORS {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }

        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self
            .source_file
            .line(span.start_line)
            .unwrap_or("")
            .to_string();
        let err = GlyphError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    /// Skip whitespace and `;` comments.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else if ch == ';' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        self.skip_trivia();

        let start_line = self.line;
        let start_col = self.col;
        let Some(ch) = self.advance() else {
            return Token::new(TokenKind::Eof, self.current_span());
        };

        match ch {
            '(' => Token::new(TokenKind::LParen, self.span_from(start_line, start_col)),
            ')' => Token::new(TokenKind::RParen, self.span_from(start_line, start_col)),
            '\'' => Token::new(TokenKind::Quote, self.span_from(start_line, start_col)),
            c if is_reserved(c) => Token::new(
                TokenKind::Instruction(c),
                self.span_from(start_line, start_col),
            ),
            c => self.scan_atom(c, start_line, start_col),
        }
    }

    /// Scan a number or symbol whose first character has been consumed.
    fn scan_atom(&mut self, first: char, start_line: u32, start_col: u32) -> Token {
        let mut text = String::from(first);
        while let Some(ch) = self.peek() {
            if is_delimiter(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }

        let span = self.span_from(start_line, start_col);
        if !looks_numeric(&text) {
            return Token::new(TokenKind::Symbol(text), span);
        }

        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Token::new(TokenKind::Number(value), span),
            _ => {
                self.emit_error(
                    ErrorCode::INVALID_NUMBER,
                    format!("invalid number literal '{text}'"),
                    span,
                );
                Token::new(TokenKind::Number(0.0), span)
            }
        }
    }
}

/// Characters that end an atom.
fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '(' | ')' | '\'' | ';') || is_reserved(ch)
}

/// An atom is numeric if, after an optional sign, it starts with a digit
/// or with `.` and a digit (`-1`, `+.5`, `.25`). A bare `-` or `+` is a
/// symbol, and so is `->`.
fn looks_numeric(text: &str) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let mut chars = unsigned.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}
