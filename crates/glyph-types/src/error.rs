use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors reported before fail-fast.
pub const MAX_ERRORS: usize = 20;

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Structure,
}

/// Numeric error code (E100–E699).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNCLOSED_PAREN: Self = Self(101);
    pub const INVALID_NUMBER: Self = Self(102);
    pub const DANGLING_QUOTE: Self = Self(103);

    // ── Structure errors (E600–E699) ──
    pub const NESTING_LIMIT_EXCEEDED: Self = Self(600);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            600..=699 => ErrorCategory::Structure,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured syntax error.
///
/// Hosts render these directly; they must not parse free-form strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphError {
    /// Source name (file name, or a label such as `<observe#2>`).
    pub file: String,
    /// Error code (e.g., E101).
    pub code: ErrorCode,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Source location.
    #[serde(flatten)]
    pub span: Span,
    /// The exact source line for context.
    pub source_line: String,
    /// Optional fix suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl GlyphError {
    /// Create a new error.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    /// Attach a fix suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for GlyphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for GlyphError {}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Structure => write!(f, "structure"),
        }
    }
}

/// Errors collected by one lexer or parser run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<GlyphError>,
    pub total_errors: usize,
}

impl CompileErrors {
    /// Create an empty result (no errors).
    pub fn empty() -> Self {
        Self {
            errors: Vec::new(),
            total_errors: 0,
        }
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Add an error, respecting the MAX_ERRORS limit.
    pub fn push_error(&mut self, error: GlyphError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    /// Move every error from `other` into `self`.
    pub fn extend(&mut self, other: CompileErrors) {
        // Errors past the cap in `other` were counted but not stored.
        let uncounted = other.total_errors.saturating_sub(other.errors.len());
        for err in other.errors {
            self.push_error(err);
        }
        self.total_errors += uncounted;
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for err in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
            first = false;
        }
        if self.total_errors > self.errors.len() {
            write!(f, " (+{} more)", self.total_errors - self.errors.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_category() {
        assert_eq!(
            ErrorCode::UNEXPECTED_TOKEN.category(),
            ErrorCategory::Syntax
        );
        assert_eq!(ErrorCode::INVALID_NUMBER.category(), ErrorCategory::Syntax);
        assert_eq!(
            ErrorCode::NESTING_LIMIT_EXCEEDED.category(),
            ErrorCategory::Structure
        );
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::UNCLOSED_PAREN), "E101");
        assert_eq!(format!("{}", ErrorCode::UNEXPECTED_TOKEN), "E100");
    }

    #[test]
    fn test_glyph_error_creation() {
        let err = GlyphError::new(
            "sample.gl",
            ErrorCode::UNCLOSED_PAREN,
            "unclosed '('",
            Span::new(3, 1, 3, 9),
            "(+ 1 2",
        );
        assert_eq!(err.code, ErrorCode::UNCLOSED_PAREN);
        assert_eq!(err.category, ErrorCategory::Syntax);
        assert_eq!(format!("{err}"), "3:1: E101 [syntax] unclosed '('");
    }

    #[test]
    fn test_glyph_error_with_suggestion() {
        let err = GlyphError::new(
            "sample.gl",
            ErrorCode::DANGLING_QUOTE,
            "quote without datum",
            Span::new(1, 1, 1, 1),
            "'",
        )
        .with_suggestion("write '(a b) or 'name");
        assert_eq!(err.suggestion.as_deref(), Some("write '(a b) or 'name"));
    }

    #[test]
    fn test_glyph_error_json_serialization() {
        let err = GlyphError::new(
            "sample.gl",
            ErrorCode::INVALID_NUMBER,
            "invalid number literal '1.2.3'",
            Span::new(2, 4, 2, 8),
            "(+ 1.2.3 4)",
        );

        let json = serde_json::to_string_pretty(&err).unwrap();
        assert!(json.contains("\"code\""));
        assert!(json.contains("\"message\""));
        assert!(json.contains("\"source_line\""));
        assert!(!json.contains("\"suggestion\""));
        assert!(json.contains("\"line\""));
        assert!(json.contains("\"end_column\""));

        let deserialized: GlyphError = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, err);
    }

    #[test]
    fn test_compile_errors_max_limit() {
        let mut errs = CompileErrors::empty();
        for i in 0..25 {
            errs.push_error(GlyphError::new(
                "sample.gl",
                ErrorCode::UNEXPECTED_TOKEN,
                format!("Error {i}"),
                Span::point(i as u32 + 1, 1),
                "",
            ));
        }
        assert_eq!(errs.errors.len(), 20);
        assert_eq!(errs.total_errors, 25);
        assert!(errs.has_errors());
        assert!(format!("{errs}").ends_with("(+5 more)"));
    }

    #[test]
    fn test_compile_errors_extend() {
        let mut a = CompileErrors::empty();
        let mut b = CompileErrors::empty();
        b.push_error(GlyphError::new(
            "sample.gl",
            ErrorCode::UNEXPECTED_TOKEN,
            "unexpected ')'",
            Span::point(1, 1),
            ")",
        ));
        a.extend(b);
        assert_eq!(a.total_errors, 1);
        assert_eq!(a.errors.len(), 1);
    }

    #[test]
    fn test_compile_errors_empty() {
        let errs = CompileErrors::empty();
        assert!(!errs.has_errors());
        assert_eq!(errs.total_errors, 0);
    }
}
