//! Parser edge cases: malformed input, error recovery, nesting limits.

use glyph_lexer::Lexer;
use glyph_parser::{ParseResult, Parser, MAX_NESTING};
use glyph_types::ast::ExprKind;
use glyph_types::{ErrorCode, SourceFile, Span};

fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("edge.gl", source);
    let lex = Lexer::new(&sf).lex();
    Parser::new(lex.tokens, &sf).parse()
}

fn codes(source: &str) -> Vec<ErrorCode> {
    parse(source).errors.errors.iter().map(|e| e.code).collect()
}

// ── Parens ──────────────────────────────────────────────────────────

#[test]
fn test_unclosed_paren_reports_opening_position() {
    let result = parse("(define x\n  (+ 1 2)");
    assert_eq!(result.errors.errors.len(), 1);
    let err = &result.errors.errors[0];
    assert_eq!(err.code, ErrorCode::UNCLOSED_PAREN);
    assert_eq!(err.span, Span::new(1, 1, 1, 1));
    assert_eq!(err.file, "edge.gl");
    assert!(err.suggestion.is_some());
    assert!(result.exprs.is_empty());
}

#[test]
fn test_every_unclosed_level_is_reported() {
    assert_eq!(
        codes("((a"),
        vec![ErrorCode::UNCLOSED_PAREN, ErrorCode::UNCLOSED_PAREN]
    );
}

#[test]
fn test_stray_close_paren_is_skipped() {
    let result = parse(") (stable)");
    assert_eq!(codes(") (stable)"), vec![ErrorCode::UNEXPECTED_TOKEN]);
    assert_eq!(result.exprs.len(), 1);
}

#[test]
fn test_forms_after_stray_paren_still_parse() {
    let result = parse("(a)) (b) (c)");
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.exprs.len(), 3);
}

// ── Quote ───────────────────────────────────────────────────────────

#[test]
fn test_dangling_quote_at_end() {
    assert_eq!(codes("'"), vec![ErrorCode::DANGLING_QUOTE]);
}

#[test]
fn test_dangling_quote_before_close() {
    let result = parse("(list 1 ')");
    assert_eq!(
        result.errors.errors.iter().map(|e| e.code).collect::<Vec<_>>(),
        vec![ErrorCode::DANGLING_QUOTE]
    );
    // The enclosing list still closes.
    assert_eq!(result.exprs.len(), 1);
    assert_eq!(result.exprs[0].as_list().map(|l| l.len()), Some(2));
}

// ── Nesting ─────────────────────────────────────────────────────────

fn nested(depth: u32) -> String {
    let depth = depth as usize;
    format!("{}1{}", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn test_nesting_at_limit_is_accepted() {
    let result = parse(&nested(MAX_NESTING));
    assert!(!result.errors.has_errors());
    assert_eq!(result.exprs.len(), 1);
}

#[test]
fn test_nesting_beyond_limit_is_rejected_once() {
    let result = parse(&format!("{} (after)", nested(MAX_NESTING + 1)));
    assert_eq!(
        result.errors.errors.iter().map(|e| e.code).collect::<Vec<_>>(),
        vec![ErrorCode::NESTING_LIMIT_EXCEEDED]
    );
    // Recovery resumes after the oversized list.
    assert_eq!(result.exprs.len(), 2);
    assert_eq!(result.exprs[1].to_string(), "(after)");
}

#[test]
fn test_quote_chain_counts_toward_nesting() {
    let result = parse(&format!("{}x (after)", "'".repeat(5_000)));
    assert_eq!(
        result.errors.errors.iter().map(|e| e.code).collect::<Vec<_>>(),
        vec![ErrorCode::NESTING_LIMIT_EXCEEDED]
    );
    // The whole chain is skipped; parsing resumes at the next form.
    assert_eq!(result.exprs.len(), 1);
    assert_eq!(result.exprs[0].to_string(), "(after)");
}

#[test]
fn test_quotes_and_lists_share_nesting_budget() {
    let half = (MAX_NESTING / 2) as usize;
    let at_limit = format!("{}{}1{}", "'".repeat(half), "(".repeat(half), ")".repeat(half));
    assert!(!parse(&at_limit).errors.has_errors());

    let over = format!("'{at_limit}");
    assert_eq!(codes(&over), vec![ErrorCode::NESTING_LIMIT_EXCEEDED]);
}

// ── Recovery & limits ───────────────────────────────────────────────

#[test]
fn test_error_cap() {
    let source = ") ".repeat(40);
    let result = parse(&source);
    assert_eq!(result.errors.errors.len(), glyph_types::MAX_ERRORS);
}

#[test]
fn test_empty_source() {
    let result = parse("");
    assert!(result.exprs.is_empty());
    assert!(!result.errors.has_errors());
}

#[test]
fn test_only_comments() {
    let result = parse("; nothing here\n;; or here");
    assert!(result.exprs.is_empty());
    assert!(!result.errors.has_errors());
}

#[test]
fn test_reserved_code_point_in_operator_position() {
    let result = parse("(\u{E0FF} 1 2)");
    assert!(!result.errors.has_errors());
    let items = result.exprs[0].as_list().expect("list");
    assert_eq!(items[0].kind, ExprKind::Reserved('\u{E0FF}'));
}
