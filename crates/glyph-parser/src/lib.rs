//! Glyph parser: converts a token stream into S-expression AST nodes.

mod parse_expr;
mod parser;

pub use parser::{ParseResult, Parser, MAX_NESTING};

use glyph_lexer::Lexer;
use glyph_types::SourceFile;

/// Lex and parse a source file in one step.
///
/// Lexer errors and parser errors are reported together; `exprs` holds
/// every top-level form that parsed cleanly.
pub fn parse_source(source_file: &SourceFile) -> ParseResult {
    let lexed = Lexer::new(source_file).lex();
    let mut result = Parser::new(lexed.tokens, source_file).parse();
    let mut errors = lexed.errors;
    errors.extend(result.errors);
    result.errors = errors;
    result
}
