//! Shared types for the Glyph interpreter.
//!
//! This crate defines the instruction set table, AST node types, source
//! spans, syntax errors, configuration loading and the clock abstraction
//! used across all interpreter stages.

mod error;
mod span;
pub mod ast;
pub mod clock;
pub mod config;
pub mod opcode;

pub use clock::{Clock, ManualClock, MonotonicClock, SharedClock};
pub use config::{ConfigError, LoadConfig};
pub use error::{CompileErrors, ErrorCategory, ErrorCode, GlyphError, MAX_ERRORS};
pub use opcode::{Band, Category, Opcode, UnknownInstruction};
pub use span::{SourceFile, Span};

/// Result type used by the lexer and parser.
pub type Result<T> = std::result::Result<T, GlyphError>;
