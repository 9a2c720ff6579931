//! Runtime error types for the Glyph evaluator.

use glyph_types::{CompileErrors, UnknownInstruction};
use thiserror::Error;

/// Evaluation error.
///
/// Errors abort the expression being evaluated. Side effects that happened
/// before the failure remain, including queued fires.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A reserved code point with no assigned instruction.
    #[error(transparent)]
    UnknownInstruction(#[from] UnknownInstruction),

    /// Lookup miss across the whole scope chain.
    #[error("unbound symbol '{0}'")]
    UnboundSymbol(String),

    /// Wrong argument count to an instruction or lambda.
    #[error("{op}: expected {expected} argument(s), got {got}")]
    Arity {
        op: String,
        expected: String,
        got: usize,
    },

    /// Operand of the wrong value kind.
    #[error("type error: {0}")]
    TypeError(String),

    /// Reference to an axis other than x, y or z.
    #[error("no such axis: {0}")]
    AxisIndex(String),

    /// Division by zero, domain error, NaN or infinite result.
    #[error("arithmetic trap: {0}")]
    ArithmeticTrap(String),

    #[error("gas exhausted")]
    GasExhausted,

    /// Lambda calls nested past `max_depth`, or evaluation nested past
    /// `max_nesting`.
    #[error("maximum depth of {0} exceeded")]
    DepthExceeded(u32),

    /// Source text failed to lex or parse.
    #[error("syntax error: {0}")]
    Syntax(CompileErrors),
}

impl EvalError {
    pub(crate) fn arity(op: impl Into<String>, expected: impl Into<String>, got: usize) -> Self {
        Self::Arity {
            op: op.into(),
            expected: expected.into(),
            got,
        }
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            EvalError::from(UnknownInstruction('\u{E0FF}')).to_string(),
            "unknown instruction U+E0FF"
        );
        assert_eq!(
            EvalError::arity("lambda", "1", 2).to_string(),
            "lambda: expected 1 argument(s), got 2"
        );
        assert_eq!(
            EvalError::UnboundSymbol("x".into()).to_string(),
            "unbound symbol 'x'"
        );
        assert_eq!(
            EvalError::DepthExceeded(64).to_string(),
            "maximum depth of 64 exceeded"
        );
    }
}
