//! Runtime values.

use glyph_types::ast::Expr;
use glyph_types::Opcode;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::env::Env;
use crate::fire::Fire;

const SCALE: f64 = 1_000_000.0;
/// Below this scaled magnitude, scaling then unscaling recovers the same
/// integer, which keeps rounding idempotent.
const EXACT_LIMIT: f64 = 1_125_899_906_842_624.0; // 2^50

/// Round to 6 decimal places, halves away from zero.
///
/// `-0.0` becomes `0.0`. Non-finite values, and values too large to carry
/// six decimals, are returned unchanged. Idempotent.
pub fn round6(x: f64) -> f64 {
    let scaled = x * SCALE;
    if !scaled.is_finite() || scaled.abs() >= EXACT_LIMIT {
        return x;
    }
    let rounded = scaled.round() / SCALE;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// A closure: parameter names, body forms and the captured scope.
pub struct Lambda {
    pub params: Vec<Rc<str>>,
    pub body: Vec<Expr>,
    /// Shared with the defining scope, not copied.
    pub env: Env,
}

impl Lambda {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Debug for Lambda {
    // The captured environment may contain this lambda.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("params", &self.params)
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}

/// A Glyph runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    /// A number rounded to 6 decimals.
    ///
    /// Build with [`Value::num`]. A directly constructed `Num` may hold an
    /// unrounded value until it is bound in a scope; equality and
    /// arithmetic round their operands either way.
    Num(f64),
    Symbol(Rc<str>),
    List(Vec<Value>),
    Lambda(Rc<Lambda>),
    Fire(Rc<Fire>),
    /// An instruction used as data or as a first-class primitive.
    Opcode(Opcode),
}

impl Value {
    /// A number, rounded to 6 decimals.
    pub fn num(x: f64) -> Self {
        Value::Num(round6(x))
    }

    pub fn symbol(name: &str) -> Self {
        Value::Symbol(Rc::from(name))
    }

    /// Only `nil` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_fire(&self) -> Option<&Fire> {
        match self {
            Value::Fire(fire) => Some(fire),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Num(_) => "number",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Lambda(_) => "lambda",
            Value::Fire(_) => "fire",
            Value::Opcode(_) => "opcode",
        }
    }
}

impl PartialEq for Value {
    /// Structural, except closures and fires compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => round6(*a) == round6(*b),
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Lambda(a), Value::Lambda(b)) => Rc::ptr_eq(a, b),
            (Value::Fire(a), Value::Fire(b)) => Rc::ptr_eq(a, b),
            (Value::Opcode(a), Value::Opcode(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for Value {
    /// Numbers by value, lists lexicographically; anything else is unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Num(a), Value::Num(b)) => round6(*a).partial_cmp(&round6(*b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    match x.partial_cmp(y)? {
                        Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => fmt_num(*n, f),
            Value::Symbol(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Value::Lambda(l) => write!(f, "<lambda/{}>", l.arity()),
            Value::Fire(fire) => write!(f, "{fire}"),
            Value::Opcode(op) => write!(f, "{op}"),
        }
    }
}

pub(crate) fn fmt_num(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{n}")
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::num(x)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
