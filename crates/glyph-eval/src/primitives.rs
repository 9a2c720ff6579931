//! Primitive instructions applied to evaluated arguments.
//!
//! One exhaustive match keyed by [`Opcode`]. Every numeric result goes
//! through [`Value::num`]; NaN or infinite results trap.

use glyph_types::{Category, Opcode};

use crate::axis::Axis;
use crate::error::{EvalError, EvalResult};
use crate::evaluator::{constant, Evaluator};
use crate::value::{round6, Value};

impl Evaluator {
    pub(crate) fn call_primitive(&mut self, op: Opcode, args: Vec<Value>) -> EvalResult<Value> {
        match op.category() {
            Category::Arithmetic => arithmetic(op, &args),
            Category::Comparison => comparison(op, &args),
            Category::Logic => match op {
                Opcode::Not => {
                    exactly(op, &args, 1)?;
                    Ok(Value::Bool(!args[0].is_truthy()))
                }
                // `and`/`or` reach here only as first-class values.
                _ => Err(special_form(op)),
            },
            Category::List => list_op(op, args),
            Category::Control => match op {
                Opcode::Apply => self.apply(args),
                _ => Err(special_form(op)),
            },
            Category::Constant => {
                exactly(op, &args, 0)?;
                Ok(constant(op).unwrap_or(Value::Nil))
            }
            Category::Trig => trig(op, &args),
            Category::Axis => self.axis_op(op, &args),
            Category::Rate => self.rate_op(op, &args),
            Category::State | Category::Ema | Category::Hawkes | Category::PhaseModel => {
                self.trigger(op, &args)
            }
            Category::Tier => match op {
                Opcode::TierRead => {
                    exactly(op, &args, 0)?;
                    Ok(Value::num(f64::from(self.tier().get())))
                }
                _ => self.trigger(op, &args),
            },
        }
    }

    /// `(apply f list)`
    fn apply(&mut self, mut args: Vec<Value>) -> EvalResult<Value> {
        exactly(Opcode::Apply, &args, 2)?;
        let list = args.pop().unwrap_or(Value::Nil);
        let callee = args.pop().unwrap_or(Value::Nil);
        match list {
            Value::List(items) => self.call(callee, items),
            other => Err(EvalError::TypeError(format!(
                "apply expects a list of arguments, got {}",
                other.type_name()
            ))),
        }
    }

    fn axis_op(&mut self, op: Opcode, args: &[Value]) -> EvalResult<Value> {
        match op {
            Opcode::AxisSet => {
                exactly(op, args, 2)?;
                let axis = axis_of(&args[0])?;
                let value = number(op, &args[1])?;
                Ok(Value::num(self.motion.set(axis, value)))
            }
            Opcode::AxisDelta => {
                exactly(op, args, 1)?;
                let axis = axis_of(&args[0])?;
                Ok(Value::num(self.motion.take_delta(axis)))
            }
            Opcode::AxisGet => {
                exactly(op, args, 1)?;
                let axis = axis_of(&args[0])?;
                Ok(Value::num(self.motion.get(axis)))
            }
            Opcode::SetX | Opcode::SetY | Opcode::SetZ => {
                exactly(op, args, 1)?;
                let value = number(op, &args[0])?;
                Ok(Value::num(self.motion.set(fixed_axis(op), value)))
            }
            Opcode::DeltaX | Opcode::DeltaY | Opcode::DeltaZ => {
                exactly(op, args, 0)?;
                Ok(Value::num(self.motion.take_delta(fixed_axis(op))))
            }
            _ => {
                exactly(op, args, 0)?;
                Ok(Value::num(self.motion.get(fixed_axis(op))))
            }
        }
    }

    fn rate_op(&mut self, op: Opcode, args: &[Value]) -> EvalResult<Value> {
        match op {
            Opcode::Rate => {
                exactly(op, args, 0)?;
                Ok(Value::num(self.motion.rate_magnitude()))
            }
            Opcode::RatePer => {
                exactly(op, args, 1)?;
                let seconds = number(op, &args[0])?;
                if seconds <= 0.0 {
                    return Err(EvalError::ArithmeticTrap(format!(
                        "rate-per needs a positive interval, got {}",
                        args[0]
                    )));
                }
                finite(op, self.motion.rate_magnitude() / seconds)
            }
            _ => {
                at_least(op, args, 1)?;
                let sum = numbers(op, args)?.iter().map(|x| x * x).sum::<f64>();
                finite(op, sum.sqrt())
            }
        }
    }

    /// Trigger instructions take an optional numeric payload.
    fn trigger(&mut self, op: Opcode, args: &[Value]) -> EvalResult<Value> {
        let value = match args {
            [] => None,
            [v] => Some(round6(number(op, v)?)),
            _ => return Err(EvalError::arity(op.name(), "0 or 1", args.len())),
        };
        Ok(self.emit(op, value))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Pure primitives
// ══════════════════════════════════════════════════════════════════════════════

fn arithmetic(op: Opcode, args: &[Value]) -> EvalResult<Value> {
    let xs = numbers(op, args)?;
    let result: f64 = match op {
        Opcode::Add => xs.iter().sum(),
        Opcode::Mul => xs.iter().product(),
        Opcode::Sub => match xs.as_slice() {
            [] => return Err(EvalError::arity(op.name(), "at least 1", 0)),
            [x] => -x,
            [first, rest @ ..] => rest.iter().fold(*first, |acc, x| acc - x),
        },
        Opcode::Div => match xs.as_slice() {
            [] => return Err(EvalError::arity(op.name(), "at least 1", 0)),
            [x] => divide(1.0, *x)?,
            [first, rest @ ..] => {
                let mut acc = *first;
                for x in rest {
                    acc = divide(acc, *x)?;
                }
                acc
            }
        },
        Opcode::Mod => {
            let [a, b] = two(op, &xs)?;
            if b == 0.0 {
                return Err(EvalError::ArithmeticTrap("modulo by zero".into()));
            }
            a % b
        }
        Opcode::Abs => one(op, &xs)?.abs(),
        Opcode::Min => {
            at_least(op, args, 1)?;
            xs.iter().copied().fold(f64::INFINITY, f64::min)
        }
        Opcode::Max => {
            at_least(op, args, 1)?;
            xs.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
        Opcode::Sqrt => {
            let x = one(op, &xs)?;
            if x < 0.0 {
                return Err(EvalError::ArithmeticTrap(format!(
                    "sqrt of negative number {}",
                    Value::num(x)
                )));
            }
            x.sqrt()
        }
        _ => {
            let [base, exp] = two(op, &xs)?;
            base.powf(exp)
        }
    };
    finite(op, result)
}

fn divide(a: f64, b: f64) -> EvalResult<f64> {
    if b == 0.0 {
        Err(EvalError::ArithmeticTrap("division by zero".into()))
    } else {
        Ok(a / b)
    }
}

fn comparison(op: Opcode, args: &[Value]) -> EvalResult<Value> {
    match op {
        Opcode::Eq => {
            at_least(op, args, 2)?;
            Ok(Value::Bool(args.windows(2).all(|w| w[0] == w[1])))
        }
        Opcode::Ne => {
            exactly(op, args, 2)?;
            Ok(Value::Bool(args[0] != args[1]))
        }
        _ => {
            at_least(op, args, 2)?;
            let xs = numbers(op, args)?;
            let holds: fn(f64, f64) -> bool = match op {
                Opcode::Lt => |a, b| a < b,
                Opcode::Le => |a, b| a <= b,
                Opcode::Gt => |a, b| a > b,
                _ => |a, b| a >= b,
            };
            Ok(Value::Bool(xs.windows(2).all(|w| holds(w[0], w[1]))))
        }
    }
}

fn list_op(op: Opcode, mut args: Vec<Value>) -> EvalResult<Value> {
    if op == Opcode::List {
        return Ok(Value::List(args));
    }
    match op {
        Opcode::Cons => {
            exactly(op, &args, 2)?;
            let tail = args.pop().unwrap_or(Value::Nil);
            let head = args.pop().unwrap_or(Value::Nil);
            match tail {
                Value::List(tail) => {
                    let mut items = Vec::with_capacity(tail.len() + 1);
                    items.push(head);
                    items.extend(tail);
                    Ok(Value::List(items))
                }
                other => Err(expected_list(op, &other)),
            }
        }
        Opcode::Nth => {
            exactly(op, &args, 2)?;
            let items = list(op, &args[0])?;
            let index = number(op, &args[1])?;
            if index.fract() != 0.0 {
                return Err(EvalError::TypeError(format!(
                    "nth index must be an integer, got {}",
                    args[1]
                )));
            }
            if index < 0.0 {
                return Ok(Value::Nil);
            }
            Ok(items.get(index as usize).cloned().unwrap_or(Value::Nil))
        }
        _ => {
            exactly(op, &args, 1)?;
            let items = list(op, &args[0])?;
            Ok(match op {
                Opcode::Head => items.first().cloned().unwrap_or(Value::Nil),
                Opcode::Tail => Value::List(items.iter().skip(1).cloned().collect()),
                Opcode::Len => Value::num(items.len() as f64),
                _ => Value::Bool(items.is_empty()),
            })
        }
    }
}

fn trig(op: Opcode, args: &[Value]) -> EvalResult<Value> {
    if op == Opcode::Atan2 {
        let xs = numbers(op, args)?;
        let [y, x] = two(op, &xs)?;
        return finite(op, y.atan2(x));
    }
    exactly(op, args, 1)?;
    let x = number(op, &args[0])?;
    let result = match op {
        Opcode::Sin => x.sin(),
        Opcode::Cos => x.cos(),
        Opcode::Tan => x.tan(),
        Opcode::Asin | Opcode::Acos if !(-1.0..=1.0).contains(&x) => {
            return Err(EvalError::ArithmeticTrap(format!(
                "{op} argument {} outside [-1, 1]",
                args[0]
            )));
        }
        Opcode::Asin => x.asin(),
        Opcode::Acos => x.acos(),
        Opcode::Atan => x.atan(),
        Opcode::Rad => x.to_radians(),
        _ => x.to_degrees(),
    };
    finite(op, result)
}

// ══════════════════════════════════════════════════════════════════════════════
// Argument helpers
// ══════════════════════════════════════════════════════════════════════════════

fn exactly(op: Opcode, args: &[Value], n: usize) -> EvalResult<()> {
    if args.len() == n {
        Ok(())
    } else {
        Err(EvalError::arity(op.name(), n.to_string(), args.len()))
    }
}

fn at_least(op: Opcode, args: &[Value], n: usize) -> EvalResult<()> {
    if args.len() >= n {
        Ok(())
    } else {
        Err(EvalError::arity(op.name(), format!("at least {n}"), args.len()))
    }
}

fn one(op: Opcode, xs: &[f64]) -> EvalResult<f64> {
    match xs {
        [x] => Ok(*x),
        _ => Err(EvalError::arity(op.name(), "1", xs.len())),
    }
}

fn two(op: Opcode, xs: &[f64]) -> EvalResult<[f64; 2]> {
    match xs {
        [a, b] => Ok([*a, *b]),
        _ => Err(EvalError::arity(op.name(), "2", xs.len())),
    }
}

fn number(op: Opcode, value: &Value) -> EvalResult<f64> {
    value.as_num().ok_or_else(|| {
        EvalError::TypeError(format!(
            "'{op}' expects a number, got {}",
            value.type_name()
        ))
    })
}

fn numbers(op: Opcode, args: &[Value]) -> EvalResult<Vec<f64>> {
    args.iter().map(|v| number(op, v)).collect()
}

fn list(op: Opcode, value: &Value) -> EvalResult<&[Value]> {
    value.as_list().ok_or_else(|| expected_list(op, value))
}

fn expected_list(op: Opcode, value: &Value) -> EvalError {
    EvalError::TypeError(format!(
        "'{op}' expects a list, got {}",
        value.type_name()
    ))
}

fn finite(op: Opcode, x: f64) -> EvalResult<Value> {
    if x.is_finite() {
        Ok(Value::num(x))
    } else {
        Err(EvalError::ArithmeticTrap(format!(
            "'{op}' produced NaN/Infinity"
        )))
    }
}

fn special_form(op: Opcode) -> EvalError {
    EvalError::TypeError(format!("special form '{op}' cannot be applied"))
}

/// Axis designator: `0`, `1`, `2` or the symbols `x`, `y`, `z`.
fn axis_of(value: &Value) -> EvalResult<Axis> {
    let axis = match value {
        Value::Num(n) if n.fract() == 0.0 && *n >= 0.0 => Axis::from_index(*n as usize),
        Value::Num(_) => None,
        Value::Symbol(name) => Axis::from_name(name),
        other => {
            return Err(EvalError::TypeError(format!(
                "axis must be a number or symbol, got {}",
                other.type_name()
            )))
        }
    };
    axis.ok_or_else(|| EvalError::AxisIndex(value.to_string()))
}

fn fixed_axis(op: Opcode) -> Axis {
    match op {
        Opcode::SetX | Opcode::DeltaX | Opcode::GetX => Axis::X,
        Opcode::SetY | Opcode::DeltaY | Opcode::GetY => Axis::Y,
        _ => Axis::Z,
    }
}
