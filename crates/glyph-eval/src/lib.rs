//! Glyph tree-walking evaluator.
//!
//! Evaluates parsed S-expressions against a scoped [`Environment`],
//! producing a [`Value`] and appending [`Fire`] events to a queue owned by
//! the [`Evaluator`]. Each evaluator also owns one [`MotionState`] and
//! shares an escalation policy through a [`glyph_policy::PolicyHandle`].

mod axis;
mod config;
mod env;
mod error;
mod evaluator;
mod fire;
mod primitives;
mod scopes;
mod value;

pub use axis::{Axis, AxisRegister, MotionState};
pub use config::EvalConfig;
pub use env::{Env, Environment};
pub use error::{EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use fire::Fire;
pub use value::{round6, Lambda, Value};
