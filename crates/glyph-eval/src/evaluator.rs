//! Core expression evaluator: special forms, calls, and the fire queue.

use glyph_parser::parse_source;
use glyph_policy::{EscalationPolicy, PolicyConfig, PolicyHandle, Tier};
use glyph_types::ast::{Expr, ExprKind};
use glyph_types::{MonotonicClock, Opcode, SharedClock, SourceFile};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

use crate::axis::{Axis, MotionState};
use crate::config::EvalConfig;
use crate::env::{Env, Environment};
use crate::error::{EvalError, EvalResult};
use crate::fire::Fire;
use crate::scopes::ScopeRegistry;
use crate::value::{Lambda, Value};

/// The tree-walking evaluator.
///
/// Owns a global scope, one [`MotionState`] and a fire queue. The tier
/// lives in a [`PolicyHandle`] that may be shared with other evaluators.
pub struct Evaluator {
    config: EvalConfig,
    global: Env,
    pub(crate) motion: MotionState,
    fires: Vec<Fire>,
    pub(crate) policy: PolicyHandle,
    clock: SharedClock,
    /// Steps taken by the current top-level evaluation.
    gas: u64,
    /// Current lambda call nesting.
    depth: u32,
    /// Current `eval` nesting.
    nesting: u32,
    /// Every child scope this evaluator created.
    scopes: ScopeRegistry,
}

impl Evaluator {
    /// An evaluator with its own default policy, both on a wall-time clock.
    pub fn new(config: EvalConfig) -> Self {
        let clock = MonotonicClock::shared();
        let policy = EscalationPolicy::with_clock(PolicyConfig::default(), Arc::clone(&clock));
        Self::with_policy(config, PolicyHandle::new(policy), clock)
    }

    /// An evaluator that reports to an existing policy and reads `clock`
    /// for fire timestamps.
    pub fn with_policy(config: EvalConfig, policy: PolicyHandle, clock: SharedClock) -> Self {
        Self {
            config,
            global: Environment::global(),
            motion: MotionState::new(),
            fires: Vec::new(),
            policy,
            clock,
            gas: 0,
            depth: 0,
            nesting: 0,
            scopes: ScopeRegistry::new(),
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Evaluate one top-level expression in `env`.
    ///
    /// Resets the gas meter. On failure, fires queued before the failing
    /// sub-expression stay queued.
    pub fn evaluate(&mut self, expr: &Expr, env: &Env) -> EvalResult<Value> {
        self.gas = 0;
        self.depth = 0;
        self.nesting = 0;
        let result = self.eval(expr, env);
        trace!(gas = self.gas, ok = result.is_ok(), "evaluated");
        if self.scopes.should_collect() {
            self.collect_scopes();
        }
        result
    }

    /// Parse `source` and evaluate every top-level form in the global
    /// scope. Returns the last value, or nil for empty source.
    #[instrument(skip_all, fields(len = source.len()))]
    pub fn eval_source(&mut self, source: &str) -> EvalResult<Value> {
        let file = SourceFile::new("<input>", source);
        let parsed = parse_source(&file);
        if parsed.errors.has_errors() {
            debug!(errors = parsed.errors.total_errors, "source rejected");
            return Err(EvalError::Syntax(parsed.errors));
        }
        let global = Rc::clone(&self.global);
        let mut last = Value::Nil;
        for expr in &parsed.exprs {
            last = self.evaluate(expr, &global)?;
        }
        Ok(last)
    }

    /// Drain the fire queue in emission order.
    pub fn take_fires(&mut self) -> Vec<Fire> {
        std::mem::take(&mut self.fires)
    }

    pub fn axis_set(&mut self, axis: Axis, value: f64) -> f64 {
        self.motion.set(axis, value)
    }

    /// Pending delta on `axis`; consumes it.
    pub fn axis_delta(&mut self, axis: Axis) -> f64 {
        self.motion.take_delta(axis)
    }

    pub fn axis_get(&self, axis: Axis) -> f64 {
        self.motion.get(axis)
    }

    pub fn rate_magnitude(&self) -> f64 {
        self.motion.rate_magnitude()
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn tier(&self) -> Tier {
        self.policy.tier()
    }

    pub fn policy(&self) -> &PolicyHandle {
        &self.policy
    }

    pub fn global(&self) -> &Env {
        &self.global
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Clock used for fire timestamps.
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Steps used by the most recent top-level evaluation.
    pub fn gas_used(&self) -> u64 {
        self.gas
    }

    /// Child scopes created by this evaluator that are still allocated.
    pub fn live_scopes(&self) -> usize {
        self.scopes.live()
    }

    /// Free scopes kept alive only by closures stored inside them.
    ///
    /// Runs automatically after a top-level evaluation once enough scopes
    /// have been created. Returns how many scopes were cleared.
    pub fn collect_scopes(&mut self) -> usize {
        let cleared = self.scopes.collect();
        debug!(cleared, live = self.scopes.live(), "scopes collected");
        cleared
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Consume one unit of gas. Returns error if exhausted.
    fn consume_gas(&mut self) -> EvalResult<()> {
        self.gas += 1;
        if self.gas > self.config.gas_limit {
            Err(EvalError::GasExhausted)
        } else {
            Ok(())
        }
    }

    pub(crate) fn eval(&mut self, expr: &Expr, env: &Env) -> EvalResult<Value> {
        self.consume_gas()?;
        if self.nesting >= self.config.max_nesting {
            return Err(EvalError::DepthExceeded(self.config.max_nesting));
        }
        self.nesting += 1;
        let result = self.eval_kind(expr, env);
        self.nesting -= 1;
        result
    }

    fn eval_kind(&mut self, expr: &Expr, env: &Env) -> EvalResult<Value> {
        match &expr.kind {
            ExprKind::Number(n) => {
                if n.is_finite() {
                    Ok(Value::num(*n))
                } else {
                    Err(EvalError::ArithmeticTrap("non-finite literal".into()))
                }
            }
            ExprKind::Symbol(name) => env
                .get(name)
                .ok_or_else(|| EvalError::UnboundSymbol(name.clone())),
            ExprKind::Op(op) => Ok(op_value(*op)),
            ExprKind::Reserved(c) => Err(glyph_types::UnknownInstruction(*c).into()),
            ExprKind::Quote(datum) => quote(datum),
            ExprKind::List(items) => self.eval_list(items, env),
        }
    }

    fn eval_list(&mut self, items: &[Expr], env: &Env) -> EvalResult<Value> {
        let Some((head, args)) = items.split_first() else {
            return Ok(Value::List(Vec::new()));
        };

        if let ExprKind::Op(op) = head.kind {
            if op.is_special_form() {
                return self.eval_special(op, args, env);
            }
            let values = self.eval_args(args, env)?;
            return self.call_primitive(op, values);
        }

        let callee = self.eval(head, env)?;
        let values = self.eval_args(args, env)?;
        self.call(callee, values)
    }

    fn eval_args(&mut self, args: &[Expr], env: &Env) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, env)?);
        }
        Ok(values)
    }

    /// Evaluate forms in order and return the last value (nil when empty).
    fn eval_body(&mut self, body: &[Expr], env: &Env) -> EvalResult<Value> {
        let mut last = Value::Nil;
        for expr in body {
            last = self.eval(expr, env)?;
        }
        Ok(last)
    }

    // ── Special forms ────────────────────────────────────────────────────

    fn eval_special(&mut self, op: Opcode, args: &[Expr], env: &Env) -> EvalResult<Value> {
        match op {
            Opcode::If => self.eval_if(args, env),
            Opcode::Cond => self.eval_cond(args, env),
            Opcode::Let => self.eval_let(args, env),
            Opcode::Lambda => eval_lambda(args, env),
            Opcode::Quote => match args {
                [datum] => quote(datum),
                _ => Err(EvalError::arity(op.name(), "1", args.len())),
            },
            Opcode::Define => self.eval_define(args, env),
            Opcode::Begin => self.eval_body(args, env),
            Opcode::And => {
                for arg in args {
                    if !self.eval(arg, env)?.is_truthy() {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Opcode::Or => {
                for arg in args {
                    if self.eval(arg, env)?.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }
            _ => Err(EvalError::TypeError(format!("'{op}' is not a special form"))),
        }
    }

    /// `(if test then [else])`
    fn eval_if(&mut self, args: &[Expr], env: &Env) -> EvalResult<Value> {
        let (test, then, otherwise) = match args {
            [test, then] => (test, then, None),
            [test, then, otherwise] => (test, then, Some(otherwise)),
            _ => return Err(EvalError::arity("if", "2 or 3", args.len())),
        };
        if self.eval(test, env)?.is_truthy() {
            self.eval(then, env)
        } else if let Some(otherwise) = otherwise {
            self.eval(otherwise, env)
        } else {
            Ok(Value::Nil)
        }
    }

    /// `(cond (test body...)... [(else body...)])`
    ///
    /// A clause with no body yields its test value.
    fn eval_cond(&mut self, clauses: &[Expr], env: &Env) -> EvalResult<Value> {
        for clause in clauses {
            let Some((test, body)) = clause.as_list().and_then(<[Expr]>::split_first) else {
                return Err(EvalError::TypeError(format!(
                    "cond clause must be a non-empty list, got {clause}"
                )));
            };
            let value = if test.as_symbol() == Some("else") {
                Value::Bool(true)
            } else {
                self.eval(test, env)?
            };
            if value.is_truthy() {
                return if body.is_empty() {
                    Ok(value)
                } else {
                    self.eval_body(body, env)
                };
            }
        }
        Ok(Value::Nil)
    }

    /// `(let ((name value)...) body...)`
    ///
    /// Bindings are evaluated in order inside the new scope, so later ones
    /// see and may shadow earlier ones.
    fn eval_let(&mut self, args: &[Expr], env: &Env) -> EvalResult<Value> {
        let Some((bindings, body)) = args.split_first() else {
            return Err(EvalError::arity("let", "at least 1", 0));
        };
        let Some(bindings) = bindings.as_list() else {
            return Err(EvalError::TypeError(format!(
                "let bindings must be a list, got {bindings}"
            )));
        };
        let scope = self.scopes.child(env);
        for binding in bindings {
            let (name, value) = match binding.as_list() {
                Some([name, value]) => match name.as_symbol() {
                    Some(name) => (name, value),
                    None => {
                        return Err(EvalError::TypeError(format!(
                            "let binding name must be a symbol, got {name}"
                        )))
                    }
                },
                _ => {
                    return Err(EvalError::TypeError(format!(
                        "let binding must be (name value), got {binding}"
                    )))
                }
            };
            let value = self.eval(value, &scope)?;
            scope.define(name, value);
        }
        self.eval_body(body, &scope)
    }

    /// `(define name value)`: binds in the current scope, returns the value.
    fn eval_define(&mut self, args: &[Expr], env: &Env) -> EvalResult<Value> {
        let [name, value] = args else {
            return Err(EvalError::arity("define", "2", args.len()));
        };
        let Some(name) = name.as_symbol() else {
            return Err(EvalError::TypeError(format!(
                "define expects a symbol name, got {name}"
            )));
        };
        let value = self.eval(value, env)?;
        env.define(name, value.clone());
        Ok(value)
    }

    // ── Calls ─────────────────────────────────────────────────────────────

    /// Call a lambda or a first-class primitive with evaluated arguments.
    pub(crate) fn call(&mut self, callee: Value, args: Vec<Value>) -> EvalResult<Value> {
        match callee {
            Value::Lambda(lambda) => self.call_lambda(&lambda, args),
            Value::Opcode(op) if op.is_special_form() => Err(EvalError::TypeError(format!(
                "special form '{op}' cannot be applied"
            ))),
            Value::Opcode(op) => self.call_primitive(op, args),
            other => Err(EvalError::TypeError(format!(
                "cannot call {} '{other}'",
                other.type_name()
            ))),
        }
    }

    fn call_lambda(&mut self, lambda: &Rc<Lambda>, args: Vec<Value>) -> EvalResult<Value> {
        if args.len() != lambda.arity() {
            return Err(EvalError::arity(
                "lambda",
                lambda.arity().to_string(),
                args.len(),
            ));
        }
        if self.depth >= self.config.max_depth {
            return Err(EvalError::DepthExceeded(self.config.max_depth));
        }
        let scope = self.scopes.child(&lambda.env);
        for (param, arg) in lambda.params.iter().zip(args) {
            scope.define(Rc::clone(param), arg);
        }
        self.depth += 1;
        let result = self.eval_body(&lambda.body, &scope);
        self.depth -= 1;
        result
    }

    // ── Fires ─────────────────────────────────────────────────────────────

    /// Build a fire for `trigger`, queue it, and return it.
    ///
    /// `escalate` and `deescalate` apply to the policy first, so their fire
    /// carries the tier after the transition.
    pub(crate) fn emit(&mut self, trigger: Opcode, value: Option<f64>) -> Value {
        let tier = if trigger.is_tier_trigger() {
            self.policy.apply(trigger)
        } else {
            self.policy.tier()
        };
        let fire = Fire {
            trigger,
            value,
            timestamp: self.clock.now_nanos(),
            tier,
        };
        debug!(%trigger, value = ?fire.value, %tier, "fire");
        self.fires.push(fire.clone());
        Value::Fire(Rc::new(fire))
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvalConfig::default())
    }
}

impl Drop for Evaluator {
    // Closures capture the scopes that hold them; clearing every scope
    // breaks those cycles. Closures the host still holds see empty scopes.
    fn drop(&mut self) {
        self.global.clear();
        self.scopes.clear_all();
    }
}

/// An instruction in value position: constants yield their value, every
/// other instruction is a first-class opcode.
fn op_value(op: Opcode) -> Value {
    constant(op).unwrap_or(Value::Opcode(op))
}

pub(crate) fn constant(op: Opcode) -> Option<Value> {
    Some(match op {
        Opcode::Nil => Value::Nil,
        Opcode::True => Value::Bool(true),
        Opcode::False => Value::Bool(false),
        Opcode::Pi => Value::num(std::f64::consts::PI),
        Opcode::Tau => Value::num(std::f64::consts::TAU),
        Opcode::Euler => Value::num(std::f64::consts::E),
        _ => return None,
    })
}

/// `(lambda (params...) body...)`
fn eval_lambda(args: &[Expr], env: &Env) -> EvalResult<Value> {
    let [params, body @ ..] = args else {
        return Err(EvalError::arity("lambda", "at least 2", 0));
    };
    if body.is_empty() {
        return Err(EvalError::arity("lambda", "at least 2", args.len()));
    }
    let Some(params) = params.as_list() else {
        return Err(EvalError::TypeError(format!(
            "lambda parameters must be a list, got {params}"
        )));
    };
    let mut names: Vec<Rc<str>> = Vec::with_capacity(params.len());
    for param in params {
        let Some(name) = param.as_symbol() else {
            return Err(EvalError::TypeError(format!(
                "lambda parameter must be a symbol, got {param}"
            )));
        };
        if names.iter().any(|n| &**n == name) {
            return Err(EvalError::TypeError(format!(
                "duplicate lambda parameter '{name}'"
            )));
        }
        names.push(Rc::from(name));
    }
    Ok(Value::Lambda(Rc::new(Lambda {
        params: names,
        body: body.to_vec(),
        env: Rc::clone(env),
    })))
}

/// Convert syntax to data.
///
/// Atoms that name `nil`, `true` or `false` become those values; other
/// instructions become opcodes. Unassigned code points are still rejected.
fn quote(datum: &Expr) -> EvalResult<Value> {
    Ok(match &datum.kind {
        ExprKind::Number(n) => Value::num(*n),
        ExprKind::Symbol(name) => Value::symbol(name),
        ExprKind::Op(op) => match op {
            Opcode::Nil | Opcode::True | Opcode::False => op_value(*op),
            _ => Value::Opcode(*op),
        },
        ExprKind::Reserved(c) => return Err(glyph_types::UnknownInstruction(*c).into()),
        ExprKind::List(items) => {
            Value::List(items.iter().map(quote).collect::<EvalResult<_>>()?)
        }
        ExprKind::Quote(inner) => Value::List(vec![Value::Opcode(Opcode::Quote), quote(inner)?]),
    })
}
