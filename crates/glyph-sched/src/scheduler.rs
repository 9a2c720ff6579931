//! Phase scheduler
//!
//! Drives one evaluator through the observe, orient, decide and act phases,
//! one phase per tick.

use glyph_eval::{EvalConfig, Evaluator};
use glyph_parser::parse_source;
use glyph_policy::PolicyHandle;
use glyph_types::ast::Expr;
use glyph_types::{CompileErrors, SourceFile};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::SchedulerConfig;
use crate::tick::TickResult;
use crate::Phase;

/// Runtime state for a phase loop
pub struct PhaseScheduler {
    config: SchedulerConfig,
    evaluator: Evaluator,
    /// Registered expressions indexed by [`Phase::index`]
    programs: [Vec<Expr>; 4],
    /// Phase the next tick runs
    phase: Phase,
    /// Ticks completed
    seq: u64,
    /// Ticks that ran past the budget
    overruns: u64,
}

impl PhaseScheduler {
    /// A scheduler over a fresh evaluator with its own policy.
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_evaluator(config, Evaluator::new(EvalConfig::default()))
    }

    /// A scheduler driving an existing evaluator. Its clock times ticks and
    /// its policy receives the tick's fires.
    pub fn with_evaluator(config: SchedulerConfig, evaluator: Evaluator) -> Self {
        info!(budget_us = config.tick_budget_us, "scheduler created");
        Self {
            config,
            evaluator,
            programs: Default::default(),
            phase: Phase::Observe,
            seq: 0,
            overruns: 0,
        }
    }

    /// Parse `source` and append its top-level forms to `phase`.
    ///
    /// Returns how many expressions were added. Nothing is registered when
    /// the source has syntax errors.
    pub fn register(&mut self, phase: Phase, source: &str) -> Result<usize, CompileErrors> {
        let file = SourceFile::new(format!("<{phase}>"), source);
        let parsed = parse_source(&file);
        if parsed.errors.has_errors() {
            warn!(%phase, errors = parsed.errors.total_errors, "registration rejected");
            return Err(parsed.errors);
        }
        let added = parsed.exprs.len();
        self.programs[phase.index()].extend(parsed.exprs);
        debug!(%phase, added, "registered");
        Ok(added)
    }

    /// Append one already-parsed expression to `phase`; returns its index.
    pub fn register_expr(&mut self, phase: Phase, expr: Expr) -> usize {
        let list = &mut self.programs[phase.index()];
        list.push(expr);
        list.len() - 1
    }

    pub fn expressions(&self, phase: Phase) -> &[Expr] {
        &self.programs[phase.index()]
    }

    /// Drop every expression registered for `phase`.
    pub fn clear(&mut self, phase: Phase) {
        self.programs[phase.index()].clear();
    }

    /// Run the current phase and advance to the next.
    ///
    /// Every expression runs even when an earlier one fails. Fires other
    /// than `escalate`/`deescalate` (already applied during evaluation) are
    /// then fed to the policy in emission order.
    #[instrument(skip(self), fields(seq = self.seq + 1, phase = %self.phase))]
    pub fn tick(&mut self) -> TickResult {
        trace!("tick start");
        let phase = self.phase;
        let clock = Arc::clone(self.evaluator.clock());
        let started_at = clock.now_nanos();
        let policy: PolicyHandle = self.evaluator.policy().clone();
        let first_audit = policy.next_audit_id();

        let global = Rc::clone(self.evaluator.global());
        let mut outcomes = Vec::with_capacity(self.programs[phase.index()].len());
        for expr in &self.programs[phase.index()] {
            let outcome = self.evaluator.evaluate(expr, &global);
            if let Err(e) = &outcome {
                warn!(error = %e, "expression failed");
            }
            outcomes.push(outcome);
        }

        let fires = self.evaluator.take_fires();
        for fire in fires.iter().filter(|f| !f.trigger.is_tier_trigger()) {
            policy.apply(fire.trigger);
        }
        let transitions = policy.audit_since(first_audit);
        let tier = policy.tier();

        let elapsed = Duration::from_nanos(clock.now_nanos().saturating_sub(started_at));
        if elapsed > self.config.tick_budget() {
            self.overruns += 1;
            warn!(
                elapsed_us = elapsed.as_micros() as u64,
                budget_us = self.config.tick_budget_us,
                "tick overran budget"
            );
        }

        self.seq += 1;
        self.phase = phase.next();
        debug!(
            fires = fires.len(),
            transitions = transitions.len(),
            %tier,
            "tick complete"
        );

        TickResult {
            seq: self.seq,
            phase,
            outcomes,
            fires,
            transitions,
            tier,
            started_at,
            elapsed,
        }
    }

    /// Run four ticks, one per phase, starting from the current phase.
    pub fn cycle(&mut self) -> Vec<TickResult> {
        Phase::ALL.iter().map(|_| self.tick()).collect()
    }

    /// Phase the next tick will run.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Ticks completed so far.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Mutable access for host input, e.g. axis readings between ticks.
    pub fn evaluator_mut(&mut self) -> &mut Evaluator {
        &mut self.evaluator
    }

    pub fn policy(&self) -> &PolicyHandle {
        self.evaluator.policy()
    }
}

impl Default for PhaseScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
