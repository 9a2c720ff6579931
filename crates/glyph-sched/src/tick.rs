//! Per-tick results.

use glyph_eval::{EvalError, Fire, Value};
use glyph_policy::{Tier, TierTransition};
use std::time::Duration;

use crate::Phase;

/// Everything one tick produced.
#[derive(Debug)]
pub struct TickResult {
    /// Sequence number; the first tick is 1.
    pub seq: u64,
    pub phase: Phase,
    /// One entry per registered expression, in registration order.
    pub outcomes: Vec<Result<Value, EvalError>>,
    /// Fires drained after the phase ran, in emission order.
    pub fires: Vec<Fire>,
    /// Audit entries the policy recorded during the tick.
    pub transitions: Vec<TierTransition>,
    /// Tier once the tick's fires were applied.
    pub tier: Tier,
    /// Scheduler clock reading at tick start, in nanoseconds.
    pub started_at: u64,
    pub elapsed: Duration,
}

impl TickResult {
    pub fn errors(&self) -> impl Iterator<Item = &EvalError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(Result::is_ok)
    }

    /// Transitions that changed the tier, skipping audited rejections.
    pub fn tier_changes(&self) -> impl Iterator<Item = &TierTransition> {
        self.transitions.iter().filter(|t| !t.is_rejection())
    }
}
