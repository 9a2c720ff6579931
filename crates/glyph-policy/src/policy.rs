//! The stateful escalation policy.

use glyph_types::{MonotonicClock, Opcode, SharedClock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::{decide, Decision, PolicyConfig, Reason, Tier};

/// One audited tier decision.
///
/// Rejected de-escalations are recorded with `from == to` and
/// [`Reason::CooldownActive`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTransition {
    /// Sequence number, unique and increasing per policy.
    pub id: u64,
    pub from: Tier,
    pub to: Tier,
    pub trigger: Opcode,
    /// Clock reading in nanoseconds.
    pub at: u64,
    pub reason: Reason,
}

impl TierTransition {
    pub fn is_rejection(&self) -> bool {
        self.reason == Reason::CooldownActive
    }
}

impl fmt::Display for TierTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} -> {} on {} ({}) @{}ns",
            self.id, self.from, self.to, self.trigger, self.reason, self.at
        )
    }
}

/// Escalation state machine.
///
/// Holds the current tier and the timestamp of the last successful
/// de-escalation. Application is sequential; share one policy between
/// evaluators through a [`crate::PolicyHandle`].
pub struct EscalationPolicy {
    config: PolicyConfig,
    tier: Tier,
    /// Clock reading of the last de-escalation that changed the tier.
    last_deescalation: Option<u64>,
    clock: SharedClock,
    audit: Vec<TierTransition>,
    next_id: u64,
}

impl EscalationPolicy {
    /// A policy on a wall-time clock.
    pub fn new(config: PolicyConfig) -> Self {
        Self::with_clock(config, MonotonicClock::shared())
    }

    pub fn with_clock(config: PolicyConfig, clock: SharedClock) -> Self {
        let tier = config.initial();
        Self {
            config,
            tier,
            last_deescalation: None,
            clock,
            audit: Vec::new(),
            next_id: 0,
        }
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// Apply one trigger and return the resulting tier.
    ///
    /// Never fails: clamping absorbs out-of-range moves and a refused
    /// de-escalation leaves the tier as it was.
    pub fn apply(&mut self, trigger: Opcode) -> Tier {
        let now = self.clock.now_nanos();
        let since = self.elapsed_since_deescalation(now);
        match decide(&self.config, self.tier, trigger, since) {
            Decision::Transition { to, reason } => {
                let from = self.tier;
                self.tier = to;
                if trigger == Opcode::Deescalate {
                    self.last_deescalation = Some(now);
                }
                info!(%from, %to, %trigger, %reason, "tier transition");
                self.record(from, to, trigger, now, reason);
            }
            Decision::Rejected { remaining } => {
                debug!(
                    tier = %self.tier,
                    remaining_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
                    "de-escalation rejected: cooldown active"
                );
                if self.config.audit_rejections {
                    self.record(self.tier, self.tier, trigger, now, Reason::CooldownActive);
                }
            }
            Decision::Unchanged => {
                trace!(tier = %self.tier, %trigger, "trigger left tier unchanged");
            }
        }
        self.tier
    }

    /// Time since the last successful de-escalation, or `None` if there
    /// has not been one.
    pub fn time_since_last_deescalation(&self) -> Option<Duration> {
        self.elapsed_since_deescalation(self.clock.now_nanos())
    }

    fn elapsed_since_deescalation(&self, now: u64) -> Option<Duration> {
        self.last_deescalation
            .map(|at| Duration::from_nanos(now.saturating_sub(at)))
    }

    /// Every retained audit entry, oldest first.
    pub fn audit(&self) -> &[TierTransition] {
        &self.audit
    }

    /// Retained audit entries with `id >= first_id`.
    pub fn audit_since(&self, first_id: u64) -> &[TierTransition] {
        let start = self.audit.partition_point(|t| t.id < first_id);
        &self.audit[start..]
    }

    /// The id the next audit entry will receive.
    pub fn next_audit_id(&self) -> u64 {
        self.next_id
    }

    fn record(&mut self, from: Tier, to: Tier, trigger: Opcode, at: u64, reason: Reason) {
        self.audit.push(TierTransition {
            id: self.next_id,
            from,
            to,
            trigger,
            at,
            reason,
        });
        self.next_id += 1;
        let excess = self.audit.len().saturating_sub(self.config.audit_capacity);
        if excess > 0 {
            self.audit.drain(..excess);
        }
    }
}

impl fmt::Debug for EscalationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EscalationPolicy")
            .field("tier", &self.tier)
            .field("last_deescalation", &self.last_deescalation)
            .field("audit_len", &self.audit.len())
            .finish_non_exhaustive()
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}
