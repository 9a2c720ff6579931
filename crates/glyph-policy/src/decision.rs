//! The pure tier transition function.

use glyph_types::Opcode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::{PolicyConfig, Tier};

/// Why a tier changed, or why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Explicit `escalate` request.
    Escalate,
    /// Explicit `deescalate` request.
    Deescalate,
    /// A critical trigger raised the tier to the floor.
    CriticalFloor,
    /// An escalating trigger raised the tier by one step.
    Escalating,
    /// A de-escalation arrived inside the cooldown window.
    CooldownActive,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reason::Escalate => "escalate",
            Reason::Deescalate => "deescalate",
            Reason::CriticalFloor => "critical floor",
            Reason::Escalating => "escalating trigger",
            Reason::CooldownActive => "cooldown active",
        })
    }
}

/// Outcome of [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Move to `to`. `to` always differs from the current tier.
    Transition { to: Tier, reason: Reason },
    /// No effect: the trigger is not tier-relevant, or the tier is
    /// already clamped in the requested direction.
    Unchanged,
    /// De-escalation refused; `remaining` is the rest of the cooldown.
    Rejected { remaining: Duration },
}

/// Decide the next tier for `trigger` at `current`.
///
/// `since_last_deescalation` is `None` when no de-escalation has ever
/// succeeded, in which case the cooldown does not apply.
pub fn decide(
    config: &PolicyConfig,
    current: Tier,
    trigger: Opcode,
    since_last_deescalation: Option<Duration>,
) -> Decision {
    match trigger {
        Opcode::Escalate => step(current, current.up(), Reason::Escalate),
        Opcode::Deescalate => {
            let cooldown = config.cooldown();
            match since_last_deescalation {
                Some(elapsed) if elapsed < cooldown => Decision::Rejected {
                    remaining: cooldown - elapsed,
                },
                _ => step(current, current.down(), Reason::Deescalate),
            }
        }
        t if t.is_critical() => {
            let floor = config.floor_tier();
            if current < floor {
                Decision::Transition {
                    to: floor,
                    reason: Reason::CriticalFloor,
                }
            } else {
                step(current, current.up(), Reason::Escalating)
            }
        }
        t if t.is_escalating() => step(current, current.up(), Reason::Escalating),
        _ => Decision::Unchanged,
    }
}

fn step(current: Tier, to: Tier, reason: Reason) -> Decision {
    if to == current {
        Decision::Unchanged
    } else {
        Decision::Transition { to, reason }
    }
}
