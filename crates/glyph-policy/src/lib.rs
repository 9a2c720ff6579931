//! Glyph escalation policy.
//!
//! Maps trigger instructions to a tier in `[1, 7]`. [`decide`] is the pure
//! transition function; [`EscalationPolicy`] wraps it with the current tier,
//! the de-escalation cooldown state, and an audit trail. [`PolicyHandle`]
//! shares one policy between several evaluators.

mod config;
mod decision;
mod handle;
mod policy;
mod tier;

pub use config::PolicyConfig;
pub use decision::{decide, Decision, Reason};
pub use handle::PolicyHandle;
pub use policy::{EscalationPolicy, TierTransition};
pub use tier::Tier;
