//! Shared ownership of one policy.

use glyph_types::Opcode;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::{EscalationPolicy, PolicyConfig, Tier, TierTransition};

/// A cloneable handle to one [`EscalationPolicy`].
///
/// Every clone sees the same tier. Each call takes the lock for its own
/// duration, so transitions from different holders never interleave.
#[derive(Debug, Clone)]
pub struct PolicyHandle {
    inner: Arc<Mutex<EscalationPolicy>>,
}

impl PolicyHandle {
    pub fn new(policy: EscalationPolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(policy)),
        }
    }

    pub fn from_config(config: PolicyConfig) -> Self {
        Self::new(EscalationPolicy::new(config))
    }

    /// Lock the policy. A poisoned lock is recovered: policy state is
    /// consistent after every completed `apply`.
    pub fn lock(&self) -> MutexGuard<'_, EscalationPolicy> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn apply(&self, trigger: Opcode) -> Tier {
        self.lock().apply(trigger)
    }

    pub fn tier(&self) -> Tier {
        self.lock().tier()
    }

    pub fn time_since_last_deescalation(&self) -> Option<Duration> {
        self.lock().time_since_last_deescalation()
    }

    pub fn next_audit_id(&self) -> u64 {
        self.lock().next_audit_id()
    }

    /// Clone out the audit entries with `id >= first_id`.
    pub fn audit_since(&self, first_id: u64) -> Vec<TierTransition> {
        self.lock().audit_since(first_id).to_vec()
    }

    /// `true` if both handles point at the same policy.
    pub fn same_policy(&self, other: &PolicyHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for PolicyHandle {
    fn default() -> Self {
        Self::new(EscalationPolicy::default())
    }
}

impl From<EscalationPolicy> for PolicyHandle {
    fn from(policy: EscalationPolicy) -> Self {
        Self::new(policy)
    }
}
