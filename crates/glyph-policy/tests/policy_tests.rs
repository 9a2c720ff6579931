//! Escalation policy tests: tier bounds, critical floor, cooldown,
//! audit trail, and shared handles.

use glyph_policy::{EscalationPolicy, PolicyConfig, PolicyHandle, Reason, Tier};
use glyph_types::{ManualClock, Opcode, SharedClock};
use std::sync::Arc;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn policy_at(tier: u8) -> (EscalationPolicy, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let shared: SharedClock = clock.clone();
    let config = PolicyConfig {
        initial_tier: tier,
        ..PolicyConfig::default()
    };
    (EscalationPolicy::with_clock(config, shared), clock)
}

const ALL_TIER_RELEVANT: &[Opcode] = &[
    Opcode::Escalate,
    Opcode::Deescalate,
    Opcode::Anomalous,
    Opcode::RateExceeded,
    Opcode::Crisis,
    Opcode::EmaHigh,
    Opcode::EmaSustained,
    Opcode::HawkesSpike,
    Opcode::PhasePeak,
    Opcode::PhaseCascade,
    Opcode::KcExploit,
    Opcode::KcAct,
    Opcode::Stable,
];

// ─────────────────────────────────────────────────────────────────────
// Bounds
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_tier_stays_in_range_under_any_sequence() {
    let (mut policy, clock) = policy_at(1);
    // Deterministic pseudo-random walk over the trigger set.
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    for _ in 0..5_000 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let trigger = ALL_TIER_RELEVANT[(state % ALL_TIER_RELEVANT.len() as u64) as usize];
        clock.advance(Duration::from_secs(state % 90));
        let tier = policy.apply(trigger);
        assert!((1..=7).contains(&tier.get()));
    }
}

#[test]
fn test_escalate_clamps_at_seven() {
    let (mut policy, _clock) = policy_at(6);
    assert_eq!(policy.apply(Opcode::Escalate), Tier::new(7));
    assert_eq!(policy.apply(Opcode::Escalate), Tier::new(7));
    // A clamped request is not a transition.
    assert_eq!(policy.audit().len(), 1);
}

// ─────────────────────────────────────────────────────────────────────
// Critical floor
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_critical_below_floor_lands_on_floor() {
    for start in 1..3 {
        let (mut policy, _clock) = policy_at(start);
        assert_eq!(policy.apply(Opcode::Anomalous), Tier::new(3));
        assert_eq!(policy.audit()[0].reason, Reason::CriticalFloor);
    }
}

#[test]
fn test_critical_at_or_above_floor_is_not_lowered() {
    for start in 3..=7u8 {
        let (mut policy, _clock) = policy_at(start);
        let after = policy.apply(Opcode::HawkesSpike);
        assert!(after >= Tier::new(start));
        assert_eq!(after, Tier::new(start).up());
    }
}

// ─────────────────────────────────────────────────────────────────────
// Cooldown
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_two_deescalations_within_cooldown_change_tier_once() {
    let (mut policy, clock) = policy_at(5);
    assert_eq!(policy.apply(Opcode::Deescalate), Tier::new(4));
    clock.advance(Duration::from_secs(30));
    assert_eq!(policy.apply(Opcode::Deescalate), Tier::new(4));

    let changes = policy.audit().iter().filter(|t| t.from != t.to).count();
    assert_eq!(changes, 1);
}

#[test]
fn test_deescalation_allowed_after_cooldown() {
    let (mut policy, clock) = policy_at(5);
    policy.apply(Opcode::Deescalate);
    clock.advance(Duration::from_secs(60));
    assert_eq!(policy.apply(Opcode::Deescalate), Tier::new(3));
}

#[test]
fn test_rejection_does_not_restart_cooldown() {
    let (mut policy, clock) = policy_at(5);
    policy.apply(Opcode::Deescalate);
    clock.advance(Duration::from_secs(50));
    policy.apply(Opcode::Deescalate); // rejected
    clock.advance(Duration::from_secs(10));
    assert_eq!(policy.apply(Opcode::Deescalate), Tier::new(3));
}

#[test]
fn test_time_since_last_deescalation() {
    let (mut policy, clock) = policy_at(4);
    assert_eq!(policy.time_since_last_deescalation(), None);
    policy.apply(Opcode::Deescalate);
    assert_eq!(policy.time_since_last_deescalation(), Some(Duration::ZERO));
    clock.advance(Duration::from_millis(1500));
    assert_eq!(
        policy.time_since_last_deescalation(),
        Some(Duration::from_millis(1500))
    );
}

#[test]
fn test_deescalate_at_floor_of_range_does_not_start_cooldown() {
    let (mut policy, _clock) = policy_at(1);
    assert_eq!(policy.apply(Opcode::Deescalate), Tier::MIN);
    assert_eq!(policy.time_since_last_deescalation(), None);
}

#[test]
fn test_escalation_is_not_gated_by_cooldown() {
    let (mut policy, _clock) = policy_at(4);
    policy.apply(Opcode::Deescalate);
    assert_eq!(policy.apply(Opcode::Escalate), Tier::new(4));
    assert_eq!(policy.apply(Opcode::RateExceeded), Tier::new(5));
}

// ─────────────────────────────────────────────────────────────────────
// Audit
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_audit_records_trigger_and_timestamp() {
    let (mut policy, clock) = policy_at(1);
    clock.advance(Duration::from_nanos(1234));
    policy.apply(Opcode::Crisis);
    let entry = &policy.audit()[0];
    assert_eq!(entry.id, 0);
    assert_eq!(entry.from, Tier::new(1));
    assert_eq!(entry.to, Tier::new(3));
    assert_eq!(entry.trigger, Opcode::Crisis);
    assert_eq!(entry.at, 1234);
}

#[test]
fn test_rejections_audited_by_default() {
    let (mut policy, _clock) = policy_at(5);
    policy.apply(Opcode::Deescalate);
    policy.apply(Opcode::Deescalate);
    let last = policy.audit().last().expect("audit entry");
    assert!(last.is_rejection());
    assert_eq!(last.from, last.to);
}

#[test]
fn test_rejections_can_be_left_out_of_audit() {
    let clock: SharedClock = Arc::new(ManualClock::new());
    let config = PolicyConfig {
        initial_tier: 5,
        audit_rejections: false,
        ..PolicyConfig::default()
    };
    let mut policy = EscalationPolicy::with_clock(config, clock);
    policy.apply(Opcode::Deescalate);
    policy.apply(Opcode::Deescalate);
    assert_eq!(policy.audit().len(), 1);
}

#[test]
fn test_non_tier_triggers_are_not_audited() {
    let (mut policy, _clock) = policy_at(2);
    policy.apply(Opcode::Stable);
    policy.apply(Opcode::KcRecon);
    assert!(policy.audit().is_empty());
}

#[test]
fn test_audit_since_returns_suffix() {
    let (mut policy, _clock) = policy_at(1);
    policy.apply(Opcode::Escalate);
    let mark = policy.next_audit_id();
    policy.apply(Opcode::Escalate);
    policy.apply(Opcode::Escalate);
    let since = policy.audit_since(mark);
    assert_eq!(since.len(), 2);
    assert_eq!(since[0].id, mark);
    assert_eq!(since[1].to, Tier::new(4));
}

#[test]
fn test_audit_capacity_drops_oldest() {
    let clock: SharedClock = Arc::new(ManualClock::new());
    let config = PolicyConfig {
        audit_capacity: 2,
        ..PolicyConfig::default()
    };
    let mut policy = EscalationPolicy::with_clock(config, clock);
    for _ in 0..4 {
        policy.apply(Opcode::Escalate);
    }
    let ids: Vec<u64> = policy.audit().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn test_transition_serializes_to_json() {
    let (mut policy, _clock) = policy_at(1);
    policy.apply(Opcode::Anomalous);
    let json = serde_json::to_value(&policy.audit()[0]).unwrap();
    assert_eq!(json["from"], 1);
    assert_eq!(json["to"], 3);
    assert_eq!(json["trigger"], "anomalous");
    assert_eq!(json["reason"], "critical_floor");
}

// ─────────────────────────────────────────────────────────────────────
// Shared handle
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_handle_clones_share_one_tier() {
    let a = PolicyHandle::default();
    let b = a.clone();
    a.apply(Opcode::Escalate);
    b.apply(Opcode::Escalate);
    assert_eq!(a.tier(), Tier::new(3));
    assert!(a.same_policy(&b));
}

#[test]
fn test_handle_across_threads() {
    let handle = PolicyHandle::default();
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let h = handle.clone();
            std::thread::spawn(move || {
                h.apply(Opcode::Escalate);
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
    assert_eq!(handle.tier(), Tier::new(5));
    assert_eq!(handle.audit_since(0).len(), 4);
}

#[test]
fn test_policy_determinism_100_iterations() {
    let script = [
        Opcode::Anomalous,
        Opcode::Deescalate,
        Opcode::Deescalate,
        Opcode::EmaHigh,
        Opcode::KcAct,
        Opcode::Escalate,
    ];
    let run = || {
        let (mut policy, clock) = policy_at(1);
        for trigger in script {
            clock.advance(Duration::from_secs(20));
            policy.apply(trigger);
        }
        policy.audit().to_vec()
    };
    let first = run();
    for i in 0..100 {
        assert_eq!(first, run(), "Determinism failure at iteration {i}");
    }
}
