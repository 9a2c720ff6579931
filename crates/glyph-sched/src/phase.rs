//! Scheduler phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One stage of the observe → orient → decide → act loop.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Observe,
    Orient,
    Decide,
    Act,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 4] = [Phase::Observe, Phase::Orient, Phase::Decide, Phase::Act];

    /// The phase after this one; `Act` wraps to `Observe`.
    pub const fn next(self) -> Phase {
        match self {
            Phase::Observe => Phase::Orient,
            Phase::Orient => Phase::Decide,
            Phase::Decide => Phase::Act,
            Phase::Act => Phase::Observe,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Phase::Observe => "observe",
            Phase::Orient => "orient",
            Phase::Decide => "decide",
            Phase::Act => "act",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_wraps() {
        let mut phase = Phase::Observe;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(phase);
            phase = phase.next();
        }
        assert_eq!(
            seen,
            vec![Phase::Observe, Phase::Orient, Phase::Decide, Phase::Act, Phase::Observe]
        );
    }

    #[test]
    fn test_index_matches_all() {
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Decide).unwrap(), "\"decide\"");
        let p: Phase = serde_json::from_str("\"act\"").unwrap();
        assert_eq!(p, Phase::Act);
    }
}
