//! Fire events.

use glyph_policy::Tier;
use glyph_types::Opcode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete, timestamped record emitted by evaluating a trigger
/// instruction. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fire {
    pub trigger: Opcode,
    /// Optional payload, rounded to 6 decimals.
    pub value: Option<f64>,
    /// Clock reading at emission, in nanoseconds.
    pub timestamp: u64,
    /// For `escalate`/`deescalate`, the tier after the transition;
    /// otherwise the tier at emission.
    pub tier: Tier,
}

impl fmt::Display for Fire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<fire {}", self.trigger)?;
        if let Some(value) = self.value {
            f.write_str(" ")?;
            crate::value::fmt_num(value, f)?;
        }
        write!(f, " tier={}>", self.tier.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let fire = Fire {
            trigger: Opcode::Anomalous,
            value: Some(0.5),
            timestamp: 10,
            tier: Tier::new(3),
        };
        assert_eq!(fire.to_string(), "#<fire anomalous 0.5 tier=3>");
        let bare = Fire { value: None, ..fire };
        assert_eq!(bare.to_string(), "#<fire anomalous tier=3>");
    }

    #[test]
    fn test_json_shape() {
        let fire = Fire {
            trigger: Opcode::HawkesSpike,
            value: Some(2.25),
            timestamp: 42,
            tier: Tier::new(4),
        };
        let json = serde_json::to_value(&fire).unwrap();
        assert_eq!(json["trigger"], "hawkes-spike");
        assert_eq!(json["value"], 2.25);
        assert_eq!(json["timestamp"], 42);
        assert_eq!(json["tier"], 4);
    }
}
