//! Escalation policy configuration.

use glyph_types::{ConfigError, LoadConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Tier;

/// Escalation policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Minimum tier forced by critical triggers.
    pub floor: u8,

    /// Seconds that must pass after a de-escalation before the next one
    /// is accepted.
    pub cooldown_secs: u64,

    /// Tier a fresh policy starts at.
    pub initial_tier: u8,

    /// Record cooldown rejections in the audit trail.
    pub audit_rejections: bool,

    /// Maximum retained audit entries; the oldest are dropped first.
    pub audit_capacity: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            floor: 3,
            cooldown_secs: 60,
            initial_tier: 1,
            audit_rejections: true,
            audit_capacity: 4096,
        }
    }
}

impl PolicyConfig {
    pub fn floor_tier(&self) -> Tier {
        Tier::new(self.floor)
    }

    pub fn initial(&self) -> Tier {
        Tier::new(self.initial_tier)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl LoadConfig for PolicyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let range = Tier::MIN.get()..=Tier::MAX.get();
        if !range.contains(&self.floor) {
            return Err(ConfigError::Invalid("floor must be in [1, 7]"));
        }
        if !range.contains(&self.initial_tier) {
            return Err(ConfigError::Invalid("initial_tier must be in [1, 7]"));
        }
        if self.audit_capacity == 0 {
            return Err(ConfigError::Invalid("audit_capacity must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = PolicyConfig::default();
        assert_eq!(c.floor_tier(), Tier::new(3));
        assert_eq!(c.cooldown(), Duration::from_secs(60));
        assert_eq!(c.initial(), Tier::MIN);
        assert!(c.audit_rejections);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let c = PolicyConfig::from_json(r#"{"floor": 5, "cooldown_secs": 10}"#).unwrap();
        assert_eq!(c.floor, 5);
        assert_eq!(c.cooldown_secs, 10);
        assert_eq!(c.initial_tier, 1);
    }

    #[test]
    fn test_rejects_out_of_range_floor() {
        assert!(PolicyConfig::from_json(r#"{"floor": 0}"#).is_err());
        assert!(PolicyConfig::from_json(r#"{"floor": 8}"#).is_err());
        assert!(PolicyConfig::from_json(r#"{"initial_tier": 9}"#).is_err());
    }
}
