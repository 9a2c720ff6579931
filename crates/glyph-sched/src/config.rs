//! Scheduler configuration.

use glyph_types::{ConfigError, LoadConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Wall budget for one tick in microseconds. Longer ticks are logged
    /// and counted as overruns; they are never interrupted.
    pub tick_budget_us: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_budget_us: 1_000,
        }
    }
}

impl SchedulerConfig {
    pub fn tick_budget(&self) -> Duration {
        Duration::from_micros(self.tick_budget_us)
    }

    pub fn with_tick_budget(mut self, budget: Duration) -> Self {
        self.tick_budget_us = u64::try_from(budget.as_micros()).unwrap_or(u64::MAX);
        self
    }
}

impl LoadConfig for SchedulerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_budget_us == 0 {
            return Err(ConfigError::Invalid("tick_budget_us must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget() {
        assert_eq!(SchedulerConfig::default().tick_budget(), Duration::from_millis(1));
    }

    #[test]
    fn test_with_tick_budget() {
        let c = SchedulerConfig::default().with_tick_budget(Duration::from_micros(250));
        assert_eq!(c.tick_budget_us, 250);
    }

    #[test]
    fn test_from_json() {
        let c = SchedulerConfig::from_json(r#"{"tick_budget_us": 50}"#).unwrap();
        assert_eq!(c.tick_budget(), Duration::from_micros(50));
        assert_eq!(SchedulerConfig::from_json("{}").unwrap(), SchedulerConfig::default());
    }

    #[test]
    fn test_zero_budget_rejected() {
        assert!(matches!(
            SchedulerConfig::from_json(r#"{"tick_budget_us": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
    }
}
