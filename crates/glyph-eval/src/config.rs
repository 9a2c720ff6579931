//! Evaluator configuration.

use glyph_types::{ConfigError, LoadConfig};
use serde::{Deserialize, Serialize};

/// Resource limits for one evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Evaluation steps allowed per top-level expression.
    pub gas_limit: u64,

    /// Maximum nesting of lambda calls.
    pub max_depth: u32,

    /// Maximum nesting of sub-expression evaluation, across calls. Bounds
    /// the host stack.
    pub max_nesting: u32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            gas_limit: 1_000_000,
            max_depth: 64,
            max_nesting: 256,
        }
    }
}

impl EvalConfig {
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_nesting(mut self, max_nesting: u32) -> Self {
        self.max_nesting = max_nesting;
        self
    }
}

impl LoadConfig for EvalConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.gas_limit == 0 {
            return Err(ConfigError::Invalid("gas_limit must be > 0"));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be > 0"));
        }
        if self.max_nesting == 0 {
            return Err(ConfigError::Invalid("max_nesting must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(EvalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let c = EvalConfig::from_json(r#"{"gas_limit": 500}"#).unwrap();
        assert_eq!(c.gas_limit, 500);
        assert_eq!(c.max_depth, 64);
        assert_eq!(c.max_nesting, 256);
        assert!(EvalConfig::from_json(r#"{"max_depth": 0}"#).is_err());
        assert!(EvalConfig::from_json(r#"{"max_nesting": 0}"#).is_err());
    }
}
