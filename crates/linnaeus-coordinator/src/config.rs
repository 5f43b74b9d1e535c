//! Configuration for the coordinator

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`StrategyCoordinator`](crate::StrategyCoordinator)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Embedding-space similarity above which two candidate groups merge
    /// even without matching comparison keys, in [0, 1]
    pub merge_similarity_threshold: f64,

    /// Concepts below this combined confidence are discarded, in [0, 1]
    pub acceptance_threshold: f64,

    /// Maximum wall-clock time for a single strategy (seconds); a
    /// strategy past its deadline contributes an empty candidate set
    pub strategy_timeout_secs: u64,
}

impl CoordinatorConfig {
    /// Get the per-strategy timeout as a Duration
    pub fn strategy_timeout(&self) -> Duration {
        Duration::from_secs(self.strategy_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.merge_similarity_threshold) {
            return Err(format!(
                "merge_similarity_threshold {} out of range [0.0, 1.0]",
                self.merge_similarity_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            return Err(format!(
                "acceptance_threshold {} out of range [0.0, 1.0]",
                self.acceptance_threshold
            ));
        }
        if self.strategy_timeout_secs == 0 {
            return Err("strategy_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            merge_similarity_threshold: 0.85,
            acceptance_threshold: 0.5,
            strategy_timeout_secs: 60,
        }
    }
}

impl CoordinatorConfig {
    /// Strict preset: higher acceptance bar, tighter merge similarity
    pub fn strict() -> Self {
        Self {
            merge_similarity_threshold: 0.9,
            acceptance_threshold: 0.65,
            strategy_timeout_secs: 60,
        }
    }

    /// Lenient preset: keeps weaker concepts, merges more aggressively
    pub fn lenient() -> Self {
        Self {
            merge_similarity_threshold: 0.8,
            acceptance_threshold: 0.35,
            strategy_timeout_secs: 120,
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(CoordinatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(CoordinatorConfig::strict().validate().is_ok());
        assert!(CoordinatorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut config = CoordinatorConfig::default();
        config.acceptance_threshold = 1.2;
        assert!(config.validate().is_err());

        let mut config = CoordinatorConfig::default();
        config.merge_similarity_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CoordinatorConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = CoordinatorConfig::from_toml(&toml_str).unwrap();

        assert_eq!(
            config.merge_similarity_threshold,
            parsed.merge_similarity_threshold
        );
        assert_eq!(config.acceptance_threshold, parsed.acceptance_threshold);
    }
}
