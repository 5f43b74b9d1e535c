//! Aggregated pipeline configuration

use linnaeus_coordinator::CoordinatorConfig;
use linnaeus_hierarchy::HierarchyConfig;
use linnaeus_preprocess::PreprocessConfig;
use linnaeus_strategies::{EmbeddingStrategyConfig, RuleBasedConfig, StatisticalConfig};
use serde::{Deserialize, Serialize};

/// Configuration for a full pipeline run
///
/// One immutable value passed in at construction; there is no ambient
/// or global configuration state anywhere in the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Preprocessing configuration
    pub preprocess: PreprocessConfig,

    /// Rule-based strategy configuration
    pub rule_based: RuleBasedConfig,

    /// Statistical strategy configuration
    pub statistical: StatisticalConfig,

    /// Embedding strategy configuration
    pub embedding: EmbeddingStrategyConfig,

    /// Coordinator (fork-join and merge) configuration
    pub coordinator: CoordinatorConfig,

    /// Hierarchy construction configuration
    pub hierarchy: HierarchyConfig,
}

impl PipelineConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.preprocess.validate()?;
        self.rule_based.validate()?;
        self.statistical.validate()?;
        self.embedding.validate()?;
        self.coordinator.validate()?;
        self.hierarchy.validate()?;
        Ok(())
    }

    /// Lenient preset: keeps weaker concepts when a default run comes
    /// back empty
    pub fn lenient() -> Self {
        Self {
            coordinator: CoordinatorConfig::lenient(),
            ..Self::default()
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
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_lenient_preset_is_valid() {
        assert!(PipelineConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_section_error_propagates() {
        let mut config = PipelineConfig::default();
        config.coordinator.acceptance_threshold = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PipelineConfig::default();
        let parsed = PipelineConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(
            config.coordinator.acceptance_threshold,
            parsed.coordinator.acceptance_threshold
        );
        assert_eq!(
            config.preprocess.min_content_chars,
            parsed.preprocess.min_content_chars
        );
    }
}
