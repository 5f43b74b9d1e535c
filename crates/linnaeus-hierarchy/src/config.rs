//! Configuration for hierarchy construction

use serde::{Deserialize, Serialize};

/// Weights combining the three specificity signals
///
/// The exact combination is a tuning surface rather than a constant:
/// relation-pattern hints are the strongest signal when present, so they
/// default to half the weight, with neighborhood density and phrase
/// length splitting the remainder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpecificityWeights {
    /// Weight of rule-based hierarchical-relation hints
    pub hint: f64,
    /// Weight of embedding neighborhood density (dense neighborhoods
    /// read as general)
    pub density: f64,
    /// Weight of phrase length / modifier count (longer reads as more
    /// specific)
    pub length: f64,
}

impl Default for SpecificityWeights {
    fn default() -> Self {
        Self {
            hint: 0.5,
            density: 0.25,
            length: 0.25,
        }
    }
}

/// Configuration for [`HierarchyBuilder`](crate::HierarchyBuilder)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Specificity signal weights
    pub specificity: SpecificityWeights,

    /// Neighbors considered when measuring neighborhood density
    pub density_neighbors: usize,

    /// Similarity at or above which two concepts belong to the same
    /// connected component, in [0, 1]
    pub component_threshold: f64,

    /// Minimum specificity gap for one concept to count as strictly
    /// more general than another
    pub specificity_margin: f64,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            specificity: SpecificityWeights::default(),
            density_neighbors: 5,
            component_threshold: 0.35,
            specificity_margin: 1e-6,
        }
    }
}

impl HierarchyConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("hint", self.specificity.hint),
            ("density", self.specificity.density),
            ("length", self.specificity.length),
        ];
        for (name, value) in weights {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("specificity.{} {} out of range [0.0, 1.0]", name, value));
            }
        }
        let total = self.specificity.hint + self.specificity.density + self.specificity.length;
        if total <= 0.0 {
            return Err("specificity weights must not all be zero".to_string());
        }
        if !(0.0..=1.0).contains(&self.component_threshold) {
            return Err(format!(
                "component_threshold {} out of range [0.0, 1.0]",
                self.component_threshold
            ));
        }
        if self.density_neighbors == 0 {
            return Err("density_neighbors must be greater than 0".to_string());
        }
        if self.specificity_margin < 0.0 {
            return Err("specificity_margin must be non-negative".to_string());
        }
        Ok(())
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
        assert!(HierarchyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut config = HierarchyConfig::default();
        config.specificity = SpecificityWeights {
            hint: 0.0,
            density: 0.0,
            length: 0.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut config = HierarchyConfig::default();
        config.component_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = HierarchyConfig::default();
        let parsed = HierarchyConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(config.density_neighbors, parsed.density_neighbors);
        assert_eq!(config.specificity.hint, parsed.specificity.hint);
    }
}
