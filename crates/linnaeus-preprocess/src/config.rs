//! Configuration for the preprocessor

use serde::{Deserialize, Serialize};

/// Configuration for [`TextPreprocessor`](crate::TextPreprocessor)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Minimum usable content length (characters, after whitespace
    /// collapse); shorter documents are rejected
    pub min_content_chars: usize,

    /// Sentences shorter than this many words are folded into their
    /// neighbor rather than emitted as standalone units
    pub min_sentence_words: usize,

    /// Abbreviations that a sentence never ends on (matched against the
    /// token preceding a period)
    pub abbreviations: Vec<String>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 120,
            min_sentence_words: 3,
            abbreviations: vec![
                "e.g".to_string(),
                "i.e".to_string(),
                "et al".to_string(),
                "etc".to_string(),
                "fig".to_string(),
                "eq".to_string(),
                "vs".to_string(),
                "cf".to_string(),
                "dr".to_string(),
                "prof".to_string(),
            ],
        }
    }
}

impl PreprocessConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_content_chars == 0 {
            return Err("min_content_chars must be greater than 0".to_string());
        }
        if self.min_sentence_words == 0 {
            return Err("min_sentence_words must be greater than 0".to_string());
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
        let config = PreprocessConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_min_content_rejected() {
        let mut config = PreprocessConfig::default();
        config.min_content_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PreprocessConfig::default();
        let toml_str = config.to_toml().unwrap();
        let parsed = PreprocessConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.min_content_chars, parsed.min_content_chars);
        assert_eq!(config.abbreviations, parsed.abbreviations);
    }
}
