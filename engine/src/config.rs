use crate::error::{EngineError, Result};
use crate::types::{Field, FieldWeights};
use serde::{Deserialize, Serialize};

/// Engine configuration passed from JavaScript as a JSON string.
/// Every field is optional, so `{}` yields the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Loosest per-field score (errors / pattern length) still accepted
    pub threshold: f32,
    /// Relative weight of each field when combining field scores
    pub weights: FieldWeights,
    /// Organizations per page in the unfiltered view
    pub page_size: usize,
    /// Quiet period after the last keystroke before searching
    pub debounce_ms: u64,
    /// Relative path of the catalogue document
    pub catalogue_url: String,
    /// Highlight spans shorter than this are dropped
    pub min_match_char_length: usize,
    /// Queries are cut to this many chars before matching
    pub max_pattern_length: usize,
    pub max_results: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            threshold: 0.3,
            weights: Field::ALL.iter().map(|&field| (field, 1.0)).collect(),
            page_size: 5,
            debounce_ms: 300,
            catalogue_url: "universities.json".to_string(),
            min_match_char_length: 1,
            max_pattern_length: 32,
            max_results: None,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a config JSON string
    pub fn from_json(config_json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(config_json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(EngineError::Config(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if self.page_size == 0 {
            return Err(EngineError::Config("page_size must be at least 1".into()));
        }
        if self.max_pattern_length == 0 {
            return Err(EngineError::Config("max_pattern_length must be at least 1".into()));
        }
        if let Some((field, weight)) = self.weights.iter().find(|(_, w)| **w <= 0.0) {
            return Err(EngineError::Config(format!(
                "weight for {:?} must be positive, got {}",
                field, weight
            )));
        }
        Ok(())
    }

    /// Weight of a field, normalised so all four fields sum to 1
    pub fn normalized_weight(&self, field: Field) -> f32 {
        let weight_of = |f: Field| self.weights.get(&f).copied().unwrap_or(1.0);
        let total: f32 = Field::ALL.iter().map(|&f| weight_of(f)).sum();
        weight_of(field) / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.page_size, 5);
    }

    #[test]
    fn test_partial_weights() {
        let config = EngineConfig::from_json(r#"{"weights": {"title": 2.0}}"#).unwrap();
        assert!((config.normalized_weight(Field::Title) - 0.4).abs() < 1e-6);
        assert!((config.normalized_weight(Field::Url) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(EngineConfig::from_json(r#"{"page_size": 0}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"max_pattern_length": 0}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"threshold": 1.5}"#).is_err());
        assert!(EngineConfig::from_json(r#"{"weights": {"url": 0}}"#).is_err());
        assert!(EngineConfig::from_json("not json").is_err());
    }
}
