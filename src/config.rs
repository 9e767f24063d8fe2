// Tue Jan 13 2026 - Alex

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Every tunable threshold of the matching engine. Missing keys in a config
/// file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub similarity: SimilarityConfig,
    pub scoring: ScoringConfig,
    pub boosts: BoostConfig,
    pub gate: GateConfig,
    pub status: StatusConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Minimum name similarity for two fields to be paired.
    pub name_threshold: f64,
    /// Fuzzy type similarity below this is treated as 0.
    pub type_floor: f64,
    pub substring_coverage: f64,
    pub substring_score: f64,
    pub affix_score: f64,
    pub stripped_penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub exact_threshold: f64,
    pub high_sim_threshold: f64,
    pub high_sim_weight: f64,
    pub structural_weight: f64,
    pub type_weight: f64,
    pub size_weight: f64,
    pub small_struct_fields: usize,
    pub small_struct_name_weight: f64,
    pub struct_name_weight: f64,
    pub order_penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    pub exact_name: f64,
    pub outlier: f64,
    pub outlier_similarity: f64,
    pub outlier_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub min_score: f64,
    pub small_fields: usize,
    pub small_field_ratio: f64,
    pub field_ratio: f64,
    pub small_match_ratio: f64,
    pub match_ratio: f64,
    pub lenient_name_similarity: f64,
    pub lenient_score: f64,
    pub lenient_match_ratio: f64,
    pub large_fields: usize,
    pub size_cap: usize,
    pub large_size_cap: usize,
    pub runner_up_gap: f64,
    pub runner_up_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub max_diff_ratio: f64,
    pub matched_score: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            similarity: SimilarityConfig::default(),
            scoring: ScoringConfig::default(),
            boosts: BoostConfig::default(),
            gate: GateConfig::default(),
            status: StatusConfig::default(),
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            name_threshold: 0.7,
            type_floor: 0.7,
            substring_coverage: 0.7,
            substring_score: 0.9,
            affix_score: 0.85,
            stripped_penalty: 0.01,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            exact_threshold: 1.0,
            high_sim_threshold: 0.9,
            high_sim_weight: 0.8,
            structural_weight: 0.6,
            type_weight: 0.2,
            size_weight: 0.2,
            small_struct_fields: 3,
            small_struct_name_weight: 0.7,
            struct_name_weight: 0.5,
            order_penalty: 0.9,
        }
    }
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            exact_name: 1.05,
            outlier: 1.05,
            outlier_similarity: 0.85,
            outlier_margin: 0.2,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_score: 0.5,
            small_fields: 3,
            small_field_ratio: 0.4,
            field_ratio: 0.6,
            small_match_ratio: 0.3,
            match_ratio: 0.5,
            lenient_name_similarity: 0.8,
            lenient_score: 0.4,
            lenient_match_ratio: 0.2,
            large_fields: 5,
            size_cap: 64,
            large_size_cap: 128,
            runner_up_gap: 0.05,
            runner_up_score: 0.6,
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            max_diff_ratio: 0.5,
            matched_score: 0.75,
        }
    }
}

impl ScoringConfig {
    /// Weight of the struct-name term for a struct with `field_count` fields.
    pub fn name_weight_for(&self, field_count: usize) -> f64 {
        if field_count <= self.small_struct_fields {
            self.small_struct_name_weight
        } else {
            self.struct_name_weight
        }
    }
}

impl MatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;
        let config: MatchConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("Using default match config: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = [
            ("similarity.name_threshold", self.similarity.name_threshold),
            ("similarity.type_floor", self.similarity.type_floor),
            ("similarity.substring_coverage", self.similarity.substring_coverage),
            ("similarity.substring_score", self.similarity.substring_score),
            ("similarity.affix_score", self.similarity.affix_score),
            ("similarity.stripped_penalty", self.similarity.stripped_penalty),
            ("scoring.exact_threshold", self.scoring.exact_threshold),
            ("scoring.high_sim_threshold", self.scoring.high_sim_threshold),
            ("scoring.high_sim_weight", self.scoring.high_sim_weight),
            ("scoring.structural_weight", self.scoring.structural_weight),
            ("scoring.type_weight", self.scoring.type_weight),
            ("scoring.size_weight", self.scoring.size_weight),
            ("scoring.small_struct_name_weight", self.scoring.small_struct_name_weight),
            ("scoring.struct_name_weight", self.scoring.struct_name_weight),
            ("scoring.order_penalty", self.scoring.order_penalty),
            ("boosts.outlier_similarity", self.boosts.outlier_similarity),
            ("boosts.outlier_margin", self.boosts.outlier_margin),
            ("gate.min_score", self.gate.min_score),
            ("gate.small_field_ratio", self.gate.small_field_ratio),
            ("gate.field_ratio", self.gate.field_ratio),
            ("gate.small_match_ratio", self.gate.small_match_ratio),
            ("gate.match_ratio", self.gate.match_ratio),
            ("gate.lenient_name_similarity", self.gate.lenient_name_similarity),
            ("gate.lenient_score", self.gate.lenient_score),
            ("gate.lenient_match_ratio", self.gate.lenient_match_ratio),
            ("gate.runner_up_gap", self.gate.runner_up_gap),
            ("gate.runner_up_score", self.gate.runner_up_score),
            ("status.max_diff_ratio", self.status.max_diff_ratio),
            ("status.matched_score", self.status.matched_score),
        ];

        for (key, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{} must be between 0.0 and 1.0, got {}", key, value)));
            }
        }

        let weights = self.scoring.structural_weight + self.scoring.type_weight + self.scoring.size_weight;
        if (weights - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid(format!("score weights must sum to 1.0, got {}", weights)));
        }

        if self.boosts.exact_name < 1.0 || self.boosts.outlier < 1.0 {
            return Err(ConfigError::Invalid("boost multipliers must be at least 1.0".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scoring.name_weight_for(3), 0.7);
        assert_eq!(config.scoring.name_weight_for(4), 0.5);
    }

    #[test]
    fn test_rejects_bad_weights() {
        let mut config = MatchConfig::default();
        config.scoring.type_weight = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = MatchConfig::default();
        config.gate.min_score = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: MatchConfig = serde_json::from_str(r#"{ "gate": { "min_score": 0.6 } }"#).unwrap();
        assert_eq!(config.gate.min_score, 0.6);
        assert_eq!(config.gate.size_cap, 64);
        assert_eq!(config.similarity, SimilarityConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("layout-crosscheck-missing-config.json");
        assert!(matches!(MatchConfig::load(&path), Err(ConfigError::NotFound(_))));
        assert_eq!(MatchConfig::load_or_default(&path), MatchConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("layout-crosscheck-config-{}.json", std::process::id()));
        let mut config = MatchConfig::default();
        config.gate.large_size_cap = 256;
        config.save(&path).unwrap();
        let loaded = MatchConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded.gate.large_size_cap, 256);
    }
}
