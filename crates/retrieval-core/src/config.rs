//! Configuration types for the retrieval engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, RetrievalError};

/// Main configuration for the retrieval engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// BM25 term-weighting parameters.
    #[serde(default)]
    pub bm25: Bm25Config,

    /// Rank fusion parameters.
    #[serde(default)]
    pub fusion: FusionConfig,

    /// Search defaults.
    #[serde(default)]
    pub search: SearchConfig,
}

/// BM25 parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bm25Config {
    /// Term-frequency saturation.
    #[serde(default = "default_k1")]
    pub k1: f32,

    /// Document-length normalization (0 = none, 1 = full).
    #[serde(default = "default_b")]
    pub b: f32,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

/// Reciprocal rank fusion parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// RRF constant. 60 is the standard value balancing high vs. low ranks.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f32,

    /// Default weight of the vector ranking.
    #[serde(default = "default_weight")]
    pub vector_weight: f32,

    /// Default weight of the lexical ranking.
    #[serde(default = "default_weight")]
    pub lexical_weight: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            rrf_k: 60.0,
            vector_weight: 1.0,
            lexical_weight: 1.0,
        }
    }
}

/// Search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default number of fused results.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { default_top_k: 5 }
    }
}

// Default value functions

fn default_k1() -> f32 {
    1.5
}

fn default_b() -> f32 {
    0.75
}

fn default_rrf_k() -> f32 {
    60.0
}

fn default_weight() -> f32 {
    1.0
}

fn default_top_k() -> usize {
    5
}

impl RetrievalConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| RetrievalError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default paths, falling back to defaults.
    pub fn load_default() -> Result<Self> {
        // Try user config first
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("retrieval").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        // Try local config
        let local_config = PathBuf::from("retrieval.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        Ok(Self::default())
    }

    /// Validate the parameter space. Called before the config is used;
    /// a bad value aborts before any computation starts.
    pub fn validate(&self) -> Result<()> {
        if self.fusion.rrf_k <= 0.0 {
            return Err(RetrievalError::invalid_argument(format!(
                "rrf_k must be > 0, got {}",
                self.fusion.rrf_k
            )));
        }
        if self.fusion.vector_weight < 0.0 || self.fusion.lexical_weight < 0.0 {
            return Err(RetrievalError::invalid_argument(
                "fusion weights must be >= 0",
            ));
        }
        if self.bm25.k1 < 0.0 {
            return Err(RetrievalError::invalid_argument(format!(
                "bm25 k1 must be >= 0, got {}",
                self.bm25.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(RetrievalError::invalid_argument(format!(
                "bm25 b must be in [0, 1], got {}",
                self.bm25.b
            )));
        }
        if self.search.default_top_k == 0 {
            return Err(RetrievalError::invalid_argument("default_top_k must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RetrievalConfig::default();
        assert_eq!(config.fusion.rrf_k, 60.0);
        assert_eq!(config.bm25.k1, 1.5);
        assert_eq!(config.bm25.b, 0.75);
        assert_eq!(config.search.default_top_k, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RetrievalConfig::default();
        config.fusion.rrf_k = 0.0;
        assert!(config.validate().is_err());

        let mut config = RetrievalConfig::default();
        config.fusion.vector_weight = -1.0;
        assert!(config.validate().is_err());

        let mut config = RetrievalConfig::default();
        config.bm25.b = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_toml_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bm25]\nk1 = 1.2").unwrap();

        let config = RetrievalConfig::load(file.path()).unwrap();
        assert_eq!(config.bm25.k1, 1.2);
        assert_eq!(config.bm25.b, 0.75);
        assert_eq!(config.fusion.rrf_k, 60.0);
    }

    #[test]
    fn test_load_rejects_invalid_toml_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fusion]\nrrf_k = -5.0").unwrap();

        assert!(RetrievalConfig::load(file.path()).is_err());
    }
}
