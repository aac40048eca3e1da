//! Matching thresholds and weights
//!
//! Every cutoff the resolver applies lives here so it can be tuned without
//! touching the matching logic. Defaults reproduce the values the reference
//! data was calibrated against.
//!
//! # Example Config File
//!
//! ```toml
//! hamlet_number_exact = true
//! commune_length_tolerance = 5
//!
//! [thresholds]
//! commune_min = 85
//! total_min = 75
//!
//! [weights.full_address]
//! commune = 0.5
//! district = 0.3
//! province = 0.2
//! ```
//!
//! Omitted keys keep their defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Allowed drift of a weight-set sum from 1.0.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Per-field and combined minimum scores, on the 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub commune_min: f64,
    pub district_min: f64,
    pub province_min: f64,
    pub hamlet_min: f64,
    /// Commune minimum when matching against post-merger names
    pub new_commune_min: f64,
    /// Province minimum when matching against post-merger names
    pub new_province_min: f64,
    /// Minimum weighted total for any fuzzy match
    pub total_min: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            commune_min: 85.0,
            district_min: 70.0,
            province_min: 60.0,
            hamlet_min: 75.0,
            new_commune_min: 85.0,
            new_province_min: 70.0,
            total_min: 75.0,
        }
    }
}

impl Thresholds {
    fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("commune_min", self.commune_min),
            ("district_min", self.district_min),
            ("province_min", self.province_min),
            ("hamlet_min", self.hamlet_min),
            ("new_commune_min", self.new_commune_min),
            ("new_province_min", self.new_province_min),
            ("total_min", self.total_min),
        ]
    }
}

/// Weights for input already written with post-merger names (no district).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewAddressWeights {
    pub commune: f64,
    pub province: f64,
}

impl Default for NewAddressWeights {
    fn default() -> Self {
        Self {
            commune: 0.7,
            province: 0.3,
        }
    }
}

/// Weights for hamlet-level matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HamletWeights {
    pub hamlet: f64,
    pub commune: f64,
    pub district: f64,
    pub province: f64,
}

impl Default for HamletWeights {
    fn default() -> Self {
        Self {
            hamlet: 0.4,
            commune: 0.3,
            district: 0.2,
            province: 0.1,
        }
    }
}

/// Weights for commune / district / province matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullAddressWeights {
    pub commune: f64,
    pub district: f64,
    pub province: f64,
}

impl Default for FullAddressWeights {
    fn default() -> Self {
        Self {
            commune: 0.5,
            district: 0.3,
            province: 0.2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub new_address: NewAddressWeights,
    pub hamlet: HamletWeights,
    pub full_address: FullAddressWeights,
}

/// Resolver tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub thresholds: Thresholds,
    /// Numeric-coded hamlets ("khu pho 2") match only on identical numbers
    pub hamlet_number_exact: bool,
    /// Largest commune-name length difference (in characters) still scored
    pub commune_length_tolerance: usize,
    /// Multiplier applied to the token-sort ratio in field scores
    pub token_sort_scale: f64,
    pub weights: Weights,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            hamlet_number_exact: true,
            commune_length_tolerance: 5,
            token_sort_scale: crate::algorithms::DEFAULT_TOKEN_SORT_SCALE,
            weights: Weights::default(),
        }
    }
}

impl MatchConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check every threshold and weight set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.thresholds.named() {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        let NewAddressWeights { commune, province } = self.weights.new_address;
        check_weights("new_address", &[commune, province])?;

        let HamletWeights {
            hamlet,
            commune,
            district,
            province,
        } = self.weights.hamlet;
        check_weights("hamlet", &[hamlet, commune, district, province])?;

        let FullAddressWeights {
            commune,
            district,
            province,
        } = self.weights.full_address;
        check_weights("full_address", &[commune, district, province])?;

        if !self.token_sort_scale.is_finite() || self.token_sort_scale < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "token_sort_scale",
                value: self.token_sort_scale,
            });
        }

        Ok(())
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the combined minimum for every fuzzy branch
    pub fn with_total_min(mut self, total_min: f64) -> Self {
        self.thresholds.total_min = total_min;
        self
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_hamlet_number_exact(mut self, exact: bool) -> Self {
        self.hamlet_number_exact = exact;
        self
    }

    pub fn with_commune_length_tolerance(mut self, tolerance: usize) -> Self {
        self.commune_length_tolerance = tolerance;
        self
    }

    pub fn with_token_sort_scale(mut self, scale: f64) -> Self {
        self.token_sort_scale = scale;
        self
    }
}

fn check_weights(name: &'static str, weights: &[f64]) -> Result<(), ConfigError> {
    let sum: f64 = weights.iter().sum();
    let valid = weights.iter().all(|w| w.is_finite() && *w >= 0.0)
        && (sum - 1.0).abs() <= WEIGHT_SUM_TOLERANCE;
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidWeights { name, sum })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.thresholds.commune_min, 85.0);
        assert_eq!(config.thresholds.total_min, 75.0);
        assert_eq!(config.weights.full_address.commune, 0.5);
        assert!(config.hamlet_number_exact);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = MatchConfig::from_toml_str(
            r#"
            hamlet_number_exact = false

            [thresholds]
            total_min = 80
            "#,
        )
        .unwrap();
        assert!(!config.hamlet_number_exact);
        assert_eq!(config.thresholds.total_min, 80.0);
        assert_eq!(config.thresholds.district_min, 70.0);
        assert_eq!(config.weights, Weights::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(MatchConfig::from_toml_str("").unwrap(), MatchConfig::default());
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let err = MatchConfig::from_toml_str("[thresholds]\ncommune_min = 120").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidThreshold {
                name: "commune_min",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_unbalanced_weights() {
        let err = MatchConfig::from_toml_str(
            "[weights.hamlet]\nhamlet = 0.5\ncommune = 0.3\ndistrict = 0.2\nprovince = 0.1",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWeights { name: "hamlet", .. }));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let weights = Weights {
            new_address: NewAddressWeights {
                commune: 1.2,
                province: -0.2,
            },
            ..Weights::default()
        };
        let config = MatchConfig::default().with_weights(weights);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = MatchConfig::from_toml_str("thresholds = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "commune_length_tolerance = 3").unwrap();
        writeln!(file, "[weights.new_address]\ncommune = 0.6\nprovince = 0.4").unwrap();

        let config = MatchConfig::from_path(file.path()).unwrap();
        assert_eq!(config.commune_length_tolerance, 3);
        assert_eq!(config.weights.new_address.commune, 0.6);
    }

    #[test]
    fn test_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = MatchConfig::from_path(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_builders() {
        let config = MatchConfig::default()
            .with_total_min(90.0)
            .with_hamlet_number_exact(false)
            .with_commune_length_tolerance(2)
            .with_token_sort_scale(1.0);
        assert_eq!(config.thresholds.total_min, 90.0);
        assert!(!config.hamlet_number_exact);
        assert_eq!(config.commune_length_tolerance, 2);
        assert_eq!(config.token_sort_scale, 1.0);
    }
}
