use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::insights::{FusionConfig, FusionWeights};
use crate::models::Domain;

/// Application-level constants
pub const APP_NAME: &str = "Lunara";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const ENV_RECENCY_WINDOW: &str = "LUNARA_RECENCY_WINDOW";
pub const ENV_EXTRACTION_TIMEOUT_SECS: &str = "LUNARA_EXTRACTION_TIMEOUT_SECS";
pub const ENV_FUSION_PROFILE: &str = "LUNARA_FUSION_PROFILE";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "lunara_lib=info"
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("invalid fusion weight for {domain}: {weight}")]
    InvalidWeight { domain: Domain, weight: f64 },

    #[error("fusion weights sum to {total}, above the allowed maximum")]
    WeightTotal { total: f64 },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════════════════════
// Tracker configuration
// ═══════════════════════════════════════════════════════════

/// Basal body temperature pattern detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BbtConfig {
    /// Fewer readings than this report "insufficient data".
    pub min_entries: usize,
    /// Most recent readings considered.
    pub window: usize,
    /// Minimum second-half rise in °C that counts as ovulation.
    pub rise_threshold: f64,
}

impl Default for BbtConfig {
    fn default() -> Self {
        Self {
            min_entries: 7,
            window: 14,
            rise_threshold: 0.2,
        }
    }
}

/// Tunables for scoring, fusion and the extraction boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Most recent entries used where recency matters (sleep, stress,
    /// water intake, exercise minutes, symptom severity).
    pub recency_window: usize,
    /// Upper bound on one extractor call.
    pub extraction_timeout_secs: u64,
    pub fusion: FusionConfig,
    pub bbt: BbtConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            recency_window: 7,
            extraction_timeout_secs: 30,
            fusion: FusionConfig::default(),
            bbt: BbtConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Defaults overlaid with `LUNARA_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup` (environment-style keys).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_RECENCY_WINDOW) {
            config.recency_window = parse_env(ENV_RECENCY_WINDOW, &raw)?;
        }
        if let Some(raw) = lookup(ENV_EXTRACTION_TIMEOUT_SECS) {
            config.extraction_timeout_secs = parse_env(ENV_EXTRACTION_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_FUSION_PROFILE) {
            config.fusion.weights = match raw.trim().to_ascii_lowercase().as_str() {
                "six_domain" => FusionWeights::six_domain(),
                "five_domain" => FusionWeights::five_domain(),
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        key: ENV_FUSION_PROFILE,
                        value: raw,
                    })
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recency_window == 0 {
            return Err(ConfigError::Invalid("recency_window must be at least 1".into()));
        }
        if self.extraction_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "extraction_timeout_secs must be at least 1".into(),
            ));
        }
        if self.bbt.min_entries < 2 || self.bbt.window < self.bbt.min_entries {
            return Err(ConfigError::Invalid(format!(
                "bbt window {} must cover min_entries {} (at least 2)",
                self.bbt.window, self.bbt.min_entries
            )));
        }
        if !self.bbt.rise_threshold.is_finite() || self.bbt.rise_threshold <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "bbt rise_threshold must be positive, got {}",
                self.bbt.rise_threshold
            )));
        }
        self.fusion.weights.validate()
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_name_is_lunara() {
        assert_eq!(APP_NAME, "Lunara");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }

    #[test]
    fn defaults_are_valid() {
        let config = TrackerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.recency_window, 7);
        assert_eq!(config.bbt.min_entries, 7);
        assert_eq!(config.bbt.window, 14);
        assert_eq!(config.fusion.weights, FusionWeights::six_domain());
    }

    #[test]
    fn env_overlays_defaults() {
        let config = TrackerConfig::from_lookup(lookup(&[
            (ENV_RECENCY_WINDOW, "10"),
            (ENV_EXTRACTION_TIMEOUT_SECS, " 5 "),
            (ENV_FUSION_PROFILE, "FIVE_DOMAIN"),
        ]))
        .unwrap();
        assert_eq!(config.recency_window, 10);
        assert_eq!(config.extraction_timeout_secs, 5);
        assert_eq!(config.fusion.weights, FusionWeights::five_domain());
    }

    #[test]
    fn empty_env_gives_defaults() {
        let config = TrackerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn bad_env_values_are_rejected() {
        let err = TrackerConfig::from_lookup(lookup(&[(ENV_RECENCY_WINDOW, "week")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: ENV_RECENCY_WINDOW, .. }));

        let err = TrackerConfig::from_lookup(lookup(&[(ENV_RECENCY_WINDOW, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = TrackerConfig::from_lookup(lookup(&[(ENV_FUSION_PROFILE, "seven")])).unwrap_err();
        assert!(err.to_string().contains(ENV_FUSION_PROFILE));
    }

    #[test]
    fn json_config_merges_with_defaults() {
        let config = TrackerConfig::from_json(
            r#"{"recency_window": 5, "fusion": {"weights": {"nutrition": 0.5, "exercise": 0.5}}}"#,
        )
        .unwrap();
        assert_eq!(config.recency_window, 5);
        assert_eq!(config.fusion.weights.weight(Domain::Nutrition), 0.5);
        assert_eq!(config.fusion.weights.weight(Domain::Cycle), 0.0);
        assert_eq!(config.bbt, BbtConfig::default());
    }

    #[test]
    fn json_config_rejects_heavy_weights() {
        let err = TrackerConfig::from_json(r#"{"fusion": {"weights": {"cycle": 1.0, "fertility": 1.0}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::WeightTotal { .. }));

        assert!(matches!(
            TrackerConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
