//! Runtime configuration for the `concord` binary.
//!
//! Resolution order: built-in defaults, then the TOML file (`--config` or
//! `CONCORD_CONFIG`), then individual `CONCORD_*` environment overrides.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use concord_core::AlignmentThresholds;

pub const ENV_SOFT_SPREAD: &str = "CONCORD_SOFT_DISAGREEMENT_SPREAD";
pub const ENV_HARD_REQUIRES_VALUE_CONFLICT: &str = "CONCORD_HARD_REQUIRES_VALUE_CONFLICT";
pub const ENV_SIGNAL_FLOOR: &str = "CONCORD_INSUFFICIENT_SIGNAL_FLOOR";
pub const ENV_SIGNAL_CEILING: &str = "CONCORD_INSUFFICIENT_SIGNAL_CEILING";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcordConfig {
    pub thresholds: ThresholdConfig,
    pub logging: LoggingConfig,
}

/// `[thresholds]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub soft_disagreement_spread: f64,
    pub hard_disagreement_requires_value_conflict: bool,
    pub insufficient_signal_confidence_floor: f64,
    pub insufficient_signal_spread_ceiling: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            soft_disagreement_spread: 0.2,
            hard_disagreement_requires_value_conflict: true,
            insufficient_signal_confidence_floor: 0.5,
            insufficient_signal_spread_ceiling: 0.2,
        }
    }
}

/// `[logging]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ConcordConfig {
    /// Load from `path` (or defaults) and apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Invalid TOML in {:?}", path))
    }

    /// Apply `CONCORD_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let t = &mut self.thresholds;
        if let Some(v) = lookup(ENV_SOFT_SPREAD) {
            t.soft_disagreement_spread = parse_env(ENV_SOFT_SPREAD, &v)?;
        }
        if let Some(v) = lookup(ENV_HARD_REQUIRES_VALUE_CONFLICT) {
            t.hard_disagreement_requires_value_conflict =
                parse_env(ENV_HARD_REQUIRES_VALUE_CONFLICT, &v)?;
        }
        if let Some(v) = lookup(ENV_SIGNAL_FLOOR) {
            t.insufficient_signal_confidence_floor = parse_env(ENV_SIGNAL_FLOOR, &v)?;
        }
        if let Some(v) = lookup(ENV_SIGNAL_CEILING) {
            t.insufficient_signal_spread_ceiling = parse_env(ENV_SIGNAL_CEILING, &v)?;
        }
        Ok(())
    }

    /// Validated engine thresholds.
    pub fn thresholds(&self) -> Result<AlignmentThresholds> {
        let t = &self.thresholds;
        let thresholds = AlignmentThresholds::new(
            t.soft_disagreement_spread,
            t.hard_disagreement_requires_value_conflict,
            t.insufficient_signal_confidence_floor,
            t.insufficient_signal_spread_ceiling,
        );
        thresholds
            .validate()
            .context("Invalid [thresholds] configuration")?;
        Ok(thresholds)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration as TOML")
    }
}

fn parse_env<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid value for {key}: {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = ConcordConfig::default();
        let t = config.thresholds().unwrap();
        assert_eq!(t.soft_disagreement_spread, 0.2);
        assert!(t.hard_disagreement_requires_value_conflict);
        assert_eq!(t.insufficient_signal_confidence_floor, 0.5);
        assert_eq!(t.insufficient_signal_spread_ceiling, 0.2);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("concord.toml");
        std::fs::write(
            &path,
            "[thresholds]\nsoft_disagreement_spread = 0.1\n\n[logging]\njson = true\n",
        )
        .unwrap();

        let config = ConcordConfig::from_file(&path).unwrap();
        assert_eq!(config.thresholds.soft_disagreement_spread, 0.1);
        assert_eq!(config.thresholds.insufficient_signal_confidence_floor, 0.5);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_HARD_REQUIRES_VALUE_CONFLICT, "false"),
            (ENV_SIGNAL_FLOOR, " 0.4 "),
        ]
        .into_iter()
        .collect();
        let mut config = ConcordConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert!(!config.thresholds.hard_disagreement_requires_value_conflict);
        assert_eq!(config.thresholds.insufficient_signal_confidence_floor, 0.4);
        assert_eq!(config.thresholds.soft_disagreement_spread, 0.2);
    }

    #[test]
    fn test_bad_env_value_is_an_error() {
        let mut config = ConcordConfig::default();
        let err = config
            .apply_env(|k| (k == ENV_SOFT_SPREAD).then(|| "wide".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_SOFT_SPREAD));
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let mut config = ConcordConfig::default();
        config.thresholds.insufficient_signal_spread_ceiling = 1.5;
        assert!(config.thresholds().is_err());
    }

    #[test]
    fn test_toml_rendering_reloads() {
        let config = ConcordConfig::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[thresholds]"));
        let back: ConcordConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(back, config);
    }
}
