// Engine Configuration - scan windows, thresholds and scenario policy
// Loaded from JSON documents or from the environment (.env supported)

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::close_approach::{AccuracyTier, ScenarioMode};
use crate::error::ConfigError;
use crate::physics_engine::asteroid_density;

pub const ENV_SEARCH_DAYS: &str = "IMPACT_SEARCH_DAYS";
pub const ENV_ACCURACY: &str = "IMPACT_ACCURACY";
pub const ENV_CLOSE_THRESHOLD_KM: &str = "IMPACT_CLOSE_THRESHOLD_KM";
pub const ENV_IMPACT_THRESHOLD_KM: &str = "IMPACT_THRESHOLD_KM";
pub const ENV_SCENARIO_MODE: &str = "IMPACT_SCENARIO_MODE";
pub const ENV_SEED: &str = "IMPACT_SEED";
pub const ENV_DENSITY: &str = "IMPACT_DENSITY";
pub const ENV_LOG_LEVEL: &str = "IMPACT_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Length of the close-approach search window (days)
    pub search_window_days: f64,
    pub accuracy: AccuracyTier,
    /// Coarse minimum below this triggers the fine refinement pass (km)
    pub close_detection_threshold_km: f64,
    /// Minimum distance below this produces an impact scenario (km)
    pub impact_threshold_km: f64,
    pub scenario_mode: ScenarioMode,
    /// Seed for the synthetic scenario generator
    pub synthetic_seed: u64,
    /// Impactor density used for catalog bodies (kg/m³)
    pub impactor_density_kg_m3: f64,
    /// Default tracing filter, overridden by RUST_LOG
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            search_window_days: 60.0,
            accuracy: AccuracyTier::Coarse,
            close_detection_threshold_km: 500_000.0,
            impact_threshold_km: 100_000.0,
            scenario_mode: ScenarioMode::Trajectory,
            synthetic_seed: 42,
            impactor_density_kg_m3: asteroid_density::STONY,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Defaults overridden by `IMPACT_*` variables; a `.env` file is read first
    /// when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(days) = parse_var(&lookup, ENV_SEARCH_DAYS)? {
            config.search_window_days = days;
        }
        if let Some(tier) = parse_var(&lookup, ENV_ACCURACY)? {
            config.accuracy = tier;
        }
        if let Some(km) = parse_var(&lookup, ENV_CLOSE_THRESHOLD_KM)? {
            config.close_detection_threshold_km = km;
        }
        if let Some(km) = parse_var(&lookup, ENV_IMPACT_THRESHOLD_KM)? {
            config.impact_threshold_km = km;
        }
        if let Some(mode) = parse_var(&lookup, ENV_SCENARIO_MODE)? {
            config.scenario_mode = mode;
        }
        if let Some(seed) = parse_var(&lookup, ENV_SEED)? {
            config.synthetic_seed = seed;
        }
        if let Some(density) = parse_var(&lookup, ENV_DENSITY)? {
            config.impactor_density_kg_m3 = density;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("search_window_days", self.search_window_days),
            (
                "close_detection_threshold_km",
                self.close_detection_threshold_km,
            ),
            ("impact_threshold_km", self.impact_threshold_km),
            ("impactor_density_kg_m3", self.impactor_density_kg_m3),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.impact_threshold_km > self.close_detection_threshold_km {
            return Err(ConfigError::Invalid(format!(
                "impact_threshold_km ({}) exceeds close_detection_threshold_km ({})",
                self.impact_threshold_km, self.close_detection_threshold_km
            )));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Env { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search_window_days, 60.0);
        assert_eq!(config.impact_threshold_km, 100_000.0);
        assert_eq!(config.scenario_mode, ScenarioMode::Trajectory);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{"accuracy": "fine", "search_window_days": 30}"#)
                .unwrap();
        assert_eq!(config.accuracy, AccuracyTier::Fine);
        assert_eq!(config.search_window_days, 30.0);
        assert_eq!(config.synthetic_seed, 42);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let err = EngineConfig::from_json_str(
            r#"{"impact_threshold_km": 600000, "close_detection_threshold_km": 500000}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_env_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (ENV_SEARCH_DAYS, "120"),
            (ENV_ACCURACY, "fine"),
            (ENV_SCENARIO_MODE, "synthetic"),
            (ENV_SEED, "7"),
            (ENV_LOG_LEVEL, "debug"),
        ]))
        .unwrap();
        assert_eq!(config.search_window_days, 120.0);
        assert_eq!(config.accuracy, AccuracyTier::Fine);
        assert_eq!(config.scenario_mode, ScenarioMode::Synthetic);
        assert_eq!(config.synthetic_seed, 7);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_env_rejects_garbage() {
        let err = EngineConfig::from_lookup(lookup_from(&[(ENV_SEED, "forty-two")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: ENV_SEED, .. }));

        let err = EngineConfig::from_lookup(lookup_from(&[(ENV_SEARCH_DAYS, "-5")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
