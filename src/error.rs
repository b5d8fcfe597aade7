// Error types for the impact and orbit engines
// Every expected domain violation surfaces as one of these, never as a panic

use thiserror::Error;

/// Invalid input to the impact-effects model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImpactError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("{name} out of range: {value} ({expected})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Failure while propagating an orbit or scanning for a close approach.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitError {
    #[error("invalid orbital element {name} = {value}: {reason}")]
    InvalidElement {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("numeric overflow while evaluating {context} at JD {julian_date}")]
    NumericOverflow {
        context: &'static str,
        julian_date: f64,
    },
    #[error("julian date {0} cannot be represented as a calendar date")]
    InvalidDate(f64),
    #[error("invalid scan parameter: {0}")]
    InvalidScan(String),
    #[error("impact model rejected scenario parameters: {0}")]
    Impact(#[from] ImpactError),
}

/// Errors that can occur while loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("environment variable {key} has invalid value {value:?}")]
    Env { key: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while decoding catalog payloads.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse catalog payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog payload has no `object` entry")]
    MissingObject,
}

/// Errors raised by the reference scenario catalogue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
    #[error("unknown study parameter: {0} (expected diameter, velocity or angle)")]
    UnknownParameter(String),
    #[error("parameter study needs at least one value")]
    EmptyStudy,
    #[error(transparent)]
    Impact(#[from] ImpactError),
}

/// Rejects NaN/inf before any range check.
pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64, ImpactError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ImpactError::NotFinite { name, value })
    }
}
