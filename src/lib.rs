// ImpactRisk - Asteroid impact effects and close-approach prediction
// Library entry point: module tree and the commonly used types

pub mod catalog;
pub mod close_approach;
pub mod config;
pub mod error;
pub mod impact_effects;
pub mod logging;
pub mod orbital_propagator;
pub mod physics_engine;
pub mod scenarios;
pub mod service;
pub mod tsunami;

pub use catalog::{parse_sbdb_response, CatalogRecord, PhysicalProperties};
pub use close_approach::{
    find_close_approach, predict_batch, predict_impact, record_rng, AccuracyTier, BatchEntry,
    CloseApproachResult, CompassDirection, ImpactEffects, ImpactPrediction, ImpactScenario,
    ScenarioMode,
};
pub use config::EngineConfig;
pub use error::{CatalogError, ConfigError, ImpactError, OrbitError, ScenarioError};
pub use impact_effects::{AsteroidPhysicalParameters, ImpactAnalysis, RiskCategory};
pub use orbital_propagator::{
    earth_position_at, position_at, predict_position, solve_kepler_equation, OrbitalElements,
    PositionPrediction, StateVector,
};
pub use physics_engine::{CartesianState, Vector3};
pub use service::{ApiResponse, ImpactService};
pub use tsunami::{assess_tsunami_risk, TsunamiAssessment};
