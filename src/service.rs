// Impact Service - Entry points for the request layer
// Every call returns an ApiResponse envelope; errors never escape as panics

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, warn};

use crate::catalog::{parse_sbdb_response, CatalogRecord};
use crate::close_approach::{self, BatchEntry, ImpactPrediction};
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::impact_effects::{
    AsteroidPhysicalParameters, CasualtyEstimate, ImpactAnalysis, DEFAULT_IMPACT_ANGLE_DEG,
};
use crate::orbital_propagator::{
    assess_orbit_risk, predict_position, predict_trajectory, OrbitRiskAssessment,
    OrbitalElements, PositionPrediction, TrajectoryPrediction,
};
use crate::physics_engine::asteroid_density;
use crate::scenarios::{
    self, ImpactLocation, ParameterStudy, ScenarioComparison, ScenarioRun, StudyParameter,
};
use crate::tsunami::{self, ElevationSample, TsunamiAssessment, DEFAULT_SEARCH_RADIUS_KM};

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// `{"success": true, "data": …}` or `{"success": false, "error": "…"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                warn!(error = %e, "request failed");
                Self::err(e.to_string())
            }
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

fn default_density() -> f64 {
    asteroid_density::STONY
}

fn default_angle() -> f64 {
    DEFAULT_IMPACT_ANGLE_DEG
}

fn default_search_radius() -> f64 {
    DEFAULT_SEARCH_RADIUS_KM
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactRequest {
    pub diameter_m: f64,
    pub velocity_km_s: f64,
    #[serde(default = "default_density")]
    pub density_kg_m3: f64,
    #[serde(default = "default_angle")]
    pub angle_degrees: f64,
}

impl ImpactRequest {
    fn parameters(&self) -> Result<AsteroidPhysicalParameters, crate::error::ImpactError> {
        AsteroidPhysicalParameters::with_details(
            self.diameter_m,
            self.velocity_km_s,
            self.density_kg_m3,
            self.angle_degrees,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CasualtyRequest {
    #[serde(flatten)]
    pub impact: ImpactRequest,
    pub population_density_per_km2: f64,
    pub total_population: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsunamiRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub diameter_m: f64,
    /// Elevation at the impact point as reported by the terrain service (m)
    pub elevation_m: f64,
    #[serde(default)]
    pub ring: Vec<ElevationSample>,
    #[serde(default = "default_search_radius")]
    pub search_radius_km: f64,
}

// =============================================================================
// SERVICE
// =============================================================================

/// Holds the validated engine configuration shared by all calls.
#[derive(Debug, Clone)]
pub struct ImpactService {
    config: EngineConfig,
}

impl ImpactService {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(EngineConfig::from_env()?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fresh generator per asteroid so identical requests give identical
    /// synthetic scenarios, alone or inside a batch.
    fn scenario_rng(&self, asteroid_id: &str) -> StdRng {
        close_approach::record_rng(self.config.synthetic_seed, asteroid_id)
    }

    // ===== IMPACT EFFECTS =====

    pub fn analyze_impact(&self, request: &ImpactRequest) -> ApiResponse<ImpactAnalysis> {
        debug!(?request, "analyze_impact");
        ApiResponse::from_result(request.parameters().map(|p| p.comprehensive_analysis()))
    }

    pub fn estimate_casualties(&self, request: &CasualtyRequest) -> ApiResponse<CasualtyEstimate> {
        ApiResponse::from_result(request.impact.parameters().and_then(|p| {
            p.estimate_casualties(request.population_density_per_km2, request.total_population)
        }))
    }

    // ===== ORBITS =====

    pub fn predict_position(
        &self,
        elements: &OrbitalElements,
        date: &DateTime<Utc>,
    ) -> ApiResponse<PositionPrediction> {
        ApiResponse::from_result(predict_position(elements, date))
    }

    pub fn predict_trajectory(
        &self,
        elements: &OrbitalElements,
        start: &DateTime<Utc>,
        days: f64,
        points: usize,
    ) -> ApiResponse<TrajectoryPrediction> {
        ApiResponse::from_result(predict_trajectory(elements, start, days, points))
    }

    pub fn assess_orbit(
        &self,
        elements: &OrbitalElements,
        diameter_km: f64,
    ) -> ApiResponse<OrbitRiskAssessment> {
        ApiResponse::from_result(assess_orbit_risk(elements, diameter_km))
    }

    // ===== CLOSE APPROACH =====

    pub fn predict_impact(
        &self,
        record: &CatalogRecord,
        start: &DateTime<Utc>,
    ) -> ApiResponse<ImpactPrediction> {
        let mut rng = self.scenario_rng(&record.id);
        ApiResponse::from_result(close_approach::predict_impact(
            record,
            start,
            &self.config,
            &mut rng,
        ))
    }

    /// Always succeeds at the envelope level; per-asteroid failures are in the entries.
    pub fn predict_batch(
        &self,
        records: &[CatalogRecord],
        start: &DateTime<Utc>,
    ) -> ApiResponse<Vec<BatchEntry>> {
        ApiResponse::ok(close_approach::predict_batch(
            records,
            start,
            &self.config,
            |record| self.scenario_rng(&record.id),
        ))
    }

    pub fn parse_catalog_record(&self, id: &str, payload: &str) -> ApiResponse<CatalogRecord> {
        ApiResponse::from_result(parse_sbdb_response(id, payload))
    }

    // ===== TSUNAMI =====

    pub fn assess_tsunami(&self, request: &TsunamiRequest) -> ApiResponse<TsunamiAssessment> {
        ApiResponse::from_result(tsunami::assess_tsunami_risk(
            request.latitude,
            request.longitude,
            request.diameter_m,
            request.elevation_m,
            &request.ring,
            request.search_radius_km,
        ))
    }

    // ===== SCENARIOS =====

    pub fn run_scenario(
        &self,
        key: &str,
        custom_location: Option<ImpactLocation>,
    ) -> ApiResponse<ScenarioRun> {
        ApiResponse::from_result(scenarios::run_scenario(key, custom_location))
    }

    pub fn compare_scenarios(&self, keys: &[&str]) -> ApiResponse<ScenarioComparison> {
        ApiResponse::from_result(scenarios::compare_scenarios(keys))
    }

    pub fn parameter_study(
        &self,
        parameter: &str,
        base_diameter_m: f64,
        values: Option<&[f64]>,
    ) -> ApiResponse<ParameterStudy> {
        ApiResponse::from_result(
            parameter
                .parse::<StudyParameter>()
                .and_then(|p| scenarios::parameter_study(p, base_diameter_m, values)),
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
