// Close Approach - Earth encounter scan and impact scenario synthesis
// Samples the Earth-relative distance over a window, refines the minimum and
// derives an impact scenario when it falls inside the impact threshold

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::catalog::CatalogRecord;
use crate::config::EngineConfig;
use crate::error::OrbitError;
use crate::impact_effects::{
    damage_radii, AirBlastRanges, AsteroidPhysicalParameters, CraterDimensions, DamageRadii,
    KineticEnergy, SeismicMagnitude, DEFAULT_IMPACT_ANGLE_DEG,
};
use crate::orbital_propagator::{relative_state, OrbitalElements, RelativeState};
use crate::physics_engine::{
    date_from_julian, gmst_degrees, julian_date, normalize_degrees, wrap_longitude, Vector3,
    EARTH_ESCAPE_VELOCITY, EARTH_RADIUS_KM,
};

/// Half-width of the refinement window around the coarse minimum (days)
const REFINEMENT_HALF_WIDTH_DAYS: f64 = 1.0;
/// Refinement sampling step (days)
const REFINEMENT_STEP_DAYS: f64 = 1.0 / 24.0;

/// Grazing entries are floored here so the crater model stays defined
const MIN_IMPACT_ANGLE_DEG: f64 = 1.0;

/// Synthetic scenario sampling ranges
const SYNTHETIC_LATITUDE: (f64, f64) = (-60.0, 60.0);
const SYNTHETIC_LONGITUDE: (f64, f64) = (-180.0, 180.0);
const SYNTHETIC_VELOCITY_KM_S: (f64, f64) = (11.0, 30.0);

// =============================================================================
// MODES
// =============================================================================

/// Sampling resolution of the close-approach scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyTier {
    /// 2-day steps, no refinement
    #[default]
    Coarse,
    /// 6-hour steps plus hourly refinement around a close minimum
    Fine,
}

impl AccuracyTier {
    pub fn step_days(&self) -> f64 {
        match self {
            Self::Coarse => 2.0,
            Self::Fine => 0.25,
        }
    }

    pub fn refines(&self) -> bool {
        matches!(self, Self::Fine)
    }
}

impl FromStr for AccuracyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coarse" => Ok(Self::Coarse),
            "fine" => Ok(Self::Fine),
            other => Err(format!("unknown accuracy tier: {other}")),
        }
    }
}

/// How impact coordinates are produced once an impact is predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioMode {
    /// Derived from the relative position and velocity at closest approach
    #[default]
    Trajectory,
    /// Sampled from a seeded generator, independent of the trajectory
    Synthetic,
}

impl FromStr for ScenarioMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trajectory" => Ok(Self::Trajectory),
            "synthetic" => Ok(Self::Synthetic),
            other => Err(format!("unknown scenario mode: {other}")),
        }
    }
}

/// 8-point compass direction the impactor arrives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompassDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassDirection {
    const ALL: [CompassDirection; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    /// Bearing in degrees clockwise from north.
    pub fn from_bearing(bearing_deg: f64) -> Self {
        let sector = (normalize_degrees(bearing_deg + 22.5) / 45.0).floor() as usize;
        Self::ALL[sector % 8]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::N => "North",
            Self::NE => "Northeast",
            Self::E => "East",
            Self::SE => "Southeast",
            Self::S => "South",
            Self::SW => "Southwest",
            Self::W => "West",
            Self::NW => "Northwest",
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// RESULT TYPES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseApproachResult {
    pub distance_km: f64,
    pub distance_earth_radii: f64,
    pub date: DateTime<Utc>,
    pub julian_date: f64,
    /// Distance evaluations performed, refinement included
    pub samples_evaluated: usize,
    pub refined: bool,
}

/// Effects of a synthesized impact, from the shared impact model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactEffects {
    pub energy: KineticEnergy,
    pub crater: CraterDimensions,
    pub seismic: SeismicMagnitude,
    pub air_blast: AirBlastRanges,
    pub damage_radii: DamageRadii,
}

impl ImpactEffects {
    pub fn from_parameters(params: &AsteroidPhysicalParameters) -> Self {
        let energy = params.kinetic_energy();
        Self {
            energy,
            crater: params.crater_size(),
            seismic: params.seismic_magnitude(),
            air_blast: params.air_blast_ranges(),
            damage_radii: damage_radii(energy.energy_tnt_megatons),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactScenario {
    pub date: DateTime<Utc>,
    pub julian_date: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Direction of arrival, degrees clockwise from north in [0, 360)
    pub bearing_deg: f64,
    pub direction: CompassDirection,
    pub velocity_km_s: f64,
    pub impact_angle_deg: f64,
    pub mode: ScenarioMode,
    pub effects: ImpactEffects,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactPrediction {
    pub asteroid_id: String,
    pub asteroid_name: String,
    pub closest_approach: CloseApproachResult,
    pub impact: Option<ImpactScenario>,
}

impl ImpactPrediction {
    pub fn is_impact(&self) -> bool {
        self.impact.is_some()
    }
}

/// One entry per batch input; failures are captured, never propagated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub asteroid_id: String,
    pub success: bool,
    pub prediction: Option<ImpactPrediction>,
    pub error: Option<String>,
}

// =============================================================================
// CLOSE-APPROACH SCAN
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct ScanMinimum {
    state: RelativeState,
    samples: usize,
    refined: bool,
}

fn sample_range(
    elements: &OrbitalElements,
    from_jd: f64,
    span_days: f64,
    step_days: f64,
    best: &mut Option<RelativeState>,
) -> Result<usize, OrbitError> {
    // Tolerate representation error in fractional steps such as 1/24 day
    let steps = (span_days / step_days + 1e-9).floor() as usize;
    for k in 0..=steps {
        let jd = from_jd + k as f64 * step_days;
        let rel = relative_state(elements, jd)?;
        if best.as_ref().map_or(true, |b| rel.distance_km < b.distance_km) {
            *best = Some(rel);
        }
    }
    Ok(steps + 1)
}

fn scan_minimum(
    elements: &OrbitalElements,
    start_jd: f64,
    config: &EngineConfig,
) -> Result<ScanMinimum, OrbitError> {
    if !start_jd.is_finite() {
        return Err(OrbitError::InvalidDate(start_jd));
    }
    config
        .validate()
        .map_err(|e| OrbitError::InvalidScan(e.to_string()))?;
    elements.validate()?;

    let tier = config.accuracy;
    debug!(
        start_jd,
        window_days = config.search_window_days,
        ?tier,
        "scanning for close approach"
    );

    let mut best = None;
    let mut samples = sample_range(
        elements,
        start_jd,
        config.search_window_days,
        tier.step_days(),
        &mut best,
    )?;
    let Some(coarse) = best else {
        return Err(OrbitError::InvalidScan("scan produced no samples".into()));
    };

    let mut refined = false;
    if tier.refines() && coarse.distance_km < config.close_detection_threshold_km {
        debug!(
            distance_km = coarse.distance_km,
            julian_date = coarse.julian_date,
            "refining close approach"
        );
        samples += sample_range(
            elements,
            coarse.julian_date - REFINEMENT_HALF_WIDTH_DAYS,
            2.0 * REFINEMENT_HALF_WIDTH_DAYS,
            REFINEMENT_STEP_DAYS,
            &mut best,
        )?;
        refined = true;
    }

    let state = best.unwrap_or(coarse);
    Ok(ScanMinimum {
        state,
        samples,
        refined,
    })
}

impl ScanMinimum {
    fn to_result(&self) -> Result<CloseApproachResult, OrbitError> {
        let jd = self.state.julian_date;
        let date = date_from_julian(jd).ok_or(OrbitError::InvalidDate(jd))?;
        Ok(CloseApproachResult {
            distance_km: self.state.distance_km,
            distance_earth_radii: self.state.distance_km / EARTH_RADIUS_KM,
            date,
            julian_date: jd,
            samples_evaluated: self.samples,
            refined: self.refined,
        })
    }
}

/// Minimum Earth distance over `config.search_window_days` from `start_jd`.
pub fn find_close_approach(
    elements: &OrbitalElements,
    start_jd: f64,
    config: &EngineConfig,
) -> Result<CloseApproachResult, OrbitError> {
    scan_minimum(elements, start_jd, config)?.to_result()
}

// =============================================================================
// SCENARIO GEOMETRY
// =============================================================================

/// Impact site and approach derived from the Earth-relative motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryGeometry {
    pub latitude: f64,
    pub longitude: f64,
    pub bearing_deg: f64,
    pub impact_angle_deg: f64,
    pub velocity_km_s: f64,
    /// Whether the straight-line path actually crosses Earth's surface
    pub intersects_surface: bool,
}

/// Straight-line extrapolation of the relative motion onto Earth's sphere.
///
/// A path that misses is projected onto the surface point under its closest
/// approach and given a 45° entry.
pub fn trajectory_geometry(
    relative_position: &Vector3,
    relative_velocity: &Vector3,
    earth_position: &Vector3,
    jd: f64,
) -> TrajectoryGeometry {
    let speed = relative_velocity.magnitude();
    let direction = relative_velocity.normalize();
    let moving = speed > 1e-9;

    let mut intersects_surface = false;
    let mut impact_angle_deg = DEFAULT_IMPACT_ANGLE_DEG;

    let normal = if moving {
        // |r + s·d|² = R²
        let b = relative_position.dot(&direction);
        let c = relative_position.magnitude().powi(2) - EARTH_RADIUS_KM.powi(2);
        let discriminant = b * b - c;
        if discriminant >= 0.0 {
            let s = -b - discriminant.sqrt();
            let normal = relative_position
                .add(&direction.scale(s))
                .scale(1.0 / EARTH_RADIUS_KM);
            intersects_surface = true;
            let sin_angle = (-direction.dot(&normal)).clamp(-1.0, 1.0);
            impact_angle_deg = sin_angle.asin().to_degrees();
            normal
        } else {
            let along = direction.scale(relative_position.dot(&direction));
            let perpendicular = relative_position.sub(&along);
            if perpendicular.magnitude() > 1e-9 {
                perpendicular.normalize()
            } else {
                relative_position.normalize()
            }
        }
    } else if relative_position.magnitude() > 1e-9 {
        relative_position.normalize()
    } else {
        earth_position.scale(-1.0).normalize()
    };

    let normal_eq = normal.ecliptic_to_equatorial();
    let latitude = normal_eq.z.clamp(-1.0, 1.0).asin();
    let right_ascension = normal_eq.y.atan2(normal_eq.x);
    let longitude = wrap_longitude(right_ascension.to_degrees() - gmst_degrees(jd));

    // Local east/north at the impact site, equatorial frame
    let (sin_ra, cos_ra) = right_ascension.sin_cos();
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let east = Vector3::new(-sin_ra, cos_ra, 0.0);
    let north = Vector3::new(-sin_lat * cos_ra, -sin_lat * sin_ra, cos_lat);

    let from = direction.ecliptic_to_equatorial().scale(-1.0);
    let (from_east, from_north) = (from.dot(&east), from.dot(&north));
    let bearing_deg = if moving && from_east.hypot(from_north) > 1e-9 {
        normalize_degrees(from_east.atan2(from_north).to_degrees())
    } else {
        0.0
    };

    TrajectoryGeometry {
        latitude: latitude.to_degrees(),
        longitude,
        bearing_deg,
        impact_angle_deg: impact_angle_deg.clamp(MIN_IMPACT_ANGLE_DEG, 90.0),
        velocity_km_s: (speed * speed + EARTH_ESCAPE_VELOCITY * EARTH_ESCAPE_VELOCITY).sqrt(),
        intersects_surface,
    }
}

/// Plausible impact parameters drawn from `rng`, unrelated to the orbit.
pub fn synthetic_geometry<R: Rng>(rng: &mut R) -> TrajectoryGeometry {
    let latitude = rng.gen_range(SYNTHETIC_LATITUDE.0..SYNTHETIC_LATITUDE.1);
    let longitude = rng.gen_range(SYNTHETIC_LONGITUDE.0..SYNTHETIC_LONGITUDE.1);
    let velocity_km_s = rng.gen_range(SYNTHETIC_VELOCITY_KM_S.0..SYNTHETIC_VELOCITY_KM_S.1);
    let bearing_deg = rng.gen_range(0.0..360.0);

    TrajectoryGeometry {
        latitude,
        longitude,
        bearing_deg,
        impact_angle_deg: DEFAULT_IMPACT_ANGLE_DEG,
        velocity_km_s,
        intersects_surface: false,
    }
}

fn synthesize_scenario<R: Rng>(
    record: &CatalogRecord,
    closest: &RelativeState,
    date: DateTime<Utc>,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<ImpactScenario, OrbitError> {
    let geometry = match config.scenario_mode {
        ScenarioMode::Trajectory => trajectory_geometry(
            &closest.position_km,
            &closest.velocity_km_s,
            &closest.earth.position,
            closest.julian_date,
        ),
        ScenarioMode::Synthetic => synthetic_geometry(rng),
    };

    let density = record
        .physical_properties
        .density_kg_m3()
        .unwrap_or(config.impactor_density_kg_m3);
    let params = AsteroidPhysicalParameters::with_details(
        record.physical_properties.diameter_m(),
        geometry.velocity_km_s,
        density,
        geometry.impact_angle_deg,
    )?;

    Ok(ImpactScenario {
        date,
        julian_date: closest.julian_date,
        latitude: geometry.latitude,
        longitude: geometry.longitude,
        bearing_deg: geometry.bearing_deg,
        direction: CompassDirection::from_bearing(geometry.bearing_deg),
        velocity_km_s: geometry.velocity_km_s,
        impact_angle_deg: geometry.impact_angle_deg,
        mode: config.scenario_mode,
        effects: ImpactEffects::from_parameters(&params),
    })
}

// =============================================================================
// PREDICTION
// =============================================================================

/// Scan one catalog body and synthesize an impact scenario when its minimum
/// distance falls below `config.impact_threshold_km`.
///
/// `rng` is only drawn from in synthetic mode.
pub fn predict_impact<R: Rng>(
    record: &CatalogRecord,
    start: &DateTime<Utc>,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<ImpactPrediction, OrbitError> {
    let minimum = scan_minimum(&record.orbital_elements, julian_date(start), config)?;
    let closest_approach = minimum.to_result()?;

    let impact = if closest_approach.distance_km < config.impact_threshold_km {
        let scenario = synthesize_scenario(
            record,
            &minimum.state,
            closest_approach.date,
            config,
            rng,
        )?;
        info!(
            asteroid = %record.id,
            date = %scenario.date,
            latitude = scenario.latitude,
            longitude = scenario.longitude,
            energy_mt = scenario.effects.energy.energy_tnt_megatons,
            "impact scenario synthesized"
        );
        Some(scenario)
    } else {
        debug!(
            asteroid = %record.id,
            distance_km = closest_approach.distance_km,
            "no impact within window"
        );
        None
    };

    Ok(ImpactPrediction {
        asteroid_id: record.id.clone(),
        asteroid_name: record.display_name().to_string(),
        closest_approach,
        impact,
    })
}

/// Generator for one record's synthetic scenario, keyed by `seed` and the
/// record id so results do not depend on batch order or neighbours.
pub fn record_rng(seed: u64, asteroid_id: &str) -> StdRng {
    // FNV-1a
    let id_hash = asteroid_id
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        });
    StdRng::seed_from_u64(seed ^ id_hash)
}

/// Predict every record independently. Each record draws from its own
/// generator from `rng_for`. A failing record yields an entry with
/// `success == false` and does not affect the others.
pub fn predict_batch<R, F>(
    records: &[CatalogRecord],
    start: &DateTime<Utc>,
    config: &EngineConfig,
    mut rng_for: F,
) -> Vec<BatchEntry>
where
    R: Rng,
    F: FnMut(&CatalogRecord) -> R,
{
    records
        .iter()
        .map(|record| {
            let mut rng = rng_for(record);
            match predict_impact(record, start, config, &mut rng) {
                Ok(prediction) => BatchEntry {
                    asteroid_id: record.id.clone(),
                    success: true,
                    prediction: Some(prediction),
                    error: None,
                },
                Err(err) => {
                    warn!(asteroid = %record.id, error = %err, "prediction failed");
                    BatchEntry {
                        asteroid_id: record.id.clone(),
                        success: false,
                        prediction: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_engine::{
        AU_KM, EARTH_MEAN_LONGITUDE_J2000, EARTH_MEAN_MOTION_DEG_PER_DAY, J2000_JD,
    };
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn start_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap()
    }

    fn earth_longitude_deg(jd: f64) -> f64 {
        normalize_degrees(EARTH_MEAN_LONGITUDE_J2000 + EARTH_MEAN_MOTION_DEG_PER_DAY * (jd - J2000_JD))
    }

    /// Circular coplanar orbit 0.02 AU outside Earth's, slightly ahead of it.
    fn trailing_circular(start_jd: f64) -> OrbitalElements {
        OrbitalElements {
            semi_major_axis: 1.02,
            eccentricity: 0.0,
            inclination: 0.0,
            ascending_node: 0.0,
            argument_perihelion: 0.0,
            mean_anomaly: earth_longitude_deg(start_jd) + 0.8655,
            epoch: start_jd,
        }
    }

    /// Perihelion at exactly 1 AU, reached where Earth is 20 days after start.
    fn colliding(start_jd: f64) -> CatalogRecord {
        let epoch = start_jd + 20.0;
        let mut record = CatalogRecord::new(
            "2030 IMP",
            OrbitalElements {
                semi_major_axis: 1.5,
                eccentricity: 1.0 / 3.0,
                inclination: 0.0,
                ascending_node: 0.0,
                argument_perihelion: earth_longitude_deg(epoch),
                mean_anomaly: 0.0,
                epoch,
            },
        );
        record.physical_properties.diameter_km = 0.05;
        record
    }

    fn config(accuracy: AccuracyTier, scenario_mode: ScenarioMode) -> EngineConfig {
        EngineConfig {
            accuracy,
            scenario_mode,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("FINE".parse::<AccuracyTier>(), Ok(AccuracyTier::Fine));
        assert_eq!("synthetic".parse::<ScenarioMode>(), Ok(ScenarioMode::Synthetic));
        assert!("medium".parse::<AccuracyTier>().is_err());
        assert_eq!(
            serde_json::to_string(&ScenarioMode::Trajectory).unwrap(),
            "\"trajectory\""
        );
    }

    #[test]
    fn test_compass_from_bearing() {
        assert_eq!(CompassDirection::from_bearing(0.0), CompassDirection::N);
        assert_eq!(CompassDirection::from_bearing(359.0), CompassDirection::N);
        assert_eq!(CompassDirection::from_bearing(22.4), CompassDirection::N);
        assert_eq!(CompassDirection::from_bearing(22.6), CompassDirection::NE);
        assert_eq!(CompassDirection::from_bearing(180.0), CompassDirection::S);
        assert_eq!(CompassDirection::from_bearing(-90.0), CompassDirection::W);
        assert_eq!(CompassDirection::from_bearing(300.0), CompassDirection::NW);
        assert_eq!(CompassDirection::SE.to_string(), "Southeast");
    }

    #[test]
    fn test_scan_finds_coplanar_minimum() {
        let start_jd = julian_date(&start_date());
        let elements = trailing_circular(start_jd);

        // Earth gains on the asteroid at the difference of mean motions
        let drift = EARTH_MEAN_MOTION_DEG_PER_DAY - elements.mean_motion_per_day().to_degrees();
        let expected_day = 0.8655 / drift;
        assert!(expected_day > 20.0 && expected_day < 40.0);

        for tier in [AccuracyTier::Coarse, AccuracyTier::Fine] {
            let result =
                find_close_approach(&elements, start_jd, &config(tier, ScenarioMode::Trajectory))
                    .unwrap();
            assert!(
                (result.distance_km - 0.02 * AU_KM).abs() < 20_000.0,
                "{tier:?}: {}",
                result.distance_km
            );
            assert!((result.julian_date - start_jd - expected_day).abs() <= tier.step_days());
            assert!(!result.refined);
            assert_relative_eq!(
                result.distance_earth_radii,
                result.distance_km / EARTH_RADIUS_KM
            );
        }
    }

    #[test]
    fn test_sample_counts_per_tier() {
        let start_jd = julian_date(&start_date());
        let elements = trailing_circular(start_jd);
        let coarse = find_close_approach(
            &elements,
            start_jd,
            &config(AccuracyTier::Coarse, ScenarioMode::Trajectory),
        )
        .unwrap();
        assert_eq!(coarse.samples_evaluated, 31);

        let fine = find_close_approach(
            &elements,
            start_jd,
            &config(AccuracyTier::Fine, ScenarioMode::Trajectory),
        )
        .unwrap();
        assert_eq!(fine.samples_evaluated, 241);
    }

    #[test]
    fn test_fine_tier_refines_close_minimum() {
        let start_jd = julian_date(&start_date());
        let record = colliding(start_jd);
        let result = find_close_approach(
            &record.orbital_elements,
            start_jd,
            &config(AccuracyTier::Fine, ScenarioMode::Trajectory),
        )
        .unwrap();
        assert!(result.refined);
        assert_eq!(result.samples_evaluated, 241 + 49);
        assert!(result.distance_km < EARTH_RADIUS_KM);
    }

    #[test]
    fn test_collision_produces_trajectory_scenario() {
        let start = start_date();
        for tier in [AccuracyTier::Coarse, AccuracyTier::Fine] {
            let mut rng = StdRng::seed_from_u64(1);
            let prediction = predict_impact(
                &colliding(julian_date(&start)),
                &start,
                &config(tier, ScenarioMode::Trajectory),
                &mut rng,
            )
            .unwrap();
            assert!(prediction.is_impact(), "{tier:?}");
            let scenario = prediction.impact.unwrap();

            assert_eq!(scenario.mode, ScenarioMode::Trajectory);
            assert!((scenario.julian_date - julian_date(&start) - 20.0).abs() < 1e-6);
            // Ecliptic-plane approach keeps the site within the obliquity band
            assert!(scenario.latitude.abs() <= 23.5);
            assert!((-180.0..180.0).contains(&scenario.longitude));
            assert!((0.0..360.0).contains(&scenario.bearing_deg));
            assert!(scenario.impact_angle_deg > 0.0 && scenario.impact_angle_deg <= 90.0);
            // ~4.6 km/s relative speed plus escape velocity
            assert!(scenario.velocity_km_s > 11.5 && scenario.velocity_km_s < 13.0);
            assert!(scenario.effects.energy.energy_tnt_megatons > 0.0);
            assert_relative_eq!(
                scenario.effects.damage_radii.moderate_damage_km,
                scenario.effects.energy.energy_tnt_megatons.sqrt()
            );
        }
    }

    #[test]
    fn test_trajectory_mode_is_deterministic() {
        let start = start_date();
        let record = colliding(julian_date(&start));
        let cfg = EngineConfig::default();
        let first = predict_impact(&record, &start, &cfg, &mut StdRng::seed_from_u64(1)).unwrap();
        let second = predict_impact(&record, &start, &cfg, &mut StdRng::seed_from_u64(99)).unwrap();
        let (a, b) = (first.impact.unwrap(), second.impact.unwrap());
        assert_eq!(a.latitude, b.latitude);
        assert_eq!(a.longitude, b.longitude);
        assert_eq!(a.effects, b.effects);
    }

    #[test]
    fn test_synthetic_mode_is_seed_reproducible() {
        let start = start_date();
        let record = colliding(julian_date(&start));
        let cfg = config(AccuracyTier::Coarse, ScenarioMode::Synthetic);

        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            predict_impact(&record, &start, &cfg, &mut rng)
                .unwrap()
                .impact
                .unwrap()
        };
        let (a, b) = (run(42), run(42));
        assert_eq!(a.latitude, b.latitude);
        assert_eq!(a.bearing_deg, b.bearing_deg);
        assert_eq!(a.velocity_km_s, b.velocity_km_s);
        assert_eq!(a.mode, ScenarioMode::Synthetic);
        assert_eq!(a.impact_angle_deg, DEFAULT_IMPACT_ANGLE_DEG);
        assert_eq!(a.direction, CompassDirection::from_bearing(a.bearing_deg));
    }

    #[test]
    fn test_synthetic_geometry_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let g = synthetic_geometry(&mut rng);
            assert!((-60.0..60.0).contains(&g.latitude));
            assert!((-180.0..180.0).contains(&g.longitude));
            assert!((0.0..360.0).contains(&g.bearing_deg));
            assert!((11.0..30.0).contains(&g.velocity_km_s));
        }
    }

    #[test]
    fn test_head_on_geometry() {
        let earth = Vector3::new(AU_KM, 0.0, 0.0);
        let g = trajectory_geometry(
            &Vector3::new(100_000.0, 0.0, 0.0),
            &Vector3::new(-20.0, 0.0, 0.0),
            &earth,
            J2000_JD,
        );
        assert!(g.intersects_surface);
        assert_relative_eq!(g.impact_angle_deg, 90.0, epsilon = 1e-9);
        assert!(g.latitude.abs() < 1e-9);
        assert_relative_eq!(
            g.longitude,
            wrap_longitude(-gmst_degrees(J2000_JD)),
            epsilon = 1e-9
        );
        // Vertical entry has no horizontal heading
        assert_eq!(g.bearing_deg, 0.0);
        assert_relative_eq!(
            g.velocity_km_s,
            (400.0 + EARTH_ESCAPE_VELOCITY * EARTH_ESCAPE_VELOCITY).sqrt()
        );
    }

    #[test]
    fn test_oblique_geometry() {
        let earth = Vector3::new(AU_KM, 0.0, 0.0);
        let g = trajectory_geometry(
            &Vector3::new(100_000.0, 0.0, 3000.0),
            &Vector3::new(-20.0, 0.0, 0.0),
            &earth,
            J2000_JD,
        );
        assert!(g.intersects_surface);
        let expected_angle = (3000.0 / EARTH_RADIUS_KM).acos().to_degrees();
        assert_relative_eq!(g.impact_angle_deg, expected_angle, epsilon = 1e-6);
        // North of the equator, arriving from the equatorward side
        assert!(g.latitude > 0.0);
        assert!(g.bearing_deg > 145.0 && g.bearing_deg < 165.0, "{}", g.bearing_deg);
        assert_eq!(CompassDirection::from_bearing(g.bearing_deg), CompassDirection::SE);
    }

    #[test]
    fn test_missing_path_falls_back_to_closest_point() {
        let earth = Vector3::new(AU_KM, 0.0, 0.0);
        let g = trajectory_geometry(
            &Vector3::new(0.0, 50_000.0, 0.0),
            &Vector3::new(-10.0, 0.0, 0.0),
            &earth,
            J2000_JD,
        );
        assert!(!g.intersects_surface);
        assert_eq!(g.impact_angle_deg, DEFAULT_IMPACT_ANGLE_DEG);

        // Stationary at Earth's centre: sunward point
        let g = trajectory_geometry(&Vector3::zero(), &Vector3::zero(), &earth, J2000_JD);
        assert!(g.latitude.abs() < 1e-9);
        assert_relative_eq!(g.velocity_km_s, EARTH_ESCAPE_VELOCITY);
        assert_eq!(g.impact_angle_deg, DEFAULT_IMPACT_ANGLE_DEG);
    }

    #[test]
    fn test_distant_body_has_no_impact() {
        let start = start_date();
        let record = CatalogRecord::new("main-belt", trailing_circular(julian_date(&start)));
        let prediction = predict_impact(
            &record,
            &start,
            &EngineConfig::default(),
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        assert!(!prediction.is_impact());
        assert!(prediction.closest_approach.distance_km > 1_000_000.0);
    }

    #[test]
    fn test_invalid_input_aborts_scan() {
        let start_jd = julian_date(&start_date());
        let cfg = EngineConfig::default();
        assert!(matches!(
            find_close_approach(&trailing_circular(start_jd), f64::NAN, &cfg),
            Err(OrbitError::InvalidDate(_))
        ));

        let mut elements = trailing_circular(start_jd);
        elements.semi_major_axis = f64::NAN;
        assert!(find_close_approach(&elements, start_jd, &cfg).is_err());

        let bad_config = EngineConfig {
            search_window_days: 0.0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            find_close_approach(&trailing_circular(start_jd), start_jd, &bad_config),
            Err(OrbitError::InvalidScan(_))
        ));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let start = start_date();
        let start_jd = julian_date(&start);
        let mut malformed = CatalogRecord::new("bad", trailing_circular(start_jd));
        malformed.orbital_elements.eccentricity = 1.5;

        let records = vec![
            colliding(start_jd),
            malformed,
            CatalogRecord::new("far", trailing_circular(start_jd)),
        ];
        let entries = predict_batch(
            &records,
            &start,
            &EngineConfig::default(),
            |record| record_rng(42, &record.id),
        );

        assert_eq!(entries.len(), 3);
        assert_eq!(entries.iter().filter(|e| !e.success).count(), 1);
        assert!(!entries[1].success);
        assert!(entries[1].error.as_deref().unwrap().contains("eccentricity"));
        assert!(entries[0].prediction.as_ref().unwrap().is_impact());
        assert!(!entries[2].prediction.as_ref().unwrap().is_impact());
    }

    #[test]
    fn test_batch_synthetic_items_do_not_depend_on_neighbours() {
        let start = start_date();
        let start_jd = julian_date(&start);
        let cfg = config(AccuracyTier::Coarse, ScenarioMode::Synthetic);
        let mut second = colliding(start_jd);
        second.id = "2030 IMP-B".to_string();

        let rng_for = |record: &CatalogRecord| record_rng(cfg.synthetic_seed, &record.id);
        let after_impact =
            predict_batch(&[colliding(start_jd), second.clone()], &start, &cfg, rng_for);
        let after_miss = predict_batch(
            &[CatalogRecord::new("far", trailing_circular(start_jd)), second.clone()],
            &start,
            &cfg,
            rng_for,
        );

        let site =
            |entries: &[BatchEntry]| entries[1].prediction.clone().unwrap().impact.unwrap();
        let (a, b) = (site(&after_impact), site(&after_miss));
        assert_eq!(a.latitude, b.latitude);
        assert_eq!(a.bearing_deg, b.bearing_deg);

        let mut rng = record_rng(cfg.synthetic_seed, &second.id);
        let alone = predict_impact(&second, &start, &cfg, &mut rng).unwrap().impact.unwrap();
        assert_eq!(alone.longitude, a.longitude);

        // Same orbit, different id: a different synthetic site
        let first = after_impact[0].prediction.clone().unwrap().impact.unwrap();
        assert_ne!(first.latitude, a.latitude);
    }
}
