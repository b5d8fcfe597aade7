// Orbital Propagator - Two-body Keplerian positions for asteroids and Earth
// Heliocentric ecliptic frame, km and km/s

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::warn;

use crate::error::OrbitError;
use crate::impact_effects::{KineticEnergy, RiskCategory};
use crate::physics_engine::{
    asteroid_density, julian_date, normalize_degrees, CartesianState, Vector3, AU_KM,
    EARTH_MEAN_LONGITUDE_J2000, EARTH_MEAN_MOTION_DEG_PER_DAY, EARTH_ORBITAL_SPEED,
    EARTH_RADIUS_KM, GM_SUN, J2000_JD, SECONDS_PER_DAY,
};

pub const KEPLER_TOLERANCE: f64 = 1e-10;
pub const KEPLER_MAX_ITERATIONS: u32 = 50;

/// Nominal encounter speed used by the orbit-only risk assessment (km/s)
const NOMINAL_IMPACT_VELOCITY: f64 = 20.0;

// =============================================================================
// KEPLERIAN ORBITAL ELEMENTS
// =============================================================================

/// Catalog orbital elements. Angles in degrees, distance in AU, epoch as JD.
/// Absent fields fall back to placeholder values because the source catalog
/// frequently omits them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    /// Semi-major axis (AU)
    #[serde(default = "defaults::semi_major_axis")]
    pub semi_major_axis: f64,
    /// Eccentricity, elliptical orbits only
    #[serde(default = "defaults::eccentricity")]
    pub eccentricity: f64,
    /// Inclination (degrees)
    #[serde(default = "defaults::inclination")]
    pub inclination: f64,
    /// Longitude of ascending node (degrees)
    #[serde(default = "defaults::ascending_node")]
    pub ascending_node: f64,
    /// Argument of perihelion (degrees)
    #[serde(default = "defaults::argument_perihelion")]
    pub argument_perihelion: f64,
    /// Mean anomaly at epoch (degrees)
    #[serde(default = "defaults::mean_anomaly")]
    pub mean_anomaly: f64,
    /// Epoch (Julian Date)
    #[serde(default = "defaults::epoch")]
    pub epoch: f64,
}

pub(crate) mod defaults {
    use crate::physics_engine::J2000_JD;

    pub fn semi_major_axis() -> f64 {
        2.0
    }
    pub fn eccentricity() -> f64 {
        0.2
    }
    pub fn inclination() -> f64 {
        5.0
    }
    pub fn ascending_node() -> f64 {
        45.0
    }
    pub fn argument_perihelion() -> f64 {
        30.0
    }
    pub fn mean_anomaly() -> f64 {
        0.0
    }
    pub fn epoch() -> f64 {
        J2000_JD
    }
}

impl Default for OrbitalElements {
    fn default() -> Self {
        Self {
            semi_major_axis: defaults::semi_major_axis(),
            eccentricity: defaults::eccentricity(),
            inclination: defaults::inclination(),
            ascending_node: defaults::ascending_node(),
            argument_perihelion: defaults::argument_perihelion(),
            mean_anomaly: defaults::mean_anomaly(),
            epoch: defaults::epoch(),
        }
    }
}

impl OrbitalElements {
    pub fn validate(&self) -> Result<(), OrbitError> {
        let fields = [
            ("semi_major_axis", self.semi_major_axis),
            ("eccentricity", self.eccentricity),
            ("inclination", self.inclination),
            ("ascending_node", self.ascending_node),
            ("argument_perihelion", self.argument_perihelion),
            ("mean_anomaly", self.mean_anomaly),
            ("epoch", self.epoch),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(OrbitError::InvalidElement {
                    name,
                    value,
                    reason: "must be finite",
                });
            }
        }
        if self.semi_major_axis <= 0.0 {
            return Err(OrbitError::InvalidElement {
                name: "semi_major_axis",
                value: self.semi_major_axis,
                reason: "must be > 0 AU",
            });
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(OrbitError::InvalidElement {
                name: "eccentricity",
                value: self.eccentricity,
                reason: "only elliptical orbits (0 <= e < 1) are supported",
            });
        }
        Ok(())
    }

    pub fn perihelion_au(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    pub fn aphelion_au(&self) -> f64 {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    /// Mean motion in radians per day
    pub fn mean_motion_per_day(&self) -> f64 {
        let a_km = self.semi_major_axis * AU_KM;
        (GM_SUN / a_km.powi(3)).sqrt() * SECONDS_PER_DAY
    }
}

// =============================================================================
// KEPLER EQUATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly (radians)
    pub eccentric_anomaly: f64,
    pub iterations: u32,
    pub converged: bool,
}

/// Solve Kepler's equation M = E - e*sin(E) using Newton-Raphson.
///
/// Always terminates within `KEPLER_MAX_ITERATIONS`; when the tolerance is not
/// reached the best estimate is returned with `converged == false`.
pub fn solve_kepler_equation(mean_anomaly: f64, eccentricity: f64) -> KeplerSolution {
    // Starting at π keeps Newton stable for highly eccentric orbits
    let mut e_anom = if eccentricity < 0.8 {
        mean_anomaly + eccentricity * mean_anomaly.sin()
    } else {
        PI
    };

    for iteration in 1..=KEPLER_MAX_ITERATIONS {
        let f = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        let f_prime = 1.0 - eccentricity * e_anom.cos();
        if f_prime.abs() < 1e-12 {
            break;
        }
        let delta = f / f_prime;
        e_anom -= delta;

        if delta.abs() < KEPLER_TOLERANCE {
            return KeplerSolution {
                eccentric_anomaly: e_anom,
                iterations: iteration,
                converged: true,
            };
        }
    }

    KeplerSolution {
        eccentric_anomaly: e_anom,
        iterations: KEPLER_MAX_ITERATIONS,
        converged: false,
    }
}

// =============================================================================
// STATE VECTOR
// =============================================================================

/// Heliocentric ecliptic state of a body at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub position_km: Vector3,
    pub velocity_km_s: Vector3,
    pub distance_au: f64,
    pub true_anomaly_deg: f64,
    pub eccentric_anomaly_deg: f64,
    pub mean_anomaly_deg: f64,
    pub julian_date: f64,
    pub kepler_converged: bool,
}

/// Position of a body at a calendar date.
pub fn position_at(
    elements: &OrbitalElements,
    date: &DateTime<Utc>,
) -> Result<StateVector, OrbitError> {
    position_at_jd(elements, julian_date(date))
}

/// Position of a body at a Julian Date.
///
/// Velocity uses the vis-viva magnitude with a direction perpendicular to the
/// radius vector in the ecliptic plane. This is an approximation: the true
/// direction follows from differentiating the position, and inclined or
/// eccentric orbits deviate from it.
pub fn position_at_jd(elements: &OrbitalElements, jd: f64) -> Result<StateVector, OrbitError> {
    elements.validate()?;
    if !jd.is_finite() {
        return Err(OrbitError::InvalidDate(jd));
    }

    let a = elements.semi_major_axis * AU_KM;
    let e = elements.eccentricity;
    let i = normalize_degrees(elements.inclination).to_radians();
    let omega_big = normalize_degrees(elements.ascending_node).to_radians(); // Ω
    let omega_small = normalize_degrees(elements.argument_perihelion).to_radians(); // ω
    let m0 = elements.mean_anomaly.to_radians();

    let dt_days = jd - elements.epoch;
    let m = (m0 + elements.mean_motion_per_day() * dt_days).rem_euclid(2.0 * PI);

    let kepler = solve_kepler_equation(m, e);
    if !kepler.converged {
        warn!(
            mean_anomaly = m,
            eccentricity = e,
            julian_date = jd,
            "Kepler solver did not converge, using best estimate"
        );
    }
    let eccentric_anomaly = kepler.eccentric_anomaly;

    let true_anomaly = 2.0
        * ((1.0 + e).sqrt() * (eccentric_anomaly / 2.0).sin())
            .atan2((1.0 - e).sqrt() * (eccentric_anomaly / 2.0).cos());

    // Distance from focus
    let r = a * (1.0 - e * eccentric_anomaly.cos());

    // Position in orbital plane (perifocal frame)
    let x_orb = r * true_anomaly.cos();
    let y_orb = r * true_anomaly.sin();

    let cos_omega = omega_big.cos();
    let sin_omega = omega_big.sin();
    let cos_w = omega_small.cos();
    let sin_w = omega_small.sin();
    let cos_i = i.cos();
    let sin_i = i.sin();

    let r11 = cos_omega * cos_w - sin_omega * sin_w * cos_i;
    let r12 = -cos_omega * sin_w - sin_omega * cos_w * cos_i;
    let r21 = sin_omega * cos_w + cos_omega * sin_w * cos_i;
    let r22 = -sin_omega * sin_w + cos_omega * cos_w * cos_i;
    let r31 = sin_w * sin_i;
    let r32 = cos_w * sin_i;

    let position = Vector3::new(
        r11 * x_orb + r12 * y_orb,
        r21 * x_orb + r22 * y_orb,
        r31 * x_orb + r32 * y_orb,
    );

    let speed = (GM_SUN * (2.0 / r - 1.0 / a)).sqrt();
    let velocity = Vector3::new(-position.y / r * speed, position.x / r * speed, 0.0);

    if !position.is_finite() || !velocity.is_finite() {
        return Err(OrbitError::NumericOverflow {
            context: "asteroid state",
            julian_date: jd,
        });
    }

    Ok(StateVector {
        position_km: position,
        velocity_km_s: velocity,
        distance_au: r / AU_KM,
        true_anomaly_deg: true_anomaly.to_degrees(),
        eccentric_anomaly_deg: eccentric_anomaly.to_degrees(),
        mean_anomaly_deg: m.to_degrees(),
        julian_date: jd,
        kepler_converged: kepler.converged,
    })
}

// =============================================================================
// EARTH
// =============================================================================

/// Earth on a circular 1 AU orbit driven by its mean longitude.
pub fn earth_position_at(date: &DateTime<Utc>) -> Result<CartesianState, OrbitError> {
    earth_position_at_jd(julian_date(date))
}

pub fn earth_position_at_jd(jd: f64) -> Result<CartesianState, OrbitError> {
    if !jd.is_finite() {
        return Err(OrbitError::InvalidDate(jd));
    }
    let days = jd - J2000_JD;
    let longitude =
        normalize_degrees(EARTH_MEAN_LONGITUDE_J2000 + EARTH_MEAN_MOTION_DEG_PER_DAY * days)
            .to_radians();
    let (sin_l, cos_l) = longitude.sin_cos();

    let state = CartesianState::new(
        Vector3::new(AU_KM * cos_l, AU_KM * sin_l, 0.0),
        Vector3::new(-EARTH_ORBITAL_SPEED * sin_l, EARTH_ORBITAL_SPEED * cos_l, 0.0),
    );
    if !state.is_finite() {
        return Err(OrbitError::NumericOverflow {
            context: "earth state",
            julian_date: jd,
        });
    }
    Ok(state)
}

// =============================================================================
// EARTH-RELATIVE GEOMETRY
// =============================================================================

/// Asteroid and Earth evaluated at the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeState {
    pub julian_date: f64,
    pub asteroid: StateVector,
    pub earth: CartesianState,
    /// Asteroid minus Earth (km)
    pub position_km: Vector3,
    /// Asteroid minus Earth (km/s)
    pub velocity_km_s: Vector3,
    pub distance_km: f64,
}

pub fn relative_state(elements: &OrbitalElements, jd: f64) -> Result<RelativeState, OrbitError> {
    let asteroid = position_at_jd(elements, jd)?;
    let earth = earth_position_at_jd(jd)?;
    let position = asteroid.position_km.sub(&earth.position);
    let velocity = asteroid.velocity_km_s.sub(&earth.velocity);
    let distance_km = position.magnitude();
    if !distance_km.is_finite() {
        return Err(OrbitError::NumericOverflow {
            context: "earth distance",
            julian_date: jd,
        });
    }
    Ok(RelativeState {
        julian_date: jd,
        asteroid,
        earth,
        position_km: position,
        velocity_km_s: velocity,
        distance_km,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeDistance {
    pub distance_km: f64,
    pub distance_au: f64,
    pub distance_earth_radii: f64,
}

impl RelativeDistance {
    pub fn from_km(distance_km: f64) -> Self {
        Self {
            distance_km,
            distance_au: distance_km / AU_KM,
            distance_earth_radii: distance_km / EARTH_RADIUS_KM,
        }
    }
}

/// Asteroid, Earth and their separation at one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionPrediction {
    pub date: DateTime<Utc>,
    pub asteroid: StateVector,
    pub earth: CartesianState,
    pub relative: RelativeDistance,
}

pub fn predict_position(
    elements: &OrbitalElements,
    date: &DateTime<Utc>,
) -> Result<PositionPrediction, OrbitError> {
    let rel = relative_state(elements, julian_date(date))?;
    Ok(PositionPrediction {
        date: *date,
        asteroid: rel.asteroid,
        earth: rel.earth,
        relative: RelativeDistance::from_km(rel.distance_km),
    })
}

// =============================================================================
// TRAJECTORY PREDICTION
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub date: DateTime<Utc>,
    pub asteroid_position_km: [f64; 3],
    pub asteroid_velocity_km_s: [f64; 3],
    pub earth_position_km: [f64; 3],
    pub distance_from_earth_km: f64,
    pub distance_from_earth_au: f64,
    pub distance_from_earth_radii: f64,
    pub true_anomaly_deg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampledClosestApproach {
    pub distance_km: f64,
    pub distance_earth_radii: f64,
    pub date: DateTime<Utc>,
    pub point_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryPrediction {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub time_span_days: f64,
    pub points: Vec<TrajectoryPoint>,
    pub closest_approach: Option<SampledClosestApproach>,
}

/// `start` shifted by `days`, or an error when that leaves chrono's range.
fn offset_date(start: &DateTime<Utc>, days: f64) -> Result<DateTime<Utc>, OrbitError> {
    let ms = (days * SECONDS_PER_DAY * 1000.0).round();
    if !ms.is_finite() || ms.abs() >= i64::MAX as f64 {
        return Err(OrbitError::InvalidScan(format!("offset of {days} days is out of range")));
    }
    TimeDelta::try_milliseconds(ms as i64)
        .and_then(|delta| start.checked_add_signed(delta))
        .ok_or_else(|| OrbitError::InvalidScan(format!("offset of {days} days is out of range")))
}

/// `points` evenly spaced samples covering `days` from `start`.
pub fn predict_trajectory(
    elements: &OrbitalElements,
    start: &DateTime<Utc>,
    days: f64,
    points: usize,
) -> Result<TrajectoryPrediction, OrbitError> {
    if !(days > 0.0) || !days.is_finite() || points == 0 {
        return Err(OrbitError::InvalidScan(format!(
            "trajectory needs days > 0 and points > 0 (days={days}, points={points})"
        )));
    }
    elements.validate()?;

    let step_days = days / points as f64;
    let mut samples = Vec::with_capacity(points);
    let mut closest: Option<SampledClosestApproach> = None;

    for index in 0..points {
        let date = offset_date(start, index as f64 * step_days)?;
        let rel = relative_state(elements, julian_date(&date))?;

        if closest
            .as_ref()
            .map_or(true, |c| rel.distance_km < c.distance_km)
        {
            closest = Some(SampledClosestApproach {
                distance_km: rel.distance_km,
                distance_earth_radii: rel.distance_km / EARTH_RADIUS_KM,
                date,
                point_index: index,
            });
        }

        samples.push(TrajectoryPoint {
            date,
            asteroid_position_km: rel.asteroid.position_km.to_array(),
            asteroid_velocity_km_s: rel.asteroid.velocity_km_s.to_array(),
            earth_position_km: rel.earth.position.to_array(),
            distance_from_earth_km: rel.distance_km,
            distance_from_earth_au: rel.distance_km / AU_KM,
            distance_from_earth_radii: rel.distance_km / EARTH_RADIUS_KM,
            true_anomaly_deg: rel.asteroid.true_anomaly_deg,
        });
    }

    Ok(TrajectoryPrediction {
        start_date: *start,
        end_date: offset_date(start, days)?,
        time_span_days: days,
        points: samples,
        closest_approach: closest,
    })
}

// =============================================================================
// ORBIT-ONLY RISK ASSESSMENT
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitRiskAssessment {
    pub crosses_earth_orbit: bool,
    /// Radial gap between the orbit's apsides and Earth's 1 AU circle
    pub minimum_distance_au: f64,
    pub perihelion_au: f64,
    pub aphelion_au: f64,
    pub diameter_km: f64,
    pub estimated_mass_kg: f64,
    pub impact_velocity_km_s: f64,
    pub energy: KineticEnergy,
    pub risk_level: RiskCategory,
}

/// Simplified MOID-style screen assuming Earth on a circular 1 AU orbit.
pub fn assess_orbit_risk(
    elements: &OrbitalElements,
    diameter_km: f64,
) -> Result<OrbitRiskAssessment, OrbitError> {
    elements.validate()?;
    if !diameter_km.is_finite() || diameter_km <= 0.0 {
        return Err(OrbitError::InvalidScan(format!(
            "diameter_km must be > 0, got {diameter_km}"
        )));
    }

    let perihelion = elements.perihelion_au();
    let aphelion = elements.aphelion_au();
    let crosses_earth_orbit = perihelion < 1.0 && 1.0 < aphelion;
    let minimum_distance_au = if crosses_earth_orbit {
        0.0
    } else if perihelion >= 1.0 {
        perihelion - 1.0
    } else {
        1.0 - aphelion
    };

    let radius_m = diameter_km * 500.0;
    let mass = (4.0 / 3.0) * PI * radius_m.powi(3) * asteroid_density::CATALOG_NOMINAL;
    let v = NOMINAL_IMPACT_VELOCITY * 1000.0;

    Ok(OrbitRiskAssessment {
        crosses_earth_orbit,
        minimum_distance_au,
        perihelion_au: perihelion,
        aphelion_au: aphelion,
        diameter_km,
        estimated_mass_kg: mass,
        impact_velocity_km_s: NOMINAL_IMPACT_VELOCITY,
        energy: KineticEnergy::from_joules(0.5 * mass * v * v),
        risk_level: RiskCategory::from_diameter_km(diameter_km),
    })
}

// =============================================================================
// TESTS
// =============================================================================
