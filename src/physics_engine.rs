// Physics Engine - Shared constants, vector math and time scales
// Units follow the impact/orbit models: km, km/s, Julian Dates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// PHYSICAL CONSTANTS
// =============================================================================

/// Astronomical Unit in kilometers
pub const AU_KM: f64 = 149_597_870.7;

/// Sun's gravitational parameter μ = G * M_sun (km³/s²)
pub const GM_SUN: f64 = 1.32712440018e11;

/// Earth's mean radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Escape velocity at Earth's surface (km/s)
pub const EARTH_ESCAPE_VELOCITY: f64 = 11.186;

/// Mean orbital speed of Earth (km/s)
pub const EARTH_ORBITAL_SPEED: f64 = 29.78;

/// Earth's mean longitude at J2000 (degrees)
pub const EARTH_MEAN_LONGITUDE_J2000: f64 = 100.464;

/// Earth's mean longitude rate (degrees/day)
pub const EARTH_MEAN_MOTION_DEG_PER_DAY: f64 = 0.9856076686;

/// Obliquity of the ecliptic at J2000 (degrees)
pub const OBLIQUITY_J2000_DEG: f64 = 23.4393;

/// Surface gravity used by crater scaling (m/s²)
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Average crustal density of the target (kg/m³)
pub const TARGET_DENSITY: f64 = 2670.0;

/// 1 kiloton of TNT in joules
pub const JOULES_PER_KILOTON: f64 = 4.184e12;

/// Asteroid bulk density by composition (kg/m³)
/// References: Carry (2012), DeMeo & Carry (2013)
pub mod asteroid_density {
    pub const C_TYPE: f64 = 1700.0; // Carbonaceous
    pub const B_TYPE: f64 = 1500.0; // Primitive
    pub const D_TYPE: f64 = 1200.0; // Organic-rich
    pub const P_TYPE: f64 = 1300.0; // Primitive
    pub const S_TYPE: f64 = 2700.0; // Silicaceous
    pub const Q_TYPE: f64 = 2500.0; // Ordinary chondrite
    pub const V_TYPE: f64 = 3200.0; // Basaltic (Vesta-like)
    pub const M_TYPE: f64 = 4000.0; // Metallic
    pub const X_TYPE: f64 = 3500.0; // Unknown, metal-rich
    pub const RUBBLE_PILE: f64 = 2000.0; // Unclassified
    pub const STONY: f64 = 2600.0; // Impact model default
    pub const CATALOG_NOMINAL: f64 = 2500.0; // Used when only a catalog diameter is known
}

// =============================================================================
// TIME SCALES
// =============================================================================

/// Julian Date of the J2000 epoch (2000-01-01 12:00 UTC, TT offset ignored)
pub const J2000_JD: f64 = 2451545.0;

/// Julian Date of the Unix epoch
pub const UNIX_EPOCH_JD: f64 = 2440587.5;

pub const SECONDS_PER_DAY: f64 = 86400.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Julian Date of a UTC instant
pub fn julian_date(date: &DateTime<Utc>) -> f64 {
    date.timestamp_millis() as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JD
}

/// UTC instant of a Julian Date, `None` when outside chrono's range or not finite
pub fn date_from_julian(jd: f64) -> Option<DateTime<Utc>> {
    if !jd.is_finite() {
        return None;
    }
    let millis = ((jd - UNIX_EPOCH_JD) * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(millis as i64)
}

/// Greenwich mean sidereal time in degrees, [0, 360)
pub fn gmst_degrees(jd: f64) -> f64 {
    let d = jd - J2000_JD;
    normalize_degrees(280.46061837 + 360.98564736629 * d)
}

/// Wrap an angle in degrees to [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Wrap a longitude in degrees to [-180, 180)
pub fn wrap_longitude(lon: f64) -> f64 {
    normalize_degrees(lon + 180.0) - 180.0
}

// =============================================================================
// 3D VECTOR MATHEMATICS
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 1e-15 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
                z: self.z / mag,
            }
        } else {
            Self::zero()
        }
    }

    pub fn dot(&self, other: &Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn scale(&self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn add(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    pub fn sub(&self, other: &Vector3) -> Vector3 {
        Vector3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Rotate an ecliptic vector into the equatorial frame (about +x by the obliquity)
    pub fn ecliptic_to_equatorial(&self) -> Vector3 {
        let eps = OBLIQUITY_J2000_DEG.to_radians();
        let (sin_eps, cos_eps) = eps.sin_cos();
        Vector3 {
            x: self.x,
            y: self.y * cos_eps - self.z * sin_eps,
            z: self.y * sin_eps + self.z * cos_eps,
        }
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

// =============================================================================
// CARTESIAN STATE (Position + Velocity)
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CartesianState {
    pub position: Vector3, // km
    pub velocity: Vector3, // km/s
}

impl CartesianState {
    pub fn new(position: Vector3, velocity: Vector3) -> Self {
        Self { position, velocity }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

// =============================================================================
// TESTS
// =============================================================================
