// Tsunami Risk - Wave generation potential of an ocean or coastal impact
// Pure assessment over caller-supplied elevations; no terrain lookups here

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use crate::error::{require_finite, ImpactError};
use crate::physics_engine::wrap_longitude;

/// Ring samples taken around the impact point
pub const DEFAULT_SAMPLE_COUNT: usize = 16;
pub const DEFAULT_SEARCH_RADIUS_KM: f64 = 1000.0;
pub const MAX_SEARCH_RADIUS_KM: f64 = 5000.0;

/// Approximate length of one degree of latitude
const KM_PER_DEGREE: f64 = 111.0;
const MAX_WAVE_HEIGHT_M: f64 = 100.0;
const MAX_AFFECTED_REGIONS: usize = 5;
/// Land impacts closer than this to water can still raise waves
const NEAR_WATER_KM: f64 = 50.0;

// =============================================================================
// CLASSIFICATIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeCategory {
    Negligible,
    Minor,
    Moderate,
    Major,
    Catastrophic,
}

impl SizeCategory {
    pub fn from_diameter_m(diameter_m: f64) -> Self {
        if diameter_m < 50.0 {
            Self::Negligible
        } else if diameter_m < 200.0 {
            Self::Minor
        } else if diameter_m < 500.0 {
            Self::Moderate
        } else if diameter_m < 1000.0 {
            Self::Major
        } else {
            Self::Catastrophic
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Negligible => "Too small to generate significant tsunamis",
            Self::Minor => "May cause local wave disturbances",
            Self::Moderate => "Can generate regional tsunamis",
            Self::Major => "Can generate large regional tsunamis",
            Self::Catastrophic => "Can generate ocean-wide mega-tsunamis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TsunamiRiskLevel {
    None,
    Minimal,
    Low,
    Moderate,
    High,
    Extreme,
}

impl TsunamiRiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            9.. => Self::Extreme,
            7..=8 => Self::High,
            5..=6 => Self::Moderate,
            3..=4 => Self::Low,
            _ => Self::Minimal,
        }
    }

    pub fn recommended_action(&self) -> &'static str {
        match self {
            Self::None | Self::Minimal => "Monitor for updates",
            Self::Low => "Stay informed, prepare coastal monitoring",
            Self::Moderate => "Prepare evacuation plans for coastal areas",
            Self::High => "Evacuate coastal areas immediately",
            Self::Extreme => "Mass evacuation of all coastal regions",
        }
    }
}

// =============================================================================
// SAMPLING
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Angle around the ring, radians from north
    pub angle: f64,
    pub distance_km: f64,
}

/// A ring sample with the elevation the terrain service reported for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
    pub elevation_m: f64,
}

impl ElevationSample {
    pub fn at(point: &SamplePoint, elevation_m: f64) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            distance_km: point.distance_km,
            elevation_m,
        }
    }

    pub fn is_water(&self) -> bool {
        self.elevation_m <= 0.0
    }
}

/// `count` points evenly spaced on a circle of `radius_km` around the centre,
/// using a flat-earth degree conversion.
pub fn sample_points(
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
    count: usize,
) -> Vec<SamplePoint> {
    let cos_lat = center_lat.to_radians().cos();
    (0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64;
            let lat_offset = radius_km / KM_PER_DEGREE * angle.cos();
            let lon_offset = if cos_lat.abs() > 1e-9 {
                radius_km / KM_PER_DEGREE * angle.sin() / cos_lat
            } else {
                0.0
            };
            SamplePoint {
                latitude: (center_lat + lat_offset).clamp(-90.0, 90.0),
                longitude: wrap_longitude(center_lon + lon_offset),
                angle,
                distance_km: radius_km,
            }
        })
        .collect()
}

// =============================================================================
// ASSESSMENT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactSite {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation_m: f64,
    pub is_underwater: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoastalAnalysis {
    pub total_sample_points: usize,
    pub water_points: usize,
    pub land_points: usize,
    pub water_to_land_ratio: f64,
    pub max_wave_height_estimate_m: f64,
    pub affected_regions: Vec<String>,
    pub search_radius_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsunamiAssessment {
    pub tsunami_likely: bool,
    pub risk_level: TsunamiRiskLevel,
    pub risk_factors: Vec<String>,
    pub warnings: Vec<String>,
    pub impact_location: ImpactSite,
    pub size_category: SizeCategory,
    pub coastal_analysis: Option<CoastalAnalysis>,
    /// Only estimated for land impacts
    pub distance_to_water_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickTsunamiCheck {
    pub is_water_impact: bool,
    pub elevation_m: f64,
    pub risk_level: TsunamiRiskLevel,
    pub assessment: String,
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ImpactError> {
    let latitude = require_finite("latitude", latitude)?;
    let longitude = require_finite("longitude", longitude)?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ImpactError::OutOfRange {
            name: "latitude",
            value: latitude,
            expected: "[-90, 90]",
        });
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ImpactError::OutOfRange {
            name: "longitude",
            value: longitude,
            expected: "[-180, 180]",
        });
    }
    Ok(())
}

fn validate_inputs(
    latitude: f64,
    longitude: f64,
    diameter_m: f64,
    impact_elevation_m: f64,
) -> Result<(), ImpactError> {
    validate_coordinates(latitude, longitude)?;
    require_finite("impact_elevation_m", impact_elevation_m)?;
    if require_finite("diameter_m", diameter_m)? <= 0.0 {
        return Err(ImpactError::OutOfRange {
            name: "diameter_m",
            value: diameter_m,
            expected: "> 0",
        });
    }
    Ok(())
}

/// Tsunami risk for an impact at (`latitude`, `longitude`).
///
/// `ring` holds elevations around the site, typically for the points from
/// [`sample_points`]; it is only consulted for underwater impacts.
pub fn assess_tsunami_risk(
    latitude: f64,
    longitude: f64,
    diameter_m: f64,
    impact_elevation_m: f64,
    ring: &[ElevationSample],
    search_radius_km: f64,
) -> Result<TsunamiAssessment, ImpactError> {
    validate_inputs(latitude, longitude, diameter_m, impact_elevation_m)?;
    let radius = require_finite("search_radius_km", search_radius_km)?;
    if radius <= 0.0 || radius > MAX_SEARCH_RADIUS_KM {
        return Err(ImpactError::OutOfRange {
            name: "search_radius_km",
            value: radius,
            expected: "(0, 5000]",
        });
    }
    if let Some(bad) = ring.iter().find(|s| !s.elevation_m.is_finite()) {
        return Err(ImpactError::NotFinite {
            name: "ring elevation_m",
            value: bad.elevation_m,
        });
    }

    let is_underwater = impact_elevation_m <= 0.0;
    let mut assessment = TsunamiAssessment {
        tsunami_likely: false,
        risk_level: TsunamiRiskLevel::None,
        risk_factors: Vec::new(),
        warnings: Vec::new(),
        impact_location: ImpactSite {
            latitude,
            longitude,
            elevation_m: impact_elevation_m,
            is_underwater,
        },
        size_category: SizeCategory::from_diameter_m(diameter_m),
        coastal_analysis: None,
        distance_to_water_km: None,
    };

    if is_underwater {
        assessment
            .risk_factors
            .push("Impact location is underwater/at sea level".to_string());
        assessment.tsunami_likely = true;

        let coastal = analyze_coastline(latitude, longitude, diameter_m, ring, radius);
        let level = risk_level(diameter_m, impact_elevation_m, coastal.water_to_land_ratio);
        assessment.warnings = warnings(level, &coastal);
        assessment.risk_level = level;
        assessment.coastal_analysis = Some(coastal);
    } else {
        let distance = estimate_distance_to_water(latitude, longitude);
        if distance < NEAR_WATER_KM {
            assessment
                .risk_factors
                .push(format!("Impact within ~{distance}km of water body"));
            if diameter_m > 500.0 {
                assessment.tsunami_likely = true;
                assessment.risk_level = TsunamiRiskLevel::Low;
                assessment
                    .warnings
                    .push("Large asteroid impact near water may cause local tsunamis".to_string());
            }
        }
        assessment.distance_to_water_km = Some(distance);
    }

    debug!(
        latitude,
        longitude,
        diameter_m,
        risk = ?assessment.risk_level,
        "tsunami risk assessed"
    );
    Ok(assessment)
}

/// Single-elevation screen without ring samples.
pub fn quick_check(diameter_m: f64, elevation_m: f64) -> Result<QuickTsunamiCheck, ImpactError> {
    if require_finite("diameter_m", diameter_m)? <= 0.0 {
        return Err(ImpactError::OutOfRange {
            name: "diameter_m",
            value: diameter_m,
            expected: "> 0",
        });
    }
    let elevation_m = require_finite("elevation_m", elevation_m)?;
    let is_water_impact = elevation_m <= 0.0;

    let (risk_level, assessment) = if !is_water_impact {
        (TsunamiRiskLevel::Minimal, "Land impact - minimal tsunami risk")
    } else if diameter_m < 50.0 {
        (
            TsunamiRiskLevel::Minimal,
            "Small asteroid, water impact - low tsunami risk",
        )
    } else if diameter_m < 200.0 {
        (
            TsunamiRiskLevel::Low,
            "Moderate asteroid, water impact - possible local tsunamis",
        )
    } else if diameter_m < 500.0 {
        (
            TsunamiRiskLevel::Moderate,
            "Large asteroid, water impact - regional tsunami risk",
        )
    } else {
        (
            TsunamiRiskLevel::High,
            "Very large asteroid, water impact - major tsunami risk",
        )
    };

    Ok(QuickTsunamiCheck {
        is_water_impact,
        elevation_m,
        risk_level,
        assessment: assessment.to_string(),
    })
}

fn analyze_coastline(
    latitude: f64,
    longitude: f64,
    diameter_m: f64,
    ring: &[ElevationSample],
    search_radius_km: f64,
) -> CoastalAnalysis {
    let water_points = ring.iter().filter(|s| s.is_water()).count();
    let deepest = ring
        .iter()
        .filter(|s| s.is_water())
        .map(|s| s.elevation_m)
        .fold(0.0_f64, f64::min);

    CoastalAnalysis {
        total_sample_points: ring.len(),
        water_points,
        land_points: ring.len() - water_points,
        water_to_land_ratio: if ring.is_empty() {
            0.0
        } else {
            water_points as f64 / ring.len() as f64
        },
        max_wave_height_estimate_m: estimate_wave_height(diameter_m, deepest.abs()),
        affected_regions: coastal_regions(latitude, longitude),
        search_radius_km,
    }
}

/// Wave height near shore (m), capped at 100 m. Shallower water steepens the wave.
pub fn estimate_wave_height(diameter_m: f64, water_depth_m: f64) -> f64 {
    let energy_factor = if diameter_m < 100.0 {
        1.0
    } else if diameter_m < 500.0 {
        5.0
    } else if diameter_m < 1000.0 {
        20.0
    } else {
        50.0
    };
    let depth_factor = (100.0 / water_depth_m.max(10.0)).max(1.0);
    (energy_factor * depth_factor * 0.1).min(MAX_WAVE_HEIGHT_M)
}

/// Size, location and surrounding water each add to a score mapped to a level.
pub fn risk_score(diameter_m: f64, elevation_m: f64, water_ratio: f64) -> u32 {
    let size = if diameter_m > 1000.0 {
        5
    } else if diameter_m > 500.0 {
        4
    } else if diameter_m > 200.0 {
        3
    } else if diameter_m > 100.0 {
        2
    } else {
        1
    };

    // Deep ocean disperses energy; shelves and coastlines amplify it
    let location = if elevation_m < -1000.0 {
        3
    } else if elevation_m < -100.0 {
        4
    } else if elevation_m <= 0.0 {
        5
    } else {
        0
    };

    let proximity = if water_ratio > 0.8 {
        2
    } else if water_ratio > 0.5 {
        1
    } else {
        0
    };

    size + location + proximity
}

fn risk_level(diameter_m: f64, elevation_m: f64, water_ratio: f64) -> TsunamiRiskLevel {
    TsunamiRiskLevel::from_score(risk_score(diameter_m, elevation_m, water_ratio))
}

fn warnings(level: TsunamiRiskLevel, coastal: &CoastalAnalysis) -> Vec<String> {
    let height = coastal.max_wave_height_estimate_m;
    let mut warnings = match level {
        TsunamiRiskLevel::Extreme | TsunamiRiskLevel::High => vec![
            "EXTREME TSUNAMI RISK: Immediate evacuation of all coastal areas required".to_string(),
            format!("Estimated wave heights up to {height:.1}m"),
            "Evacuate areas within 10km of coastline to elevations above 30m".to_string(),
        ],
        TsunamiRiskLevel::Moderate => vec![
            "MODERATE TSUNAMI RISK: Coastal areas should prepare for evacuation".to_string(),
            format!("Estimated wave heights up to {height:.1}m"),
            "Evacuate low-lying coastal areas to higher ground".to_string(),
        ],
        TsunamiRiskLevel::Low => vec![
            "LOW TSUNAMI RISK: Monitor coastal areas for unusual wave activity".to_string(),
            "Be prepared to move away from immediate shoreline".to_string(),
        ],
        TsunamiRiskLevel::Minimal | TsunamiRiskLevel::None => Vec::new(),
    };

    if !coastal.affected_regions.is_empty() {
        warnings.push(format!(
            "Potentially affected regions: {}",
            coastal.affected_regions.join(", ")
        ));
    }
    warnings
}

/// Coastlines exposed to an impact, by ocean basin plus known high-risk zones.
pub fn coastal_regions(latitude: f64, longitude: f64) -> Vec<String> {
    let north = latitude > 0.0;
    let basin: &[&str] = if (-180.0..=-30.0).contains(&longitude) {
        if north {
            &["North American Coast", "European Coast"]
        } else {
            &["South American Coast", "African Coast"]
        }
    } else if (-30.0..=60.0).contains(&longitude) {
        if north {
            &["European Coast", "Middle Eastern Coast"]
        } else {
            &["African Coast", "Indian Ocean Islands"]
        }
    } else if north {
        &["Asian Coast", "Pacific Islands"]
    } else {
        &["Australian Coast", "Pacific Islands"]
    };

    let mut regions: Vec<String> = basin.iter().map(|r| r.to_string()).collect();

    if (20.0..=50.0).contains(&latitude) && (120.0..=150.0).contains(&longitude) {
        regions.push("Japan Coast (High Risk)".to_string());
    } else if (-10.0..=10.0).contains(&latitude) && (90.0..=120.0).contains(&longitude) {
        regions.push("Indonesia/Philippines (High Risk)".to_string());
    } else if (30.0..=45.0).contains(&latitude) && (-130.0..=-115.0).contains(&longitude) {
        regions.push("US West Coast (High Risk)".to_string());
    }

    regions.truncate(MAX_AFFECTED_REGIONS);
    regions
}

/// Rough distance to open water (km) from continental-interior boxes.
pub fn estimate_distance_to_water(latitude: f64, longitude: f64) -> f64 {
    let within = |lat: (f64, f64), lon: (f64, f64)| {
        (lat.0..=lat.1).contains(&latitude) && (lon.0..=lon.1).contains(&longitude)
    };

    if within((20.0, 50.0), (-105.0, -95.0)) {
        800.0 // Central US
    } else if within((45.0, 65.0), (30.0, 140.0)) {
        1000.0 // Central Asia
    } else if within((-30.0, 10.0), (10.0, 30.0)) {
        500.0 // Central Africa
    } else if within((-40.0, -10.0), (-70.0, -40.0)) {
        600.0 // Central South America
    } else {
        100.0
    }
}

// =============================================================================
// TESTS
// =============================================================================
