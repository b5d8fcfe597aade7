// Impact Effects - Closed-form consequences of an asteroid strike
// Energy, crater scaling, seismic magnitude, air blast and casualty estimates

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{require_finite, ImpactError};
use crate::physics_engine::{
    asteroid_density, JOULES_PER_KILOTON, STANDARD_GRAVITY, TARGET_DENSITY,
};

/// Schmidt-Housen scaling constant for complex craters
const CRATER_SCALING_K: f64 = 1.88;

/// Fraction of kinetic energy radiated as seismic waves (Collins, Melosh & Marcus 2005)
pub const SEISMIC_EFFICIENCY: f64 = 1e-4;

pub const DEFAULT_IMPACT_ANGLE_DEG: f64 = 45.0;

/// (fatality rate, injury rate) per blast zone, from nuclear weapons effects studies
const SEVERE_ZONE_RATES: (f64, f64) = (0.90, 0.10);
const HEAVY_ZONE_RATES: (f64, f64) = (0.50, 0.40);
const LIGHT_ZONE_RATES: (f64, f64) = (0.05, 0.30);

// =============================================================================
// ASTEROID PHYSICAL PARAMETERS
// =============================================================================

/// Validated impactor description. Fields are private so a constructed value
/// always satisfies the domain checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AsteroidPhysicalParameters {
    diameter_m: f64,
    velocity_km_s: f64,
    density_kg_m3: f64,
    angle_deg: f64,
}

impl AsteroidPhysicalParameters {
    /// Stony impactor (2600 kg/m³) striking at 45°.
    pub fn new(diameter_m: f64, velocity_km_s: f64) -> Result<Self, ImpactError> {
        Self::with_details(
            diameter_m,
            velocity_km_s,
            asteroid_density::STONY,
            DEFAULT_IMPACT_ANGLE_DEG,
        )
    }

    pub fn with_details(
        diameter_m: f64,
        velocity_km_s: f64,
        density_kg_m3: f64,
        angle_deg: f64,
    ) -> Result<Self, ImpactError> {
        let diameter_m = require_finite("diameter_m", diameter_m)?;
        let velocity_km_s = require_finite("velocity_km_s", velocity_km_s)?;
        let density_kg_m3 = require_finite("density_kg_m3", density_kg_m3)?;
        let angle_deg = require_finite("angle_degrees", angle_deg)?;

        if diameter_m <= 0.0 {
            return Err(ImpactError::OutOfRange {
                name: "diameter_m",
                value: diameter_m,
                expected: "> 0",
            });
        }
        if velocity_km_s <= 0.0 {
            return Err(ImpactError::OutOfRange {
                name: "velocity_km_s",
                value: velocity_km_s,
                expected: "> 0",
            });
        }
        if density_kg_m3 <= 0.0 {
            return Err(ImpactError::OutOfRange {
                name: "density_kg_m3",
                value: density_kg_m3,
                expected: "> 0",
            });
        }
        if angle_deg <= 0.0 || angle_deg > 90.0 {
            return Err(ImpactError::OutOfRange {
                name: "angle_degrees",
                value: angle_deg,
                expected: "(0, 90]",
            });
        }

        Ok(Self {
            diameter_m,
            velocity_km_s,
            density_kg_m3,
            angle_deg,
        })
    }

    pub fn diameter_m(&self) -> f64 {
        self.diameter_m
    }

    pub fn velocity_km_s(&self) -> f64 {
        self.velocity_km_s
    }

    pub fn density_kg_m3(&self) -> f64 {
        self.density_kg_m3
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    pub fn radius_m(&self) -> f64 {
        self.diameter_m / 2.0
    }

    pub fn volume_m3(&self) -> f64 {
        (4.0 / 3.0) * PI * self.radius_m().powi(3)
    }

    pub fn mass_kg(&self) -> f64 {
        self.volume_m3() * self.density_kg_m3
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    /// Kinetic energy E = ½·m·v² with TNT equivalents.
    pub fn kinetic_energy(&self) -> KineticEnergy {
        let velocity_m_s = self.velocity_km_s * 1000.0;
        let energy_joules = 0.5 * self.mass_kg() * velocity_m_s * velocity_m_s;
        KineticEnergy::from_joules(energy_joules)
    }

    /// Gravity-regime crater scaling. Small strength-regime craters are outside
    /// the validity of this law.
    pub fn crater_size(&self) -> CraterDimensions {
        let energy = self.kinetic_energy().energy_joules;
        let sin_angle = self.angle_deg.to_radians().sin();
        let effective_energy = energy * sin_angle * sin_angle;

        let diameter_m = CRATER_SCALING_K
            * (effective_energy / (TARGET_DENSITY * STANDARD_GRAVITY)).powf(0.22)
            * (self.density_kg_m3 / TARGET_DENSITY).powf(0.11);
        let depth_m = diameter_m * 0.2;
        let rim_height_m = diameter_m * 0.07;
        let radius = diameter_m / 2.0;

        CraterDimensions {
            diameter_m,
            diameter_km: diameter_m / 1000.0,
            depth_m,
            rim_height_m,
            volume_m3: PI * radius * radius * depth_m / 3.0,
        }
    }

    pub fn seismic_magnitude(&self) -> SeismicMagnitude {
        SeismicMagnitude::from_energy_joules(self.kinetic_energy().energy_joules)
    }

    pub fn air_blast_ranges(&self) -> AirBlastRanges {
        AirBlastRanges::from_yield_kilotons(self.kinetic_energy().energy_tnt_kilotons)
    }

    /// Population in each overpressure annulus, capped by what is left of
    /// `total_population` after the inner zones.
    pub fn estimate_casualties(
        &self,
        population_density_per_km2: f64,
        total_population: u64,
    ) -> Result<CasualtyEstimate, ImpactError> {
        let density = require_finite("population_density_per_km2", population_density_per_km2)?;
        if density < 0.0 {
            return Err(ImpactError::OutOfRange {
                name: "population_density_per_km2",
                value: density,
                expected: ">= 0",
            });
        }

        let blast = self.air_blast_ranges();
        let total = total_population as f64;

        let area_20_psi = PI * blast.psi_20_km.powi(2);
        let area_5_psi = PI * blast.psi_5_km.powi(2) - area_20_psi;
        let area_1_psi = PI * blast.psi_1_km.powi(2) - area_5_psi - area_20_psi;

        let pop_20_psi = (area_20_psi.max(0.0) * density).min(total);
        let pop_5_psi = (area_5_psi.max(0.0) * density).min(total - pop_20_psi);
        let pop_1_psi = (area_1_psi.max(0.0) * density).min(total - pop_20_psi - pop_5_psi);

        let severe_zone = ZoneCasualties::new(pop_20_psi, SEVERE_ZONE_RATES, blast.psi_20_km);
        let heavy_damage_zone = ZoneCasualties::new(pop_5_psi, HEAVY_ZONE_RATES, blast.psi_5_km);
        let light_damage_zone = ZoneCasualties::new(pop_1_psi, LIGHT_ZONE_RATES, blast.psi_1_km);

        let zones = [&severe_zone, &heavy_damage_zone, &light_damage_zone];
        let totals = CasualtyTotals {
            fatalities: zones.iter().map(|z| z.fatalities).sum(),
            injuries: zones.iter().map(|z| z.injuries).sum(),
            affected_population: zones.iter().map(|z| z.population).sum(),
        };

        Ok(CasualtyEstimate {
            severe_zone,
            heavy_damage_zone,
            light_damage_zone,
            totals,
        })
    }

    /// Energy, crater, seismic and blast figures in one bundle.
    pub fn comprehensive_analysis(&self) -> ImpactAnalysis {
        ImpactAnalysis {
            asteroid_properties: AsteroidProperties {
                diameter_m: self.diameter_m,
                velocity_km_s: self.velocity_km_s,
                mass_kg: self.mass_kg(),
                volume_m3: self.volume_m3(),
                density_kg_m3: self.density_kg_m3,
                impact_angle_degrees: self.angle_deg,
            },
            energy: self.kinetic_energy(),
            crater: self.crater_size(),
            seismic: self.seismic_magnitude(),
            air_blast_ranges: self.air_blast_ranges(),
        }
    }
}

// =============================================================================
// RESULT TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KineticEnergy {
    pub energy_joules: f64,
    pub energy_tnt_kilotons: f64,
    pub energy_tnt_megatons: f64,
}

impl KineticEnergy {
    pub fn from_joules(energy_joules: f64) -> Self {
        let kilotons = energy_joules / JOULES_PER_KILOTON;
        Self {
            energy_joules,
            energy_tnt_kilotons: kilotons,
            energy_tnt_megatons: kilotons / 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CraterDimensions {
    pub diameter_m: f64,
    pub diameter_km: f64,
    pub depth_m: f64,
    pub rim_height_m: f64,
    pub volume_m3: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeismicMagnitude {
    /// Kanamori moment magnitude of the full kinetic energy
    pub moment_magnitude: f64,
    pub richter_approximate: f64,
    pub energy_ergs: f64,
    /// Magnitude of the seismically radiated fraction (`SEISMIC_EFFICIENCY`)
    pub effective_magnitude: f64,
}

impl SeismicMagnitude {
    pub fn from_energy_joules(energy_joules: f64) -> Self {
        let energy_ergs = energy_joules * 1e7;
        let moment_magnitude = moment_magnitude_from_ergs(energy_ergs);
        Self {
            moment_magnitude,
            richter_approximate: (moment_magnitude - 0.2).max(0.0),
            energy_ergs,
            effective_magnitude: moment_magnitude_from_ergs(energy_ergs * SEISMIC_EFFICIENCY),
        }
    }
}

/// Kanamori (1977): log10(E) = 11.8 + 1.5·M, E in ergs. Clamped at zero.
pub fn moment_magnitude_from_ergs(energy_ergs: f64) -> f64 {
    if energy_ergs > 0.0 {
        ((energy_ergs.log10() - 11.8) / 1.5).max(0.0)
    } else {
        0.0
    }
}

/// Overpressure and thermal radii in km. All zero for a non-positive yield.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AirBlastRanges {
    #[serde(rename = "1_psi_km")]
    pub psi_1_km: f64,
    #[serde(rename = "5_psi_km")]
    pub psi_5_km: f64,
    #[serde(rename = "20_psi_km")]
    pub psi_20_km: f64,
    pub thermal_3rd_degree_km: f64,
}

impl AirBlastRanges {
    pub fn from_yield_kilotons(yield_kt: f64) -> Self {
        if !(yield_kt > 0.0) {
            return Self::default();
        }
        let cube_root = yield_kt.powf(0.33);
        Self {
            psi_1_km: 2.2 * cube_root,
            psi_5_km: 0.8 * cube_root,
            psi_20_km: 0.3 * cube_root,
            thermal_3rd_degree_km: 1.9 * yield_kt.powf(0.41),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.psi_1_km == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneCasualties {
    pub population: u64,
    pub fatalities: u64,
    pub injuries: u64,
    /// Outer radius of the zone (km)
    pub radius_km: f64,
}

impl ZoneCasualties {
    fn new(population: f64, (fatality_rate, injury_rate): (f64, f64), radius_km: f64) -> Self {
        let population = population.max(0.0);
        Self {
            population: population as u64,
            fatalities: (population * fatality_rate) as u64,
            injuries: (population * injury_rate) as u64,
            radius_km,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasualtyTotals {
    pub fatalities: u64,
    pub injuries: u64,
    pub affected_population: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CasualtyEstimate {
    pub severe_zone: ZoneCasualties,
    pub heavy_damage_zone: ZoneCasualties,
    pub light_damage_zone: ZoneCasualties,
    pub totals: CasualtyTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsteroidProperties {
    pub diameter_m: f64,
    pub velocity_km_s: f64,
    pub mass_kg: f64,
    pub volume_m3: f64,
    pub density_kg_m3: f64,
    pub impact_angle_degrees: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub asteroid_properties: AsteroidProperties,
    pub energy: KineticEnergy,
    pub crater: CraterDimensions,
    pub seismic: SeismicMagnitude,
    pub air_blast_ranges: AirBlastRanges,
}

// =============================================================================
// COARSE DAMAGE RADII & RISK CATEGORY
// =============================================================================

/// Square-root damage radii (km) quoted in scenario summaries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageRadii {
    pub total_destruction_km: f64,
    pub severe_damage_km: f64,
    pub moderate_damage_km: f64,
    pub light_damage_km: f64,
}

pub fn damage_radii(energy_megatons: f64) -> DamageRadii {
    let mt = energy_megatons.max(0.0);
    DamageRadii {
        total_destruction_km: (mt / 10.0).sqrt(),
        severe_damage_km: (mt / 2.0).sqrt(),
        moderate_damage_km: mt.sqrt(),
        light_damage_km: (mt * 2.0).sqrt(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    GlobalCatastrophe,
    RegionalDevastation,
    LocalCatastrophe,
    LocalDamage,
    MinimalRisk,
}

impl RiskCategory {
    pub fn from_diameter_km(diameter_km: f64) -> Self {
        if diameter_km >= 10.0 {
            Self::GlobalCatastrophe
        } else if diameter_km >= 1.0 {
            Self::RegionalDevastation
        } else if diameter_km >= 0.1 {
            Self::LocalCatastrophe
        } else if diameter_km >= 0.01 {
            Self::LocalDamage
        } else {
            Self::MinimalRisk
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::GlobalCatastrophe => "Global Catastrophe",
            Self::RegionalDevastation => "Regional Devastation",
            Self::LocalCatastrophe => "Local Catastrophe",
            Self::LocalDamage => "Local Damage",
            Self::MinimalRisk => "Minimal Risk",
        }
    }

    pub fn potential_effects(&self) -> &'static str {
        match self {
            Self::GlobalCatastrophe => "Mass extinction event, global winter",
            Self::RegionalDevastation => "Continental damage, climate effects",
            Self::LocalCatastrophe => "City-scale destruction",
            Self::LocalDamage => "Building-scale damage",
            Self::MinimalRisk => "Likely burns up in atmosphere",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
