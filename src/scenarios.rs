// Impact Scenarios - Historical and hypothetical reference impacts
// Preset catalogue, side-by-side comparison and single-parameter sweeps

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ScenarioError;
use crate::impact_effects::{AsteroidPhysicalParameters, ImpactAnalysis, DEFAULT_IMPACT_ANGLE_DEG};
use crate::physics_engine::asteroid_density;
use crate::tsunami::validate_coordinates;

/// Fixed inputs of a parameter study for the parameters not being swept
const STUDY_VELOCITY_KM_S: f64 = 20.0;

// =============================================================================
// PRESETS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioCategory {
    SmallEvent,
    MediumEvent,
    CityKiller,
    RegionalDisaster,
    ExtinctionEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Landmark {
    pub latitude: f64,
    pub longitude: f64,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioPreset {
    pub key: &'static str,
    pub name: &'static str,
    pub diameter_m: f64,
    pub velocity_km_s: f64,
    pub density_kg_m3: f64,
    pub angle_deg: f64,
    pub description: &'static str,
    pub location: Landmark,
    pub historical: bool,
    pub category: ScenarioCategory,
}

impl ScenarioPreset {
    pub fn parameters(&self) -> Result<AsteroidPhysicalParameters, ScenarioError> {
        Ok(AsteroidPhysicalParameters::with_details(
            self.diameter_m,
            self.velocity_km_s,
            self.density_kg_m3,
            self.angle_deg,
        )?)
    }

    fn matches(&self, query: &str) -> bool {
        [self.key, self.name, self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(query))
    }
}

static PRESETS: [ScenarioPreset; 8] = [
    ScenarioPreset {
        key: "chelyabinsk_2013",
        name: "2013 Chelyabinsk Event (Actual)",
        diameter_m: 20.0,
        velocity_km_s: 19.16,
        density_kg_m3: 3300.0,
        angle_deg: 18.0,
        description: "Actual airburst over Russia in 2013. Injured ~1500 people.",
        location: Landmark {
            latitude: 55.1544,
            longitude: 61.4294,
            name: "Chelyabinsk, Russia",
        },
        historical: true,
        category: ScenarioCategory::SmallEvent,
    },
    ScenarioPreset {
        key: "tunguska_1908",
        name: "1908 Tunguska Event (Estimated)",
        diameter_m: 60.0,
        velocity_km_s: 27.0,
        density_kg_m3: 2000.0,
        angle_deg: 30.0,
        description: "Massive airburst over Siberia. Flattened 2,000 km² of forest.",
        location: Landmark {
            latitude: 60.8858,
            longitude: 101.8942,
            name: "Tunguska, Siberia",
        },
        historical: true,
        category: ScenarioCategory::MediumEvent,
    },
    ScenarioPreset {
        key: "apophis_potential",
        name: "Apophis 2029 Close Approach",
        diameter_m: 340.0,
        velocity_km_s: 12.87,
        density_kg_m3: 2600.0,
        angle_deg: 45.0,
        description: "Potentially hazardous asteroid - modeled impact scenario.",
        location: Landmark {
            latitude: 40.7128,
            longitude: -74.0060,
            name: "New York City, USA",
        },
        historical: false,
        category: ScenarioCategory::CityKiller,
    },
    ScenarioPreset {
        key: "chicxulub_scale",
        name: "Chicxulub-Scale Event (K-Pg Extinction)",
        diameter_m: 10_000.0,
        velocity_km_s: 20.0,
        density_kg_m3: 2600.0,
        angle_deg: 60.0,
        description: "Dinosaur extinction event scale impact (66 million years ago).",
        location: Landmark {
            latitude: 21.4,
            longitude: -89.5,
            name: "Yucatan Peninsula, Mexico",
        },
        historical: true,
        category: ScenarioCategory::ExtinctionEvent,
    },
    ScenarioPreset {
        key: "city_killer",
        name: "City Killer Scenario",
        diameter_m: 140.0,
        velocity_km_s: 18.0,
        density_kg_m3: 2600.0,
        angle_deg: 45.0,
        description: "NASA threshold for city-destroying asteroid.",
        location: Landmark {
            latitude: 35.6762,
            longitude: 139.6503,
            name: "Tokyo, Japan",
        },
        historical: false,
        category: ScenarioCategory::CityKiller,
    },
    ScenarioPreset {
        key: "regional_disaster",
        name: "Regional Disaster Scenario",
        diameter_m: 500.0,
        velocity_km_s: 25.0,
        density_kg_m3: 2800.0,
        angle_deg: 30.0,
        description: "Regional-scale impact causing widespread damage.",
        location: Landmark {
            latitude: 51.5074,
            longitude: -0.1278,
            name: "London, UK",
        },
        historical: false,
        category: ScenarioCategory::RegionalDisaster,
    },
    ScenarioPreset {
        key: "small_meteor",
        name: "Small Meteor Event",
        diameter_m: 5.0,
        velocity_km_s: 15.0,
        density_kg_m3: 3000.0,
        angle_deg: 45.0,
        description: "Typical small meteor event - usually burns up in atmosphere.",
        location: Landmark {
            latitude: 34.0522,
            longitude: -118.2437,
            name: "Los Angeles, USA",
        },
        historical: false,
        category: ScenarioCategory::SmallEvent,
    },
    ScenarioPreset {
        key: "planetary_defense_test",
        name: "Planetary Defense Test Case",
        diameter_m: 250.0,
        velocity_km_s: 22.0,
        density_kg_m3: 2400.0,
        angle_deg: 35.0,
        description: "Test case for planetary defense systems and impact mitigation.",
        location: Landmark {
            latitude: 48.8566,
            longitude: 2.3522,
            name: "Paris, France",
        },
        historical: false,
        category: ScenarioCategory::CityKiller,
    },
];

pub fn presets() -> &'static [ScenarioPreset] {
    &PRESETS
}

pub fn find(key: &str) -> Option<&'static ScenarioPreset> {
    PRESETS.iter().find(|p| p.key == key)
}

pub fn by_category(category: ScenarioCategory) -> Vec<&'static ScenarioPreset> {
    PRESETS.iter().filter(|p| p.category == category).collect()
}

pub fn historical() -> Vec<&'static ScenarioPreset> {
    PRESETS.iter().filter(|p| p.historical).collect()
}

/// Preset keys grouped by category.
pub fn categories() -> BTreeMap<ScenarioCategory, Vec<&'static str>> {
    let mut grouped: BTreeMap<ScenarioCategory, Vec<&'static str>> = BTreeMap::new();
    for preset in &PRESETS {
        grouped.entry(preset.category).or_default().push(preset.key);
    }
    grouped
}

/// Case-insensitive match on key, display name or description.
pub fn search(query: &str) -> Vec<&'static ScenarioPreset> {
    let query = query.to_lowercase();
    PRESETS.iter().filter(|p| p.matches(&query)).collect()
}

// =============================================================================
// SCENARIO ANALYSIS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl ImpactLocation {
    /// Named after its coordinates when no name is given.
    pub fn new(latitude: f64, longitude: f64, name: Option<String>) -> Self {
        let name = name.unwrap_or_else(|| format!("({latitude:.3}, {longitude:.3})"));
        Self {
            latitude,
            longitude,
            name,
        }
    }
}

impl From<Landmark> for ImpactLocation {
    fn from(landmark: Landmark) -> Self {
        Self {
            latitude: landmark.latitude,
            longitude: landmark.longitude,
            name: landmark.name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub energy_megatons: f64,
    pub seismic_magnitude: f64,
    pub crater_diameter_km: f64,
    pub crater_depth_m: f64,
    pub severe_damage_radius_km: f64,
    pub light_damage_radius_km: f64,
}

impl From<&ImpactAnalysis> for ScenarioSummary {
    fn from(analysis: &ImpactAnalysis) -> Self {
        Self {
            energy_megatons: analysis.energy.energy_tnt_megatons,
            seismic_magnitude: analysis.seismic.moment_magnitude,
            crater_diameter_km: analysis.crater.diameter_km,
            crater_depth_m: analysis.crater.depth_m,
            severe_damage_radius_km: analysis.air_blast_ranges.psi_20_km,
            light_damage_radius_km: analysis.air_blast_ranges.psi_1_km,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioRun {
    pub scenario: ScenarioPreset,
    pub impact_location: ImpactLocation,
    pub analysis: ImpactAnalysis,
    pub summary: ScenarioSummary,
}

/// Full analysis of a preset, optionally relocated.
pub fn run_scenario(
    key: &str,
    custom_location: Option<ImpactLocation>,
) -> Result<ScenarioRun, ScenarioError> {
    let preset = find(key).ok_or_else(|| ScenarioError::UnknownScenario(key.to_string()))?;
    let impact_location = match custom_location {
        Some(location) => {
            validate_coordinates(location.latitude, location.longitude)?;
            location
        }
        None => preset.location.into(),
    };

    let analysis = preset.parameters()?.comprehensive_analysis();
    Ok(ScenarioRun {
        scenario: *preset,
        impact_location,
        summary: ScenarioSummary::from(&analysis),
        analysis,
    })
}

// =============================================================================
// COMPARISON
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub scenario_name: String,
    pub display_name: String,
    pub category: ScenarioCategory,
    pub historical: bool,
    pub diameter_m: f64,
    pub velocity_km_s: f64,
    pub energy_mt: f64,
    pub seismic_magnitude: f64,
    pub crater_diameter_km: f64,
    pub crater_depth_m: f64,
    pub severe_damage_range_km: f64,
    pub light_damage_range_km: f64,
    pub thermal_range_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Zero range for an empty input.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
        values
            .into_iter()
            .fold(None, |acc: Option<Self>, v| {
                Some(match acc {
                    None => Self { min: v, max: v },
                    Some(r) => Self {
                        min: r.min.min(v),
                        max: r.max.max(v),
                    },
                })
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    /// Sorted by ascending energy
    pub comparison_data: Vec<ComparisonRow>,
    pub valid_scenarios: Vec<String>,
    pub total_scenarios: usize,
    pub categories: Vec<ScenarioCategory>,
    pub energy_range: ValueRange,
    pub size_range: ValueRange,
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Compare presets by key; unknown keys are skipped.
pub fn compare_scenarios(keys: &[&str]) -> Result<ScenarioComparison, ScenarioError> {
    let mut rows = Vec::new();
    let mut valid_scenarios = Vec::new();

    for preset in keys.iter().filter_map(|key| find(key)) {
        let analysis = preset.parameters()?.comprehensive_analysis();
        let blast = analysis.air_blast_ranges;
        rows.push(ComparisonRow {
            scenario_name: preset.key.to_string(),
            display_name: preset.name.to_string(),
            category: preset.category,
            historical: preset.historical,
            diameter_m: preset.diameter_m,
            velocity_km_s: preset.velocity_km_s,
            energy_mt: round_to(analysis.energy.energy_tnt_megatons, 3),
            seismic_magnitude: round_to(analysis.seismic.moment_magnitude, 2),
            crater_diameter_km: round_to(analysis.crater.diameter_km, 3),
            crater_depth_m: round_to(analysis.crater.depth_m, 1),
            severe_damage_range_km: round_to(blast.psi_20_km, 2),
            light_damage_range_km: round_to(blast.psi_1_km, 2),
            thermal_range_km: round_to(blast.thermal_3rd_degree_km, 2),
        });
        valid_scenarios.push(preset.key.to_string());
    }

    rows.sort_by(|a, b| a.energy_mt.total_cmp(&b.energy_mt));

    let mut categories: Vec<ScenarioCategory> = rows.iter().map(|r| r.category).collect();
    categories.sort();
    categories.dedup();

    Ok(ScenarioComparison {
        total_scenarios: rows.len(),
        categories,
        energy_range: ValueRange::of(rows.iter().map(|r| r.energy_mt)),
        size_range: ValueRange::of(rows.iter().map(|r| r.diameter_m)),
        comparison_data: rows,
        valid_scenarios,
    })
}

// =============================================================================
// PARAMETER STUDY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyParameter {
    Diameter,
    Velocity,
    Angle,
}

impl StudyParameter {
    pub fn default_values(&self) -> &'static [f64] {
        match self {
            Self::Diameter => &[50.0, 100.0, 200.0, 500.0, 1000.0],
            Self::Velocity => &[10.0, 15.0, 20.0, 25.0, 30.0],
            Self::Angle => &[15.0, 30.0, 45.0, 60.0, 90.0],
        }
    }

    /// Impactor with `value` substituted for this parameter; the others are
    /// `base_diameter_m`, 20 km/s, 2600 kg/m³ and 45°.
    fn impactor(
        &self,
        base_diameter_m: f64,
        value: f64,
    ) -> Result<AsteroidPhysicalParameters, ScenarioError> {
        let (diameter, velocity, angle) = match self {
            Self::Diameter => (value, STUDY_VELOCITY_KM_S, DEFAULT_IMPACT_ANGLE_DEG),
            Self::Velocity => (base_diameter_m, value, DEFAULT_IMPACT_ANGLE_DEG),
            Self::Angle => (base_diameter_m, STUDY_VELOCITY_KM_S, value),
        };
        Ok(AsteroidPhysicalParameters::with_details(
            diameter,
            velocity,
            asteroid_density::STONY,
            angle,
        )?)
    }
}

impl FromStr for StudyParameter {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "diameter" => Ok(Self::Diameter),
            "velocity" => Ok(Self::Velocity),
            "angle" => Ok(Self::Angle),
            _ => Err(ScenarioError::UnknownParameter(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudyPoint {
    pub parameter_value: f64,
    pub energy_mt: f64,
    pub seismic_magnitude: f64,
    pub crater_diameter_km: f64,
    pub crater_depth_m: f64,
    pub severe_damage_km: f64,
    pub light_damage_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterStudy {
    pub parameter: StudyParameter,
    pub base_diameter_m: f64,
    pub values_tested: Vec<f64>,
    pub results: Vec<StudyPoint>,
    pub parameter_range: ValueRange,
    pub energy_range_mt: ValueRange,
    pub damage_range_km: ValueRange,
}

/// Sweep one parameter, holding the others fixed. `values` defaults to
/// [`StudyParameter::default_values`].
pub fn parameter_study(
    parameter: StudyParameter,
    base_diameter_m: f64,
    values: Option<&[f64]>,
) -> Result<ParameterStudy, ScenarioError> {
    let values = values.unwrap_or_else(|| parameter.default_values());
    if values.is_empty() {
        return Err(ScenarioError::EmptyStudy);
    }

    let results = values
        .iter()
        .map(|&value| -> Result<StudyPoint, ScenarioError> {
            let analysis = parameter
                .impactor(base_diameter_m, value)?
                .comprehensive_analysis();
            Ok(StudyPoint {
                parameter_value: value,
                energy_mt: analysis.energy.energy_tnt_megatons,
                seismic_magnitude: analysis.seismic.moment_magnitude,
                crater_diameter_km: analysis.crater.diameter_km,
                crater_depth_m: analysis.crater.depth_m,
                severe_damage_km: analysis.air_blast_ranges.psi_20_km,
                light_damage_km: analysis.air_blast_ranges.psi_1_km,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParameterStudy {
        parameter,
        base_diameter_m,
        values_tested: values.to_vec(),
        parameter_range: ValueRange::of(values.iter().copied()),
        energy_range_mt: ValueRange::of(results.iter().map(|r| r.energy_mt)),
        damage_range_km: ValueRange::of(results.iter().map(|r| r.severe_damage_km)),
        results,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_catalogue_lookups() {
        assert_eq!(presets().len(), 8);
        assert_eq!(find("tunguska_1908").unwrap().diameter_m, 60.0);
        assert!(find("atlantis").is_none());

        let historical: Vec<_> = historical().iter().map(|p| p.key).collect();
        assert_eq!(
            historical,
            vec!["chelyabinsk_2013", "tunguska_1908", "chicxulub_scale"]
        );
        assert_eq!(by_category(ScenarioCategory::CityKiller).len(), 3);

        let grouped = categories();
        assert_eq!(grouped.values().map(Vec::len).sum::<usize>(), 8);
        assert_eq!(
            grouped[&ScenarioCategory::SmallEvent],
            vec!["chelyabinsk_2013", "small_meteor"]
        );
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let hits: Vec<_> = search("SIBERIA").iter().map(|p| p.key).collect();
        assert_eq!(hits, vec!["tunguska_1908"]);
        assert_eq!(search("scenario").len(), 3);
        assert!(search("zzz").is_empty());
    }

    #[test]
    fn test_run_chelyabinsk() {
        let run = run_scenario("chelyabinsk_2013", None).unwrap();
        assert_eq!(run.impact_location.name, "Chelyabinsk, Russia");
        assert_relative_eq!(run.summary.energy_megatons, 0.606, epsilon = 0.01);
        assert_eq!(run.summary.light_damage_radius_km, run.analysis.air_blast_ranges.psi_1_km);
        assert!(run.analysis.seismic.effective_magnitude > 4.0);
        assert!(run.analysis.seismic.effective_magnitude < 4.5);
    }

    #[test]
    fn test_run_with_custom_location() {
        let run = run_scenario("city_killer", Some(ImpactLocation::new(-33.8688, 151.2093, None)))
            .unwrap();
        assert_eq!(run.impact_location.name, "(-33.869, 151.209)");

        assert!(matches!(
            run_scenario("city_killer", Some(ImpactLocation::new(95.0, 0.0, None))),
            Err(ScenarioError::Impact(_))
        ));
        assert!(matches!(
            run_scenario("nope", None),
            Err(ScenarioError::UnknownScenario(_))
        ));
    }

    #[test]
    fn test_comparison_sorted_by_energy() {
        let comparison =
            compare_scenarios(&["tunguska_1908", "nope", "small_meteor", "chelyabinsk_2013"])
                .unwrap();
        let order: Vec<_> = comparison
            .comparison_data
            .iter()
            .map(|r| r.scenario_name.as_str())
            .collect();
        assert_eq!(order, vec!["small_meteor", "chelyabinsk_2013", "tunguska_1908"]);
        assert_eq!(comparison.valid_scenarios.len(), 3);
        assert_eq!(comparison.total_scenarios, 3);
        assert_eq!(
            comparison.categories,
            vec![ScenarioCategory::SmallEvent, ScenarioCategory::MediumEvent]
        );
        assert_eq!(comparison.size_range, ValueRange { min: 5.0, max: 60.0 });

        let empty = compare_scenarios(&[]).unwrap();
        assert_eq!(empty.energy_range, ValueRange::default());
    }

    #[test]
    fn test_parameter_study_defaults() {
        let study = parameter_study(StudyParameter::Velocity, 100.0, None).unwrap();
        assert_eq!(study.values_tested, vec![10.0, 15.0, 20.0, 25.0, 30.0]);
        // Energy scales with v²
        assert_relative_eq!(
            study.results[4].energy_mt / study.results[0].energy_mt,
            9.0,
            max_relative = 1e-9
        );
        assert_eq!(study.parameter_range, ValueRange { min: 10.0, max: 30.0 });
        assert_eq!(study.energy_range_mt.max, study.results[4].energy_mt);
    }

    #[test]
    fn test_parameter_study_diameter_ignores_base() {
        let a = parameter_study(StudyParameter::Diameter, 1.0, Some(&[200.0])).unwrap();
        let b = parameter_study(StudyParameter::Diameter, 999.0, Some(&[200.0])).unwrap();
        assert_eq!(a.results, b.results);
    }

    #[test]
    fn test_parameter_study_errors() {
        assert!(matches!(
            "mass".parse::<StudyParameter>(),
            Err(ScenarioError::UnknownParameter(_))
        ));
        assert_eq!("Angle".parse::<StudyParameter>(), Ok(StudyParameter::Angle));
        assert!(matches!(
            parameter_study(StudyParameter::Angle, 100.0, Some(&[])),
            Err(ScenarioError::EmptyStudy)
        ));
        assert!(parameter_study(StudyParameter::Angle, 100.0, Some(&[120.0])).is_err());
    }
}
