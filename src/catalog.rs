// Catalog Records - Small-body data as delivered by the catalog fetcher
// Parses JPL SBDB-shaped payloads; the HTTP side lives outside this crate

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::CatalogError;
use crate::orbital_propagator::OrbitalElements;
use crate::physics_engine::asteroid_density;

// =============================================================================
// RECORD SCHEMA
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProperties {
    #[serde(default = "default_diameter_km")]
    pub diameter_km: f64,
    #[serde(default = "default_absolute_magnitude")]
    pub absolute_magnitude: f64,
    #[serde(default = "default_albedo")]
    pub albedo: f64,
    /// Bus-DeMeo or Tholen class when the catalog knows it
    #[serde(default)]
    pub spectral_type: Option<String>,
}

fn default_diameter_km() -> f64 {
    1.0
}

fn default_absolute_magnitude() -> f64 {
    20.0
}

fn default_albedo() -> f64 {
    0.14
}

impl Default for PhysicalProperties {
    fn default() -> Self {
        Self {
            diameter_km: default_diameter_km(),
            absolute_magnitude: default_absolute_magnitude(),
            albedo: default_albedo(),
            spectral_type: None,
        }
    }
}

impl PhysicalProperties {
    pub fn diameter_m(&self) -> f64 {
        self.diameter_km * 1000.0
    }

    /// Bulk density implied by the spectral class, if one is known.
    pub fn density_kg_m3(&self) -> Option<f64> {
        self.spectral_type.as_deref().map(estimate_density)
    }
}

/// One body as handed over by the catalog collaborator. Every numeric field is
/// independently defaultable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub orbital_elements: OrbitalElements,
    #[serde(flatten)]
    pub physical_properties: PhysicalProperties,
}

impl CatalogRecord {
    pub fn new(id: impl Into<String>, orbital_elements: OrbitalElements) -> Self {
        Self {
            id: id.into(),
            name: None,
            orbital_elements,
            physical_properties: PhysicalProperties::default(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Estimate asteroid density from the leading letter of the spectral class
pub fn estimate_density(spectral_type: &str) -> f64 {
    match spectral_type.trim().to_uppercase().chars().next() {
        Some('C') => asteroid_density::C_TYPE,
        Some('B') => asteroid_density::B_TYPE,
        Some('D') => asteroid_density::D_TYPE,
        Some('P') => asteroid_density::P_TYPE,
        Some('S') => asteroid_density::S_TYPE,
        Some('Q') => asteroid_density::Q_TYPE,
        Some('V') => asteroid_density::V_TYPE,
        Some('M') => asteroid_density::M_TYPE,
        Some('X') => asteroid_density::X_TYPE,
        _ => asteroid_density::RUBBLE_PILE,
    }
}

// =============================================================================
// SBDB RESPONSE TYPES
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SbdbResponse {
    pub object: Option<SbdbObject>,
    pub orbit: Option<SbdbOrbit>,
    pub phys_par: Option<Vec<SbdbField>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SbdbObject {
    pub fullname: Option<String>,
    pub des: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SbdbOrbit {
    pub epoch: Option<Value>,
    pub elements: Option<Vec<SbdbField>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SbdbField {
    pub name: String,
    pub value: Option<Value>,
}

impl SbdbField {
    /// SBDB sends numbers as strings; accept both.
    fn numeric(&self) -> Option<f64> {
        numeric_value(self.value.as_ref()?)
    }

    fn text(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

impl SbdbResponse {
    /// Map the payload onto a `CatalogRecord`, defaulting whatever is missing
    /// or unparseable.
    pub fn into_record(self, id: &str) -> Result<CatalogRecord, CatalogError> {
        let object = self.object.ok_or(CatalogError::MissingObject)?;

        let mut elements = OrbitalElements::default();
        if let Some(orbit) = self.orbit {
            if let Some(epoch) = orbit.epoch.as_ref().and_then(numeric_value) {
                elements.epoch = epoch;
            }
            for field in orbit.elements.unwrap_or_default() {
                let Some(value) = field.numeric() else {
                    debug!(id, element = %field.name, "unparseable orbital element, keeping default");
                    continue;
                };
                match field.name.as_str() {
                    "a" => elements.semi_major_axis = value,
                    "e" => elements.eccentricity = value,
                    "i" => elements.inclination = value,
                    "om" => elements.ascending_node = value,
                    "w" => elements.argument_perihelion = value,
                    "ma" => elements.mean_anomaly = value,
                    "epoch" => elements.epoch = value,
                    _ => {}
                }
            }
        }

        let mut physical = PhysicalProperties::default();
        for field in self.phys_par.unwrap_or_default() {
            match field.name.as_str() {
                "diameter" => {
                    if let Some(v) = field.numeric() {
                        physical.diameter_km = v;
                    }
                }
                "H" => {
                    if let Some(v) = field.numeric() {
                        physical.absolute_magnitude = v;
                    }
                }
                "albedo" => {
                    if let Some(v) = field.numeric() {
                        physical.albedo = v;
                    }
                }
                "spec_B" | "spec_T" => {
                    if physical.spectral_type.is_none() {
                        physical.spectral_type = field.text();
                    }
                }
                _ => {}
            }
        }

        Ok(CatalogRecord {
            id: id.to_string(),
            name: object.fullname.or(object.des),
            orbital_elements: elements,
            physical_properties: physical,
        })
    }
}

pub fn parse_sbdb_response(id: &str, json: &str) -> Result<CatalogRecord, CatalogError> {
    let response: SbdbResponse = serde_json::from_str(json)?;
    response.into_record(id)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_engine::J2000_JD;

    const APOPHIS: &str = r#"{
        "object": {"fullname": "99942 Apophis (2004 MN4)", "des": "99942"},
        "orbit": {
            "epoch": "2460000.5",
            "elements": [
                {"name": "e", "value": "0.1914"},
                {"name": "a", "value": "0.9224"},
                {"name": "i", "value": "3.339"},
                {"name": "om", "value": "204.43"},
                {"name": "w", "value": "126.65"},
                {"name": "ma", "value": 180.0},
                {"name": "tp", "value": "2460044.1"}
            ]
        },
        "phys_par": [
            {"name": "diameter", "value": "0.34"},
            {"name": "H", "value": "19.09"},
            {"name": "spec_B", "value": "Sq"}
        ]
    }"#;

    #[test]
    fn test_parse_full_payload() {
        let record = parse_sbdb_response("99942", APOPHIS).unwrap();
        assert_eq!(record.display_name(), "99942 Apophis (2004 MN4)");
        assert_eq!(record.orbital_elements.semi_major_axis, 0.9224);
        assert_eq!(record.orbital_elements.mean_anomaly, 180.0);
        assert_eq!(record.orbital_elements.epoch, 2460000.5);
        assert_eq!(record.physical_properties.diameter_km, 0.34);
        assert_eq!(record.physical_properties.albedo, 0.14);
        assert_eq!(record.physical_properties.density_kg_m3(), Some(2700.0));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let record = parse_sbdb_response(
            "x",
            r#"{"object": {"des": "2024 XY"}, "orbit": {"elements": [{"name": "e", "value": "oops"}]}}"#,
        )
        .unwrap();
        assert_eq!(record.display_name(), "2024 XY");
        assert_eq!(record.orbital_elements, OrbitalElements::default());
        assert_eq!(record.orbital_elements.epoch, J2000_JD);
        assert_eq!(record.physical_properties, PhysicalProperties::default());
    }

    #[test]
    fn test_missing_object_is_an_error() {
        assert!(matches!(
            parse_sbdb_response("x", r#"{"orbit": null}"#),
            Err(CatalogError::MissingObject)
        ));
        assert!(parse_sbdb_response("x", "not json").is_err());
    }

    #[test]
    fn test_flat_record_deserializes_with_defaults() {
        let record: CatalogRecord = serde_json::from_str(
            r#"{"id": "433", "semi_major_axis": 1.458, "eccentricity": 0.223, "diameter_km": 16.8}"#,
        )
        .unwrap();
        assert_eq!(record.orbital_elements.semi_major_axis, 1.458);
        assert_eq!(record.orbital_elements.inclination, 5.0);
        assert_eq!(record.physical_properties.diameter_km, 16.8);
        assert_eq!(record.physical_properties.absolute_magnitude, 20.0);
        assert_eq!(record.display_name(), "433");
    }

    #[test]
    fn test_density_by_spectral_class() {
        assert_eq!(estimate_density("C"), 1700.0);
        assert_eq!(estimate_density("Sq"), 2700.0);
        assert_eq!(estimate_density("xe"), 3500.0);
        assert_eq!(estimate_density("?"), 2000.0);
    }
}
