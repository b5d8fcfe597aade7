// End-to-end checks through the public API

use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use impactrisk::physics_engine::{
    julian_date, normalize_degrees, EARTH_MEAN_LONGITUDE_J2000, EARTH_MEAN_MOTION_DEG_PER_DAY,
    J2000_JD,
};
use impactrisk::{
    AccuracyTier, AsteroidPhysicalParameters, CatalogRecord, EngineConfig, ImpactService,
    OrbitalElements, ScenarioMode,
};

#[test]
fn chelyabinsk_reference_case() {
    let asteroid = AsteroidPhysicalParameters::with_details(20.0, 19.16, 3300.0, 18.0).unwrap();
    let analysis = asteroid.comprehensive_analysis();

    assert_relative_eq!(analysis.energy.energy_tnt_megatons, 0.606, epsilon = 0.01);
    let seismic = analysis.seismic;
    assert!(seismic.effective_magnitude >= 4.0 && seismic.effective_magnitude <= 4.5);
    assert!(seismic.moment_magnitude > seismic.effective_magnitude);
    assert!(analysis.crater.diameter_m > 0.0);
    assert!(analysis.air_blast_ranges.psi_1_km > analysis.air_blast_ranges.psi_20_km);
}

#[test]
fn catalog_payload_to_impact_prediction() {
    let start = Utc.with_ymd_and_hms(2031, 6, 1, 0, 0, 0).unwrap();
    let epoch = julian_date(&start) + 12.0;
    let earth_longitude = normalize_degrees(
        EARTH_MEAN_LONGITUDE_J2000 + EARTH_MEAN_MOTION_DEG_PER_DAY * (epoch - J2000_JD),
    );

    // Perihelion on Earth's orbit, timed to meet Earth 12 days in
    let payload = serde_json::json!({
        "object": {"fullname": "2031 TEST"},
        "orbit": {
            "epoch": epoch.to_string(),
            "elements": [
                {"name": "a", "value": "1.5"},
                {"name": "e", "value": (1.0_f64 / 3.0).to_string()},
                {"name": "i", "value": "0"},
                {"name": "om", "value": "0"},
                {"name": "w", "value": earth_longitude.to_string()},
                {"name": "ma", "value": "0"}
            ]
        },
        "phys_par": [{"name": "diameter", "value": "0.12"}]
    })
    .to_string();

    let config = EngineConfig::from_json_str(r#"{"accuracy": "fine"}"#).unwrap();
    let service = ImpactService::new(config).unwrap();

    let record = service.parse_catalog_record("2031-test", &payload);
    assert!(record.success);
    let record = record.data.unwrap();
    assert_eq!(record.physical_properties.diameter_km, 0.12);

    let response = service.predict_impact(&record, &start);
    assert!(response.success, "{:?}", response.error);
    let prediction = response.data.unwrap();
    assert_eq!(prediction.asteroid_name, "2031 TEST");
    assert!(prediction.closest_approach.refined);

    let scenario = prediction.impact.expect("impact expected");
    assert_eq!(scenario.mode, ScenarioMode::Trajectory);
    assert!((scenario.julian_date - epoch).abs() < 1.0 / 24.0);
    assert!(scenario.velocity_km_s > impactrisk::physics_engine::EARTH_ESCAPE_VELOCITY);

    let json = serde_json::to_value(&scenario).unwrap();
    assert_eq!(json["mode"], "trajectory");
    assert!(json["effects"]["air_blast"]["1_psi_km"].as_f64().unwrap() > 0.0);
}

#[test]
fn batch_of_three_with_one_malformed() {
    let start = Utc.with_ymd_and_hms(2030, 3, 1, 0, 0, 0).unwrap();
    let records: Vec<CatalogRecord> = serde_json::from_str(
        r#"[
            {"id": "a", "semi_major_axis": 1.3, "eccentricity": 0.2},
            {"id": "b", "semi_major_axis": 1.1, "eccentricity": 1.2},
            {"id": "c"}
        ]"#,
    )
    .unwrap();

    let config = EngineConfig {
        accuracy: AccuracyTier::Coarse,
        ..EngineConfig::default()
    };
    let entries = ImpactService::new(config)
        .unwrap()
        .predict_batch(&records, &start)
        .data
        .unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries.iter().filter(|e| !e.success).count(), 1);
    assert_eq!(entries[1].asteroid_id, "b");
    assert!(entries[1].error.is_some());
}

#[test]
fn synthetic_mode_repeats_per_request() {
    let start = Utc.with_ymd_and_hms(2030, 3, 1, 0, 0, 0).unwrap();
    let epoch = julian_date(&start) + 8.0;
    let earth_longitude = normalize_degrees(
        EARTH_MEAN_LONGITUDE_J2000 + EARTH_MEAN_MOTION_DEG_PER_DAY * (epoch - J2000_JD),
    );
    let record = CatalogRecord::new(
        "synthetic",
        OrbitalElements {
            semi_major_axis: 1.5,
            eccentricity: 1.0 / 3.0,
            inclination: 0.0,
            ascending_node: 0.0,
            argument_perihelion: earth_longitude,
            mean_anomaly: 0.0,
            epoch,
        },
    );

    let config = EngineConfig::from_json_str(r#"{"scenario_mode": "synthetic"}"#).unwrap();
    let service = ImpactService::new(config).unwrap();
    let first = service.predict_impact(&record, &start).data.unwrap().impact.unwrap();
    let second = service.predict_impact(&record, &start).data.unwrap().impact.unwrap();

    assert_eq!(first.latitude, second.latitude);
    assert_eq!(first.longitude, second.longitude);
    assert!((-60.0..60.0).contains(&first.latitude));
    assert!((11.0..30.0).contains(&first.velocity_km_s));
}
