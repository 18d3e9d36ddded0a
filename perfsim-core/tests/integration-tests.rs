use std::path::{Path, PathBuf};

use perfsim_core::performance::TOP_SPEED_BELOW_TARGET;
use perfsim_core::traits::*;
use perfsim_core::*;

const MIDSIZE_EV: &str = include_str!("assets/midsize_ev.yaml");

fn asset_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("assets")
        .join(name)
}

fn report_for(veh: Vehicle) -> PerformanceReport {
    let model = PhysicsModel::new(veh, SimParams::default());
    let catalog = CycleCatalog::from_resources().unwrap();
    simulate_performance(&model, &catalog, &PerfParams::default()).unwrap()
}

#[test]
fn test_yaml_vehicle_matches_mock_vehicle() {
    let veh = Vehicle::from_yaml(MIDSIZE_EV).unwrap();
    assert_eq!(veh, Vehicle::mock_vehicle());
}

#[test]
fn test_midsize_ev_report() {
    let report = report_for(Vehicle::from_file(asset_path("midsize_ev.yaml")).unwrap());

    assert_eq!(report.top_speed, "225 kph");
    assert_ne!(report.time_to_100kph, TOP_SPEED_BELOW_TARGET);
    assert_eq!(report.peak_accel, "0.43g");
    assert_eq!(report.efficiency.len(), 121);
    assert!(report.cruise_120kph_eff.is_some());
    assert!(report.city_eff.ends_with(" L/100km equivalent"), "{}", report.city_eff);
    assert!(
        report.highway_eff.ends_with(" L/100km equivalent"),
        "{}",
        report.highway_eff
    );
    assert!(!report.speed.is_empty());
    assert_eq!(report.speed.len(), report.power.len());
    assert_eq!(report.speed.len(), report.acceleration.len());

    let secs = |s: &str| s.trim_end_matches('s').parse::<f64>().unwrap();
    let accel_100 = secs(&report.time_to_100kph);
    let quarter_mile = secs(&report.quarter_mile_time);
    let to_top = secs(&report.time_to_top_speed);
    assert!(accel_100 > 3.0 && accel_100 < 15.0, "{accel_100}");
    assert!(quarter_mile > accel_100);
    assert!(to_top > quarter_mile);

    // steady-speed consumption rises with speed once drag dominates
    assert!(report.efficiency[120] > report.efficiency[40]);
}

#[test]
fn test_underpowered_vehicle_report() {
    let report = report_for(Vehicle::from_file(asset_path("neighborhood_ev.yaml")).unwrap());

    assert_eq!(report.time_to_100kph, TOP_SPEED_BELOW_TARGET);
    assert!(report.cruise_120kph_eff.is_none());
    let top_kph: f64 = report.top_speed.trim_end_matches(" kph").parse().unwrap();
    assert!(top_kph > 55.0 && top_kph < 80.0, "{top_kph}");
    assert!(!report.efficiency.is_empty() && report.efficiency.len() < 51);
    assert!(
        report.city_eff.contains("cannot follow city cycle"),
        "{}",
        report.city_eff
    );
    assert!(report.top_speed_eff.ends_with(" L/100km equivalent"));

    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(value["Cruise120"], "");
    assert_eq!(value["Accel100"], TOP_SPEED_BELOW_TARGET);
}

#[test]
fn test_reports_are_deterministic() {
    let veh = Vehicle::mock_vehicle();
    assert_eq!(report_for(veh.clone()), report_for(veh));
}

#[test]
fn test_catalog_from_files_matches_bundled_cycles() {
    let resources = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("resources")
        .join("cycles");
    let from_files =
        CycleCatalog::from_files(resources.join("city.csv"), resources.join("highway.csv"))
            .unwrap();
    assert_eq!(from_files, CycleCatalog::from_resources().unwrap());
}

#[test]
fn test_invalid_vehicle_is_rejected() {
    let bad = MIDSIZE_EV.replace("trans_eff: 0.97", "trans_eff: 1.5");
    let err = Vehicle::from_yaml(bad).unwrap_err();
    assert!(err.to_string().contains("invalid vehicle"), "{err}");
}
