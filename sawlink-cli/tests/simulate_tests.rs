use std::fs;
use tempfile::tempdir;

use sawlink_cli::commands::simulate::{self, Overrides};
use sawlink_core::sim::SimulationReport;

fn write_file<P: AsRef<std::path::Path>>(p: P, s: &str) {
    fs::write(p, s.as_bytes()).unwrap();
}

#[test]
fn simulate_defaults_complete() {
    let report = simulate::execute(None, &Overrides::default(), None, false).unwrap();

    assert!(report.completed);
    assert_eq!(report.messages_delivered, 10);
    assert_eq!(report.nodes.len(), 2);
}

#[test]
fn simulate_config_file_with_overrides() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("scenario.json");

    write_file(
        &cfg_path,
        r#"{
          "relays": 2,
          "messages": 4,
          "message_size": 16,
          "link": { "bandwidth_bps": 64000, "propagation_delay_us": 1000 },
          "loss": 0.1,
          "seed": 3
        }"#,
    );

    let overrides = Overrides {
        messages: Some(6),
        ..Default::default()
    };
    let config = simulate::load_config(Some(cfg_path.to_str().unwrap()), &overrides).unwrap();

    assert_eq!(config.relays, 2);
    assert_eq!(config.messages, 6);
    assert_eq!(config.link.bandwidth_bps, 64_000);
    assert_eq!(config.corruption, 0.0);

    let report = simulate::execute(Some(cfg_path.to_str().unwrap()), &overrides, None, false).unwrap();
    assert!(report.completed);
    assert_eq!(report.nodes.len(), 4);
}

#[test]
fn simulate_writes_json_report() {
    let td = tempdir().unwrap();
    let out_path = td.path().join("report.json");

    let overrides = Overrides {
        relays: Some(1),
        messages: Some(5),
        loss: Some(0.2),
        corruption: Some(0.1),
        seed: Some(99),
        ..Default::default()
    };

    let report = simulate::execute(None, &overrides, Some(out_path.to_str().unwrap()), true).unwrap();

    let written: SimulationReport =
        serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written, report);
    assert!(written.completed);
    assert!(written.delivered_in_order);
}

#[test]
fn simulate_rejects_bad_probability() {
    let overrides = Overrides {
        loss: Some(1.5),
        ..Default::default()
    };
    assert!(simulate::execute(None, &overrides, None, false).is_err());
}

#[test]
fn simulate_missing_config_file_errors() {
    let td = tempdir().unwrap();
    let missing = td.path().join("nope.json");
    let result = simulate::load_config(Some(missing.to_str().unwrap()), &Overrides::default());
    assert!(result.is_err());
}

#[test]
fn simulate_same_seed_same_report() {
    let overrides = Overrides {
        relays: Some(1),
        messages: Some(8),
        loss: Some(0.25),
        seed: Some(11),
        ..Default::default()
    };

    let a = simulate::execute(None, &overrides, None, false).unwrap();
    let b = simulate::execute(None, &overrides, None, false).unwrap();
    assert_eq!(a, b);
}
