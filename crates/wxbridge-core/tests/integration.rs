//! Integration tests for wxbridge-core.
//!
//! These tests exercise the full bridging pipeline:
//! decoder output → reading → translation (with conversions and delta
//! tracking) → outbound record, plus tracker persistence across a restart.

use std::process::Command;
use std::time::Duration;

use wxbridge_core::{translate, Decoder, Reading, TrackerRegistry, TranslationRule};

fn station() -> wxbridge_core::StationCredentials {
    wxbridge_core::StationCredentials {
        station_id: "KWATEST1".to_string(),
        station_key: "hunter2".to_string(),
    }
}

fn rules() -> Vec<TranslationRule> {
    vec![
        TranslationRule {
            rtl_field: "temperature_C".to_string(),
            field: "tempf".to_string(),
            conversion: Some("celsius_to_fahrenheit".to_string()),
        },
        TranslationRule {
            rtl_field: "rain_mm".to_string(),
            field: "rainin".to_string(),
            conversion: Some("millimeters_to_inches".to_string()),
        },
        TranslationRule {
            rtl_field: "rain_total_mm".to_string(),
            field: "hourlyrainin".to_string(),
            conversion: Some("delta_accumulation_hourly".to_string()),
        },
    ]
}

#[test]
fn decoder_lines_translate_to_upload_records() {
    let mut command = Command::new("sh");
    command.arg("-c").arg(
        r#"printf '{"temperature_C": 20, "rain_mm": 5}\n\n{"temperature_C": 21.5, "humidity": 60}\n'"#,
    );
    let mut decoder = Decoder::from_command(command).unwrap();

    let mut registry = TrackerRegistry::new();
    let mut records = Vec::new();
    for line in decoder.lines().unwrap() {
        let line = line.unwrap();
        if line.trim().is_empty() {
            continue;
        }
        let reading: Reading = serde_json::from_str(&line).unwrap();
        records.push(translate(&reading, &rules(), &station(), &mut registry));
    }
    let exit = decoder.shutdown(Duration::from_secs(2));
    assert!(exit.success());

    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.get("tempf").unwrap().as_f64().unwrap(), 68.0);
    let rainin = first.get("rainin").unwrap().as_f64().unwrap();
    assert!((rainin - 0.19685).abs() < 1e-4);

    // Second reading has no rain field, so no rain destination.
    let second = &records[1];
    assert!((second.get("tempf").unwrap().as_f64().unwrap() - 70.7).abs() < 1e-9);
    assert!(second.get("rainin").is_none());

    // Envelope and credentials ride along on every record.
    for record in &records {
        assert_eq!(record.get("dateutc").unwrap(), "now");
        assert_eq!(record.get("action").unwrap(), "updateraw");
        assert_eq!(record.get("ID").unwrap(), "KWATEST1");
        assert_eq!(record.get("PASSWORD").unwrap(), "hunter2");
    }
}

#[test]
fn delta_tracking_survives_a_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let state = tmp.path().join("trackers.json");

    // First run: one observation of the cumulative rain counter.
    let mut registry = TrackerRegistry::load(&state);
    assert!(registry.is_empty());
    let reading: Reading = serde_json::from_str(r#"{"rain_total_mm": 10}"#).unwrap();
    let record = translate(&reading, &rules(), &station(), &mut registry);
    assert_eq!(record.get("hourlyrainin").unwrap().as_f64().unwrap(), 0.0);
    registry.save(&state).unwrap();

    // Second run: the restored history makes the delta non-zero.
    let mut registry = TrackerRegistry::load(&state);
    assert_eq!(registry.len(), 1);
    let reading: Reading = serde_json::from_str(r#"{"rain_total_mm": 15}"#).unwrap();
    let record = translate(&reading, &rules(), &station(), &mut registry);
    let delta_in = record.get("hourlyrainin").unwrap().as_f64().unwrap();
    assert!((delta_in - 5.0 / 25.4).abs() < 1e-9);
}
