//! Command runs against a temporary data directory

use clap::Parser;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wardline_cli::config::AppConfig;
use wardline_cli::{commands, Cli};

fn data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "codes.json",
        json!([
            {"key": "J45", "description": "Asthma", "category": "ICD-10"},
            {"key": "I10", "description": "Essential hypertension", "category": "ICD-10"}
        ]),
    );
    write(
        dir.path(),
        "drugs.json",
        json!([
            {"key": "warfarin", "description": "Anticoagulant",
             "interactions": [{"with": "ibuprofen", "severity": "major", "note": "GI bleeding"}]},
            {"key": "ibuprofen", "description": "NSAID"},
            {"key": "metformin", "description": "Biguanide"}
        ]),
    );
    write(
        dir.path(),
        "patients.json",
        json!([
            {"patientId": "p-2", "firstName": "Grace", "lastName": "Hopper", "phone": "555-0100"},
            {"patientId": "p-1", "firstName": "Ada", "lastName": "Byron",
             "email": "ada@example.org", "phone": "(555) 0100"}
        ]),
    );
    dir
}

fn write(dir: &Path, name: &str, value: Value) {
    fs::write(dir.join(name), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

fn run(dir: &Path, args: &[&str]) -> anyhow::Result<String> {
    let mut argv = vec!["wardline", "--data-dir", dir.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    commands::run(&cli, &AppConfig::default())
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    serde_json::from_str(&run(dir, args).unwrap()).unwrap()
}

#[test]
fn test_find_code_and_drug() {
    let dir = data_dir();

    let found = run_json(dir.path(), &["find", "I10"]);
    assert_eq!(found["found"], true);
    assert_eq!(found["entry"]["description"], "Essential hypertension");
    assert_eq!(found["cacheHit"], false);

    let missing = run_json(dir.path(), &["find", "--kind", "drug", "aspirin"]);
    assert_eq!(missing["found"], false);
    assert!(missing.get("entry").is_none());
}

#[test]
fn test_patient_by_shared_phone_resolves_lowest_id() {
    let dir = data_dir();
    let found = run_json(dir.path(), &["patient", "--phone", "555 0100"]);
    assert_eq!(found["patient"]["patientId"], "p-1");

    let by_email = run_json(dir.path(), &["patient", "--email", " ADA@example.org"]);
    assert_eq!(by_email["patient"]["firstName"], "Ada");
}

#[test]
fn test_interactions_report_unknown_drugs() {
    let dir = data_dir();
    let report = run_json(
        dir.path(),
        &["interactions", "ibuprofen", "warfarin", "metformin", "unobtainium"],
    );
    let findings = report["findings"].as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0]["severity"], "major");
    assert_eq!(report["unknown"], json!(["unobtainium"]));
}

#[test]
fn test_triage_scenario_replays_in_priority_order() {
    let dir = data_dir();
    let vitals = json!({
        "systolic": 120, "diastolic": 80, "heartRate": 72, "temperature": 98.6, "spo2": 98
    });
    let scenario = json!({
        "department": "emergency",
        "start": "2025-03-01T20:00:00Z",
        "events": [
            {"action": "admit", "patientId": "B", "patientName": "Bea",
             "severity": "medium", "vitals": vitals},
            {"action": "admit", "at": "2025-03-01T20:01:00Z",
             "patientId": "C", "patientName": "Cal",
             "severity": "high", "vitals": vitals},
            {"action": "admit", "at": "2025-03-01T20:02:00Z",
             "patientId": "A", "patientName": "Ann",
             "severity": "low", "vitals": vitals},
            {"action": "vitals", "patientId": "missing", "vitals": vitals},
            {"action": "next", "at": "2025-03-01T20:10:00Z"},
            {"action": "next"},
            {"action": "next"},
            {"action": "next"}
        ]
    });
    write(dir.path(), "scenario.json", scenario);

    let outcomes = run_json(
        dir.path(),
        &["triage", dir.path().join("scenario.json").to_str().unwrap()],
    );
    let outcomes = outcomes.as_array().unwrap();
    assert_eq!(outcomes.len(), 8);

    assert!(outcomes[3]["error"].as_str().unwrap().contains("missing"));
    assert!(outcomes[3].get("result").is_none());

    let served: Vec<&str> = outcomes[4..7]
        .iter()
        .map(|o| o["result"]["patient"]["patientId"].as_str().unwrap())
        .collect();
    assert_eq!(served, vec!["C", "B", "A"]);
    assert_eq!(outcomes[4]["result"]["patient"]["waitSeconds"], 540);
    assert_eq!(outcomes[7]["result"]["patient"], Value::Null);
    assert_eq!(outcomes[7]["result"]["remaining"], 0);
}

#[test]
fn test_schedule_picks_best_revenue_and_appends_metrics() {
    let dir = data_dir();
    write(
        dir.path(),
        "surgeries.json",
        json!([
            {"id": "a", "start": "2025-03-03T08:00:00Z", "end": "2025-03-03T10:00:00Z",
             "revenue": "500"},
            {"id": "b", "start": "2025-03-03T09:00:00Z", "end": "2025-03-03T12:00:00Z",
             "revenue": "900"},
            {"id": "c", "start": "2025-03-03T10:00:00Z", "end": "2025-03-03T13:00:00Z",
             "revenue": "700"}
        ]),
    );

    let output = run(
        dir.path(),
        &[
            "--metrics",
            "schedule",
            dir.path().join("surgeries.json").to_str().unwrap(),
            "--weighting",
            "revenue",
        ],
    )
    .unwrap();

    let (json_part, metrics) = output.split_at(output.find("# HELP").unwrap());
    let schedule: Value = serde_json::from_str(json_part).unwrap();
    assert_eq!(schedule["totalRevenue"], "1200");
    let ids: Vec<&str> = schedule["selected"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
    assert!(metrics.contains("wardline_scheduler_runs_total 1"));
}

#[test]
fn test_missing_scenario_file_names_path() {
    let dir = data_dir();
    let err = run(dir.path(), &["triage", "/nonexistent/scenario.json"]).unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/scenario.json"));
}

#[test]
fn test_malformed_catalog_fails_load() {
    let dir = data_dir();
    fs::write(dir.path().join("codes.json"), "{not json").unwrap();
    let err = run(dir.path(), &["find", "I10"]).unwrap_err();
    assert!(format!("{err:#}").contains("codes.json"));
}
