//! Command execution

use crate::cli::{Cli, Command, PatientArgs, ScheduleArgs};
use crate::config::AppConfig;
use crate::exposition;
use crate::scenario::{replay, Scenario};
use crate::store::JsonFileStore;
use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use wardline_engine::api::{FindPatientRequest, InteractionCheckRequest, OptimizeScheduleRequest};
use wardline_engine::scheduler::{Horizon, SurgeryRequest};
use wardline_engine::telemetry::ExportMetrics;
use wardline_engine::triage::ManualClock;
use wardline_engine::Engine;

/// Run one command and return what should be printed to stdout.
pub fn run(cli: &Cli, config: &AppConfig) -> anyhow::Result<String> {
    let data_dir = cli.data_dir.as_deref().unwrap_or(config.data_dir.as_path());
    let store = JsonFileStore::open(data_dir)?;

    // Replays need a clock they control; other commands run on wall time.
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let mut engine = Engine::new(config.engine.clone(), store)?;
    if matches!(cli.command, Command::Triage { .. }) {
        engine = engine.with_clock(clock.clone());
    }
    engine
        .load_catalogs()
        .with_context(|| format!("Failed to load catalogs from {}", data_dir.display()))?;

    let mut output = match &cli.command {
        Command::Find { kind, key } => to_json(&engine.find_reference(*kind, key)?)?,
        Command::Patient(args) => to_json(&engine.find_patient(&patient_request(args))?)?,
        Command::Interactions { drugs } => {
            let request = InteractionCheckRequest {
                drugs: drugs.clone(),
            };
            to_json(&engine.check_interactions(&request)?)?
        }
        Command::Triage { scenario } => {
            let scenario: Scenario = read_json(scenario)?;
            to_json(&replay(&engine, &clock, scenario))?
        }
        Command::Schedule(args) => to_json(&engine.optimize_schedule(&schedule_request(args)?)?)?,
    };

    if cli.metrics {
        output.push_str(&exposition::render(&engine.metrics().samples())?);
    }
    Ok(output)
}

fn patient_request(args: &PatientArgs) -> FindPatientRequest {
    FindPatientRequest {
        patient_id: args.id.clone(),
        email: args.email.clone(),
        phone: args.phone.clone(),
    }
}

fn schedule_request(args: &ScheduleArgs) -> anyhow::Result<OptimizeScheduleRequest> {
    let surgeries: Vec<SurgeryRequest> = read_json(&args.surgeries)?;
    let mut request = OptimizeScheduleRequest::new(surgeries, args.weighting);
    if let (Some(start), Some(end)) = (args.horizon_start, args.horizon_end) {
        request = request.with_horizon(Horizon::new(start, end));
    }
    Ok(request)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}
