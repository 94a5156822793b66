//! Triage scenario replay
//!
//! A scenario is a list of queue events applied in order to one engine. An
//! event may carry an `at` timestamp, which moves the replay clock before the
//! event runs, so recorded shifts replay with their real waits.
//!
//! ```json
//! {
//!   "department": "emergency",
//!   "start": "2025-03-01T20:00:00Z",
//!   "events": [
//!     {"action": "admit", "patientId": "A", "patientName": "Ann", "severity": "low",
//!      "vitals": {"systolic": 120, "diastolic": 80, "heartRate": 70,
//!                 "temperature": 98.6, "spo2": 98}},
//!     {"action": "next", "at": "2025-03-01T20:15:00Z"}
//!   ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use wardline_engine::api::{AddPatientRequest, CheckVitalsRequest};
use wardline_engine::lookup::DataSource;
use wardline_engine::triage::ManualClock;
use wardline_engine::Engine;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    pub events: Vec<ScenarioEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioEvent {
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub action: ScenarioAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ScenarioAction {
    Admit(AddPatientRequest),
    Vitals(CheckVitalsRequest),
    Next,
    Peek,
    View,
    Clear,
}

impl ScenarioAction {
    fn name(&self) -> &'static str {
        match self {
            ScenarioAction::Admit(_) => "admit",
            ScenarioAction::Vitals(_) => "vitals",
            ScenarioAction::Next => "next",
            ScenarioAction::Peek => "peek",
            ScenarioAction::View => "view",
            ScenarioAction::Clear => "clear",
        }
    }
}

/// Outcome of one event. Failed events record the error and replay continues.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOutcome {
    pub index: usize,
    pub action: &'static str,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Replay `scenario` against `engine`, whose queues must use `clock`.
pub fn replay<S: DataSource>(
    engine: &Engine<S>,
    clock: &Arc<ManualClock>,
    scenario: Scenario,
) -> Vec<EventOutcome> {
    use wardline_engine::triage::Clock;

    if let Some(start) = scenario.start {
        clock.set(start);
    }
    let department = scenario.department;

    let mut outcomes = Vec::with_capacity(scenario.events.len());
    for (index, event) in scenario.events.into_iter().enumerate() {
        if let Some(at) = event.at {
            clock.set(at);
        }
        let action = event.action.name();
        let dept = department.as_deref();

        let result: Result<Value, String> = match event.action {
            ScenarioAction::Admit(mut request) => {
                request.department = request.department.or_else(|| department.clone());
                to_value(engine.add_patient(request))
            }
            ScenarioAction::Vitals(mut request) => {
                request.department = request.department.or_else(|| department.clone());
                to_value(engine.check_vitals(request))
            }
            ScenarioAction::Next => to_value(Ok(engine.next_patient(dept))),
            ScenarioAction::Peek => to_value(Ok(engine.peek_patient(dept))),
            ScenarioAction::View => to_value(Ok(engine.view_queue(dept))),
            ScenarioAction::Clear => to_value(Ok(engine.clear_queue(dept))),
        };

        if let Err(error) = &result {
            tracing::warn!(index, action, error = %error, "Scenario event failed");
        }
        let (result, error) = match result {
            Ok(value) => (Some(value), None),
            Err(error) => (None, Some(error)),
        };
        outcomes.push(EventOutcome {
            index,
            action,
            at: clock.now(),
            result,
            error,
        });
    }

    outcomes
}

fn to_value<T: Serialize>(result: wardline_engine::Result<T>) -> Result<Value, String> {
    let value = result.map_err(|e| e.to_string())?;
    serde_json::to_value(value).map_err(|e| e.to_string())
}
