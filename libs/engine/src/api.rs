//! Request and response structures exchanged with callers

use serde::{Deserialize, Serialize};
use wardline_lookup::{CatalogKind, PatientRecord, ReferenceEntry};
use wardline_triage::{
    Admission, Admitted, Severity, TriageStats, VitalSigns, VitalsCheck, WaitingPatient,
};

pub use wardline_lookup::InteractionReport;
pub use wardline_scheduler::{Schedule, ScheduleRequest as OptimizeScheduleRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPatientRequest {
    /// Target queue; the configured default department when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(flatten)]
    pub admission: Admission,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPatientResponse {
    pub department: String,
    #[serde(flatten)]
    pub admitted: Admitted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextPatientResponse {
    pub department: String,
    /// `None` when nobody is waiting.
    pub patient: Option<WaitingPatient>,
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueView {
    pub department: String,
    pub patients: Vec<WaitingPatient>,
    pub stats: TriageStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckVitalsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub patient_id: String,
    pub vitals: VitalSigns,
    /// Clinician's reassessment; the current severity when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_severity: Option<Severity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckVitalsResponse {
    pub department: String,
    #[serde(flatten)]
    pub check: VitalsCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearQueueResponse {
    pub department: String,
    pub cleared: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindReferenceResponse {
    pub kind: CatalogKind,
    pub key: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<ReferenceEntry>,
    pub cache_hit: bool,
    pub comparisons: u32,
}

/// Exactly one of `patient_id`, `email` or `phone`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPatientRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPatientResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientRecord>,
    pub cache_hit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionCheckRequest {
    pub drugs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadCatalogResponse {
    pub kind: CatalogKind,
    pub version: u64,
    pub entries: usize,
}
