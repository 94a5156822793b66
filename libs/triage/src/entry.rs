//! Queue entries and the values returned by queue operations

use crate::vitals::{VitalAlert, VitalSigns};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Clinical urgency band, least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Most urgent first.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    /// Base priority score of the band.
    pub fn score(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// Admission request. `severity` is what the triage nurse declared; the
/// queue may escalate it from the vitals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub patient_id: String,
    pub patient_name: String,
    #[serde(default)]
    pub condition: String,
    pub vitals: VitalSigns,
    pub severity: Severity,
}

/// A patient waiting in the queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageEntry {
    pub patient_id: String,
    pub patient_name: String,
    pub condition: String,
    pub vitals: VitalSigns,
    pub severity: Severity,
    pub priority: u8,
    pub enqueue_time: DateTime<Utc>,
    /// Admission sequence number; breaks ties between equal enqueue times.
    #[serde(skip)]
    pub(crate) seq: u64,
}

impl TriageEntry {
    /// Whether `self` is seen before `other`.
    pub(crate) fn outranks(&self, other: &TriageEntry) -> bool {
        match self.priority.cmp(&other.priority) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => (self.enqueue_time, self.seq) < (other.enqueue_time, other.seq),
        }
    }

    /// Seconds since admission at `now`, never negative.
    pub fn wait_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.enqueue_time).num_seconds().max(0)
    }
}

/// An entry together with its observed wait, derived at read time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingPatient {
    #[serde(flatten)]
    pub entry: TriageEntry,
    pub wait_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admitted {
    pub entry: TriageEntry,
    /// An earlier entry for the same patient was dropped.
    pub replaced: bool,
    /// Vitals raised the declared severity.
    pub escalated: bool,
    pub alerts: Vec<VitalAlert>,
    pub queue_depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsCheck {
    pub entry: TriageEntry,
    pub previous_severity: Severity,
    pub escalated: bool,
    pub alerts: Vec<VitalAlert>,
}
