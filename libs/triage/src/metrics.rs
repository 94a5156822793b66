//! Triage queue recorder

use serde::Serialize;
use wardline_metrics::{Counter, DurationSnapshot, DurationStat, ExportMetrics, Gauge, Sample};

#[derive(Debug, Default)]
pub(crate) struct TriageRecorder {
    pub(crate) admissions: Counter,
    pub(crate) replacements: Counter,
    pub(crate) escalations: Counter,
    pub(crate) vitals_checks: Counter,
    pub(crate) dequeues: Counter,
    pub(crate) removals: Counter,
    pub(crate) clears: Counter,
    pub(crate) depth: Gauge,
    pub(crate) dequeue_wait: DurationStat,
}

impl TriageRecorder {
    pub(crate) fn snapshot(&self, department: &str) -> TriageMetrics {
        TriageMetrics {
            department: department.to_string(),
            depth: self.depth.get().max(0) as u64,
            admissions: self.admissions.get(),
            replacements: self.replacements.get(),
            escalations: self.escalations.get(),
            vitals_checks: self.vitals_checks.get(),
            dequeues: self.dequeues.get(),
            removals: self.removals.get(),
            clears: self.clears.get(),
            dequeue_wait: self.dequeue_wait.snapshot(),
        }
    }
}

/// Read-only view of one queue's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageMetrics {
    pub department: String,
    pub depth: u64,
    pub admissions: u64,
    pub replacements: u64,
    /// Admissions and vitals checks that raised severity.
    pub escalations: u64,
    pub vitals_checks: u64,
    pub dequeues: u64,
    pub removals: u64,
    pub clears: u64,
    /// Observed wait of dequeued patients.
    pub dequeue_wait: DurationSnapshot,
}

impl ExportMetrics for TriageMetrics {
    fn samples(&self) -> Vec<Sample> {
        vec![
            Sample::gauge(
                "wardline_triage_queue_depth",
                "Patients waiting in the triage queue",
                self.depth as f64,
            ),
            Sample::counter(
                "wardline_triage_admissions_total",
                "Triage admissions",
                self.admissions,
            ),
            Sample::counter(
                "wardline_triage_replacements_total",
                "Admissions that replaced an existing entry",
                self.replacements,
            ),
            Sample::counter(
                "wardline_triage_escalations_total",
                "Severity escalations from critical vitals",
                self.escalations,
            ),
            Sample::counter(
                "wardline_triage_vitals_checks_total",
                "Vitals re-checks",
                self.vitals_checks,
            ),
            Sample::counter(
                "wardline_triage_dequeues_total",
                "Patients called from the queue",
                self.dequeues,
            ),
            Sample::counter(
                "wardline_triage_clears_total",
                "Administrative queue resets",
                self.clears,
            ),
            Sample::gauge(
                "wardline_triage_mean_wait_seconds",
                "Mean wait of dequeued patients",
                self.dequeue_wait.mean_micros / 1_000_000.0,
            ),
        ]
        .into_iter()
        .map(|s| s.with_label("department", self.department.as_str()))
        .collect()
    }
}
