//! Thread-safe triage queue for one department

use crate::clock::{Clock, SystemClock};
use crate::entry::{Admission, Admitted, Severity, TriageEntry, VitalsCheck, WaitingPatient};
use crate::error::{Error, Result};
use crate::heap::IndexedHeap;
use crate::metrics::{TriageMetrics, TriageRecorder};
use crate::vitals::{
    assess_vitals, derive_severity, validate_vitals, CriticalThresholds, VitalSigns,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct QueueState {
    heap: IndexedHeap,
    next_seq: u64,
}

/// Point-in-time summary of a queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageStats {
    pub department: String,
    pub depth: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub longest_wait_seconds: i64,
    pub average_wait_seconds: f64,
}

impl TriageStats {
    /// Stats of a department nobody has been admitted to.
    pub fn empty(department: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            depth: 0,
            by_severity: Severity::ALL.iter().map(|s| (*s, 0)).collect(),
            longest_wait_seconds: 0,
            average_wait_seconds: 0.0,
        }
    }
}

/// Priority queue of waiting patients.
///
/// All operations take one lock: writes (`add`, `pop_next`, `check_vitals`,
/// `remove`, `clear`) exclusively, reads (`peek_next`, `view_all`, `get`,
/// `stats`) shared. Validation and severity derivation happen before the
/// lock is taken, so rejected input never touches the heap.
pub struct TriageQueue {
    department: String,
    state: RwLock<QueueState>,
    clock: Arc<dyn Clock>,
    thresholds: CriticalThresholds,
    metrics: TriageRecorder,
}

impl TriageQueue {
    pub fn new(department: impl Into<String>) -> Self {
        Self {
            department: department.into(),
            state: RwLock::new(QueueState::default()),
            clock: Arc::new(SystemClock),
            thresholds: CriticalThresholds::default(),
            metrics: TriageRecorder::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_thresholds(mut self, thresholds: CriticalThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn department(&self) -> &str {
        &self.department
    }

    pub fn thresholds(&self) -> &CriticalThresholds {
        &self.thresholds
    }

    fn read(&self) -> RwLockReadGuard<'_, QueueState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, QueueState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a patient. An existing entry for the same id is replaced and
    /// the patient re-enters with a fresh enqueue time.
    pub fn add(&self, admission: Admission) -> Result<Admitted> {
        let patient_id = admission.patient_id.trim().to_string();
        if patient_id.is_empty() {
            return Err(Error::EmptyPatientId);
        }
        validate_vitals(&admission.vitals)?;

        let alerts = assess_vitals(&admission.vitals, &self.thresholds);
        let severity = derive_severity(&admission.vitals, admission.severity, &self.thresholds);
        let escalated = severity > admission.severity;

        let (entry, replaced, depth) = {
            let mut state = self.write();
            let replaced = state.heap.remove(&patient_id).is_some();

            let seq = state.next_seq;
            state.next_seq += 1;
            let entry = TriageEntry {
                patient_id,
                patient_name: admission.patient_name,
                condition: admission.condition,
                vitals: admission.vitals,
                severity,
                priority: severity.score(),
                enqueue_time: self.clock.now(),
                seq,
            };
            state.heap.push(entry.clone());
            (entry, replaced, state.heap.len())
        };

        self.metrics.admissions.incr();
        if replaced {
            self.metrics.replacements.incr();
        }
        if escalated {
            self.metrics.escalations.incr();
            tracing::info!(
                department = %self.department,
                patient_id = %entry.patient_id,
                declared = %admission.severity,
                alerts = alerts.len(),
                "Admission escalated to critical"
            );
        }
        self.metrics.depth.set(depth as i64);

        tracing::debug!(
            department = %self.department,
            patient_id = %entry.patient_id,
            severity = %entry.severity,
            replaced,
            depth,
            "Patient admitted"
        );

        Ok(Admitted {
            entry,
            replaced,
            escalated,
            alerts,
            queue_depth: depth,
        })
    }

    /// The next patient to be seen, without removing them.
    pub fn peek_next(&self) -> Option<WaitingPatient> {
        let now = self.clock.now();
        self.read().heap.peek().map(|e| waiting(e.clone(), now))
    }

    /// Remove and return the most urgent patient.
    pub fn pop_next(&self) -> Option<WaitingPatient> {
        let (entry, depth) = {
            let mut state = self.write();
            let entry = state.heap.pop()?;
            (entry, state.heap.len())
        };

        let next = waiting(entry, self.clock.now());
        self.metrics.dequeues.incr();
        self.metrics.depth.set(depth as i64);
        if let Ok(wait) = u64::try_from(next.wait_seconds) {
            self.metrics
                .dequeue_wait
                .record(std::time::Duration::from_secs(wait));
        }

        tracing::debug!(
            department = %self.department,
            patient_id = %next.entry.patient_id,
            severity = %next.entry.severity,
            wait_seconds = next.wait_seconds,
            depth,
            "Patient dequeued"
        );

        Some(next)
    }

    /// Every waiting patient in the order they would be called.
    pub fn view_all(&self) -> Vec<WaitingPatient> {
        let now = self.clock.now();
        let sorted = self.read().heap.sorted();
        sorted.into_iter().map(|e| waiting(e, now)).collect()
    }

    /// Record new vitals for a waiting patient and re-rank them.
    ///
    /// `declared` defaults to the patient's current severity. The patient
    /// keeps their place in arrival order within the new band.
    pub fn check_vitals(
        &self,
        patient_id: &str,
        vitals: VitalSigns,
        declared: Option<Severity>,
    ) -> Result<VitalsCheck> {
        let patient_id = patient_id.trim();
        if patient_id.is_empty() {
            return Err(Error::EmptyPatientId);
        }
        validate_vitals(&vitals)?;
        let alerts = assess_vitals(&vitals, &self.thresholds);

        let (entry, previous_severity) = {
            let mut state = self.write();
            let previous_severity = match state.heap.get(patient_id) {
                Some(current) => current.severity,
                None => {
                    return Err(Error::NotFound {
                        department: self.department.clone(),
                        patient_id: patient_id.to_string(),
                    })
                }
            };

            let severity = derive_severity(
                &vitals,
                declared.unwrap_or(previous_severity),
                &self.thresholds,
            );
            let entry = state.heap.update(patient_id, |entry| {
                entry.vitals = vitals;
                entry.severity = severity;
                entry.priority = severity.score();
            });
            match entry {
                Some(entry) => (entry.clone(), previous_severity),
                None => {
                    return Err(Error::NotFound {
                        department: self.department.clone(),
                        patient_id: patient_id.to_string(),
                    })
                }
            }
        };

        let escalated = entry.severity > previous_severity;
        self.metrics.vitals_checks.incr();
        if escalated {
            self.metrics.escalations.incr();
            tracing::info!(
                department = %self.department,
                patient_id = %entry.patient_id,
                from = %previous_severity,
                to = %entry.severity,
                "Vitals check escalated severity"
            );
        } else {
            tracing::debug!(
                department = %self.department,
                patient_id = %entry.patient_id,
                severity = %entry.severity,
                "Vitals checked"
            );
        }

        Ok(VitalsCheck {
            entry,
            previous_severity,
            escalated,
            alerts,
        })
    }

    /// Take a patient out of the queue without seeing them (left, transferred).
    pub fn remove(&self, patient_id: &str) -> Option<TriageEntry> {
        let (removed, depth) = {
            let mut state = self.write();
            let removed = state.heap.remove(patient_id.trim())?;
            (removed, state.heap.len())
        };

        self.metrics.removals.incr();
        self.metrics.depth.set(depth as i64);
        tracing::debug!(
            department = %self.department,
            patient_id = %removed.patient_id,
            "Patient removed"
        );
        Some(removed)
    }

    pub fn get(&self, patient_id: &str) -> Option<WaitingPatient> {
        let now = self.clock.now();
        self.read()
            .heap
            .get(patient_id.trim())
            .map(|e| waiting(e.clone(), now))
    }

    /// Drop every waiting patient, returning how many were dropped.
    pub fn clear(&self) -> usize {
        let dropped = self.write().heap.clear();

        self.metrics.clears.incr();
        self.metrics.depth.set(0);
        tracing::info!(department = %self.department, dropped, "Triage queue cleared");
        dropped
    }

    pub fn len(&self) -> usize {
        self.read().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> TriageStats {
        let now = self.clock.now();
        let state = self.read();

        let mut stats = TriageStats::empty(self.department.clone());
        let mut total_wait = 0i64;
        let mut longest_wait = 0i64;
        for entry in state.heap.iter() {
            *stats.by_severity.entry(entry.severity).or_default() += 1;
            let wait = entry.wait_seconds(now);
            total_wait += wait;
            longest_wait = longest_wait.max(wait);
        }

        stats.depth = state.heap.len();
        stats.longest_wait_seconds = longest_wait;
        if stats.depth > 0 {
            stats.average_wait_seconds = total_wait as f64 / stats.depth as f64;
        }
        stats
    }

    pub fn metrics(&self) -> TriageMetrics {
        self.metrics.snapshot(&self.department)
    }
}

impl std::fmt::Debug for TriageQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriageQueue")
            .field("department", &self.department)
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}

fn waiting(entry: TriageEntry, now: DateTime<Utc>) -> WaitingPatient {
    let wait_seconds = entry.wait_seconds(now);
    WaitingPatient {
        entry,
        wait_seconds,
    }
}
