//! Emergency department triage
//!
//! Patients wait in a [`TriageQueue`], a binary max-heap keyed by severity
//! band, then earliest arrival, then admission order. An auxiliary
//! id-to-position map makes replacement, removal and vitals re-checks
//! O(log n) instead of a linear scan.
//!
//! Severity is never trusted blindly: every admission and every vitals
//! update passes through [`derive_severity`], which escalates to
//! [`Severity::Critical`] whenever a [`CriticalThresholds`] limit is breached.

#![forbid(unsafe_code)]

pub mod clock;
pub mod entry;
pub mod error;
mod heap;
pub mod metrics;
pub mod queue;
pub mod vitals;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{Admission, Admitted, Severity, TriageEntry, VitalsCheck, WaitingPatient};
pub use error::{Error, Result};
pub use metrics::TriageMetrics;
pub use queue::{TriageQueue, TriageStats};
pub use vitals::{
    assess_vitals, derive_severity, validate_vitals, Breach, CriticalThresholds, VitalAlert,
    VitalField, VitalSigns,
};
