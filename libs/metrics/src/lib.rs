//! Metrics primitives for the wardline components
//!
//! Each component owns a recorder built from these primitives and exposes
//! only an immutable snapshot of it. Recording is a handful of relaxed atomic
//! operations: it never allocates, never blocks and never fails, so it can sit
//! on the hot path of a triage or lookup call.

#![forbid(unsafe_code)]

mod recorder;
mod sample;

pub use recorder::{Counter, DurationSnapshot, DurationStat, Gauge, Timing};
pub use sample::{ExportMetrics, Sample, SampleKind};
