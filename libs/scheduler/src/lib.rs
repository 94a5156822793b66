//! Operating-room scheduling
//!
//! Selects the subset of requested surgeries that fits one room without
//! overlap and maximizes total weight, using the classic weighted interval
//! scheduling recurrence in O(n log n).

#![forbid(unsafe_code)]

pub mod error;
pub mod metrics;
pub mod request;
pub mod scheduler;

pub use error::{Error, Result};
pub use metrics::SchedulerMetrics;
pub use request::{Horizon, Schedule, ScheduleRequest, SurgeryRequest, WeightingMode};
pub use scheduler::{optimize, Scheduler};
