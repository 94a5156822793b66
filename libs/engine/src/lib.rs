//! Wardline engine
//!
//! One [`Engine`] instance owns per-department triage queues, the cached
//! clinical [`Directory`](wardline_lookup::Directory) and the OR scheduler.
//! Callers (an HTTP layer, the CLI) talk to it with the plain request and
//! response structs in [`api`]; nothing here knows about transport or storage
//! beyond the [`DataSource`](wardline_lookup::DataSource) trait.

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use metrics::EngineMetrics;

pub use wardline_lookup as lookup;
pub use wardline_metrics as telemetry;
pub use wardline_scheduler as scheduler;
pub use wardline_triage as triage;
