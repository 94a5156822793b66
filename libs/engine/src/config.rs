//! Engine configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use wardline_lookup::{DirectoryOptions, DuplicatePolicy};
use wardline_triage::CriticalThresholds;

/// Settings for one engine instance. Every field has a default, so an empty
/// configuration source is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Entries held by the shared lookup cache.
    pub cache_capacity: usize,
    pub duplicate_policy: DuplicatePolicy,
    /// Queue used when a triage request names no department.
    pub default_department: String,
    pub critical_thresholds: CriticalThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
            duplicate_policy: DuplicatePolicy::Reject,
            default_department: "emergency".to_string(),
            critical_thresholds: CriticalThresholds::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(Error::Config("cache_capacity must be at least 1".into()));
        }
        if self.default_department.trim().is_empty() {
            return Err(Error::Config("default_department must not be empty".into()));
        }

        let t = &self.critical_thresholds;
        let pairs = [
            ("systolic", t.systolic_low, t.systolic_high),
            ("heart_rate", t.heart_rate_low, t.heart_rate_high),
        ];
        for (name, low, high) in pairs {
            if !(low.is_finite() && high.is_finite() && low < high) {
                return Err(Error::Config(format!(
                    "critical_thresholds: {name} low ({low}) must be below high ({high})"
                )));
            }
        }
        if !t.spo2_low.is_finite() || !t.temperature_high.is_finite() {
            return Err(Error::Config(
                "critical_thresholds must be finite numbers".into(),
            ));
        }

        Ok(())
    }

    pub fn directory_options(&self) -> DirectoryOptions {
        DirectoryOptions {
            cache_capacity: self.cache_capacity,
            duplicate_policy: self.duplicate_policy,
        }
    }
}
