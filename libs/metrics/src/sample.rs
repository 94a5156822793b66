//! Flat metric samples for exposition (Prometheus text format, JSON dumps)

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Counter,
    Gauge,
}

/// One named value with optional labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub name: String,
    pub help: &'static str,
    pub kind: SampleKind,
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl Sample {
    pub fn counter(name: impl Into<String>, help: &'static str, value: u64) -> Self {
        Self {
            name: name.into(),
            help,
            kind: SampleKind::Counter,
            labels: Vec::new(),
            value: value as f64,
        }
    }

    pub fn gauge(name: impl Into<String>, help: &'static str, value: f64) -> Self {
        Self {
            name: name.into(),
            help,
            kind: SampleKind::Gauge,
            labels: Vec::new(),
            value,
        }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self
    }
}

/// Implemented by metric snapshots that can be flattened into samples.
pub trait ExportMetrics {
    fn samples(&self) -> Vec<Sample>;
}
