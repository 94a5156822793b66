//! Engine-wide metrics snapshot

use serde::Serialize;
use wardline_lookup::{CacheStats, CatalogMetrics};
use wardline_metrics::{ExportMetrics, Sample};
use wardline_scheduler::SchedulerMetrics;
use wardline_triage::TriageMetrics;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineMetrics {
    pub catalogs: Vec<CatalogMetrics>,
    pub cache: CacheStats,
    pub triage: Vec<TriageMetrics>,
    pub scheduler: SchedulerMetrics,
}

impl ExportMetrics for EngineMetrics {
    fn samples(&self) -> Vec<Sample> {
        let mut samples = Vec::new();
        for catalog in &self.catalogs {
            samples.extend(catalog.samples());
        }
        samples.extend(self.cache.samples());
        for queue in &self.triage {
            samples.extend(queue.samples());
        }
        samples.extend(self.scheduler.samples());
        samples
    }
}
