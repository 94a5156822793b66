//! Catalog and cache recorders
//!
//! Recorders are crate-private; callers only ever see the snapshots.

use crate::entry::CatalogKind;
use serde::Serialize;
use wardline_metrics::{Counter, DurationSnapshot, DurationStat, ExportMetrics, Gauge, Sample};

#[derive(Debug, Default)]
pub(crate) struct CatalogRecorder {
    pub(crate) lookups: Counter,
    pub(crate) found: Counter,
    pub(crate) not_found: Counter,
    pub(crate) comparisons: Counter,
    pub(crate) builds: Counter,
    pub(crate) rejected_builds: Counter,
    pub(crate) size: Gauge,
    pub(crate) lookup_time: DurationStat,
}

impl CatalogRecorder {
    pub(crate) fn snapshot(&self, kind: CatalogKind, version: u64) -> CatalogMetrics {
        CatalogMetrics {
            kind,
            version,
            size: self.size.get().max(0) as u64,
            lookups: self.lookups.get(),
            found: self.found.get(),
            not_found: self.not_found.get(),
            comparisons: self.comparisons.get(),
            builds: self.builds.get(),
            rejected_builds: self.rejected_builds.get(),
            lookup_time: self.lookup_time.snapshot(),
        }
    }
}

/// Read-only view of one catalog's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMetrics {
    pub kind: CatalogKind,
    pub version: u64,
    pub size: u64,
    pub lookups: u64,
    pub found: u64,
    pub not_found: u64,
    /// Total key comparisons across all lookups.
    pub comparisons: u64,
    pub builds: u64,
    pub rejected_builds: u64,
    pub lookup_time: DurationSnapshot,
}

impl CatalogMetrics {
    pub fn mean_comparisons(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.comparisons as f64 / self.lookups as f64
        }
    }
}

impl ExportMetrics for CatalogMetrics {
    fn samples(&self) -> Vec<Sample> {
        let kind = self.kind.as_str();
        vec![
            Sample::gauge(
                "wardline_catalog_entries",
                "Entries in the active catalog snapshot",
                self.size as f64,
            ),
            Sample::gauge(
                "wardline_catalog_version",
                "Version of the active catalog snapshot",
                self.version as f64,
            ),
            Sample::counter(
                "wardline_catalog_lookups_total",
                "Catalog lookups",
                self.lookups,
            ),
            Sample::counter(
                "wardline_catalog_not_found_total",
                "Catalog lookups for absent keys",
                self.not_found,
            ),
            Sample::counter(
                "wardline_catalog_comparisons_total",
                "Key comparisons performed by catalog binary search",
                self.comparisons,
            ),
            Sample::counter(
                "wardline_catalog_builds_total",
                "Catalog snapshots published",
                self.builds,
            ),
            Sample::counter(
                "wardline_catalog_rejected_builds_total",
                "Catalog builds rejected by validation",
                self.rejected_builds,
            ),
        ]
        .into_iter()
        .map(|s| s.with_label("catalog", kind))
        .collect()
    }
}

#[derive(Debug, Default)]
pub(crate) struct CacheRecorder {
    pub(crate) hits: Counter,
    pub(crate) misses: Counter,
    pub(crate) evictions: Counter,
}

/// Hit/miss accounting for a [`crate::LookupCache`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub size: usize,
    pub capacity: usize,
    pub evictions: u64,
}

impl CacheStats {
    pub(crate) fn new(
        recorder: &CacheRecorder,
        size: usize,
        capacity: usize,
    ) -> Self {
        let hits = recorder.hits.get();
        let misses = recorder.misses.get();
        let total = hits + misses;
        Self {
            hits,
            misses,
            hit_rate: if total == 0 {
                0.0
            } else {
                hits as f64 / total as f64
            },
            size,
            capacity,
            evictions: recorder.evictions.get(),
        }
    }
}

impl ExportMetrics for CacheStats {
    fn samples(&self) -> Vec<Sample> {
        vec![
            Sample::counter("wardline_cache_hits_total", "Lookup cache hits", self.hits),
            Sample::counter(
                "wardline_cache_misses_total",
                "Lookup cache misses",
                self.misses,
            ),
            Sample::counter(
                "wardline_cache_evictions_total",
                "Entries evicted under capacity pressure",
                self.evictions,
            ),
            Sample::gauge("wardline_cache_hit_rate", "Lookup cache hit rate", self.hit_rate),
            Sample::gauge(
                "wardline_cache_entries",
                "Entries held by the lookup cache",
                self.size as f64,
            ),
        ]
    }
}
