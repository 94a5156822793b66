//! Versioned, sorted reference catalogs
//!
//! A [`Catalog`] publishes immutable [`Snapshot`]s. `build` validates and
//! sorts a fresh array outside any lock, then swaps the active `Arc` in one
//! short write section; readers clone the `Arc` and search without holding a
//! lock, so a concurrent rebuild never exposes a partially built index.

use crate::entry::{CatalogKind, ReferenceEntry};
use crate::error::{Error, Result};
use crate::metrics::{CatalogMetrics, CatalogRecorder};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

/// What `build` does when two input entries share a key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail the build; the previous snapshot stays active.
    #[default]
    Reject,
    /// Keep the entry that appears last in the input.
    KeepLast,
}

/// Immutable, key-sorted array of entries.
#[derive(Debug)]
pub struct Snapshot {
    kind: CatalogKind,
    version: u64,
    entries: Vec<Arc<ReferenceEntry>>,
}

/// Outcome of a binary search.
#[derive(Debug, Clone)]
pub struct Found {
    pub entry: Option<Arc<ReferenceEntry>>,
    /// Three-way key comparisons performed; at most floor(log2 n) + 1.
    pub comparisons: u32,
    /// Version of the snapshot that answered.
    pub version: u64,
}

impl Found {
    pub fn is_found(&self) -> bool {
        self.entry.is_some()
    }
}

impl Snapshot {
    fn empty(kind: CatalogKind) -> Self {
        Self {
            kind,
            version: 0,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Arc<ReferenceEntry>] {
        &self.entries
    }

    pub fn find(&self, key: &str) -> Found {
        let mut lo = 0usize;
        let mut hi = self.entries.len();
        let mut comparisons = 0u32;

        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            comparisons += 1;
            match self.entries[mid].key.as_str().cmp(key) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => {
                    return Found {
                        entry: Some(Arc::clone(&self.entries[mid])),
                        comparisons,
                        version: self.version,
                    }
                }
            }
        }

        Found {
            entry: None,
            comparisons,
            version: self.version,
        }
    }
}

/// One independently constructed reference catalog.
#[derive(Debug)]
pub struct Catalog {
    kind: CatalogKind,
    policy: DuplicatePolicy,
    active: RwLock<Arc<Snapshot>>,
    metrics: CatalogRecorder,
}

impl Catalog {
    pub fn new(kind: CatalogKind, policy: DuplicatePolicy) -> Self {
        Self {
            kind,
            policy,
            active: RwLock::new(Arc::new(Snapshot::empty(kind))),
            metrics: CatalogRecorder::default(),
        }
    }

    pub fn kind(&self) -> CatalogKind {
        self.kind
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// The active snapshot. Holding it keeps that version alive across rebuilds.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Replace the active snapshot with `entries`, returning the new version.
    ///
    /// Rejected input leaves the active snapshot untouched.
    pub fn build(&self, entries: Vec<ReferenceEntry>) -> Result<u64> {
        let prepared = match prepare(self.kind, self.policy, entries) {
            Ok(prepared) => prepared,
            Err(e) => {
                self.metrics.rejected_builds.incr();
                tracing::warn!(catalog = %self.kind, error = %e, "Catalog build rejected");
                return Err(e);
            }
        };

        let size = prepared.len();
        let version = {
            let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
            let version = active.version + 1;
            *active = Arc::new(Snapshot {
                kind: self.kind,
                version,
                entries: prepared,
            });
            version
        };

        self.metrics.builds.incr();
        self.metrics.size.set(size as i64);
        tracing::info!(catalog = %self.kind, version, entries = size, "Catalog snapshot published");

        Ok(version)
    }

    /// Binary search over the active snapshot.
    pub fn find(&self, key: &str) -> Found {
        let _timing = self.metrics.lookup_time.start();
        let found = self.snapshot().find(key);

        self.metrics.lookups.incr();
        self.metrics.comparisons.add(u64::from(found.comparisons));
        if found.is_found() {
            self.metrics.found.incr();
        } else {
            self.metrics.not_found.incr();
        }

        tracing::debug!(
            catalog = %self.kind,
            key,
            found = found.is_found(),
            comparisons = found.comparisons,
            version = found.version,
            "Catalog lookup"
        );

        found
    }

    pub fn metrics(&self) -> CatalogMetrics {
        self.metrics.snapshot(self.kind, self.version())
    }
}

/// Validate, sort and de-duplicate build input.
fn prepare(
    kind: CatalogKind,
    policy: DuplicatePolicy,
    mut entries: Vec<ReferenceEntry>,
) -> Result<Vec<Arc<ReferenceEntry>>> {
    if let Some(position) = entries.iter().position(|e| e.key.trim().is_empty()) {
        return Err(Error::EmptyKey { kind, position });
    }

    // Stable: among equal keys the input order survives, which KeepLast relies on.
    entries.sort_by(|a, b| a.key.cmp(&b.key));

    let mut prepared: Vec<Arc<ReferenceEntry>> = Vec::with_capacity(entries.len());
    for entry in entries {
        let duplicate = prepared.last().is_some_and(|last| last.key == entry.key);
        if !duplicate {
            prepared.push(Arc::new(entry));
            continue;
        }

        match policy {
            DuplicatePolicy::Reject => {
                return Err(Error::DuplicateKey {
                    kind,
                    key: entry.key,
                })
            }
            DuplicatePolicy::KeepLast => {
                if let Some(last) = prepared.last_mut() {
                    *last = Arc::new(entry);
                }
            }
        }
    }

    Ok(prepared)
}
