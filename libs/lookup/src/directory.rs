//! Cached lookups over catalogs and the patient store

use crate::cache::LookupCache;
use crate::catalog::{Catalog, DuplicatePolicy, Found};
use crate::entry::{CatalogKind, ReferenceEntry};
use crate::error::{Error, Result};
use crate::interactions::{find_interactions, InteractionReport};
use crate::metrics::{CacheStats, CatalogMetrics};
use crate::patient::{patient_id_cache_key, ContactKey, PatientKey, PatientRecord};
use crate::source::DataSource;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Values held by the directory's shared cache.
#[derive(Debug, Clone)]
pub enum Cached {
    Reference(Arc<ReferenceEntry>),
    Patient(Arc<PatientRecord>),
}

/// Result of a directory lookup. A miss is `value: None`, never an error.
#[derive(Debug, Clone)]
pub struct Lookup<T> {
    pub value: Option<T>,
    pub cache_hit: bool,
    /// Catalog comparisons performed; zero for cache hits and store lookups.
    pub comparisons: u32,
}

impl<T> Lookup<T> {
    fn cached(value: T) -> Self {
        Self {
            value: Some(value),
            cache_hit: true,
            comparisons: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirectoryOptions {
    pub cache_capacity: usize,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for DirectoryOptions {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
            duplicate_policy: DuplicatePolicy::Reject,
        }
    }
}

/// Code and drug catalogs plus patient lookups, fronted by one LRU cache.
pub struct Directory<S: DataSource> {
    source: S,
    codes: Catalog,
    drugs: Catalog,
    cache: LookupCache<Cached>,
}

impl<S: DataSource> Directory<S> {
    /// Create a directory with empty catalogs. Call [`Directory::reload_all`]
    /// (or `reload` per kind) to publish the first snapshots.
    pub fn new(source: S, options: &DirectoryOptions) -> Result<Self> {
        Ok(Self {
            source,
            codes: Catalog::new(CatalogKind::Code, options.duplicate_policy),
            drugs: Catalog::new(CatalogKind::Drug, options.duplicate_policy),
            cache: LookupCache::new(options.cache_capacity)?,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn catalog(&self, kind: CatalogKind) -> &Catalog {
        match kind {
            CatalogKind::Code => &self.codes,
            CatalogKind::Drug => &self.drugs,
        }
    }

    /// Rebuild one catalog from the source and drop its cached entries.
    pub fn reload(&self, kind: CatalogKind) -> Result<u64> {
        let entries = self
            .source
            .load_catalog(kind)
            .map_err(|e| Error::from_source(format!("loading {kind} catalog"), e))?;

        let version = self.catalog(kind).build(entries)?;
        let invalidated = self.cache.invalidate_prefix(&reference_prefix(kind));
        tracing::debug!(catalog = %kind, version, invalidated, "Invalidated cached entries");

        Ok(version)
    }

    pub fn reload_all(&self) -> Result<()> {
        for kind in CatalogKind::ALL {
            self.reload(kind)?;
        }
        Ok(())
    }

    /// Find a code or drug by key, consulting the cache first.
    pub fn find_reference(
        &self,
        kind: CatalogKind,
        key: &str,
    ) -> Result<Lookup<Arc<ReferenceEntry>>> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidKey(format!("empty {kind} key")));
        }

        let cache_key = format!("{}{}", reference_prefix(kind), key);
        if let (Some(Cached::Reference(entry)), _) = self.cache.get(&cache_key) {
            return Ok(Lookup::cached(entry));
        }

        let found = self.catalog(kind).find(key);
        self.remember_reference(kind, cache_key, &found);

        Ok(Lookup {
            value: found.entry,
            cache_hit: false,
            comparisons: found.comparisons,
        })
    }

    /// Cache a catalog hit unless a rebuild published a newer snapshot since
    /// the search. A rebuild that lands after the put clears it again.
    fn remember_reference(&self, kind: CatalogKind, cache_key: String, found: &Found) {
        let Some(entry) = &found.entry else {
            return;
        };
        let catalog = self.catalog(kind);
        let value = Cached::Reference(Arc::clone(entry));
        if !self
            .cache
            .put_if(cache_key, value, || catalog.version() == found.version)
        {
            tracing::debug!(
                catalog = %kind,
                version = found.version,
                "Skipped caching entry from a replaced snapshot"
            );
        }
    }

    /// Find a patient by id or by contact key, consulting the cache first.
    pub fn find_patient(&self, key: &PatientKey) -> Result<Lookup<Arc<PatientRecord>>> {
        match key {
            PatientKey::Id(id) if id.trim().is_empty() => {
                return Err(Error::InvalidKey("empty patient id".into()))
            }
            PatientKey::Contact(contact) if contact.is_empty() => {
                return Err(Error::InvalidKey("empty patient contact".into()))
            }
            _ => {}
        }

        let cache_key = key.cache_key();
        if let (Some(Cached::Patient(record)), _) = self.cache.get(&cache_key) {
            return Ok(Lookup::cached(record));
        }

        let loaded = match key {
            PatientKey::Id(id) => self
                .source
                .load_patient(id.trim())
                .map_err(|e| Error::from_source(format!("loading patient {id}"), e))?,
            PatientKey::Contact(contact) => self
                .source
                .find_patient_by_contact(contact)
                .map_err(|e| Error::from_source("searching patients by contact", e))?,
        };

        let record = loaded.map(Arc::new);
        if let Some(record) = &record {
            self.cache.put(cache_key, Cached::Patient(Arc::clone(record)));
            if let PatientKey::Contact(_) = key {
                self.cache.put(
                    patient_id_cache_key(&record.patient_id),
                    Cached::Patient(Arc::clone(record)),
                );
            }
        }

        tracing::debug!(found = record.is_some(), "Patient lookup");

        Ok(Lookup {
            value: record,
            cache_hit: false,
            comparisons: 0,
        })
    }

    /// Convenience wrapper for [`Directory::find_patient`] by contact.
    pub fn find_patient_by_contact(
        &self,
        contact: ContactKey,
    ) -> Result<Lookup<Arc<PatientRecord>>> {
        self.find_patient(&PatientKey::Contact(contact))
    }

    /// Drop cached patient records, e.g. after the store reports an update.
    pub fn invalidate_patients(&self) -> usize {
        self.cache.invalidate_prefix("patient:")
    }

    /// Screen a medication list for declared drug-drug interactions.
    pub fn check_interactions<K: AsRef<str>>(&self, drug_keys: &[K]) -> Result<InteractionReport> {
        let mut resolved: Vec<Arc<ReferenceEntry>> = Vec::with_capacity(drug_keys.len());
        let mut unknown = Vec::new();

        for key in drug_keys {
            let key = key.as_ref().trim();
            if resolved.iter().any(|e| e.key == key) || unknown.iter().any(|u| u == key) {
                continue;
            }
            match self.find_reference(CatalogKind::Drug, key)?.value {
                Some(entry) => resolved.push(entry),
                None => unknown.push(key.to_string()),
            }
        }

        let report = InteractionReport {
            findings: find_interactions(&resolved),
            unknown,
        };

        tracing::debug!(
            drugs = resolved.len(),
            findings = report.findings.len(),
            unknown = report.unknown.len(),
            "Interaction check"
        );

        Ok(report)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn catalog_metrics(&self) -> Vec<CatalogMetrics> {
        CatalogKind::ALL
            .iter()
            .map(|kind| self.catalog(*kind).metrics())
            .collect()
    }
}

fn reference_prefix(kind: CatalogKind) -> String {
    format!("{}:", kind.as_str())
}
