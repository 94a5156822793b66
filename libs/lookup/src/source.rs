//! Narrow data-access interface to the persistence collaborator

use crate::entry::{CatalogKind, ReferenceEntry};
use crate::patient::{ContactKey, PatientRecord};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Error reported by a [`DataSource`] implementation.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Read-only access to reference catalogs and patient records.
///
/// Implementations own storage and I/O; the lookup layer never writes back.
pub trait DataSource: Send + Sync {
    /// Full contents of one catalog, in any order.
    fn load_catalog(&self, kind: CatalogKind) -> Result<Vec<ReferenceEntry>, SourceError>;

    fn load_patient(&self, patient_id: &str) -> Result<Option<PatientRecord>, SourceError>;

    fn find_patient_by_contact(
        &self,
        contact: &ContactKey,
    ) -> Result<Option<PatientRecord>, SourceError>;
}

impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    fn load_catalog(&self, kind: CatalogKind) -> Result<Vec<ReferenceEntry>, SourceError> {
        (**self).load_catalog(kind)
    }

    fn load_patient(&self, patient_id: &str) -> Result<Option<PatientRecord>, SourceError> {
        (**self).load_patient(patient_id)
    }

    fn find_patient_by_contact(
        &self,
        contact: &ContactKey,
    ) -> Result<Option<PatientRecord>, SourceError> {
        (**self).find_patient_by_contact(contact)
    }
}

/// Map-backed [`DataSource`] for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySource {
    catalogs: RwLock<HashMap<CatalogKind, Vec<ReferenceEntry>>>,
    patients: RwLock<HashMap<String, PatientRecord>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(self, kind: CatalogKind, entries: Vec<ReferenceEntry>) -> Self {
        self.set_catalog(kind, entries);
        self
    }

    pub fn with_patient(self, record: PatientRecord) -> Self {
        self.insert_patient(record);
        self
    }

    pub fn set_catalog(&self, kind: CatalogKind, entries: Vec<ReferenceEntry>) {
        self.catalogs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, entries);
    }

    pub fn insert_patient(&self, record: PatientRecord) {
        self.patients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.patient_id.clone(), record);
    }
}

impl DataSource for InMemorySource {
    fn load_catalog(&self, kind: CatalogKind) -> Result<Vec<ReferenceEntry>, SourceError> {
        let catalogs = self.catalogs.read().unwrap_or_else(PoisonError::into_inner);
        Ok(catalogs.get(&kind).cloned().unwrap_or_default())
    }

    fn load_patient(&self, patient_id: &str) -> Result<Option<PatientRecord>, SourceError> {
        let patients = self.patients.read().unwrap_or_else(PoisonError::into_inner);
        Ok(patients.get(patient_id).cloned())
    }

    fn find_patient_by_contact(
        &self,
        contact: &ContactKey,
    ) -> Result<Option<PatientRecord>, SourceError> {
        let patients = self.patients.read().unwrap_or_else(PoisonError::into_inner);
        // Shared contacts (family phone numbers) resolve to the lowest id.
        Ok(patients
            .values()
            .filter(|p| p.matches_contact(contact))
            .min_by(|a, b| a.patient_id.cmp(&b.patient_id))
            .cloned())
    }
}
