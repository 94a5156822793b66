//! JSON file data source
//!
//! Layout of the data directory:
//!
//! ```text
//! codes.json     [ReferenceEntry, ...]
//! drugs.json     [ReferenceEntry, ...]
//! patients.json  [PatientRecord, ...]
//! ```
//!
//! Missing files read as empty. Catalog files are re-read on every load so a
//! reload picks up edits; patients are read once when the store is opened.

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use wardline_engine::lookup::{
    CatalogKind, ContactKey, DataSource, PatientRecord, ReferenceEntry, SourceError,
};

#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    patients: HashMap<String, PatientRecord>,
}

impl JsonFileStore {
    pub fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        let path = dir.join("patients.json");
        let records: Vec<PatientRecord> = read_json(&path)
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Failed to load patients from {}", path.display()))?;

        let patients = records
            .into_iter()
            .map(|record| (record.patient_id.clone(), record))
            .collect::<HashMap<_, _>>();
        tracing::debug!(dir = %dir.display(), patients = patients.len(), "Opened JSON file store");

        Ok(Self { dir, patients })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn catalog_path(&self, kind: CatalogKind) -> PathBuf {
        let file = match kind {
            CatalogKind::Code => "codes.json",
            CatalogKind::Drug => "drugs.json",
        };
        self.dir.join(file)
    }
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, SourceError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Data file missing, treating as empty");
        return Ok(T::default());
    }
    let raw = fs::read_to_string(path)?;
    let value = serde_json::from_str(&raw)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(value)
}

impl DataSource for JsonFileStore {
    fn load_catalog(&self, kind: CatalogKind) -> Result<Vec<ReferenceEntry>, SourceError> {
        read_json(&self.catalog_path(kind))
    }

    fn load_patient(&self, patient_id: &str) -> Result<Option<PatientRecord>, SourceError> {
        Ok(self.patients.get(patient_id).cloned())
    }

    fn find_patient_by_contact(
        &self,
        contact: &ContactKey,
    ) -> Result<Option<PatientRecord>, SourceError> {
        Ok(self
            .patients
            .values()
            .filter(|p| p.matches_contact(contact))
            .min_by(|a, b| a.patient_id.cmp(&b.patient_id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(store.load_catalog(CatalogKind::Code).unwrap().is_empty());
        assert!(store.load_patient("p-1").unwrap().is_none());
    }

    #[test]
    fn test_reads_catalogs_and_patients() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("drugs.json"),
            r#"[{"key": "warfarin", "description": "Anticoagulant",
                 "interactions": [{"with": "aspirin", "severity": "major"}]}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("patients.json"),
            r#"[{"patientId": "p-1", "firstName": "Ada", "lastName": "Byron",
                 "phone": "+44 20 7946 0000"}]"#,
        )
        .unwrap();

        let store = JsonFileStore::open(dir.path()).unwrap();
        let drugs = store.load_catalog(CatalogKind::Drug).unwrap();
        assert_eq!(drugs[0].interactions.len(), 1);

        let found = store
            .find_patient_by_contact(&ContactKey::phone("442079460000"))
            .unwrap();
        assert_eq!(found.unwrap().first_name, "Ada");
    }

    #[test]
    fn test_malformed_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("codes.json"), "{not json").unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let err = store.load_catalog(CatalogKind::Code).unwrap_err();
        assert!(err.to_string().contains("codes.json"));
    }
}
