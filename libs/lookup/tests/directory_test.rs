//! Directory behaviour over an in-memory data source

use std::sync::Arc;
use wardline_lookup::{
    CatalogKind, ContactKey, DataSource, Directory, DirectoryOptions, DuplicatePolicy, Error,
    InMemorySource, InteractionSeverity, PatientKey, PatientRecord, ReferenceEntry, SourceError,
};

fn patient(id: &str, email: &str, phone: &str) -> PatientRecord {
    PatientRecord {
        patient_id: id.into(),
        first_name: "Test".into(),
        last_name: id.to_uppercase(),
        date_of_birth: None,
        email: Some(email.into()),
        phone: Some(phone.into()),
        visits: Vec::new(),
    }
}

fn source() -> Arc<InMemorySource> {
    Arc::new(
        InMemorySource::new()
            .with_catalog(
                CatalogKind::Code,
                vec![
                    ReferenceEntry::new("I10", "Essential hypertension"),
                    ReferenceEntry::new("E11", "Type 2 diabetes mellitus"),
                ],
            )
            .with_catalog(
                CatalogKind::Drug,
                vec![
                    ReferenceEntry::new("warfarin", "Anticoagulant").with_interaction(
                        "aspirin",
                        InteractionSeverity::Major,
                        "Bleeding risk",
                    ),
                    ReferenceEntry::new("aspirin", "Antiplatelet"),
                    ReferenceEntry::new("simvastatin", "Statin").with_interaction(
                        "clarithromycin",
                        InteractionSeverity::Contraindicated,
                        "Myopathy",
                    ),
                    ReferenceEntry::new("clarithromycin", "Macrolide"),
                ],
            )
            .with_patient(patient("p-2", "sam@example.org", "555-0100"))
            .with_patient(patient("p-1", "alex@example.org", "555-0100")),
    )
}

fn directory(source: Arc<InMemorySource>, capacity: usize) -> Directory<Arc<InMemorySource>> {
    let options = DirectoryOptions {
        cache_capacity: capacity,
        duplicate_policy: DuplicatePolicy::Reject,
    };
    let directory = Directory::new(source, &options).unwrap();
    directory.reload_all().unwrap();
    directory
}

#[test]
fn test_reference_lookup_populates_cache_on_found_only() {
    let dir = directory(source(), 16);

    let first = dir.find_reference(CatalogKind::Code, " I10 ").unwrap();
    assert_eq!(first.value.unwrap().description, "Essential hypertension");
    assert!(!first.cache_hit);
    assert!(first.comparisons >= 1);

    let second = dir.find_reference(CatalogKind::Code, "I10").unwrap();
    assert!(second.cache_hit);
    assert_eq!(second.comparisons, 0);

    let missing = dir.find_reference(CatalogKind::Code, "Z99").unwrap();
    assert!(missing.value.is_none());
    let again = dir.find_reference(CatalogKind::Code, "Z99").unwrap();
    assert!(!again.cache_hit);

    let stats = dir.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.size, 1);
}

#[test]
fn test_same_key_in_different_catalogs_does_not_collide() {
    let src = source();
    src.set_catalog(CatalogKind::Drug, vec![ReferenceEntry::new("I10", "Not a code")]);
    let dir = directory(src, 16);

    let code = dir.find_reference(CatalogKind::Code, "I10").unwrap();
    let drug = dir.find_reference(CatalogKind::Drug, "I10").unwrap();
    assert_eq!(code.value.unwrap().description, "Essential hypertension");
    assert_eq!(drug.value.unwrap().description, "Not a code");
}

#[test]
fn test_empty_key_is_validation_error() {
    let dir = directory(source(), 4);
    let err = dir.find_reference(CatalogKind::Drug, "   ").unwrap_err();
    assert!(matches!(err, Error::InvalidKey(_)));
    assert!(err.is_validation());

    let err = dir.find_patient(&PatientKey::Contact(ContactKey::phone("n/a"))).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_reload_invalidates_only_that_catalog() {
    let src = source();
    let dir = directory(Arc::clone(&src), 16);

    dir.find_reference(CatalogKind::Drug, "aspirin").unwrap();
    dir.find_reference(CatalogKind::Code, "E11").unwrap();

    src.set_catalog(
        CatalogKind::Drug,
        vec![ReferenceEntry::new("aspirin", "Acetylsalicylic acid")],
    );
    assert_eq!(dir.reload(CatalogKind::Drug).unwrap(), 2);

    let aspirin = dir.find_reference(CatalogKind::Drug, "aspirin").unwrap();
    assert!(!aspirin.cache_hit);
    assert_eq!(aspirin.value.unwrap().description, "Acetylsalicylic acid");
    assert!(dir.find_reference(CatalogKind::Code, "E11").unwrap().cache_hit);
}

#[test]
fn test_rejected_reload_keeps_serving_previous_snapshot() {
    let src = source();
    let dir = directory(Arc::clone(&src), 16);

    src.set_catalog(
        CatalogKind::Code,
        vec![ReferenceEntry::new("I10", "a"), ReferenceEntry::new("I10", "b")],
    );
    let err = dir.reload(CatalogKind::Code).unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { .. }));
    assert_eq!(dir.catalog(CatalogKind::Code).version(), 1);
    assert!(dir.find_reference(CatalogKind::Code, "E11").unwrap().value.is_some());
}

#[test]
fn test_patient_by_contact_resolves_lowest_id_and_caches_by_id() {
    let dir = directory(source(), 16);

    let by_phone = dir.find_patient_by_contact(ContactKey::phone("(555) 0100")).unwrap();
    assert_eq!(by_phone.value.unwrap().patient_id, "p-1");

    let by_id = dir.find_patient(&PatientKey::Id("p-1".into())).unwrap();
    assert!(by_id.cache_hit);

    let by_email = dir
        .find_patient(&PatientKey::Contact(ContactKey::email(" SAM@example.org")))
        .unwrap();
    assert_eq!(by_email.value.unwrap().patient_id, "p-2");

    assert!(dir
        .find_patient(&PatientKey::Id("p-404".into()))
        .unwrap()
        .value
        .is_none());

    assert_eq!(dir.invalidate_patients(), 4);
    assert!(!dir.find_patient(&PatientKey::Id("p-1".into())).unwrap().cache_hit);
}

#[test]
fn test_interaction_report() {
    let dir = directory(source(), 16);
    let report = dir
        .check_interactions(&[
            "aspirin",
            "simvastatin",
            "warfarin",
            "clarithromycin",
            "unobtainium",
            "aspirin",
        ])
        .unwrap();

    assert_eq!(report.findings.len(), 2);
    assert_eq!(report.findings[0].severity, InteractionSeverity::Contraindicated);
    assert_eq!(report.findings[1].severity, InteractionSeverity::Major);
    assert_eq!(report.highest_severity(), Some(InteractionSeverity::Contraindicated));
    assert_eq!(report.unknown, vec!["unobtainium"]);
}

#[test]
fn test_zero_capacity_is_rejected() {
    let options = DirectoryOptions {
        cache_capacity: 0,
        ..DirectoryOptions::default()
    };
    assert!(matches!(
        Directory::new(source(), &options),
        Err(Error::InvalidCapacity)
    ));
}

struct FailingSource;

impl DataSource for FailingSource {
    fn load_catalog(&self, _kind: CatalogKind) -> Result<Vec<ReferenceEntry>, SourceError> {
        Err("connection refused".into())
    }

    fn load_patient(&self, _patient_id: &str) -> Result<Option<PatientRecord>, SourceError> {
        Err("connection refused".into())
    }

    fn find_patient_by_contact(
        &self,
        _contact: &ContactKey,
    ) -> Result<Option<PatientRecord>, SourceError> {
        Ok(None)
    }
}

#[test]
fn test_source_errors_carry_context() {
    let dir = Directory::new(FailingSource, &DirectoryOptions::default()).unwrap();

    let err = dir.reload(CatalogKind::Drug).unwrap_err();
    assert!(!err.is_validation());
    assert_eq!(
        err.to_string(),
        "Data source error while loading drug catalog: connection refused"
    );
    assert!(dir.find_patient(&PatientKey::Id("p-1".into())).is_err());
}
