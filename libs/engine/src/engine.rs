//! Engine facade over triage, lookup and scheduling

use crate::api::{
    AddPatientRequest, AddPatientResponse, CheckVitalsRequest, CheckVitalsResponse,
    ClearQueueResponse, FindPatientRequest, FindPatientResponse, FindReferenceResponse,
    InteractionCheckRequest, NextPatientResponse, OptimizeScheduleRequest, QueueView,
    ReloadCatalogResponse,
};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::metrics::EngineMetrics;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use wardline_lookup::{
    CatalogKind, ContactKey, DataSource, Directory, InteractionReport, PatientKey,
};
use wardline_scheduler::{Schedule, Scheduler};
use wardline_triage::{Clock, SystemClock, TriageQueue, TriageStats};

pub struct Engine<S: DataSource> {
    config: EngineConfig,
    directory: Directory<S>,
    scheduler: Scheduler,
    queues: RwLock<BTreeMap<String, Arc<TriageQueue>>>,
    clock: Arc<dyn Clock>,
}

impl<S: DataSource> Engine<S> {
    /// Build an engine over `source`. Catalogs start empty until
    /// [`Engine::load_catalogs`] runs.
    pub fn new(config: EngineConfig, source: S) -> Result<Self> {
        config.validate()?;
        let directory = Directory::new(source, &config.directory_options())?;

        Ok(Self {
            config,
            directory,
            scheduler: Scheduler::new(),
            queues: RwLock::new(BTreeMap::new()),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the time source used by queues created from now on.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn directory(&self) -> &Directory<S> {
        &self.directory
    }

    /// Load every catalog from the data source.
    pub fn load_catalogs(&self) -> Result<Vec<ReloadCatalogResponse>> {
        CatalogKind::ALL
            .iter()
            .map(|kind| self.reload_catalog(*kind))
            .collect()
    }

    // Triage

    fn department_name(&self, department: Option<&str>) -> String {
        match department.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.config.default_department.clone(),
        }
    }

    fn existing_queue(&self, department: &str) -> Option<Arc<TriageQueue>> {
        self.queues
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(department)
            .cloned()
    }

    fn queue_or_create(&self, department: &str) -> Arc<TriageQueue> {
        if let Some(queue) = self.existing_queue(department) {
            return queue;
        }

        let mut queues = self.queues.write().unwrap_or_else(PoisonError::into_inner);
        let queue = queues.entry(department.to_string()).or_insert_with(|| {
            tracing::info!(department, "Triage queue opened");
            Arc::new(
                TriageQueue::new(department)
                    .with_clock(Arc::clone(&self.clock))
                    .with_thresholds(self.config.critical_thresholds.clone()),
            )
        });
        Arc::clone(queue)
    }

    /// Departments with an open queue.
    pub fn departments(&self) -> Vec<String> {
        self.queues
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn add_patient(&self, request: AddPatientRequest) -> Result<AddPatientResponse> {
        let department = self.department_name(request.department.as_deref());
        let admitted = self.queue_or_create(&department).add(request.admission)?;
        Ok(AddPatientResponse {
            department,
            admitted,
        })
    }

    pub fn next_patient(&self, department: Option<&str>) -> NextPatientResponse {
        let department = self.department_name(department);
        let (patient, remaining) = match self.existing_queue(&department) {
            Some(queue) => (queue.pop_next(), queue.len()),
            None => (None, 0),
        };
        NextPatientResponse {
            department,
            patient,
            remaining,
        }
    }

    pub fn peek_patient(&self, department: Option<&str>) -> NextPatientResponse {
        let department = self.department_name(department);
        let (patient, remaining) = match self.existing_queue(&department) {
            Some(queue) => (queue.peek_next(), queue.len()),
            None => (None, 0),
        };
        NextPatientResponse {
            department,
            patient,
            remaining,
        }
    }

    pub fn view_queue(&self, department: Option<&str>) -> QueueView {
        let department = self.department_name(department);
        let (patients, stats) = match self.existing_queue(&department) {
            Some(queue) => (queue.view_all(), queue.stats()),
            None => (Vec::new(), TriageStats::empty(department.clone())),
        };
        QueueView {
            department,
            patients,
            stats,
        }
    }

    pub fn check_vitals(&self, request: CheckVitalsRequest) -> Result<CheckVitalsResponse> {
        let department = self.department_name(request.department.as_deref());
        let queue = self.existing_queue(&department).ok_or_else(|| {
            Error::Triage(wardline_triage::Error::NotFound {
                department: department.clone(),
                patient_id: request.patient_id.clone(),
            })
        })?;

        let check = queue.check_vitals(
            &request.patient_id,
            request.vitals,
            request.declared_severity,
        )?;
        Ok(CheckVitalsResponse { department, check })
    }

    pub fn clear_queue(&self, department: Option<&str>) -> ClearQueueResponse {
        let department = self.department_name(department);
        let cleared = self
            .existing_queue(&department)
            .map_or(0, |queue| queue.clear());
        ClearQueueResponse {
            department,
            cleared,
        }
    }

    // Lookup

    pub fn find_reference(&self, kind: CatalogKind, key: &str) -> Result<FindReferenceResponse> {
        let lookup = self.directory.find_reference(kind, key)?;
        Ok(FindReferenceResponse {
            kind,
            key: key.trim().to_string(),
            found: lookup.value.is_some(),
            entry: lookup.value.map(|entry| (*entry).clone()),
            cache_hit: lookup.cache_hit,
            comparisons: lookup.comparisons,
        })
    }

    pub fn find_patient(&self, request: &FindPatientRequest) -> Result<FindPatientResponse> {
        let key = patient_key(request)?;
        let lookup = self.directory.find_patient(&key)?;
        Ok(FindPatientResponse {
            found: lookup.value.is_some(),
            patient: lookup.value.map(|record| (*record).clone()),
            cache_hit: lookup.cache_hit,
        })
    }

    pub fn check_interactions(
        &self,
        request: &InteractionCheckRequest,
    ) -> Result<InteractionReport> {
        Ok(self.directory.check_interactions(&request.drugs)?)
    }

    pub fn reload_catalog(&self, kind: CatalogKind) -> Result<ReloadCatalogResponse> {
        let version = self.directory.reload(kind)?;
        Ok(ReloadCatalogResponse {
            kind,
            version,
            entries: self.directory.catalog(kind).len(),
        })
    }

    // Scheduling

    pub fn optimize_schedule(&self, request: &OptimizeScheduleRequest) -> Result<Schedule> {
        Ok(self.scheduler.optimize(request)?)
    }

    pub fn metrics(&self) -> EngineMetrics {
        let triage = self
            .queues
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|queue| queue.metrics())
            .collect();

        EngineMetrics {
            catalogs: self.directory.catalog_metrics(),
            cache: self.directory.cache_stats(),
            triage,
            scheduler: self.scheduler.metrics(),
        }
    }
}

fn patient_key(request: &FindPatientRequest) -> Result<PatientKey> {
    match (&request.patient_id, &request.email, &request.phone) {
        (Some(id), None, None) => Ok(PatientKey::Id(id.trim().to_string())),
        (None, Some(email), None) => Ok(PatientKey::Contact(ContactKey::email(email))),
        (None, None, Some(phone)) => Ok(PatientKey::Contact(ContactKey::phone(phone))),
        _ => Err(Error::Lookup(wardline_lookup::Error::InvalidKey(
            "exactly one of patientId, email or phone is required".into(),
        ))),
    }
}
