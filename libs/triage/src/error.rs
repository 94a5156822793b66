//! Error types for triage operations

use crate::vitals::VitalField;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid vital signs: {} out of physiological range", join_fields(.fields))]
    InvalidVitals { fields: Vec<VitalField> },

    #[error("Patient id must not be empty")]
    EmptyPatientId,

    #[error("Patient not in {department} queue: {patient_id}")]
    NotFound {
        department: String,
        patient_id: String,
    },
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidVitals { .. } | Error::EmptyPatientId)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

fn join_fields(fields: &[VitalField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
