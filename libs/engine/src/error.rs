//! Unified error for engine operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid engine configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Lookup(#[from] wardline_lookup::Error),

    #[error(transparent)]
    Triage(#[from] wardline_triage::Error),

    #[error(transparent)]
    Scheduler(#[from] wardline_scheduler::Error),
}

impl Error {
    /// The request was malformed; retrying it unchanged fails again.
    pub fn is_validation(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::Lookup(e) => e.is_validation(),
            Error::Triage(e) => e.is_validation(),
            Error::Scheduler(e) => e.is_validation(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Triage(e) if e.is_not_found())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
