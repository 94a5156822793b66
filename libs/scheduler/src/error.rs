//! Error types for schedule requests

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Surgery at position {position} has an empty id")]
    EmptyId { position: usize },

    #[error("Duplicate surgery id: {0}")]
    DuplicateId(String),

    #[error("Surgery {id} must start before it ends ({start} >= {end})")]
    InvalidInterval {
        id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Surgery {id} has negative revenue")]
    NegativeRevenue { id: String },

    #[error("Scheduling horizon must start before it ends ({start} >= {end})")]
    InvalidHorizon {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Surgery {id} falls outside the scheduling horizon")]
    OutsideHorizon { id: String },

    #[error("Total schedule weight overflows")]
    WeightOverflow,
}

impl Error {
    pub fn is_validation(&self) -> bool {
        !matches!(self, Error::WeightOverflow)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
