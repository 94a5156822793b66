//! Error types for catalog, cache and directory lookups

use crate::entry::CatalogKind;
use crate::source::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Empty key in {kind} catalog at input position {position}")]
    EmptyKey { kind: CatalogKind, position: usize },

    #[error("Duplicate key in {kind} catalog: {key}")]
    DuplicateKey { kind: CatalogKind, key: String },

    #[error("Cache capacity must be at least 1")]
    InvalidCapacity,

    #[error("Invalid lookup key: {0}")]
    InvalidKey(String),

    #[error("Data source error while {context}: {source}")]
    Source {
        context: String,
        #[source]
        source: SourceError,
    },
}

impl Error {
    /// Malformed input the caller can correct and retry.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::EmptyKey { .. }
                | Error::DuplicateKey { .. }
                | Error::InvalidCapacity
                | Error::InvalidKey(_)
        )
    }

    pub(crate) fn from_source(context: impl Into<String>, source: SourceError) -> Self {
        Error::Source {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
