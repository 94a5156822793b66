//! Clinical reference lookup
//!
//! Three layers, leaf-first:
//! - [`Catalog`]: immutable, sorted snapshots of reference entries (medical
//!   codes, drug monographs) searched by binary search. Rebuilds swap the whole
//!   snapshot, so readers never see a half-built index.
//! - [`LookupCache`]: bounded LRU cache with hit/miss accounting. It never
//!   populates itself; callers `put` after a successful lookup.
//! - [`Directory`]: fronts the catalogs and the patient [`DataSource`] with a
//!   single namespaced cache.

#![forbid(unsafe_code)]

pub mod cache;
pub mod catalog;
pub mod directory;
pub mod entry;
pub mod error;
pub mod interactions;
pub mod metrics;
pub mod patient;
pub mod source;

pub use cache::LookupCache;
pub use catalog::{Catalog, DuplicatePolicy, Found, Snapshot};
pub use directory::{Cached, Directory, DirectoryOptions, Lookup};
pub use entry::{CatalogKind, Interaction, InteractionSeverity, ReferenceEntry};
pub use error::{Error, Result};
pub use interactions::{find_interactions, InteractionFinding, InteractionReport};
pub use metrics::{CacheStats, CatalogMetrics};
pub use patient::{ContactKey, PatientKey, PatientRecord, Visit};
pub use source::{DataSource, InMemorySource, SourceError};
