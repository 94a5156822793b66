//! Reference data published through catalogs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which reference catalog an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// Diagnosis/procedure codes (ICD, CPT and similar).
    Code,
    /// Drug monographs including interaction metadata.
    Drug,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 2] = [CatalogKind::Code, CatalogKind::Drug];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Code => "code",
            CatalogKind::Drug => "drug",
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCatalogKindError(pub String);

impl fmt::Display for ParseCatalogKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown catalog kind '{}' (expected 'code' or 'drug')", self.0)
    }
}

impl std::error::Error for ParseCatalogKindError {}

impl FromStr for CatalogKind {
    type Err = ParseCatalogKindError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "code" | "codes" => Ok(Self::Code),
            "drug" | "drugs" => Ok(Self::Drug),
            _ => Err(ParseCatalogKindError(s.to_string())),
        }
    }
}

/// Clinical significance of a drug-drug interaction, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionSeverity {
    Minor,
    Moderate,
    Major,
    Contraindicated,
}

impl fmt::Display for InteractionSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Major => "major",
            Self::Contraindicated => "contraindicated",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Key of the other entry in the same catalog.
    pub with: String,
    pub severity: InteractionSeverity,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

/// One record of a reference catalog. `key` is unique within a snapshot and
/// is the sort key used for binary search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceEntry {
    pub key: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interactions: Vec<Interaction>,
}

impl ReferenceEntry {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            category: None,
            interactions: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_interaction(
        mut self,
        with: impl Into<String>,
        severity: InteractionSeverity,
        note: impl Into<String>,
    ) -> Self {
        self.interactions.push(Interaction {
            with: with.into(),
            severity,
            note: note.into(),
        });
        self
    }

    /// Interaction declared by this entry against `other_key`, if any.
    pub fn interaction_with(&self, other_key: &str) -> Option<&Interaction> {
        self.interactions.iter().find(|i| i.with == other_key)
    }
}
