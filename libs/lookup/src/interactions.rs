//! Pairwise drug-interaction screening over catalog entries

use crate::entry::{InteractionSeverity, ReferenceEntry};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionFinding {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: InteractionSeverity,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionReport {
    /// Most severe first.
    pub findings: Vec<InteractionFinding>,
    /// Requested drugs absent from the catalog.
    pub unknown: Vec<String>,
}

impl InteractionReport {
    pub fn highest_severity(&self) -> Option<InteractionSeverity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    pub fn is_clear(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Check every pair of `drugs` for a declared interaction.
///
/// Interaction metadata may be declared on either side of a pair; when both
/// sides declare one, the more severe declaration wins.
pub fn find_interactions(drugs: &[Arc<ReferenceEntry>]) -> Vec<InteractionFinding> {
    let mut findings = Vec::new();

    for (i, a) in drugs.iter().enumerate() {
        for b in &drugs[i + 1..] {
            if a.key == b.key {
                continue;
            }

            let declared = [a.interaction_with(&b.key), b.interaction_with(&a.key)];
            let Some(worst) = declared.into_iter().flatten().max_by_key(|i| i.severity) else {
                continue;
            };

            findings.push(InteractionFinding {
                drug_a: a.key.clone(),
                drug_b: b.key.clone(),
                severity: worst.severity,
                note: worst.note.clone(),
            });
        }
    }

    findings.sort_by(|x, y| {
        y.severity
            .cmp(&x.severity)
            .then_with(|| x.drug_a.cmp(&y.drug_a))
            .then_with(|| x.drug_b.cmp(&y.drug_b))
    });
    findings
}
