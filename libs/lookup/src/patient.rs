//! Patient records as read from the data source

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub date: NaiveDate,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

/// Demographic record owned by the data store. The core only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub visits: Vec<Visit>,
}

impl PatientRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn matches_contact(&self, contact: &ContactKey) -> bool {
        match contact {
            ContactKey::Email(email) => self
                .email
                .as_deref()
                .is_some_and(|e| normalize_email(e) == *email),
            ContactKey::Phone(phone) => self
                .phone
                .as_deref()
                .is_some_and(|p| normalize_phone(p) == *phone),
        }
    }

    /// Most recent visit, if any.
    pub fn last_visit(&self) -> Option<&Visit> {
        self.visits.iter().max_by_key(|v| v.date)
    }
}

/// Composite lookup key. Values are stored normalized so that
/// `" Jane@Example.org"` and `"jane@example.org"` address the same patient.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContactKey {
    Email(String),
    Phone(String),
}

impl ContactKey {
    pub fn email(value: &str) -> Self {
        ContactKey::Email(normalize_email(value))
    }

    pub fn phone(value: &str) -> Self {
        ContactKey::Phone(normalize_phone(value))
    }

    pub fn value(&self) -> &str {
        match self {
            ContactKey::Email(v) | ContactKey::Phone(v) => v,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatientKey {
    Id(String),
    Contact(ContactKey),
}

impl PatientKey {
    pub(crate) fn cache_key(&self) -> String {
        match self {
            PatientKey::Id(id) => patient_id_cache_key(id),
            PatientKey::Contact(ContactKey::Email(email)) => format!("patient:email:{email}"),
            PatientKey::Contact(ContactKey::Phone(phone)) => format!("patient:phone:{phone}"),
        }
    }
}

pub(crate) fn patient_id_cache_key(id: &str) -> String {
    format!("patient:id:{}", id.trim())
}

fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalize_phone(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PatientRecord {
        PatientRecord {
            patient_id: "p-1".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            date_of_birth: None,
            email: Some("Jane.Doe@Example.org".into()),
            phone: Some("+1 (555) 010-2030".into()),
            visits: vec![
                Visit {
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    reason: "follow-up".into(),
                    department: None,
                },
                Visit {
                    date: NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
                    reason: "chest pain".into(),
                    department: Some("ED".into()),
                },
            ],
        }
    }

    #[test]
    fn test_contact_matching_is_normalized() {
        let r = record();
        assert!(r.matches_contact(&ContactKey::email("  jane.doe@example.ORG ")));
        assert!(r.matches_contact(&ContactKey::phone("15550102030")));
        assert!(!r.matches_contact(&ContactKey::phone("5550102030")));
    }

    #[test]
    fn test_cache_keys_are_namespaced() {
        assert_eq!(PatientKey::Id("p-1".into()).cache_key(), "patient:id:p-1");
        assert_eq!(PatientKey::Id(" p-1 ".into()).cache_key(), "patient:id:p-1");
        assert_eq!(
            PatientKey::Contact(ContactKey::email("A@B.c")).cache_key(),
            "patient:email:a@b.c"
        );
    }

    #[test]
    fn test_last_visit() {
        assert_eq!(record().last_visit().unwrap().reason, "chest pain");
    }
}
