//! Vital-sign validation and critical-threshold assessment

use crate::entry::Severity;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One set of bedside observations. Temperature is in degrees Fahrenheit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub systolic: f64,
    pub diastolic: f64,
    pub heart_rate: f64,
    pub temperature: f64,
    pub spo2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VitalField {
    Systolic,
    Diastolic,
    HeartRate,
    Temperature,
    Spo2,
}

impl VitalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalField::Systolic => "systolic",
            VitalField::Diastolic => "diastolic",
            VitalField::HeartRate => "heartRate",
            VitalField::Temperature => "temperature",
            VitalField::Spo2 => "spo2",
        }
    }
}

impl fmt::Display for VitalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VitalSigns {
    fn fields(&self) -> [(VitalField, f64); 5] {
        [
            (VitalField::Systolic, self.systolic),
            (VitalField::Diastolic, self.diastolic),
            (VitalField::HeartRate, self.heart_rate),
            (VitalField::Temperature, self.temperature),
            (VitalField::Spo2, self.spo2),
        ]
    }
}

fn in_physiological_range(field: VitalField, value: f64) -> bool {
    match field {
        VitalField::Systolic => value > 0.0 && value <= 300.0,
        VitalField::Diastolic => value > 0.0 && value <= 250.0,
        VitalField::HeartRate => value > 0.0 && value <= 350.0,
        VitalField::Temperature => (75.0..=115.0).contains(&value),
        VitalField::Spo2 => (0.0..=100.0).contains(&value),
    }
}

/// Reject readings no living patient (or working monitor) produces.
///
/// Every offending field is reported, not just the first.
pub fn validate_vitals(vitals: &VitalSigns) -> Result<()> {
    let fields: Vec<VitalField> = vitals
        .fields()
        .into_iter()
        .filter(|(field, value)| !value.is_finite() || !in_physiological_range(*field, *value))
        .map(|(field, _)| field)
        .collect();

    if fields.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidVitals { fields })
    }
}

/// Inclusive limits at which a reading is treated as critical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriticalThresholds {
    pub systolic_high: f64,
    pub systolic_low: f64,
    pub heart_rate_high: f64,
    pub heart_rate_low: f64,
    pub spo2_low: f64,
    pub temperature_high: f64,
}

impl Default for CriticalThresholds {
    fn default() -> Self {
        Self {
            systolic_high: 180.0,
            systolic_low: 90.0,
            heart_rate_high: 150.0,
            heart_rate_low: 40.0,
            spo2_low: 90.0,
            temperature_high: 103.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Breach {
    AtOrAbove,
    AtOrBelow,
}

/// A reading that crossed a critical threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalAlert {
    pub field: VitalField,
    pub value: f64,
    pub threshold: f64,
    pub breach: Breach,
}

impl fmt::Display for VitalAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.breach {
            Breach::AtOrAbove => ">=",
            Breach::AtOrBelow => "<=",
        };
        write!(f, "{} {} {} {}", self.field, self.value, op, self.threshold)
    }
}

/// List every breached threshold, in field order.
pub fn assess_vitals(vitals: &VitalSigns, thresholds: &CriticalThresholds) -> Vec<VitalAlert> {
    use Breach::{AtOrAbove, AtOrBelow};
    use VitalField::{HeartRate, Spo2, Systolic, Temperature};

    let checks = [
        (Systolic, vitals.systolic, thresholds.systolic_high, AtOrAbove),
        (Systolic, vitals.systolic, thresholds.systolic_low, AtOrBelow),
        (HeartRate, vitals.heart_rate, thresholds.heart_rate_high, AtOrAbove),
        (HeartRate, vitals.heart_rate, thresholds.heart_rate_low, AtOrBelow),
        (Temperature, vitals.temperature, thresholds.temperature_high, AtOrAbove),
        (Spo2, vitals.spo2, thresholds.spo2_low, AtOrBelow),
    ];

    checks
        .into_iter()
        .filter(|(_, value, threshold, breach)| match breach {
            Breach::AtOrAbove => value >= threshold,
            Breach::AtOrBelow => value <= threshold,
        })
        .map(|(field, value, threshold, breach)| VitalAlert {
            field,
            value,
            threshold,
            breach,
        })
        .collect()
}

/// Effective severity: `Critical` on any breach, otherwise what was declared.
pub fn derive_severity(
    vitals: &VitalSigns,
    declared: Severity,
    thresholds: &CriticalThresholds,
) -> Severity {
    if assess_vitals(vitals, thresholds).is_empty() {
        declared
    } else {
        Severity::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal() -> VitalSigns {
        VitalSigns {
            systolic: 120.0,
            diastolic: 80.0,
            heart_rate: 72.0,
            temperature: 98.6,
            spo2: 98.0,
        }
    }

    #[test]
    fn test_validate_accepts_normal_vitals() {
        assert!(validate_vitals(&normal()).is_ok());
    }

    #[test]
    fn test_validate_reports_every_bad_field() {
        let vitals = VitalSigns {
            systolic: 0.0,
            heart_rate: f64::NAN,
            spo2: 101.0,
            ..normal()
        };
        let err = validate_vitals(&vitals).unwrap_err();
        match &err {
            Error::InvalidVitals { fields } => assert_eq!(
                fields,
                &vec![VitalField::Systolic, VitalField::HeartRate, VitalField::Spo2]
            ),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "Invalid vital signs: systolic, heartRate, spo2 out of physiological range"
        );
    }

    #[test]
    fn test_range_edges() {
        let edges = VitalSigns {
            systolic: 300.0,
            diastolic: 250.0,
            heart_rate: 350.0,
            temperature: 75.0,
            spo2: 0.0,
        };
        assert!(validate_vitals(&edges).is_ok());
        assert!(validate_vitals(&VitalSigns {
            temperature: 115.1,
            ..edges
        })
        .is_err());
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let t = CriticalThresholds::default();
        assert!(assess_vitals(&normal(), &t).is_empty());

        let alerts = assess_vitals(
            &VitalSigns {
                systolic: 180.0,
                spo2: 90.0,
                ..normal()
            },
            &t,
        );
        let fields: Vec<VitalField> = alerts.iter().map(|a| a.field).collect();
        assert_eq!(fields, vec![VitalField::Systolic, VitalField::Spo2]);
        assert_eq!(alerts[0].breach, Breach::AtOrAbove);
        assert_eq!(alerts[1].to_string(), "spo2 90 <= 90");

        assert!(assess_vitals(
            &VitalSigns {
                systolic: 179.0,
                heart_rate: 41.0,
                temperature: 102.9,
                ..normal()
            },
            &t
        )
        .is_empty());
    }

    #[test]
    fn test_derive_severity() {
        let t = CriticalThresholds::default();
        assert_eq!(derive_severity(&normal(), Severity::Low, &t), Severity::Low);
        assert_eq!(
            derive_severity(&VitalSigns { heart_rate: 155.0, ..normal() }, Severity::Low, &t),
            Severity::Critical
        );
        assert_eq!(
            derive_severity(&VitalSigns { systolic: 85.0, ..normal() }, Severity::High, &t),
            Severity::Critical
        );
        assert_eq!(
            derive_severity(&VitalSigns { temperature: 104.0, ..normal() }, Severity::Medium, &t),
            Severity::Critical
        );
    }

    #[test]
    fn test_custom_thresholds() {
        let t = CriticalThresholds {
            spo2_low: 94.0,
            ..CriticalThresholds::default()
        };
        let vitals = VitalSigns { spo2: 93.0, ..normal() };
        assert_eq!(derive_severity(&vitals, Severity::Medium, &t), Severity::Critical);
        assert_eq!(
            derive_severity(&vitals, Severity::Medium, &CriticalThresholds::default()),
            Severity::Medium
        );
    }
}
