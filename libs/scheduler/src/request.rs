//! Schedule request and result types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One requested surgery, occupying the half-open interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurgeryRequest {
    pub id: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub procedure: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default = "default_priority_weight")]
    pub priority_weight: u32,
    pub revenue: Decimal,
}

fn default_priority_weight() -> u32 {
    1
}

impl SurgeryRequest {
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Half-open overlap: back-to-back surgeries do not conflict.
    pub fn overlaps(&self, other: &SurgeryRequest) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// What a surgery is worth to the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightingMode {
    /// Weight is the expected revenue.
    Revenue,
    /// Weight is revenue scaled by the clinical priority weight.
    PriorityRevenue,
}

impl WeightingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightingMode::Revenue => "revenue",
            WeightingMode::PriorityRevenue => "priority-revenue",
        }
    }

    /// `None` when the product does not fit in a `Decimal`.
    pub fn weight(&self, surgery: &SurgeryRequest) -> Option<Decimal> {
        match self {
            WeightingMode::Revenue => Some(surgery.revenue),
            WeightingMode::PriorityRevenue => surgery
                .revenue
                .checked_mul(Decimal::from(surgery.priority_weight)),
        }
    }
}

impl fmt::Display for WeightingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "revenue" => Ok(WeightingMode::Revenue),
            "priority-revenue" => Ok(WeightingMode::PriorityRevenue),
            other => Err(format!(
                "unknown weighting '{other}' (expected 'revenue' or 'priority-revenue')"
            )),
        }
    }
}

/// Window the room is available, used for validation and utilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Horizon {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Horizon {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    pub fn contains(&self, surgery: &SurgeryRequest) -> bool {
        self.start <= surgery.start && surgery.end <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub surgeries: Vec<SurgeryRequest>,
    pub weighting: WeightingMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<Horizon>,
}

impl ScheduleRequest {
    pub fn new(surgeries: Vec<SurgeryRequest>, weighting: WeightingMode) -> Self {
        Self {
            surgeries,
            weighting,
            horizon: None,
        }
    }

    pub fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = Some(horizon);
        self
    }
}

/// Optimal non-overlapping selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Selected surgeries ordered by start time.
    pub selected: Vec<SurgeryRequest>,
    pub weighting: WeightingMode,
    pub total_weight: Decimal,
    pub total_revenue: Decimal,
    /// Booked time over horizon length, in `[0, 1]`.
    pub utilization: f64,
    pub surgery_count: usize,
    /// Requests that were not selected.
    pub declined_count: usize,
    /// Horizon used for utilization; `None` for an empty request without one.
    pub horizon: Option<Horizon>,
}
