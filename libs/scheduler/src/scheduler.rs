//! Weighted interval scheduling
//!
//! Surgeries are sorted by `(end, start, id)`. For each surgery `i`, `p(i)`
//! is the number of earlier surgeries ending no later than `i` starts, found
//! by binary search over the sorted end times. Then
//!
//! ```text
//! OPT(0) = 0
//! OPT(i) = max(OPT(i-1), w(i) + OPT(p(i)))
//! ```
//!
//! A surgery is taken only when it strictly improves on skipping it, so for
//! equal totals the selection built from earlier-ending surgeries wins. The
//! decisions are recorded during the forward pass and replayed backwards.

use crate::error::{Error, Result};
use crate::metrics::{SchedulerMetrics, SchedulerRecorder};
use crate::request::{Horizon, Schedule, ScheduleRequest, SurgeryRequest, WeightingMode};
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Stateless optimizer with run metrics.
#[derive(Debug, Default)]
pub struct Scheduler {
    metrics: SchedulerRecorder,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optimize(&self, request: &ScheduleRequest) -> Result<Schedule> {
        let _timing = self.metrics.run_time.start();
        self.metrics.runs.incr();

        let schedule = match optimize(request) {
            Ok(schedule) => schedule,
            Err(e) => {
                self.metrics.rejected_runs.incr();
                tracing::warn!(error = %e, "Schedule request rejected");
                return Err(e);
            }
        };

        self.metrics
            .requests_considered
            .add(request.surgeries.len() as u64);
        self.metrics
            .record_selection(schedule.surgery_count, schedule.total_weight);

        tracing::info!(
            weighting = %request.weighting,
            requested = request.surgeries.len(),
            selected = schedule.surgery_count,
            total_weight = %schedule.total_weight,
            utilization = schedule.utilization,
            "Schedule optimized"
        );

        Ok(schedule)
    }

    pub fn metrics(&self) -> SchedulerMetrics {
        self.metrics.snapshot()
    }
}

/// Validate `request` and compute the maximum-weight compatible selection.
pub fn optimize(request: &ScheduleRequest) -> Result<Schedule> {
    validate(request)?;

    let weighting = request.weighting;
    let mut sorted: Vec<&SurgeryRequest> = request.surgeries.iter().collect();
    sorted.sort_by(|a, b| {
        a.end
            .cmp(&b.end)
            .then_with(|| a.start.cmp(&b.start))
            .then_with(|| a.id.cmp(&b.id))
    });

    let weights = sorted
        .iter()
        .map(|s| weighting.weight(s).ok_or(Error::WeightOverflow))
        .collect::<Result<Vec<Decimal>>>()?;

    let n = sorted.len();
    let ends: Vec<_> = sorted.iter().map(|s| s.end).collect();
    let compatible: Vec<usize> = sorted
        .iter()
        .enumerate()
        .map(|(i, s)| ends[..i].partition_point(|end| *end <= s.start))
        .collect();

    let mut opt = vec![Decimal::ZERO; n + 1];
    let mut take = vec![false; n];
    for i in 0..n {
        let with = weights[i]
            .checked_add(opt[compatible[i]])
            .ok_or(Error::WeightOverflow)?;
        if with > opt[i] {
            opt[i + 1] = with;
            take[i] = true;
        } else {
            opt[i + 1] = opt[i];
        }
    }

    let mut selected = Vec::new();
    let mut i = n;
    while i > 0 {
        if take[i - 1] {
            selected.push(sorted[i - 1].clone());
            i = compatible[i - 1];
        } else {
            i -= 1;
        }
    }
    selected.reverse();

    Ok(summarize(request, selected, opt[n], weighting))
}

fn validate(request: &ScheduleRequest) -> Result<()> {
    if let Some(horizon) = &request.horizon {
        if horizon.start >= horizon.end {
            return Err(Error::InvalidHorizon {
                start: horizon.start,
                end: horizon.end,
            });
        }
    }

    let mut seen = HashSet::with_capacity(request.surgeries.len());
    for (position, surgery) in request.surgeries.iter().enumerate() {
        if surgery.id.trim().is_empty() {
            return Err(Error::EmptyId { position });
        }
        if !seen.insert(surgery.id.as_str()) {
            return Err(Error::DuplicateId(surgery.id.clone()));
        }
        if surgery.start >= surgery.end {
            return Err(Error::InvalidInterval {
                id: surgery.id.clone(),
                start: surgery.start,
                end: surgery.end,
            });
        }
        if surgery.revenue < Decimal::ZERO {
            return Err(Error::NegativeRevenue {
                id: surgery.id.clone(),
            });
        }
        if let Some(horizon) = &request.horizon {
            if !horizon.contains(surgery) {
                return Err(Error::OutsideHorizon {
                    id: surgery.id.clone(),
                });
            }
        }
    }

    Ok(())
}

fn summarize(
    request: &ScheduleRequest,
    selected: Vec<SurgeryRequest>,
    total_weight: Decimal,
    weighting: WeightingMode,
) -> Schedule {
    let horizon = request.horizon.or_else(|| {
        let start = request.surgeries.iter().map(|s| s.start).min()?;
        let end = request.surgeries.iter().map(|s| s.end).max()?;
        Some(Horizon::new(start, end))
    });

    let booked: i64 = selected.iter().map(|s| s.duration().num_seconds()).sum();
    let utilization = match horizon.map(|h| h.duration().num_seconds()) {
        Some(available) if available > 0 => (booked as f64 / available as f64).min(1.0),
        _ => 0.0,
    };

    // Bounded by the weight sum, which was already checked.
    let total_revenue = selected
        .iter()
        .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.revenue));

    Schedule {
        surgery_count: selected.len(),
        declined_count: request.surgeries.len() - selected.len(),
        selected,
        weighting,
        total_weight,
        total_revenue,
        utilization,
        horizon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 5, hour, 0, 0).unwrap()
    }

    fn surgery(id: &str, start: u32, end: u32, revenue: i64) -> SurgeryRequest {
        SurgeryRequest {
            id: id.into(),
            patient_name: format!("Patient {id}"),
            procedure: "procedure".into(),
            start: at(start),
            end: at(end),
            priority_weight: 1,
            revenue: Decimal::from(revenue),
        }
    }

    fn ids(schedule: &Schedule) -> Vec<&str> {
        schedule.selected.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_classic_three_surgery_case() {
        let request = ScheduleRequest::new(
            vec![
                surgery("first", 0, 2, 500),
                surgery("second", 1, 3, 600),
                surgery("third", 2, 4, 700),
            ],
            WeightingMode::Revenue,
        );
        let schedule = optimize(&request).unwrap();
        assert_eq!(ids(&schedule), vec!["first", "third"]);
        assert_eq!(schedule.total_revenue, Decimal::from(1200));
        assert_eq!(schedule.total_weight, Decimal::from(1200));
        assert_eq!(schedule.declined_count, 1);
        assert!((schedule.utilization - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_request() {
        let schedule = optimize(&ScheduleRequest::new(Vec::new(), WeightingMode::Revenue)).unwrap();
        assert!(schedule.selected.is_empty());
        assert_eq!(schedule.total_revenue, Decimal::ZERO);
        assert_eq!(schedule.utilization, 0.0);
        assert!(schedule.horizon.is_none());
    }

    #[test]
    fn test_identical_intervals_are_exclusive() {
        let request = ScheduleRequest::new(
            vec![surgery("a", 8, 10, 100), surgery("b", 8, 10, 300)],
            WeightingMode::Revenue,
        );
        assert_eq!(ids(&optimize(&request).unwrap()), vec!["b"]);
    }

    #[test]
    fn test_tie_prefers_skipping() {
        // Both selections total 500; "late" only matches, it never strictly improves.
        let request = ScheduleRequest::new(
            vec![surgery("early", 8, 10, 500), surgery("late", 9, 11, 500)],
            WeightingMode::Revenue,
        );
        assert_eq!(ids(&optimize(&request).unwrap()), vec!["early"]);
    }

    #[test]
    fn test_priority_weighting_changes_selection() {
        let mut urgent = surgery("urgent", 8, 12, 400);
        urgent.priority_weight = 5;
        let request = ScheduleRequest::new(
            vec![urgent, surgery("elective-a", 8, 10, 900), surgery("elective-b", 10, 12, 900)],
            WeightingMode::Revenue,
        );
        assert_eq!(ids(&optimize(&request).unwrap()), vec!["elective-a", "elective-b"]);

        let request = ScheduleRequest {
            weighting: WeightingMode::PriorityRevenue,
            ..request
        };
        let schedule = optimize(&request).unwrap();
        assert_eq!(ids(&schedule), vec!["urgent"]);
        assert_eq!(schedule.total_weight, Decimal::from(2000));
        assert_eq!(schedule.total_revenue, Decimal::from(400));
    }

    #[test]
    fn test_explicit_horizon_drives_utilization() {
        let request = ScheduleRequest::new(vec![surgery("a", 8, 10, 100)], WeightingMode::Revenue)
            .with_horizon(Horizon::new(at(8), at(16)));
        let schedule = optimize(&request).unwrap();
        assert!((schedule.utilization - 0.25).abs() < 1e-12);
    }

    fn rejected(request: ScheduleRequest) -> Error {
        let err = optimize(&request).unwrap_err();
        assert!(err.is_validation(), "not a validation error: {err}");
        err
    }

    #[test]
    fn test_validation_errors() {
        let single = |s: SurgeryRequest| ScheduleRequest::new(vec![s], WeightingMode::Revenue);

        assert!(matches!(
            rejected(single(surgery("a", 10, 10, 1))),
            Error::InvalidInterval { .. }
        ));
        assert!(matches!(
            rejected(single(surgery("a", 8, 9, -1))),
            Error::NegativeRevenue { .. }
        ));
        assert!(matches!(
            rejected(single(surgery(" ", 8, 9, 1))),
            Error::EmptyId { position: 0 }
        ));
        assert!(matches!(
            rejected(ScheduleRequest::new(
                vec![surgery("a", 8, 9, 1), surgery("a", 9, 10, 1)],
                WeightingMode::Revenue,
            )),
            Error::DuplicateId(ref id) if id == "a"
        ));
        assert!(matches!(
            rejected(single(surgery("a", 8, 9, 1)).with_horizon(Horizon::new(at(9), at(8)))),
            Error::InvalidHorizon { .. }
        ));
        assert!(matches!(
            rejected(single(surgery("a", 7, 9, 1)).with_horizon(Horizon::new(at(8), at(17)))),
            Error::OutsideHorizon { .. }
        ));
    }

    #[test]
    fn test_zero_revenue_is_allowed() {
        let request = ScheduleRequest::new(vec![surgery("free", 8, 9, 0)], WeightingMode::Revenue);
        let schedule = optimize(&request).unwrap();
        assert!(schedule.selected.is_empty());
        assert_eq!(schedule.declined_count, 1);
    }

    #[test]
    fn test_scheduler_metrics() {
        let scheduler = Scheduler::new();
        scheduler
            .optimize(&ScheduleRequest::new(
                vec![surgery("a", 8, 10, 250), surgery("b", 10, 11, 100)],
                WeightingMode::Revenue,
            ))
            .unwrap();
        assert!(scheduler
            .optimize(&ScheduleRequest::new(
                vec![surgery("x", 9, 8, 1)],
                WeightingMode::Revenue
            ))
            .is_err());

        let metrics = scheduler.metrics();
        assert_eq!(metrics.runs, 2);
        assert_eq!(metrics.rejected_runs, 1);
        assert_eq!(metrics.requests_considered, 2);
        assert_eq!(metrics.last_selected, 2);
        assert_eq!(metrics.last_total_weight, Decimal::from(350));
        assert_eq!(metrics.run_time.count, 2);
    }
}
