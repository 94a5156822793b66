//! Scheduler recorder

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wardline_metrics::{Counter, DurationSnapshot, DurationStat, ExportMetrics, Gauge, Sample};

#[derive(Debug, Default)]
pub(crate) struct SchedulerRecorder {
    pub(crate) runs: Counter,
    pub(crate) rejected_runs: Counter,
    pub(crate) requests_considered: Counter,
    pub(crate) last_selected: Gauge,
    // Hundredths, so the gauge stays integral.
    pub(crate) last_weight_cents: Gauge,
    pub(crate) run_time: DurationStat,
}

impl SchedulerRecorder {
    pub(crate) fn record_selection(&self, selected: usize, weight: Decimal) {
        self.last_selected.set(selected as i64);
        let cents = (weight * Decimal::ONE_HUNDRED)
            .round()
            .to_i64()
            .unwrap_or(i64::MAX);
        self.last_weight_cents.set(cents);
    }

    pub(crate) fn snapshot(&self) -> SchedulerMetrics {
        SchedulerMetrics {
            runs: self.runs.get(),
            rejected_runs: self.rejected_runs.get(),
            requests_considered: self.requests_considered.get(),
            last_selected: self.last_selected.get().max(0) as u64,
            last_total_weight: Decimal::new(self.last_weight_cents.get(), 2),
            run_time: self.run_time.snapshot(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerMetrics {
    pub runs: u64,
    pub rejected_runs: u64,
    pub requests_considered: u64,
    pub last_selected: u64,
    pub last_total_weight: Decimal,
    pub run_time: DurationSnapshot,
}

impl ExportMetrics for SchedulerMetrics {
    fn samples(&self) -> Vec<Sample> {
        vec![
            Sample::counter("wardline_scheduler_runs_total", "Schedule optimizations", self.runs),
            Sample::counter(
                "wardline_scheduler_rejected_runs_total",
                "Schedule requests rejected by validation",
                self.rejected_runs,
            ),
            Sample::counter(
                "wardline_scheduler_requests_considered_total",
                "Surgery requests considered by the optimizer",
                self.requests_considered,
            ),
            Sample::gauge(
                "wardline_scheduler_last_selected",
                "Surgeries selected by the latest run",
                self.last_selected as f64,
            ),
            Sample::gauge(
                "wardline_scheduler_last_total_weight",
                "Total weight of the latest selection",
                self.last_total_weight.to_f64().unwrap_or_default(),
            ),
        ]
    }
}
