use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic event counter.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn incr(&self) {
        self.add(1);
    }

    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Point-in-time value that can move in both directions (queue depth, cache size).
#[derive(Debug, Default)]
pub struct Gauge(AtomicI64);

impl Gauge {
    pub const fn new() -> Self {
        Self(AtomicI64::new(0))
    }

    pub fn set(&self, value: i64) {
        self.0.store(value, Ordering::Relaxed);
    }

    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decr(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Running count / total / max of observed durations.
#[derive(Debug, Default)]
pub struct DurationStat {
    count: AtomicU64,
    total_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl DurationStat {
    pub const fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            total_nanos: AtomicU64::new(0),
            max_nanos: AtomicU64::new(0),
        }
    }

    pub fn record(&self, elapsed: Duration) {
        // Saturate instead of wrapping: a u64 of nanoseconds is ~584 years.
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);
    }

    /// Start timing an operation; the elapsed time is recorded when the guard drops.
    pub fn start(&self) -> Timing<'_> {
        Timing {
            stat: self,
            started: Instant::now(),
        }
    }

    pub fn snapshot(&self) -> DurationSnapshot {
        let count = self.count.load(Ordering::Relaxed);
        let total = self.total_nanos.load(Ordering::Relaxed);
        let max = self.max_nanos.load(Ordering::Relaxed);

        DurationSnapshot {
            count,
            total_micros: total / 1_000,
            max_micros: max / 1_000,
            mean_micros: if count == 0 {
                0.0
            } else {
                total as f64 / count as f64 / 1_000.0
            },
        }
    }
}

/// Drop guard returned by [`DurationStat::start`].
#[must_use = "the timing is recorded when the guard is dropped"]
pub struct Timing<'a> {
    stat: &'a DurationStat,
    started: Instant,
}

impl Drop for Timing<'_> {
    fn drop(&mut self) {
        self.stat.record(self.started.elapsed());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationSnapshot {
    pub count: u64,
    pub total_micros: u64,
    pub max_micros: u64,
    pub mean_micros: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_and_gauge() {
        let counter = Counter::new();
        counter.incr();
        counter.add(4);
        assert_eq!(counter.get(), 5);

        let gauge = Gauge::new();
        gauge.incr();
        gauge.incr();
        gauge.decr();
        assert_eq!(gauge.get(), 1);
        gauge.set(-3);
        assert_eq!(gauge.get(), -3);
    }

    #[test]
    fn test_duration_stat_tracks_mean_and_max() {
        let stat = DurationStat::new();
        stat.record(Duration::from_micros(10));
        stat.record(Duration::from_micros(30));

        let snap = stat.snapshot();
        assert_eq!(snap.count, 2);
        assert_eq!(snap.total_micros, 40);
        assert_eq!(snap.max_micros, 30);
        assert!((snap.mean_micros - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_duration_stat() {
        let snap = DurationStat::new().snapshot();
        assert_eq!(snap.count, 0);
        assert_eq!(snap.mean_micros, 0.0);
    }

    #[test]
    fn test_timing_guard_records_on_drop() {
        let stat = DurationStat::new();
        {
            let _timing = stat.start();
        }
        assert_eq!(stat.snapshot().count, 1);
    }
}
