//! In-memory per-system resilience counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};

use tulay_types::{HealthSnapshot, RetryPolicy};

#[derive(Default)]
struct Stamps {
    last_attempt: Option<DateTime<Utc>>,
    last_success: Option<DateTime<Utc>>,
    last_failure: Option<DateTime<Utc>>,
}

/// Counters for one system. Counts are atomic so concurrent batch entries
/// interleave safely; only the timestamps share a lock.
#[derive(Default)]
struct SystemHealth {
    attempts: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    non_retryable_failures: AtomicU64,
    total_response_time_ms: AtomicU64,
    stamps: Mutex<Stamps>,
}

impl SystemHealth {
    fn stamp(&self, f: impl FnOnce(&mut Stamps)) {
        f(&mut self.stamps.lock().expect("metrics lock poisoned"));
    }
}

/// Accumulates attempt/success/failure counts and timing per system code.
///
/// State lives in memory only and resets on process restart. Systems are
/// independent cells behind a shared read-mostly map, so recording for one
/// partner never contends with another.
#[derive(Default)]
pub(crate) struct HealthTracker {
    systems: RwLock<HashMap<String, Arc<SystemHealth>>>,
}

impl HealthTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn cell(&self, system_code: &str) -> Arc<SystemHealth> {
        if let Some(cell) = self
            .systems
            .read()
            .expect("metrics lock poisoned")
            .get(system_code)
        {
            return Arc::clone(cell);
        }
        let mut map = self.systems.write().expect("metrics lock poisoned");
        Arc::clone(map.entry(system_code.to_string()).or_default())
    }

    /// One physical dispatch attempt.
    pub(crate) fn record_attempt(&self, system_code: &str) {
        let cell = self.cell(system_code);
        cell.attempts.fetch_add(1, Ordering::Relaxed);
        cell.stamp(|s| s.last_attempt = Some(Utc::now()));
    }

    /// Terminal success of a logical call.
    pub(crate) fn record_success(&self, system_code: &str, response_time_ms: u64) {
        let cell = self.cell(system_code);
        cell.successes.fetch_add(1, Ordering::Relaxed);
        cell.total_response_time_ms
            .fetch_add(response_time_ms, Ordering::Relaxed);
        cell.stamp(|s| s.last_success = Some(Utc::now()));
    }

    /// Terminal failure of a logical call after its retry budget.
    pub(crate) fn record_failure(&self, system_code: &str, response_time_ms: u64) {
        let cell = self.cell(system_code);
        cell.failures.fetch_add(1, Ordering::Relaxed);
        cell.total_response_time_ms
            .fetch_add(response_time_ms, Ordering::Relaxed);
        cell.stamp(|s| s.last_failure = Some(Utc::now()));
    }

    /// Terminal classified-fatal failure of a logical call.
    pub(crate) fn record_non_retryable(&self, system_code: &str) {
        let cell = self.cell(system_code);
        cell.non_retryable_failures.fetch_add(1, Ordering::Relaxed);
        cell.stamp(|s| s.last_failure = Some(Utc::now()));
    }

    /// Snapshot one system's counters; `None` when it has no recorded
    /// traffic yet.
    pub(crate) fn snapshot(
        &self,
        system_code: &str,
        retry_policy: Option<RetryPolicy>,
    ) -> Option<HealthSnapshot> {
        let cell = {
            let map = self.systems.read().expect("metrics lock poisoned");
            Arc::clone(map.get(system_code)?)
        };

        let attempts = cell.attempts.load(Ordering::Relaxed);
        let successes = cell.successes.load(Ordering::Relaxed);
        let failures = cell.failures.load(Ordering::Relaxed);
        let total_time = cell.total_response_time_ms.load(Ordering::Relaxed);
        let terminal = successes + failures;
        let stamps = cell.stamps.lock().expect("metrics lock poisoned");

        Some(HealthSnapshot {
            system_code: system_code.to_string(),
            total_attempts: attempts,
            total_successes: successes,
            total_failures: failures,
            total_non_retryable_failures: cell.non_retryable_failures.load(Ordering::Relaxed),
            success_rate: if attempts > 0 {
                successes as f64 / attempts as f64
            } else {
                0.0
            },
            average_response_time_ms: if terminal > 0 {
                total_time as f64 / terminal as f64
            } else {
                0.0
            },
            last_attempt: stamps.last_attempt,
            last_success: stamps.last_success,
            last_failure: stamps.last_failure,
            retry_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_derives_rates_from_counters() {
        let tracker = HealthTracker::new();
        assert!(tracker.snapshot("SSS", None).is_none());

        for _ in 0..5 {
            tracker.record_attempt("SSS");
        }
        tracker.record_success("SSS", 100);
        tracker.record_success("SSS", 200);
        tracker.record_success("SSS", 300);
        tracker.record_failure("SSS", 400);
        tracker.record_failure("SSS", 0);

        let snap = tracker.snapshot("SSS", None).unwrap();
        assert_eq!(snap.total_attempts, 5);
        assert_eq!(snap.total_successes, 3);
        assert_eq!(snap.total_failures, 2);
        assert_eq!(snap.total_non_retryable_failures, 0);
        assert_eq!(snap.success_rate, 3.0 / 5.0);
        assert_eq!(snap.average_response_time_ms, 1_000.0 / 5.0);
        assert!(snap.last_attempt.is_some());
        assert!(snap.last_failure.is_some());
    }

    #[test]
    fn systems_track_independently() {
        let tracker = HealthTracker::new();
        tracker.record_attempt("SSS");
        tracker.record_attempt("BIR");
        tracker.record_non_retryable("BIR");

        assert_eq!(tracker.snapshot("SSS", None).unwrap().total_attempts, 1);
        let bir = tracker.snapshot("BIR", None).unwrap();
        assert_eq!(bir.total_non_retryable_failures, 1);
        assert_eq!(bir.total_successes, 0);
    }
}
