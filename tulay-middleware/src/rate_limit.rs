//! Approximate sliding-window rate limiting per system code.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use tulay_types::SystemConfig;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Tracks recent dispatch timestamps per system and rejects calls once any
/// configured per-minute/hour/day threshold is reached.
///
/// This is an approximate sliding-window limiter, not a token bucket:
/// bursts straddling a window boundary are tolerated, only long-run
/// averages are bound. Entries older than 24 hours are pruned lazily on
/// each check.
#[derive(Default)]
pub struct RateLimiter {
    windows: RwLock<HashMap<String, Arc<Mutex<Vec<Instant>>>>>,
}

impl RateLimiter {
    /// Create an empty limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn window(&self, system_code: &str) -> Arc<Mutex<Vec<Instant>>> {
        if let Some(cell) = self
            .windows
            .read()
            .expect("rate limiter lock poisoned")
            .get(system_code)
        {
            return Arc::clone(cell);
        }
        let mut map = self.windows.write().expect("rate limiter lock poisoned");
        Arc::clone(map.entry(system_code.to_string()).or_default())
    }

    /// Whether a dispatch to `config`'s system would exceed its thresholds.
    #[must_use]
    pub fn is_exceeded(&self, config: &SystemConfig) -> bool {
        self.is_exceeded_at(config, Instant::now())
    }

    fn is_exceeded_at(&self, config: &SystemConfig, now: Instant) -> bool {
        let cell = self.window(&config.system_code);
        let mut calls = cell.lock().expect("rate limiter lock poisoned");
        calls.retain(|at| now.saturating_duration_since(*at) < DAY);

        let within = |span: Duration| {
            calls
                .iter()
                .filter(|at| now.saturating_duration_since(**at) < span)
                .count() as u32
        };
        let last_day = calls.len() as u32;
        config.rate_limit_exceeded(within(MINUTE), within(HOUR), last_day)
    }

    /// Record one dispatched call. Only calls that actually go out are
    /// recorded; rejected calls and cache hits consume no budget.
    pub fn record(&self, system_code: &str) {
        self.record_at(system_code, Instant::now());
    }

    fn record_at(&self, system_code: &str, at: Instant) {
        let cell = self.window(system_code);
        cell.lock().expect("rate limiter lock poisoned").push(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capped(minute: u32, hour: u32, day: u32) -> SystemConfig {
        let mut cfg = SystemConfig::new("SSS", "SSS", "https://sss.example");
        cfg.rate_limit_per_minute = Some(minute);
        cfg.rate_limit_per_hour = Some(hour);
        cfg.rate_limit_per_day = Some(day);
        cfg
    }

    #[test]
    fn minute_threshold_blocks_the_next_call() {
        let limiter = RateLimiter::new();
        let cfg = capped(3, 100, 1000);
        let base = Instant::now();

        for _ in 0..3 {
            assert!(!limiter.is_exceeded_at(&cfg, base));
            limiter.record_at("SSS", base);
        }
        assert!(limiter.is_exceeded_at(&cfg, base));
    }

    #[test]
    fn minute_window_slides() {
        let limiter = RateLimiter::new();
        let cfg = capped(2, 100, 1000);
        let base = Instant::now();

        limiter.record_at("SSS", base);
        limiter.record_at("SSS", base);
        assert!(limiter.is_exceeded_at(&cfg, base + Duration::from_secs(1)));
        // Both entries leave the minute window but still count hourly.
        assert!(!limiter.is_exceeded_at(&cfg, base + Duration::from_secs(61)));
    }

    #[test]
    fn hour_threshold_outlives_the_minute_window() {
        let limiter = RateLimiter::new();
        let cfg = capped(100, 2, 1000);
        let base = Instant::now();

        limiter.record_at("SSS", base);
        limiter.record_at("SSS", base + Duration::from_secs(120));
        assert!(limiter.is_exceeded_at(&cfg, base + Duration::from_secs(240)));
        assert!(!limiter.is_exceeded_at(&cfg, base + Duration::from_secs(3601)));
    }

    #[test]
    fn day_old_entries_are_pruned() {
        let limiter = RateLimiter::new();
        let cfg = capped(100, 100, 2);
        let base = Instant::now();

        limiter.record_at("SSS", base);
        limiter.record_at("SSS", base);
        assert!(limiter.is_exceeded_at(&cfg, base + Duration::from_secs(60)));
        let next_day = base + DAY + Duration::from_secs(1);
        assert!(!limiter.is_exceeded_at(&cfg, next_day));
    }

    #[test]
    fn systems_do_not_share_windows() {
        let limiter = RateLimiter::new();
        let cfg = capped(1, 100, 1000);
        let base = Instant::now();

        limiter.record_at("PHILSYS", base);
        assert!(!limiter.is_exceeded_at(&cfg, base));
    }
}
