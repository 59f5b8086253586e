//! Backoff schedules.
//!
//! A schedule is a pure function of the retry index, so one instance can
//! serve any number of concurrent retry sequences; the per-call index comes
//! from the engine's attempt tracking.

use std::time::Duration;

/// Computes the wait before the n-th retry (0-indexed).
pub trait IntervalFunction: Send + Sync {
    fn interval(&self, retry: usize) -> Duration;
}

/// The same wait before every retry.
#[derive(Debug, Clone, Copy)]
pub struct ConstantBackoff {
    interval: Duration,
}

impl ConstantBackoff {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl IntervalFunction for ConstantBackoff {
    fn interval(&self, _retry: usize) -> Duration {
        self.interval
    }
}

/// Wait grows by `interval` per retry, capped at `max_wait`.
///
/// `LinearBackoff::new(10s, 60s)` yields 10s, 20s, 30s, 40s, 50s, 60s,
/// 60s, ...
#[derive(Debug, Clone, Copy)]
pub struct LinearBackoff {
    interval: Duration,
    max_wait: Duration,
}

impl LinearBackoff {
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }
}

impl IntervalFunction for LinearBackoff {
    fn interval(&self, retry: usize) -> Duration {
        let steps = u32::try_from(retry.saturating_add(1)).unwrap_or(u32::MAX);
        self.interval.saturating_mul(steps).min(self.max_wait)
    }
}

/// Wait grows by one additional unit of `exponent` per retry, capped at
/// `max_wait`.
///
/// The n-th retry waits `exponent × (1 + n(n+1)/2)`:
/// `ExponentialBackoff::new(5s, 60s)` yields 5s, 10s, 20s, 35s, 55s, 60s,
/// 60s, ...
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    exponent: Duration,
    max_wait: Duration,
}

impl ExponentialBackoff {
    pub fn new(exponent: Duration, max_wait: Duration) -> Self {
        Self { exponent, max_wait }
    }
}

impl IntervalFunction for ExponentialBackoff {
    fn interval(&self, retry: usize) -> Duration {
        let n = retry as u64;
        let units = n
            .checked_mul(n.saturating_add(1))
            .map(|t| t / 2)
            .and_then(|t| t.checked_add(1))
            .unwrap_or(u64::MAX);
        let steps = u32::try_from(units).unwrap_or(u32::MAX);
        self.exponent.saturating_mul(steps).min(self.max_wait)
    }
}

/// Adapts a closure as a schedule.
pub struct FnInterval<F> {
    f: F,
}

impl<F> FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> IntervalFunction for FnInterval<F>
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn interval(&self, retry: usize) -> Duration {
        (self.f)(retry)
    }
}
