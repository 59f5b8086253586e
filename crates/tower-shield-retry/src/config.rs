//! Configuration for the retry engine.

use crate::backoff::{
    ConstantBackoff, ExponentialBackoff, FnInterval, IntervalFunction, LinearBackoff,
};
use crate::events::RetryEvent;
use crate::policy::RetryPredicate;
use std::sync::Arc;
use std::time::Duration;
use tower_shield_core::events::{EventListeners, FnListener};

/// Configuration for a [`RetryPolicy`](crate::RetryPolicy).
pub struct RetryConfig<Req, Res, E> {
    pub(crate) max_retries: u32,
    pub(crate) backoff: Arc<dyn IntervalFunction>,
    pub(crate) predicate: Option<RetryPredicate<Req, Res, E>>,
    pub(crate) name: String,
    pub(crate) listeners: EventListeners<RetryEvent>,
}

impl<Req, Res, E> RetryConfig<Req, Res, E> {
    pub fn builder() -> RetryConfigBuilder<Req, Res, E> {
        RetryConfigBuilder::new()
    }

    /// Installs `predicate` only if none was configured. Used by
    /// composition layers that carry their own default.
    pub fn with_default_predicate(mut self, predicate: RetryPredicate<Req, Res, E>) -> Self {
        if self.predicate.is_none() {
            self.predicate = Some(predicate);
        }
        self
    }
}

impl<Req, Res, E> Default for RetryConfig<Req, Res, E> {
    fn default() -> Self {
        RetryConfigBuilder::new().build()
    }
}

/// Builder for [`RetryConfig`].
pub struct RetryConfigBuilder<Req, Res, E> {
    max_retries: u32,
    backoff: Arc<dyn IntervalFunction>,
    predicate: Option<RetryPredicate<Req, Res, E>>,
    name: String,
    listeners: EventListeners<RetryEvent>,
}

impl<Req, Res, E> RetryConfigBuilder<Req, Res, E> {
    /// Creates a builder with the defaults: 3 retries, no backoff (constant
    /// zero), and the driver's default predicate.
    pub fn new() -> Self {
        Self {
            max_retries: 3,
            backoff: Arc::new(ConstantBackoff::new(Duration::ZERO)),
            predicate: None,
            name: "retry".to_string(),
            listeners: EventListeners::new(),
        }
    }

    /// Sets how many retries a call may make beyond its first attempt.
    /// Zero disables retrying while keeping the engine in place.
    ///
    /// Default: 3
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Waits the same `interval` before every retry.
    pub fn constant_backoff(mut self, interval: Duration) -> Self {
        self.backoff = Arc::new(ConstantBackoff::new(interval));
        self
    }

    /// Grows the wait by `interval` per retry, capped at `max_wait`.
    pub fn linear_backoff(mut self, interval: Duration, max_wait: Duration) -> Self {
        self.backoff = Arc::new(LinearBackoff::new(interval, max_wait));
        self
    }

    /// Grows the wait by one additional unit of `exponent` per retry,
    /// capped at `max_wait`.
    pub fn exponential_backoff(mut self, exponent: Duration, max_wait: Duration) -> Self {
        self.backoff = Arc::new(ExponentialBackoff::new(exponent, max_wait));
        self
    }

    /// Sets a custom backoff schedule.
    pub fn backoff<I>(mut self, schedule: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        self.backoff = Arc::new(schedule);
        self
    }

    /// Sets a custom closure-based backoff schedule from the retry index.
    pub fn backoff_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) -> Duration + Send + Sync + 'static,
    {
        self.backoff = Arc::new(FnInterval::new(f));
        self
    }

    /// Sets the predicate deciding which outcomes are retried, replacing
    /// the default entirely. See [`on_errors`](crate::on_errors) and
    /// [`on_server_errors`](crate::on_server_errors).
    pub fn retry_on(mut self, predicate: RetryPredicate<Req, Res, E>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Sets the engine's name, used for event labeling.
    ///
    /// Default: `"retry"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked after each committed retry, with the
    /// 1-indexed retry number and the backoff that was waited.
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(u32, Duration) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    /// Registers a callback invoked when a call ends successfully, with the
    /// total number of attempts it took.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when the retry budget runs out while
    /// the outcome is still retryable.
    pub fn on_exhausted<F>(mut self, f: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Exhausted { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when a call fails with an outcome the
    /// predicate declined to retry.
    pub fn on_ignored_error<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if matches!(event, RetryEvent::IgnoredError { .. }) {
                f();
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> RetryConfig<Req, Res, E> {
        RetryConfig {
            max_retries: self.max_retries,
            backoff: self.backoff,
            predicate: self.predicate,
            name: self.name,
            listeners: self.listeners,
        }
    }
}

impl<Req, Res, E> Default for RetryConfigBuilder<Req, Res, E> {
    fn default() -> Self {
        Self::new()
    }
}
