//! Configuration for the bulkhead.

use crate::events::BulkheadEvent;
use std::sync::Arc;
use std::time::Duration;
use tower_shield_core::events::{EventListeners, FnListener};
use tower_shield_core::metrics::{MetricsSink, NoopSink, SharedSink};

/// Configuration for a [`Bulkhead`](crate::Bulkhead) gate.
///
/// Plain data, fixed once the gate is built; the only runtime mutation a
/// gate supports is [`resize`](crate::Bulkhead::resize).
#[derive(Clone)]
pub struct BulkheadConfig {
    pub(crate) max_concurrent_calls: usize,
    pub(crate) max_wait: Duration,
    pub(crate) name: String,
    pub(crate) active: bool,
    pub(crate) listeners: EventListeners<BulkheadEvent>,
    pub(crate) sink: SharedSink,
}

impl BulkheadConfig {
    pub fn builder() -> BulkheadConfigBuilder {
        BulkheadConfigBuilder::new()
    }

    /// Replaces the name. Used by composition layers that label every
    /// pattern they own with one instance name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the metrics sink. Used by composition layers that share one
    /// sink across every pattern they own.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }
}

impl Default for BulkheadConfig {
    fn default() -> Self {
        BulkheadConfigBuilder::new().build()
    }
}

/// Builder for [`BulkheadConfig`].
pub struct BulkheadConfigBuilder {
    max_concurrent_calls: usize,
    max_wait: Duration,
    name: String,
    active: bool,
    listeners: EventListeners<BulkheadEvent>,
    sink: SharedSink,
}

impl BulkheadConfigBuilder {
    /// Creates a builder with the defaults: 10 concurrent calls, 500µs
    /// admission wait, active.
    pub fn new() -> Self {
        Self {
            max_concurrent_calls: 10,
            max_wait: Duration::from_micros(500),
            name: "bulkhead".to_string(),
            active: true,
            listeners: EventListeners::new(),
            sink: Arc::new(NoopSink),
        }
    }

    /// Sets the maximum number of concurrently admitted calls. Must be
    /// greater than zero.
    ///
    /// Default: 10
    pub fn max_concurrent_calls(mut self, max: usize) -> Self {
        self.max_concurrent_calls = max;
        self
    }

    /// Sets how long an admission attempt waits for a slot before it is
    /// rejected.
    ///
    /// Default: 500µs
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Sets the gate's name, used for event and metric labeling.
    ///
    /// Default: `"bulkhead"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enables or disables enforcement. A disabled gate admits every call
    /// immediately and never blocks.
    ///
    /// Default: enabled
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets the metrics sink receiving admission observations.
    ///
    /// Default: a no-op sink
    pub fn metrics_sink<M>(mut self, sink: M) -> Self
    where
        M: MetricsSink + 'static,
    {
        self.sink = Arc::new(sink);
        self
    }

    /// Registers a callback invoked when a call is admitted, with the number
    /// of concurrently admitted calls after this one.
    pub fn on_admitted<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let BulkheadEvent::Admitted {
                concurrent_calls, ..
            } = event
            {
                f(*concurrent_calls);
            }
        }));
        self
    }

    /// Registers a callback invoked when a call is rejected, with the
    /// capacity that was exhausted.
    pub fn on_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let BulkheadEvent::Rejected {
                max_concurrent_calls,
                ..
            } = event
            {
                f(*max_concurrent_calls);
            }
        }));
        self
    }

    /// Registers a callback invoked when a slot is released, with the number
    /// of calls still admitted.
    pub fn on_released<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.listeners.add(FnListener::new(move |event| {
            if let BulkheadEvent::Released {
                concurrent_calls, ..
            } = event
            {
                f(*concurrent_calls);
            }
        }));
        self
    }

    /// Builds the configuration.
    ///
    /// # Panics
    ///
    /// Panics if `max_concurrent_calls` is zero; a gate that can admit
    /// nobody is a configuration error, not a runtime state.
    pub fn build(self) -> BulkheadConfig {
        assert!(
            self.max_concurrent_calls > 0,
            "bulkhead max_concurrent_calls must be greater than zero"
        );
        BulkheadConfig {
            max_concurrent_calls: self.max_concurrent_calls,
            max_wait: self.max_wait,
            name: self.name,
            active: self.active,
            listeners: self.listeners,
            sink: self.sink,
        }
    }
}

impl Default for BulkheadConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
