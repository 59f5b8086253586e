//! Configuration for the shield interceptor.

use std::sync::Arc;
use std::time::Duration;
use tower_shield_bulkhead::BulkheadConfig;
use tower_shield_core::metrics::{MetricsSink, NoopSink, SharedSink};
use tower_shield_retry::RetryConfig;

/// Naming function labeling requests for metrics.
pub type RequestNamer<Req> = Arc<dyn Fn(&Req) -> String + Send + Sync>;

/// Configuration for a [`ShieldLayer`](crate::ShieldLayer).
///
/// All pieces are optional; the defaults give a 10-slot bulkhead with a
/// 500µs admission wait and 3 retries with no backoff, retrying transport
/// errors and 5xx responses. Configuration is plain data fixed at build
/// time; the one runtime adjustment is resizing the bulkhead through the
/// handle on the built layer.
pub struct ShieldConfig<Req, Res, E> {
    pub(crate) name: String,
    pub(crate) bulkhead: BulkheadConfig,
    pub(crate) retry: RetryConfig<Req, Res, E>,
    pub(crate) request_timeout: Option<Duration>,
    pub(crate) sink: SharedSink,
    pub(crate) namer: Option<RequestNamer<Req>>,
}

impl<Req, Res, E> ShieldConfig<Req, Res, E> {
    pub fn builder() -> ShieldConfigBuilder<Req, Res, E> {
        ShieldConfigBuilder::new()
    }
}

/// Builder for [`ShieldConfig`].
pub struct ShieldConfigBuilder<Req, Res, E> {
    name: String,
    bulkhead: BulkheadConfig,
    retry: RetryConfig<Req, Res, E>,
    request_timeout: Option<Duration>,
    sink: SharedSink,
    namer: Option<RequestNamer<Req>>,
}

impl<Req, Res, E> ShieldConfigBuilder<Req, Res, E> {
    pub fn new() -> Self {
        Self {
            name: "shield".to_string(),
            bulkhead: BulkheadConfig::default(),
            retry: RetryConfig::default(),
            request_timeout: None,
            sink: Arc::new(NoopSink),
            namer: None,
        }
    }

    /// Names this interceptor instance. The bulkhead it owns is relabeled
    /// with the same name.
    ///
    /// Default: `"shield"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the admission gate's configuration.
    pub fn bulkhead(mut self, config: BulkheadConfig) -> Self {
        self.bulkhead = config;
        self
    }

    /// Sets the retry engine's configuration.
    pub fn retry(mut self, config: RetryConfig<Req, Res, E>) -> Self {
        self.retry = config;
        self
    }

    /// Bounds the whole logical call: admission wait plus every transport
    /// attempt and backoff. When the deadline fires the call unwinds,
    /// releasing its bulkhead slot and retry state.
    ///
    /// Default: no timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the metrics sink. The sink is shared with the bulkhead the
    /// interceptor owns, replacing whatever sink its configuration carried.
    ///
    /// Default: a no-op sink
    pub fn metrics_sink<M>(mut self, sink: M) -> Self
    where
        M: MetricsSink + 'static,
    {
        self.sink = Arc::new(sink);
        self
    }

    /// Overrides how requests are named for metric labels.
    ///
    /// Default: the request's own label, e.g. the full URI for
    /// `http::Request`.
    pub fn name_requests_with<F>(mut self, namer: F) -> Self
    where
        F: Fn(&Req) -> String + Send + Sync + 'static,
    {
        self.namer = Some(Arc::new(namer));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ShieldConfig<Req, Res, E> {
        let bulkhead = self
            .bulkhead
            .named(self.name.clone())
            .with_sink(Arc::clone(&self.sink));
        ShieldConfig {
            name: self.name,
            bulkhead,
            retry: self.retry,
            request_timeout: self.request_timeout,
            sink: self.sink,
            namer: self.namer,
        }
    }
}

impl<Req, Res, E> Default for ShieldConfigBuilder<Req, Res, E> {
    fn default() -> Self {
        Self::new()
    }
}
