//! Tower layer implementation for the shield interceptor.

use crate::config::{RequestNamer, ShieldConfig};
use crate::service::Shield;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;
use tower_shield_bulkhead::Bulkhead;
use tower_shield_core::metrics::SharedSink;
use tower_shield_core::ResponseStatus;
use tower_shield_retry::{on_server_errors, RetryPolicy};

/// Layer composing bulkhead admission and retry around a transport.
///
/// All services produced by one layer share the same gate and the same
/// retry engine, so the concurrency bound applies across clones. The chain
/// is fixed once the layer is built.
pub struct ShieldLayer<Req, Res, E> {
    bulkhead: Bulkhead,
    policy: Arc<RetryPolicy<Req, Res, E>>,
    sink: SharedSink,
    namer: Option<RequestNamer<Req>>,
    request_timeout: Option<Duration>,
}

impl<Req, Res, E> ShieldLayer<Req, Res, E>
where
    Res: ResponseStatus,
{
    /// Creates a layer from its configuration.
    ///
    /// Unless the retry configuration carries its own predicate, the
    /// interceptor retries transport errors and 5xx responses.
    pub fn new(config: ShieldConfig<Req, Res, E>) -> Self {
        let retry = config.retry.with_default_predicate(on_server_errors());
        Self {
            bulkhead: Bulkhead::new(config.bulkhead),
            policy: Arc::new(RetryPolicy::new(retry)),
            sink: config.sink,
            namer: config.namer,
            request_timeout: config.request_timeout,
        }
    }

    /// Creates a builder for the layer's configuration.
    pub fn builder() -> crate::config::ShieldConfigBuilder<Req, Res, E> {
        crate::config::ShieldConfigBuilder::new()
    }
}

impl<Req, Res, E> ShieldLayer<Req, Res, E> {
    /// Handle to the shared admission gate, e.g. for a live
    /// [`resize`](Bulkhead::resize).
    pub fn bulkhead(&self) -> &Bulkhead {
        &self.bulkhead
    }

    /// Handle to the shared retry engine.
    pub fn policy(&self) -> &Arc<RetryPolicy<Req, Res, E>> {
        &self.policy
    }
}

impl<Req, Res, E> Clone for ShieldLayer<Req, Res, E> {
    fn clone(&self) -> Self {
        Self {
            bulkhead: self.bulkhead.clone(),
            policy: Arc::clone(&self.policy),
            sink: Arc::clone(&self.sink),
            namer: self.namer.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl<S, Req, Res, E> Layer<S> for ShieldLayer<Req, Res, E> {
    type Service = Shield<S, Req, Res, E>;

    fn layer(&self, service: S) -> Self::Service {
        Shield::new(
            service,
            self.bulkhead.clone(),
            Arc::clone(&self.policy),
            Arc::clone(&self.sink),
            self.namer.clone(),
            self.request_timeout,
        )
    }
}
