//! Tower layer implementation for retry.

use crate::config::RetryConfig;
use crate::policy::RetryPolicy;
use crate::Retry;
use std::sync::Arc;
use tower::Layer;

/// Layer that retries failed calls through a shared [`RetryPolicy`].
///
/// Every service produced by this layer shares one engine; each call still
/// tracks its own attempts under its own token.
pub struct RetryLayer<Req, Res, E> {
    policy: Arc<RetryPolicy<Req, Res, E>>,
}

impl<Req, Res, E> RetryLayer<Req, Res, E> {
    /// Creates a layer from a retry configuration.
    pub fn new(config: RetryConfig<Req, Res, E>) -> Self {
        Self {
            policy: Arc::new(RetryPolicy::new(config)),
        }
    }

    /// Creates a builder for the layer's configuration.
    pub fn builder() -> crate::RetryConfigBuilder<Req, Res, E> {
        crate::RetryConfigBuilder::new()
    }

    /// Handle to the shared engine.
    pub fn policy(&self) -> &Arc<RetryPolicy<Req, Res, E>> {
        &self.policy
    }
}

impl<Req, Res, E> Clone for RetryLayer<Req, Res, E> {
    fn clone(&self) -> Self {
        Self {
            policy: Arc::clone(&self.policy),
        }
    }
}

impl<S, Req, Res, E> Layer<S> for RetryLayer<Req, Res, E> {
    type Service = Retry<S, Req, Res, E>;

    fn layer(&self, service: S) -> Self::Service {
        Retry::new(service, Arc::clone(&self.policy))
    }
}
