//! Retry engine for Tower services.
//!
//! Retrying has three pluggable pieces: a predicate deciding which outcomes
//! warrant another attempt, a backoff schedule spacing the attempts, and a
//! shared engine tracking how many retries each in-flight call has spent.
//! Attempt state is keyed by an opaque per-call token rather than request
//! identity, so concurrent calls carrying identical requests never share a
//! budget.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tower_shield_retry::{on_server_errors, RetryLayer};
//!
//! # async fn example() {
//! let layer: RetryLayer<http::Request<Vec<u8>>, http::Response<Vec<u8>>, std::io::Error> =
//!     RetryLayer::builder()
//!         .max_retries(2)
//!         .linear_backoff(Duration::from_millis(100), Duration::from_secs(1))
//!         .retry_on(on_server_errors())
//!         .name("orders-api")
//!         .build_layer();
//! # }
//! ```

pub mod backoff;
pub mod config;
pub mod events;
pub mod layer;
pub mod policy;

pub use backoff::{
    ConstantBackoff, ExponentialBackoff, FnInterval, IntervalFunction, LinearBackoff,
};
pub use config::{RetryConfig, RetryConfigBuilder};
pub use events::RetryEvent;
pub use layer::RetryLayer;
pub use policy::{on_errors, on_server_errors, CallTracker, RetryPolicy, RetryPredicate};

use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

impl<Req, Res, E> RetryConfigBuilder<Req, Res, E> {
    /// Builds the configuration and wraps it in a [`RetryLayer`].
    pub fn build_layer(self) -> RetryLayer<Req, Res, E> {
        RetryLayer::new(self.build())
    }
}

/// A Tower service that retries failed calls.
///
/// The inner service is re-invoked with a clone of the request while the
/// shared [`RetryPolicy`] keeps saying so; the final outcome, success or
/// failure, is returned verbatim.
pub struct Retry<S, Req, Res, E> {
    inner: S,
    policy: Arc<RetryPolicy<Req, Res, E>>,
}

impl<S, Req, Res, E> Retry<S, Req, Res, E> {
    pub(crate) fn new(inner: S, policy: Arc<RetryPolicy<Req, Res, E>>) -> Self {
        Self { inner, policy }
    }
}

impl<S, Req, Res, E> Clone for Retry<S, Req, Res, E>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            policy: Arc::clone(&self.policy),
        }
    }
}

impl<S, Req, Res, E> Service<Req> for Retry<S, Req, Res, E>
where
    S: Service<Req, Response = Res, Error = E> + Clone + Send + 'static,
    S::Future: Send + 'static,
    Req: Clone + Send + 'static,
    Res: Send + 'static,
    E: Send + 'static,
{
    type Response = Res;
    type Error = E;
    type Future = BoxFuture<'static, Result<Res, E>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let mut inner = self.inner.clone();
        let policy = Arc::clone(&self.policy);

        Box::pin(async move {
            let call = CallTracker::new(Arc::clone(&policy));
            let token = call.token();

            let mut outcome = inner.call(req.clone()).await;
            let mut retries = 0u32;
            while policy.should_retry(token, &req, &outcome) {
                let delay = policy.wait(token).await;
                retries += 1;
                policy.record_retry(retries, delay);

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    retry = policy.name(),
                    attempt = retries,
                    delay = ?delay,
                    "retrying call"
                );

                outcome = inner.call(req.clone()).await;
            }

            policy.record_outcome(&req, &outcome, retries);
            outcome
        })
    }
}
