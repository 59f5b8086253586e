//! Outbound-HTTP resilience decorator for Tower services.
//!
//! `tower-shield` wraps a transport — anything implementing
//! `tower::Service` — with admission control and failure recovery:
//!
//! 1. **Admit**: a bulkhead bounds how many logical calls are in flight,
//!    rejecting callers that wait longer than its `max_wait`.
//! 2. **Call**: the wrapped transport runs.
//! 3. **Evaluate**: a retry predicate inspects the outcome.
//! 4. **Maybe retry**: retryable outcomes wait a backoff and try again,
//!    while the original bulkhead slot stays held — the bound is on logical
//!    calls, not physical attempts.
//! 5. **Release**: the slot frees when the logical call is fully done, on
//!    every exit path.
//!
//! Admission failures short-circuit before the transport runs; everything
//! else propagates the transport's final response or error verbatim.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tower::ServiceBuilder;
//! use tower_shield::{BulkheadConfig, RetryConfig, ShieldLayer};
//!
//! type Req = http::Request<Vec<u8>>;
//! type Res = http::Response<Vec<u8>>;
//!
//! # async fn example() {
//! let layer: ShieldLayer<Req, Res, std::io::Error> = ShieldLayer::builder()
//!     .name("orders-api")
//!     .bulkhead(
//!         BulkheadConfig::builder()
//!             .max_concurrent_calls(25)
//!             .max_wait(Duration::from_millis(50))
//!             .build(),
//!     )
//!     .retry(
//!         RetryConfig::builder()
//!             .max_retries(2)
//!             .exponential_backoff(Duration::from_millis(100), Duration::from_secs(2))
//!             .build(),
//!     )
//!     .request_timeout(Duration::from_secs(30))
//!     .build_layer();
//!
//! let transport = tower::service_fn(|req: Req| async move {
//!     // the real network call
//!     # let _ = req;
//!     Ok::<Res, std::io::Error>(http::Response::new(Vec::new()))
//! });
//!
//! let client = ServiceBuilder::new().layer(layer).service(transport);
//! # let _ = client;
//! # }
//! ```

pub mod config;
pub mod layer;
pub mod service;

pub use config::{RequestNamer, ShieldConfig, ShieldConfigBuilder};
pub use layer::ShieldLayer;
pub use service::Shield;

// The pattern crates' public surface, re-exported for one-stop use.
pub use tower_shield_bulkhead::{
    Bulkhead, BulkheadConfig, BulkheadConfigBuilder, BulkheadEvent, BulkheadLayer,
    BulkheadService, Permit, RejectedError,
};
pub use tower_shield_core::{
    CallToken, EventListener, EventListeners, FnListener, MetricsSink, NoopSink, RequestLabel,
    ResilienceError, ResilienceEvent, ResponseStatus, SharedSink,
};
pub use tower_shield_retry::{
    on_errors, on_server_errors, ConstantBackoff, ExponentialBackoff, FnInterval,
    IntervalFunction, LinearBackoff, Retry, RetryConfig, RetryConfigBuilder, RetryEvent,
    RetryLayer, RetryPolicy, RetryPredicate,
};

#[cfg(feature = "metrics")]
pub use tower_shield_core::RecorderSink;

impl<Req, Res, E> config::ShieldConfigBuilder<Req, Res, E>
where
    Res: ResponseStatus,
{
    /// Builds the configuration and wraps it in a [`ShieldLayer`].
    pub fn build_layer(self) -> ShieldLayer<Req, Res, E> {
        ShieldLayer::new(self.build())
    }
}
