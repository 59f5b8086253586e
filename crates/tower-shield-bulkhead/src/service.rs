//! Tower service wrapper applying the gate around an inner service.

use crate::error::RejectedError;
use crate::gate::Bulkhead;
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use tower::Service;

/// A service whose calls are admitted through a [`Bulkhead`].
///
/// The slot is held for the full duration of the inner call and released on
/// every exit path, including cancellation of the response future.
#[derive(Clone)]
pub struct BulkheadService<S> {
    inner: S,
    bulkhead: Bulkhead,
}

impl<S> BulkheadService<S> {
    pub(crate) fn new(inner: S, bulkhead: Bulkhead) -> Self {
        Self { inner, bulkhead }
    }

    /// Handle to the underlying gate, e.g. for a live [`resize`](Bulkhead::resize).
    pub fn bulkhead(&self) -> &Bulkhead {
        &self.bulkhead
    }
}

impl<S, Request> Service<Request> for BulkheadService<S>
where
    S: Service<Request> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    S::Error: From<RejectedError> + Send + 'static,
    Request: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let bulkhead = self.bulkhead.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let _permit = bulkhead.admit().await.map_err(S::Error::from)?;
            inner.call(request).await
        })
    }
}
