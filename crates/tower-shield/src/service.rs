//! The composed resilience interceptor.

use crate::config::RequestNamer;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;
use tower_shield_bulkhead::Bulkhead;
use tower_shield_core::metrics::SharedSink;
use tower_shield_core::{RequestLabel, ResilienceError, ResponseStatus};
use tower_shield_retry::{CallTracker, RetryPolicy};

/// A transport decorated with admission control and retry.
///
/// One `call` is one logical call: it is admitted once, holds its bulkhead
/// slot across every physical attempt, and returns the final attempt's
/// outcome verbatim. Rejected admissions never reach the transport.
pub struct Shield<S, Req, Res, E> {
    inner: S,
    bulkhead: Bulkhead,
    policy: Arc<RetryPolicy<Req, Res, E>>,
    sink: SharedSink,
    namer: Option<RequestNamer<Req>>,
    request_timeout: Option<Duration>,
}

impl<S, Req, Res, E> Shield<S, Req, Res, E> {
    pub(crate) fn new(
        inner: S,
        bulkhead: Bulkhead,
        policy: Arc<RetryPolicy<Req, Res, E>>,
        sink: SharedSink,
        namer: Option<RequestNamer<Req>>,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner,
            bulkhead,
            policy,
            sink,
            namer,
            request_timeout,
        }
    }

    /// Handle to the admission gate, e.g. for a live
    /// [`resize`](Bulkhead::resize).
    pub fn bulkhead(&self) -> &Bulkhead {
        &self.bulkhead
    }
}

impl<S, Req, Res, E> Clone for Shield<S, Req, Res, E>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            bulkhead: self.bulkhead.clone(),
            policy: Arc::clone(&self.policy),
            sink: Arc::clone(&self.sink),
            namer: self.namer.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

impl<S, Req, Res, E> Service<Req> for Shield<S, Req, Res, E>
where
    S: Service<Req, Response = Res, Error = E> + Clone + Send + 'static,
    S::Future: Send + 'static,
    Req: RequestLabel + Clone + Send + 'static,
    Res: ResponseStatus + Send + 'static,
    E: Send + 'static,
{
    type Response = Res;
    type Error = ResilienceError<E>;
    type Future = BoxFuture<'static, Result<Res, ResilienceError<E>>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner
            .poll_ready(cx)
            .map_err(ResilienceError::Transport)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let bulkhead = self.bulkhead.clone();
        let policy = Arc::clone(&self.policy);
        let sink = Arc::clone(&self.sink);
        let namer = self.namer.clone();
        let request_timeout = self.request_timeout;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let logical_call = async move {
                // Admission first: a rejected call never reaches the
                // transport, and the slot is held until this future is done
                // with every attempt.
                let permit = bulkhead.admit().await?;

                let label = match &namer {
                    Some(namer) => namer(&req),
                    None => req.label(),
                };
                let call = CallTracker::new(Arc::clone(&policy));
                let token = call.token();

                let mut outcome = inner.call(req.clone()).await;
                let mut retries = 0u32;
                while policy.should_retry(token, &req, &outcome) {
                    sink.retry(&label);
                    let delay = policy.wait(token).await;
                    retries += 1;
                    policy.record_retry(retries, delay);

                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        request = %label,
                        attempt = retries,
                        delay = ?delay,
                        "retrying request"
                    );

                    outcome = inner.call(req.clone()).await;
                }

                if let Ok(response) = &outcome {
                    sink.response_status(&label, response.status_code());
                }
                policy.record_outcome(&req, &outcome, retries);

                drop(permit);
                outcome.map_err(ResilienceError::Transport)
            };

            match request_timeout {
                Some(deadline) => match tokio::time::timeout(deadline, logical_call).await {
                    Ok(result) => result,
                    Err(_) => Err(ResilienceError::Timeout),
                },
                None => logical_call.await,
            }
        })
    }
}
