//! Retry predicates and the shared retry engine.

use crate::backoff::IntervalFunction;
use crate::events::RetryEvent;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tower_shield_core::events::EventListeners;
use tower_shield_core::{CallToken, ResponseStatus};

/// Decides whether an attempt's outcome warrants a retry.
///
/// The predicate sees the request and the outcome of one transport attempt.
/// Exactly one of response or error exists after an attempt; the `Result`
/// encodes that directly, so there is no "both missing" case to defend
/// against. A configured predicate fully replaces the default.
pub type RetryPredicate<Req, Res, E> =
    Arc<dyn Fn(&Req, Result<&Res, &E>) -> bool + Send + Sync>;

/// Retries only transport-level errors.
pub fn on_errors<Req, Res, E>() -> RetryPredicate<Req, Res, E> {
    Arc::new(|_req, outcome| outcome.is_err())
}

/// Retries transport-level errors and server-error (5xx) responses.
///
/// This is the default predicate of the shield interceptor.
pub fn on_server_errors<Req, Res, E>() -> RetryPredicate<Req, Res, E>
where
    Res: ResponseStatus,
{
    Arc::new(|_req, outcome| match outcome {
        Ok(response) => (500..=599).contains(&response.status_code()),
        Err(_) => true,
    })
}

/// Shared retry engine: the decision logic combining predicate and attempt
/// budget, plus per-call attempt bookkeeping.
///
/// One engine serves many concurrent logical calls; each call is identified
/// by a [`CallToken`] minted at its entry point. An entry lives in the
/// attempt map only while a call's retry sequence is active and is removed
/// on the terminal decision, so the map never grows with process lifetime.
/// A single logical call must be driven from one task at a time.
pub struct RetryPolicy<Req, Res, E> {
    max_retries: u32,
    backoff: Arc<dyn IntervalFunction>,
    predicate: Option<RetryPredicate<Req, Res, E>>,
    attempts: Mutex<HashMap<CallToken, u32>>,
    name: String,
    listeners: EventListeners<RetryEvent>,
}

impl<Req, Res, E> RetryPolicy<Req, Res, E> {
    /// Builds the engine from its configuration.
    pub fn new(config: crate::config::RetryConfig<Req, Res, E>) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: config.backoff,
            predicate: config.predicate,
            attempts: Mutex::new(HashMap::new()),
            name: config.name,
            listeners: config.listeners,
        }
    }

    fn attempt_map(&self) -> MutexGuard<'_, HashMap<CallToken, u32>> {
        // Map updates are panic-free, so a poisoned lock still holds
        // consistent state.
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The predicate's verdict alone, with no attempt-state side effects.
    ///
    /// Without a configured predicate, transport errors are retryable and
    /// responses are not.
    pub fn is_retryable(&self, req: &Req, outcome: &Result<Res, E>) -> bool {
        match &self.predicate {
            Some(predicate) => predicate(req, outcome.as_ref()),
            None => outcome.is_err(),
        }
    }

    /// Whether the call identified by `token` should attempt again.
    ///
    /// True iff the predicate wants a retry and the call has retries left.
    /// Either negative clause is terminal: the call's attempt entry is
    /// removed and false returned. A positive verdict commits nothing —
    /// re-evaluating without an intervening [`wait`](Self::wait) cannot
    /// double-count.
    pub fn should_retry(&self, token: CallToken, req: &Req, outcome: &Result<Res, E>) -> bool {
        if !self.is_retryable(req, outcome) {
            self.attempt_map().remove(&token);
            return false;
        }

        let mut attempts = self.attempt_map();
        let used = attempts.get(&token).copied().unwrap_or(0);
        if used < self.max_retries {
            true
        } else {
            attempts.remove(&token);
            false
        }
    }

    /// Sleeps the backoff for the call's next retry, then commits the
    /// attempt. Returns the delay that was slept.
    ///
    /// Must be called between a positive [`should_retry`](Self::should_retry)
    /// and the next transport attempt; this is where the attempt entry is
    /// created and incremented.
    pub async fn wait(&self, token: CallToken) -> Duration {
        let delay = {
            let attempts = self.attempt_map();
            let used = attempts.get(&token).copied().unwrap_or(0);
            self.backoff.interval(used as usize)
        };
        tokio::time::sleep(delay).await;
        *self.attempt_map().entry(token).or_insert(0) += 1;
        delay
    }

    /// Retries already committed for the call. Zero once the sequence has
    /// reached a terminal decision.
    pub fn attempts(&self, token: CallToken) -> u32 {
        self.attempt_map().get(&token).copied().unwrap_or(0)
    }

    /// Drops any attempt state for the call. No-op when none exists.
    pub fn forget(&self, token: CallToken) {
        self.attempt_map().remove(&token);
    }

    /// Number of calls with live retry state. Diagnostic; useful for
    /// asserting that terminated sequences left nothing behind.
    pub fn tracked_calls(&self) -> usize {
        self.attempt_map().len()
    }

    /// Maximum retries beyond the first attempt.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Announces a committed retry to the engine's listeners.
    pub fn record_retry(&self, attempt: u32, delay: Duration) {
        self.listeners.emit(&RetryEvent::Retry {
            pattern_name: self.name.clone(),
            timestamp: Instant::now(),
            attempt,
            delay,
        });
    }

    /// Classifies a finished sequence and announces its terminal event:
    /// still-retryable outcomes are exhausted budgets, successful responses
    /// are successes, and declined errors were ignored.
    pub fn record_outcome(&self, req: &Req, outcome: &Result<Res, E>, retries: u32) {
        let timestamp = Instant::now();
        let attempts = retries + 1;
        let event = if self.is_retryable(req, outcome) {
            RetryEvent::Exhausted {
                pattern_name: self.name.clone(),
                timestamp,
                attempts,
            }
        } else if outcome.is_ok() {
            RetryEvent::Success {
                pattern_name: self.name.clone(),
                timestamp,
                attempts,
            }
        } else {
            RetryEvent::IgnoredError {
                pattern_name: self.name.clone(),
                timestamp,
            }
        };
        self.listeners.emit(&event);
    }
}

/// RAII cleanup for one logical call's retry state.
///
/// The tracker mints the call's token and removes its attempt entry when
/// dropped, so a sequence abandoned mid-flight (cancellation, whole-call
/// timeout) cannot strand an entry in the shared map.
pub struct CallTracker<Req, Res, E> {
    policy: Arc<RetryPolicy<Req, Res, E>>,
    token: CallToken,
}

impl<Req, Res, E> CallTracker<Req, Res, E> {
    pub fn new(policy: Arc<RetryPolicy<Req, Res, E>>) -> Self {
        Self {
            policy,
            token: CallToken::next(),
        }
    }

    pub fn token(&self) -> CallToken {
        self.token
    }
}

impl<Req, Res, E> Drop for CallTracker<Req, Res, E> {
    fn drop(&mut self) {
        self.policy.forget(self.token);
    }
}
