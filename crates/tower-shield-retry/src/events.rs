//! Events emitted by the retry engine's drivers.

use std::time::{Duration, Instant};
use tower_shield_core::events::ResilienceEvent;

/// Lifecycle events of a retry sequence.
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// A retry was committed and its backoff has elapsed.
    Retry {
        pattern_name: String,
        timestamp: Instant,
        /// 1-indexed retry number within the logical call.
        attempt: u32,
        /// Backoff that was waited before this retry.
        delay: Duration,
    },
    /// The logical call ended with a non-retryable success.
    Success {
        pattern_name: String,
        timestamp: Instant,
        /// Physical attempts made, including the first.
        attempts: u32,
    },
    /// The outcome was still retryable when the budget ran out.
    Exhausted {
        pattern_name: String,
        timestamp: Instant,
        /// Physical attempts made, including the first.
        attempts: u32,
    },
    /// The call failed with an outcome the predicate declined to retry.
    IgnoredError {
        pattern_name: String,
        timestamp: Instant,
    },
}

impl ResilienceEvent for RetryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Retry { .. } => "retry",
            RetryEvent::Success { .. } => "success",
            RetryEvent::Exhausted { .. } => "exhausted",
            RetryEvent::IgnoredError { .. } => "ignored_error",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RetryEvent::Retry { timestamp, .. }
            | RetryEvent::Success { timestamp, .. }
            | RetryEvent::Exhausted { timestamp, .. }
            | RetryEvent::IgnoredError { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            RetryEvent::Retry { pattern_name, .. }
            | RetryEvent::Success { pattern_name, .. }
            | RetryEvent::Exhausted { pattern_name, .. }
            | RetryEvent::IgnoredError { pattern_name, .. } => pattern_name,
        }
    }
}
