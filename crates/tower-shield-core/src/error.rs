//! Unified error type for composed resilience stacks.
//!
//! A service decorated with the shield interceptor can fail before the
//! transport runs (admission rejected), around it (whole-call timeout), or
//! inside it (the transport's own error). [`ResilienceError`] carries all
//! three without obscuring the transport error: the `Transport` variant
//! propagates the wrapped service's error value verbatim.

/// Error returned by a shield-decorated service.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResilienceError<E> {
    /// The bulkhead could not grant a slot within its configured wait. The
    /// transport was never invoked.
    #[error("bulkhead '{name}' rejected the call: {max_concurrent_calls} concurrent calls reached")]
    Rejected {
        /// Name of the rejecting bulkhead.
        name: String,
        /// Admission capacity at rejection time.
        max_concurrent_calls: usize,
    },

    /// The whole logical call (admission plus every attempt) exceeded the
    /// configured request timeout.
    #[error("logical call exceeded its request timeout")]
    Timeout,

    /// The wrapped transport's final error, passed through unchanged.
    #[error("transport error: {0}")]
    Transport(E),
}

impl<E> ResilienceError<E> {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ResilienceError::Rejected { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ResilienceError::Timeout)
    }

    /// The transport's error, if that is what this is.
    pub fn transport_error(&self) -> Option<&E> {
        match self {
            ResilienceError::Transport(e) => Some(e),
            _ => None,
        }
    }

    /// Unwraps the transport error, giving the resilience-layer error back
    /// otherwise.
    pub fn into_transport(self) -> Result<E, Self> {
        match self {
            ResilienceError::Transport(e) => Ok(e),
            other => Err(other),
        }
    }
}
