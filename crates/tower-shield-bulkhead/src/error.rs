//! Error type for the bulkhead.

use tower_shield_core::ResilienceError;

/// The gate could not grant a slot within its configured wait.
///
/// This is the bulkhead's only failure mode: admission either succeeds or
/// fails once with this error. Release never fails.
#[derive(Debug, Clone, thiserror::Error)]
#[error("bulkhead '{name}' is full: {max_concurrent_calls} concurrent calls reached")]
pub struct RejectedError {
    /// Name of the rejecting gate.
    pub name: String,
    /// Admission capacity at rejection time.
    pub max_concurrent_calls: usize,
}

impl<E> From<RejectedError> for ResilienceError<E> {
    fn from(err: RejectedError) -> Self {
        ResilienceError::Rejected {
            name: err.name,
            max_concurrent_calls: err.max_concurrent_calls,
        }
    }
}
