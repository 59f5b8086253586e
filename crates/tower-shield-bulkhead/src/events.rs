//! Events emitted by the bulkhead.

use std::time::Instant;
use tower_shield_core::events::ResilienceEvent;

/// Lifecycle events of the admission gate.
#[derive(Debug, Clone)]
pub enum BulkheadEvent {
    /// A call acquired a slot.
    Admitted {
        pattern_name: String,
        timestamp: Instant,
        /// Admitted calls after this one, including it.
        concurrent_calls: usize,
    },
    /// A call gave up waiting for a slot.
    Rejected {
        pattern_name: String,
        timestamp: Instant,
        /// The capacity that was exhausted.
        max_concurrent_calls: usize,
    },
    /// A slot was returned to the pool.
    Released {
        pattern_name: String,
        timestamp: Instant,
        /// Admitted calls remaining after the release.
        concurrent_calls: usize,
    },
}

impl ResilienceEvent for BulkheadEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BulkheadEvent::Admitted { .. } => "admitted",
            BulkheadEvent::Rejected { .. } => "rejected",
            BulkheadEvent::Released { .. } => "released",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            BulkheadEvent::Admitted { timestamp, .. }
            | BulkheadEvent::Rejected { timestamp, .. }
            | BulkheadEvent::Released { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            BulkheadEvent::Admitted { pattern_name, .. }
            | BulkheadEvent::Rejected { pattern_name, .. }
            | BulkheadEvent::Released { pattern_name, .. } => pattern_name,
        }
    }
}
