//! Metrics sink capability.
//!
//! The resilience layers report observations through a [`MetricsSink`]
//! injected at construction rather than a process-wide registry. The default
//! sink discards everything; [`RecorderSink`] (behind the `metrics` feature)
//! forwards to the [`metrics`] facade.

use std::sync::Arc;
use std::time::Duration;

/// Best-effort observation sink.
///
/// Implementations must not block. Every method defaults to a no-op so a
/// sink only picks the observations it cares about; nothing a sink does can
/// fail an admission or retry decision.
pub trait MetricsSink: Send + Sync {
    /// Time an admission attempt spent waiting for a slot, recorded whether
    /// or not a slot was granted.
    fn admission_wait(&self, name: &str, waited: Duration) {
        let _ = (name, waited);
    }

    /// An admission attempt gave up after the configured wait.
    fn admission_rejected(&self, name: &str) {
        let _ = name;
    }

    /// Number of currently admitted calls.
    fn active_calls(&self, name: &str, count: usize) {
        let _ = (name, count);
    }

    /// Current admission capacity.
    fn max_calls(&self, name: &str, capacity: usize) {
        let _ = (name, capacity);
    }

    /// A retry was committed for the named request.
    fn retry(&self, name: &str) {
        let _ = name;
    }

    /// Final response status observed for the named request.
    fn response_status(&self, name: &str, status: u16) {
        let _ = (name, status);
    }
}

/// Shared handle to a sink.
pub type SharedSink = Arc<dyn MetricsSink>;

/// Discards every observation. The default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {}

#[cfg(feature = "metrics")]
mod recorder {
    use super::MetricsSink;
    use metrics::{
        counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
    };
    use std::sync::Once;
    use std::time::Duration;

    static DESCRIBE: Once = Once::new();

    /// Forwards observations to the process-wide [`metrics`] recorder.
    ///
    /// Metric names and labels are part of the public API; dashboards depend
    /// on them staying stable.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RecorderSink;

    impl RecorderSink {
        pub fn new() -> Self {
            DESCRIBE.call_once(|| {
                describe_histogram!(
                    "bulkhead_wait_duration_seconds",
                    "Time spent waiting for a bulkhead slot"
                );
                describe_counter!(
                    "bulkhead_calls_rejected_total",
                    "Total number of calls rejected by the bulkhead"
                );
                describe_gauge!(
                    "bulkhead_concurrent_calls",
                    "Current number of admitted calls"
                );
                describe_gauge!(
                    "bulkhead_max_concurrent_calls",
                    "Maximum number of concurrently admitted calls"
                );
                describe_counter!("retry_attempts_total", "Total number of committed retries");
                describe_counter!(
                    "http_response_codes_total",
                    "Final response status codes per request"
                );
            });
            RecorderSink
        }
    }

    impl MetricsSink for RecorderSink {
        fn admission_wait(&self, name: &str, waited: Duration) {
            histogram!("bulkhead_wait_duration_seconds", "bulkhead" => name.to_string())
                .record(waited.as_secs_f64());
        }

        fn admission_rejected(&self, name: &str) {
            counter!("bulkhead_calls_rejected_total", "bulkhead" => name.to_string()).increment(1);
        }

        fn active_calls(&self, name: &str, count: usize) {
            gauge!("bulkhead_concurrent_calls", "bulkhead" => name.to_string()).set(count as f64);
        }

        fn max_calls(&self, name: &str, capacity: usize) {
            gauge!("bulkhead_max_concurrent_calls", "bulkhead" => name.to_string())
                .set(capacity as f64);
        }

        fn retry(&self, name: &str) {
            counter!("retry_attempts_total", "request" => name.to_string()).increment(1);
        }

        fn response_status(&self, name: &str, status: u16) {
            counter!(
                "http_response_codes_total",
                "request" => name.to_string(),
                "code" => status.to_string()
            )
            .increment(1);
        }
    }
}

#[cfg(feature = "metrics")]
pub use recorder::RecorderSink;
