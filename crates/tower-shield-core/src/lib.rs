//! Core infrastructure for tower-shield.
//!
//! This crate provides shared functionality used across the tower-shield
//! crates:
//! - Event system for observability
//! - Metrics sink capability with a no-op default
//! - Unified error type for composed stacks
//! - Per-call identity tokens
//! - Labeling hooks for HTTP request/response types

pub mod error;
pub mod events;
pub mod http;
pub mod metrics;
pub mod token;

pub use self::error::ResilienceError;
pub use self::events::{EventListener, EventListeners, FnListener, ResilienceEvent};
pub use self::http::{RequestLabel, ResponseStatus};
pub use self::metrics::{MetricsSink, NoopSink, SharedSink};
pub use self::token::CallToken;

#[cfg(feature = "metrics")]
pub use self::metrics::RecorderSink;
