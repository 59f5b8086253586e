//! Interceptor integration tests.
//!
//! Test organization:
//! - composition.rs: the admit -> call -> retry -> release sequence
//! - observability.rs: metrics sink and listener behavior
//! - cancellation.rs: whole-call timeout and dropped futures

mod cancellation;
