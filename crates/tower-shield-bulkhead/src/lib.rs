//! Bulkhead admission gate for Tower services.
//!
//! A bulkhead bounds how many callers may be in flight simultaneously.
//! Admission races a free slot against a configurable wait; a caller that
//! neither gets a slot nor times out cannot exist. Capacity can be changed
//! while calls are in flight without evicting anyone.
//!
//! # Standalone gate
//!
//! ```
//! use std::time::Duration;
//! use tower_shield_bulkhead::{Bulkhead, BulkheadConfig};
//!
//! # async fn example() {
//! let gate = Bulkhead::new(
//!     BulkheadConfig::builder()
//!         .max_concurrent_calls(10)
//!         .max_wait(Duration::from_millis(50))
//!         .name("payments")
//!         .build(),
//! );
//!
//! match gate.admit().await {
//!     Ok(permit) => {
//!         // ... do the bounded work; the slot frees when `permit` drops
//!         drop(permit);
//!     }
//!     Err(rejected) => eprintln!("{rejected}"),
//! }
//! # }
//! ```
//!
//! # As a Tower layer
//!
//! ```
//! use tower::ServiceBuilder;
//! use tower_shield_bulkhead::{Bulkhead, BulkheadConfig, BulkheadLayer, RejectedError};
//!
//! # #[derive(Debug)]
//! # struct MyError;
//! # impl From<RejectedError> for MyError {
//! #     fn from(_: RejectedError) -> Self { MyError }
//! # }
//! # async fn example() {
//! let gate = Bulkhead::new(BulkheadConfig::builder().max_concurrent_calls(10).build());
//!
//! let service = ServiceBuilder::new()
//!     .layer(BulkheadLayer::new(gate.clone()))
//!     .service_fn(|req: String| async move { Ok::<_, MyError>(req) });
//!
//! // Live capacity adjustment while the service is in use:
//! gate.resize(25);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod gate;
pub mod layer;
pub mod service;

pub use config::{BulkheadConfig, BulkheadConfigBuilder};
pub use error::RejectedError;
pub use events::BulkheadEvent;
pub use gate::{Bulkhead, Permit};
pub use layer::BulkheadLayer;
pub use service::BulkheadService;
