//! Retries a flaky in-process "upstream" with linear backoff.
//!
//! Run with: cargo run --example flaky_upstream

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::{Layer, Service, ServiceExt};
use tower_shield_retry::RetryLayer;

#[derive(Debug)]
struct Unavailable;

#[tokio::main]
async fn main() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);

    // Fails twice, then recovers.
    let upstream = tower::service_fn(move |req: &'static str| {
        let c = Arc::clone(&c);
        async move {
            if c.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Unavailable)
            } else {
                Ok(format!("{req}: ok"))
            }
        }
    });

    let layer: RetryLayer<&'static str, String, Unavailable> = RetryLayer::builder()
        .max_retries(3)
        .linear_backoff(Duration::from_millis(50), Duration::from_millis(200))
        .on_retry(|attempt, delay| println!("retry #{attempt} after {delay:?}"))
        .build_layer();

    let mut service = layer.layer(upstream);
    let response = service.ready().await.unwrap().call("GET /health").await;
    println!("{response:?} in {} attempts", calls.load(Ordering::SeqCst));
}
