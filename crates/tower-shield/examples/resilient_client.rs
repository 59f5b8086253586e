//! Decorates a fake HTTP transport and walks it through a flaky episode.
//!
//! Run with: cargo run --example resilient_client

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::{Layer, Service, ServiceExt};
use tower_shield::{BulkheadConfig, RetryConfig, ShieldLayer};

type Req = http::Request<Vec<u8>>;
type Res = http::Response<Vec<u8>>;

#[tokio::main]
async fn main() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);

    // A transport that returns 503 twice before recovering.
    let transport = tower::service_fn(move |_req: Req| {
        let c = Arc::clone(&c);
        async move {
            let status = if c.fetch_add(1, Ordering::SeqCst) < 2 {
                503
            } else {
                200
            };
            Ok::<Res, std::io::Error>(
                http::Response::builder()
                    .status(status)
                    .body(Vec::new())
                    .unwrap(),
            )
        }
    });

    let layer: ShieldLayer<Req, Res, std::io::Error> = ShieldLayer::builder()
        .name("orders-api")
        .bulkhead(
            BulkheadConfig::builder()
                .max_concurrent_calls(5)
                .max_wait(Duration::from_millis(50))
                .build(),
        )
        .retry(
            RetryConfig::builder()
                .max_retries(3)
                .linear_backoff(Duration::from_millis(100), Duration::from_millis(500))
                .on_retry(|attempt, delay| println!("retry #{attempt} after {delay:?}"))
                .build(),
        )
        .request_timeout(Duration::from_secs(5))
        .build_layer();

    let mut client = layer.layer(transport);

    let req = http::Request::builder()
        .uri("https://upstream.test/orders")
        .body(Vec::new())
        .unwrap();

    match client.ready().await.unwrap().call(req).await {
        Ok(response) => println!(
            "final status {} after {} attempts",
            response.status(),
            calls.load(Ordering::SeqCst)
        ),
        Err(err) => println!("failed: {err}"),
    }
}
