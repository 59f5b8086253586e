use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tower::{Layer, Service, ServiceExt};
use tower_shield::{BulkheadConfig, RetryConfig, ShieldLayer};

type Req = http::Request<()>;
type Res = http::Response<()>;

fn request() -> Req {
    http::Request::builder()
        .uri("https://upstream.test/slow")
        .body(())
        .unwrap()
}

#[tokio::test]
async fn request_timeout_fires_mid_retry_and_cleans_up() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);

    // Always 503, so the call would retry forever within its budget; the
    // generous backoff guarantees the deadline lands inside a wait.
    let transport = tower::service_fn(move |_req: Req| {
        let c = Arc::clone(&c);
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            Ok::<Res, std::io::Error>(
                http::Response::builder().status(503).body(()).unwrap(),
            )
        }
    });

    let layer: ShieldLayer<Req, Res, std::io::Error> = ShieldLayer::builder()
        .retry(
            RetryConfig::builder()
                .max_retries(10)
                .constant_backoff(Duration::from_secs(60))
                .build(),
        )
        .request_timeout(Duration::from_millis(50))
        .build_layer();
    let mut client = layer.layer(transport);

    let err = client
        .ready()
        .await
        .unwrap()
        .call(request())
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // The abandoned sequence released its slot and its attempt entry.
    assert_eq!(layer.bulkhead().active_calls(), 0);
    assert_eq!(layer.policy().tracked_calls(), 0);
}

#[tokio::test]
async fn a_dropped_call_future_releases_the_slot() {
    let transport = tower::service_fn(|_req: Req| async move {
        sleep(Duration::from_secs(60)).await;
        Ok::<Res, std::io::Error>(http::Response::new(()))
    });

    let layer: ShieldLayer<Req, Res, std::io::Error> = ShieldLayer::builder()
        .bulkhead(
            BulkheadConfig::builder()
                .max_concurrent_calls(1)
                .max_wait(Duration::from_millis(10))
                .build(),
        )
        .build_layer();
    let client = layer.layer(transport);

    let mut doomed = client.clone();
    let handle =
        tokio::spawn(async move { doomed.ready().await.unwrap().call(request()).await });
    sleep(Duration::from_millis(20)).await;
    assert_eq!(layer.bulkhead().active_calls(), 1);

    handle.abort();
    let _ = handle.await;

    assert_eq!(layer.bulkhead().active_calls(), 0);
    assert_eq!(layer.policy().tracked_calls(), 0);

    // The freed slot is immediately admittable again.
    assert!(layer.bulkhead().admit().await.is_ok());
}

#[tokio::test]
async fn timeout_spares_calls_that_finish_in_time() {
    let transport = tower::service_fn(|_req: Req| async move {
        sleep(Duration::from_millis(10)).await;
        Ok::<Res, std::io::Error>(http::Response::new(()))
    });

    let layer: ShieldLayer<Req, Res, std::io::Error> = ShieldLayer::builder()
        .request_timeout(Duration::from_secs(5))
        .build_layer();
    let mut client = layer.layer(transport);

    assert!(client.ready().await.unwrap().call(request()).await.is_ok());
}
