use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::{Layer, Service, ServiceExt};
use tower_shield_retry::{on_server_errors, RetryLayer};

type Req = http::Request<()>;
type Res = http::Response<()>;

fn request(path: &str) -> Req {
    http::Request::builder()
        .uri(format!("https://upstream.test{path}"))
        .body(())
        .unwrap()
}

/// Serves the given status codes in order, then 200s.
fn scripted_transport(
    codes: Vec<u16>,
) -> (
    impl Service<Req, Response = Res, Error = std::io::Error, Future: Send + 'static>
        + Clone
        + Send
        + 'static,
    Arc<AtomicUsize>,
) {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let service = tower::service_fn(move |_req: Req| {
        let c = Arc::clone(&c);
        let codes = codes.clone();
        async move {
            let n = c.fetch_add(1, Ordering::SeqCst);
            let code = codes.get(n).copied().unwrap_or(200);
            Ok(http::Response::builder().status(code).body(()).unwrap())
        }
    });
    (service, calls)
}

fn server_error_layer(max_retries: u32) -> RetryLayer<Req, Res, std::io::Error> {
    RetryLayer::builder()
        .max_retries(max_retries)
        .retry_on(on_server_errors())
        .build_layer()
}

#[tokio::test]
async fn one_retry_budget_retries_a_503_exactly_once() {
    let (transport, calls) = scripted_transport(vec![503, 503, 503]);
    let layer = server_error_layer(1);
    let mut service = layer.layer(transport);

    let response = service
        .ready()
        .await
        .unwrap()
        .call(request("/orders"))
        .await
        .unwrap();

    // Initial attempt plus one retry; the second 503 goes to the caller.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn recovery_within_budget_returns_the_good_response() {
    let (transport, calls) = scripted_transport(vec![500, 502]);
    let layer = server_error_layer(3);
    let mut service = layer.layer(transport);

    let response = service
        .ready()
        .await
        .unwrap()
        .call(request("/orders"))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn terminated_sequences_leave_no_attempt_state_behind() {
    let (transport, _calls) = scripted_transport(vec![503, 503, 503, 503, 503, 503]);
    let layer = server_error_layer(2);
    let service = layer.layer(transport);

    for _ in 0..3 {
        let mut svc = service.clone();
        let _ = svc.ready().await.unwrap().call(request("/orders")).await;
    }

    assert_eq!(layer.policy().tracked_calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_spend_separate_budgets() {
    // Every attempt fails, so each call should burn exactly its own budget:
    // (1 initial + 2 retries) x 8 calls.
    let (transport, calls) = scripted_transport(vec![500; 1000]);
    let layer = server_error_layer(2);
    let service = layer.layer(transport);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let mut svc = service.clone();
        handles.push(tokio::spawn(async move {
            svc.ready().await.unwrap().call(request("/orders")).await
        }));
    }
    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status(), 500);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 24);
    assert_eq!(layer.policy().tracked_calls(), 0);
}

#[tokio::test]
async fn transport_errors_surface_verbatim_after_exhaustion() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    let transport = tower::service_fn(move |_req: Req| {
        let c = Arc::clone(&c);
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            Err::<Res, _>(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "peer hung up",
            ))
        }
    });

    let layer = server_error_layer(2);
    let mut service = layer.layer(transport);

    let err = service
        .ready()
        .await
        .unwrap()
        .call(request("/orders"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}
