use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tower::{Service, ServiceExt};
use tower_shield_bulkhead::{Bulkhead, BulkheadConfig, BulkheadLayer, RejectedError};

#[derive(Debug)]
enum TestError {
    Rejected(RejectedError),
}

impl From<RejectedError> for TestError {
    fn from(e: RejectedError) -> Self {
        TestError::Rejected(e)
    }
}

fn gate(capacity: usize, max_wait: Duration) -> Bulkhead {
    Bulkhead::new(
        BulkheadConfig::builder()
            .max_concurrent_calls(capacity)
            .max_wait(max_wait)
            .name("admission-test")
            .build(),
    )
}

#[tokio::test]
async fn full_capacity_admits_then_next_caller_is_rejected() {
    for capacity in [1, 3, 10] {
        let bulkhead = gate(capacity, Duration::from_millis(10));

        let mut permits = Vec::new();
        for _ in 0..capacity {
            permits.push(bulkhead.admit().await.expect("within capacity"));
        }
        assert_eq!(bulkhead.active_calls(), capacity);

        let rejected = bulkhead.admit().await.expect_err("over capacity");
        assert_eq!(rejected.max_concurrent_calls, capacity);
        assert_eq!(rejected.name, "admission-test");
    }
}

#[tokio::test]
async fn waiter_gets_the_slot_when_a_holder_releases_in_time() {
    let bulkhead = gate(1, Duration::from_secs(2));
    let held = bulkhead.admit().await.unwrap();

    let waiter = {
        let bulkhead = bulkhead.clone();
        tokio::spawn(async move { bulkhead.admit().await })
    };

    sleep(Duration::from_millis(50)).await;
    drop(held);

    assert!(waiter.await.unwrap().is_ok());
}

#[tokio::test]
async fn inactive_gate_admits_everything_immediately() {
    let bulkhead = Bulkhead::new(
        BulkheadConfig::builder()
            .max_concurrent_calls(1)
            .max_wait(Duration::from_millis(1))
            .active(false)
            .build(),
    );

    let mut permits = Vec::new();
    for _ in 0..100 {
        permits.push(bulkhead.admit().await.expect("inactive gate never blocks"));
    }
    // Pass-through permits do not consume slots.
    assert_eq!(bulkhead.active_calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn layered_service_never_exceeds_the_bound() {
    let max_concurrent = 5;
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let a = Arc::clone(&active);
    let p = Arc::clone(&peak);

    let service = tower::service_fn(move |_req: ()| {
        let active = Arc::clone(&a);
        let peak = Arc::clone(&p);
        async move {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(10)).await;
            active.fetch_sub(1, Ordering::SeqCst);
            Ok::<_, TestError>(())
        }
    });

    let bulkhead = gate(max_concurrent, Duration::from_secs(5));
    let service = tower::ServiceBuilder::new()
        .layer(BulkheadLayer::new(bulkhead))
        .service(service);

    let mut handles = Vec::new();
    for _ in 0..50 {
        let mut svc = service.clone();
        handles.push(tokio::spawn(async move {
            svc.ready().await.unwrap().call(()).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, 50);
    assert!(
        peak.load(Ordering::SeqCst) <= max_concurrent,
        "peak {} exceeded bound {}",
        peak.load(Ordering::SeqCst),
        max_concurrent
    );
}

#[tokio::test]
async fn permits_are_not_leaked_across_rounds() {
    let bulkhead = gate(3, Duration::from_millis(20));

    for _ in 0..10 {
        let permits = vec![
            bulkhead.admit().await.unwrap(),
            bulkhead.admit().await.unwrap(),
            bulkhead.admit().await.unwrap(),
        ];
        assert!(bulkhead.admit().await.is_err());
        drop(permits);
    }

    // If a slot leaked anywhere above, this round would come up short.
    let _a = bulkhead.admit().await.unwrap();
    let _b = bulkhead.admit().await.unwrap();
    let _c = bulkhead.admit().await.unwrap();
}

#[tokio::test]
async fn admitted_and_released_listeners_track_occupancy() {
    let admitted = Arc::new(AtomicUsize::new(0));
    let released = Arc::new(AtomicUsize::new(0));
    let a = Arc::clone(&admitted);
    let r = Arc::clone(&released);

    let bulkhead = Bulkhead::new(
        BulkheadConfig::builder()
            .max_concurrent_calls(2)
            .on_admitted(move |_| {
                a.fetch_add(1, Ordering::SeqCst);
            })
            .on_released(move |_| {
                r.fetch_add(1, Ordering::SeqCst);
            })
            .build(),
    );

    let first = bulkhead.admit().await.unwrap();
    let second = bulkhead.admit().await.unwrap();
    drop(first);
    drop(second);

    assert_eq!(admitted.load(Ordering::SeqCst), 2);
    assert_eq!(released.load(Ordering::SeqCst), 2);
}
