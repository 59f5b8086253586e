use std::time::{Duration, Instant};
use tokio::time::sleep;
use tower_shield_bulkhead::{Bulkhead, BulkheadConfig};

fn gate(capacity: usize, max_wait: Duration) -> Bulkhead {
    Bulkhead::new(
        BulkheadConfig::builder()
            .max_concurrent_calls(capacity)
            .max_wait(max_wait)
            .name("timeout-test")
            .build(),
    )
}

#[tokio::test]
async fn rejection_lands_close_to_the_configured_wait() {
    let max_wait = Duration::from_millis(100);
    let bulkhead = gate(1, max_wait);
    let _held = bulkhead.admit().await.unwrap();

    let start = Instant::now();
    let result = bulkhead.admit().await;
    let elapsed = start.elapsed();

    assert!(result.is_err());
    assert!(
        elapsed >= Duration::from_millis(90),
        "rejected early: {elapsed:?}"
    );
    assert!(
        elapsed <= Duration::from_millis(400),
        "rejected late: {elapsed:?}"
    );
}

#[tokio::test]
async fn zero_wait_rejects_without_blocking() {
    let bulkhead = gate(1, Duration::ZERO);
    let _held = bulkhead.admit().await.unwrap();

    let start = Instant::now();
    assert!(bulkhead.admit().await.is_err());
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[tokio::test]
async fn slot_is_admittable_again_after_a_rejection() {
    let bulkhead = gate(1, Duration::from_millis(10));

    let held = bulkhead.admit().await.unwrap();
    assert!(bulkhead.admit().await.is_err());
    drop(held);

    assert!(bulkhead.admit().await.is_ok());
}

#[tokio::test]
async fn each_rejected_waiter_fails_exactly_once() {
    let bulkhead = gate(1, Duration::from_millis(30));
    let _held = bulkhead.admit().await.unwrap();

    let mut waiters = Vec::new();
    for _ in 0..5 {
        let bulkhead = bulkhead.clone();
        waiters.push(tokio::spawn(async move { bulkhead.admit().await }));
    }

    for waiter in waiters {
        assert!(waiter.await.unwrap().is_err());
    }
    // The holder's slot was untouched by the failed waiters.
    assert_eq!(bulkhead.active_calls(), 1);
}

#[tokio::test]
async fn waiters_do_not_hold_anything_while_queued() {
    let bulkhead = gate(1, Duration::from_millis(200));
    let held = bulkhead.admit().await.unwrap();

    let waiter = {
        let bulkhead = bulkhead.clone();
        tokio::spawn(async move { bulkhead.admit().await })
    };
    sleep(Duration::from_millis(20)).await;
    assert_eq!(bulkhead.active_calls(), 1);

    drop(held);
    assert!(waiter.await.unwrap().is_ok());
}
