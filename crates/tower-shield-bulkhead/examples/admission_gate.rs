//! Drives a small gate to show admission, rejection, and live resize.
//!
//! Run with: cargo run --example admission_gate

use std::time::Duration;
use tower_shield_bulkhead::{Bulkhead, BulkheadConfig};

#[tokio::main]
async fn main() {
    let gate = Bulkhead::new(
        BulkheadConfig::builder()
            .max_concurrent_calls(2)
            .max_wait(Duration::from_millis(20))
            .name("demo")
            .on_rejected(|max| println!("rejected: {max} slots all busy"))
            .build(),
    );

    let first = gate.admit().await.expect("slot available");
    let second = gate.admit().await.expect("slot available");
    println!("holding {} of {} slots", gate.active_calls(), gate.capacity());

    // Third caller times out after 20ms.
    if gate.admit().await.is_err() {
        println!("third caller turned away");
    }

    // Grow the pool while the first two callers still hold their slots.
    gate.resize(3);
    let third = gate.admit().await.expect("new slot admittable immediately");
    println!("after resize: {} of {}", gate.active_calls(), gate.capacity());

    drop(first);
    drop(second);
    drop(third);
    println!("drained: {} of {}", gate.active_calls(), gate.capacity());
}
