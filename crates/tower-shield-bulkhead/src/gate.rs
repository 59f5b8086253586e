//! The admission gate itself, independent of any service wrapper.

use crate::config::BulkheadConfig;
use crate::error::RejectedError;
use crate::events::BulkheadEvent;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tower_shield_core::events::EventListeners;
use tower_shield_core::metrics::SharedSink;

/// Slot bookkeeping shared by admission, release, and resize.
///
/// The semaphore holds the currently free slots and is never replaced over
/// the gate's lifetime; capacity changes act on it through `add_permits` and
/// `forget_permits` under this lock. `debt` counts slots a shrink could not
/// remove because they were held at the time; releases pay debt down before
/// returning slots to the pool. Invariant: `free + held - debt == capacity`.
struct SlotState {
    capacity: usize,
    held: usize,
    debt: usize,
}

struct Inner {
    name: String,
    max_wait: Duration,
    active: bool,
    semaphore: Semaphore,
    slots: Mutex<SlotState>,
    listeners: EventListeners<BulkheadEvent>,
    sink: SharedSink,
}

impl Inner {
    fn slots(&self) -> MutexGuard<'_, SlotState> {
        // Slot updates are panic-free, so a poisoned lock still holds
        // consistent state.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        let (concurrent, capacity) = {
            let mut slots = self.slots();
            if slots.held == 0 {
                // A stray release must never underflow the pool.
                return;
            }
            slots.held -= 1;
            if slots.debt > 0 {
                slots.debt -= 1;
            } else {
                self.semaphore.add_permits(1);
            }
            (slots.held, slots.capacity)
        };

        self.sink.active_calls(&self.name, concurrent);
        self.sink.max_calls(&self.name, capacity);
        self.listeners.emit(&BulkheadEvent::Released {
            pattern_name: self.name.clone(),
            timestamp: Instant::now(),
            concurrent_calls: concurrent,
        });
    }
}

/// Bounded-concurrency admission gate.
///
/// Callers acquire a [`Permit`] through [`admit`](Bulkhead::admit) before
/// proceeding; at most `max_concurrent_calls` permits exist at once.
/// Cloning is cheap and clones share the same slot pool, so one gate can sit
/// in front of any number of service clones and still bound them together.
#[derive(Clone)]
pub struct Bulkhead {
    inner: Arc<Inner>,
}

impl Bulkhead {
    /// Creates a gate from its configuration.
    pub fn new(config: BulkheadConfig) -> Self {
        let inner = Arc::new(Inner {
            semaphore: Semaphore::new(config.max_concurrent_calls),
            slots: Mutex::new(SlotState {
                capacity: config.max_concurrent_calls,
                held: 0,
                debt: 0,
            }),
            name: config.name,
            max_wait: config.max_wait,
            active: config.active,
            listeners: config.listeners,
            sink: config.sink,
        });
        inner.sink.max_calls(&inner.name, config.max_concurrent_calls);
        Self { inner }
    }

    /// Acquires one slot, waiting at most the configured `max_wait`.
    ///
    /// An inactive gate admits immediately without touching the pool. On
    /// rejection the caller holds nothing and the gate will not retry on its
    /// behalf; admission failure is terminal for the attempt.
    pub async fn admit(&self) -> Result<Permit, RejectedError> {
        if !self.inner.active {
            return Ok(Permit { inner: None });
        }

        let start = Instant::now();
        let acquired =
            tokio::time::timeout(self.inner.max_wait, self.inner.semaphore.acquire()).await;
        self.inner
            .sink
            .admission_wait(&self.inner.name, start.elapsed());

        match acquired {
            Ok(Ok(permit)) => {
                // Move the permit into manual bookkeeping so release can pay
                // down shrink debt instead of blindly refilling the pool.
                permit.forget();
                let (concurrent, capacity) = {
                    let mut slots = self.inner.slots();
                    slots.held += 1;
                    (slots.held, slots.capacity)
                };

                self.inner.sink.active_calls(&self.inner.name, concurrent);
                self.inner.sink.max_calls(&self.inner.name, capacity);
                self.inner.listeners.emit(&BulkheadEvent::Admitted {
                    pattern_name: self.inner.name.clone(),
                    timestamp: Instant::now(),
                    concurrent_calls: concurrent,
                });

                Ok(Permit {
                    inner: Some(Arc::clone(&self.inner)),
                })
            }
            // The semaphore is never closed; both arms mean no slot freed up
            // within `max_wait`.
            Ok(Err(_)) | Err(_) => {
                let capacity = self.capacity();
                self.inner.sink.admission_rejected(&self.inner.name);
                self.inner.listeners.emit(&BulkheadEvent::Rejected {
                    pattern_name: self.inner.name.clone(),
                    timestamp: Instant::now(),
                    max_concurrent_calls: capacity,
                });

                #[cfg(feature = "tracing")]
                tracing::warn!(
                    bulkhead = %self.inner.name,
                    max_concurrent_calls = capacity,
                    max_wait = ?self.inner.max_wait,
                    "bulkhead rejected call"
                );

                Err(RejectedError {
                    name: self.inner.name.clone(),
                    max_concurrent_calls: capacity,
                })
            }
        }
    }

    /// Changes the admission ceiling without disturbing current holders.
    ///
    /// Growing makes the extra slots admittable immediately. Shrinking
    /// removes free slots now and defers the remainder until holders
    /// release; a holder is never evicted. Passing `0` or the current
    /// capacity is a no-op.
    pub fn resize(&self, new_capacity: usize) {
        if new_capacity == 0 {
            return;
        }

        {
            let mut slots = self.inner.slots();
            if new_capacity == slots.capacity {
                return;
            }
            if new_capacity > slots.capacity {
                let mut grow = new_capacity - slots.capacity;
                let cancelled = grow.min(slots.debt);
                slots.debt -= cancelled;
                grow -= cancelled;
                if grow > 0 {
                    self.inner.semaphore.add_permits(grow);
                }
            } else {
                let shrink = slots.capacity - new_capacity;
                let forgotten = self.inner.semaphore.forget_permits(shrink);
                slots.debt += shrink - forgotten;
            }
            slots.capacity = new_capacity;
        }

        self.inner.sink.max_calls(&self.inner.name, new_capacity);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            bulkhead = %self.inner.name,
            max_concurrent_calls = new_capacity,
            "bulkhead resized"
        );
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current admission capacity.
    pub fn capacity(&self) -> usize {
        self.inner.slots().capacity
    }

    /// Number of currently admitted calls.
    pub fn active_calls(&self) -> usize {
        self.inner.slots().held
    }

    /// Whether the gate is enforcing its limit. An inactive gate admits
    /// everything.
    pub fn is_active(&self) -> bool {
        self.inner.active
    }
}

impl std::fmt::Debug for Bulkhead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.inner.slots();
        f.debug_struct("Bulkhead")
            .field("name", &self.inner.name)
            .field("capacity", &slots.capacity)
            .field("held", &slots.held)
            .field("active", &self.inner.active)
            .finish()
    }
}

/// A held bulkhead slot.
///
/// Dropping the permit returns the slot, whatever path the call takes out of
/// the interceptor: success, error, or cancellation. A permit from an
/// inactive gate releases nothing.
#[must_use = "dropping the permit releases the slot"]
pub struct Permit {
    inner: Option<Arc<Inner>>,
}

impl Permit {
    /// Returns the slot before the permit would go out of scope.
    pub fn release(self) {}
}

impl Drop for Permit {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            inner.release();
        }
    }
}

impl std::fmt::Debug for Permit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Permit")
            .field("passthrough", &self.inner.is_none())
            .finish()
    }
}
