//! Tower layer implementation for the bulkhead.

use crate::gate::Bulkhead;
use crate::service::BulkheadService;
use tower::Layer;

/// Layer that admits calls through a shared [`Bulkhead`].
///
/// Every service produced by this layer shares the same slot pool, so the
/// bound applies across clones. Keep a clone of the gate to resize it while
/// the services are live:
///
/// ```
/// use tower_shield_bulkhead::{Bulkhead, BulkheadConfig, BulkheadLayer};
///
/// let gate = Bulkhead::new(BulkheadConfig::builder().max_concurrent_calls(10).build());
/// let layer = BulkheadLayer::new(gate.clone());
/// // ... layer services, then later:
/// gate.resize(25);
/// ```
#[derive(Clone)]
pub struct BulkheadLayer {
    bulkhead: Bulkhead,
}

impl BulkheadLayer {
    /// Creates a layer admitting through the given gate.
    pub fn new(bulkhead: Bulkhead) -> Self {
        Self { bulkhead }
    }

    /// Handle to the shared gate.
    pub fn bulkhead(&self) -> &Bulkhead {
        &self.bulkhead
    }
}

impl<S> Layer<S> for BulkheadLayer {
    type Service = BulkheadService<S>;

    fn layer(&self, service: S) -> Self::Service {
        BulkheadService::new(service, self.bulkhead.clone())
    }
}
