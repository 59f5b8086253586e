//! Event system for the resilience layers.
//!
//! Each pattern crate defines its own event enum and emits through an
//! [`EventListeners`] collection held in its configuration. Listeners are
//! observation-only: a panicking listener is isolated so it cannot disturb
//! the admission or retry path it is watching.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// An event emitted by a resilience pattern instance.
pub trait ResilienceEvent: Send + Sync + fmt::Debug {
    /// Short identifier for the event kind, e.g. `"rejected"`.
    fn event_type(&self) -> &'static str;

    /// When the event occurred.
    fn timestamp(&self) -> Instant;

    /// Name of the pattern instance that emitted the event.
    fn pattern_name(&self) -> &str;
}

/// A consumer of pattern events.
pub trait EventListener<E: ResilienceEvent>: Send + Sync {
    fn on_event(&self, event: &E);
}

/// An ordered collection of listeners for one pattern instance.
pub struct EventListeners<E: ResilienceEvent> {
    listeners: Vec<Arc<dyn EventListener<E>>>,
}

impl<E: ResilienceEvent> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Delivers `event` to every listener. A listener that panics does not
    /// prevent the remaining listeners from running.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: ResilienceEvent> Clone for EventListeners<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<E: ResilienceEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a closure as an [`EventListener`].
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _event: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _event: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: ResilienceEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}
