//! # ember_event - Typed Publish/Subscribe
//!
//! Observer mechanism for engine-side notifications (texture regenerated,
//! asset reloaded, ...) with:
//! - Typed subscriptions, dispatched synchronously on publish
//! - RAII subscription handles - dropping the handle unsubscribes
//!
//! The scoped handles replace the manual subscribe-in-constructor /
//! unsubscribe-in-destructor pairing of delegate-based designs, where a
//! forgotten unsubscribe leaves a dangling callback behind.
//!
//! Dispatch is synchronous and intended for the single main/render thread;
//! handlers run inline on the publishing call.

use core::any::{Any, TypeId};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

/// Trait for events
pub trait Event: 'static {}

// Blanket implementation
impl<T: 'static> Event for T {}

/// Identifier of a live subscription
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SubscriberId(u64);

type DynHandler = Arc<dyn Fn(&dyn Any)>;

struct Registry {
    handlers: BTreeMap<TypeId, Vec<(SubscriberId, DynHandler)>>,
    next_subscriber_id: u64,
}

impl Registry {
    fn remove(&mut self, id: SubscriberId) {
        for handlers in self.handlers.values_mut() {
            handlers.retain(|(sub_id, _)| *sub_id != id);
        }
    }
}

/// Event bus for publishing and subscribing to events
///
/// Cloning the bus is cheap and yields another endpoint onto the same
/// subscriber registry, so producers deep inside the engine (an atlas page
/// signalling a texture swap) can hold their own copy.
#[derive(Clone)]
pub struct EventBus {
    registry: Arc<RwLock<Registry>>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry {
                handlers: BTreeMap::new(),
                next_subscriber_id: 1,
            })),
        }
    }

    /// Subscribe to an event type
    ///
    /// The handler runs on every publish of `E` until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<E: Event, F>(&self, handler: F) -> Subscription
    where
        F: Fn(&E) + 'static,
    {
        let mut registry = self.registry.write();
        let id = SubscriberId(registry.next_subscriber_id);
        registry.next_subscriber_id += 1;

        let wrapped: DynHandler = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                handler(event);
            }
        });

        registry
            .handlers
            .entry(TypeId::of::<E>())
            .or_default()
            .push((id, wrapped));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    /// Publish an event, dispatching to all subscribers of its type
    pub fn publish<E: Event>(&self, event: &E) {
        // Snapshot handlers so a handler may subscribe/unsubscribe or publish
        // again without holding the registry lock.
        let handlers: Vec<DynHandler> = {
            let registry = self.registry.read();
            match registry.handlers.get(&TypeId::of::<E>()) {
                Some(list) => list.iter().map(|(_, h)| h.clone()).collect(),
                None => return,
            }
        };

        for handler in handlers {
            handler(event);
        }
    }

    /// Number of live subscriptions for an event type
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.registry
            .read()
            .handlers
            .get(&TypeId::of::<E>())
            .map(|l| l.len())
            .unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped subscription handle
///
/// Unsubscribes when dropped. Outliving the bus is fine; the handle holds
/// only a weak reference to the registry.
pub struct Subscription {
    registry: Weak<RwLock<Registry>>,
    id: SubscriberId,
}

impl Subscription {
    /// Unsubscribe now instead of at drop
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.write().remove(self.id);
        }
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id.0).finish()
    }
}

/// Prelude
pub mod prelude {
    pub use crate::{Event, EventBus, Subscription};
}
