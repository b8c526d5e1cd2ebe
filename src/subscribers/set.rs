//! # Fan-out container for subscribers.
//!
//! [`SubscriberSet`] delivers each event to every registered subscriber in
//! order. Delivery is sequential: a VM lifetime produces a handful of
//! events, so per-subscriber queues and worker tasks would buy nothing
//! here. Subscribers that need to decouple can spawn internally.

use std::sync::Arc;

use crate::events::Event;
use crate::subscribers::Subscriber;

/// Ordered set of subscribers sharing one event stream.
#[derive(Clone, Default)]
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscriber>>,
}

impl SubscriberSet {
    /// Creates a set from the given subscribers.
    pub fn new(subs: Vec<Arc<dyn Subscriber>>) -> Self {
        Self { subs }
    }

    /// Returns the number of registered subscribers.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// Returns `true` when no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Delivers one event to every subscriber, in registration order.
    pub async fn emit(&self, ev: &Event) {
        for sub in &self.subs {
            sub.handle(ev).await;
        }
    }
}
