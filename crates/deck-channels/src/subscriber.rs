//! Per-component view of the bus.
//!
//! A `Subscriber` binds one `OwnerId` to a shared bus, so a component can
//! subscribe and unsubscribe by channel name alone. Dropping it releases
//! every subscription it still holds.

use crate::bus::ChannelBus;
use crate::types::{OwnerId, SubscriptionId};
use std::sync::Arc;

pub struct Subscriber<V> {
    bus: Arc<ChannelBus<V>>,
    owner: OwnerId,
}

impl<V> Subscriber<V> {
    /// Register a new owner on `bus` under `label`.
    pub fn new(bus: Arc<ChannelBus<V>>, label: impl Into<String>) -> Self {
        let owner = bus.register_owner(label);
        Self { bus, owner }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn bus(&self) -> &Arc<ChannelBus<V>> {
        &self.bus
    }

    /// Subscribe, replacing any handler this owner already has on `channel`.
    pub fn subscribe<F>(&self, channel: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        self.bus.subscribe(channel, self.owner, handler)
    }

    pub fn publish(&self, channel: &str, value: V) {
        self.bus.publish(channel, value);
    }

    /// Idempotent.
    pub fn unsubscribe(&self, channel: &str) {
        self.bus.unsubscribe(channel, self.owner);
    }

    pub fn is_subscribed(&self, channel: &str) -> bool {
        self.bus.is_subscribed(channel, self.owner)
    }

    /// Drop every subscription held by this owner. Returns how many there were.
    pub fn unsubscribe_all(&self) -> usize {
        self.bus.unsubscribe_owner(self.owner)
    }
}

impl<V> Drop for Subscriber<V> {
    fn drop(&mut self) {
        self.bus.release_owner(self.owner);
    }
}
