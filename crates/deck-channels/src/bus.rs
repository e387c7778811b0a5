//! Channel bus implementation.
//!
//! A registry of named channels, each holding an ordered list of subscriptions.
//! Publishing snapshots the list under the lock, releases the lock, then calls
//! every handler in order. Handlers may therefore subscribe, unsubscribe or
//! publish from inside a delivery without deadlocking or disturbing it.

use crate::types::{Handler, OwnerId, SubscriptionId};
use log::{debug, error, trace};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

struct Subscription<V> {
    id: SubscriptionId,
    owner: OwnerId,
    handler: Handler<V>,
}

struct Registry<V> {
    /// Subscriptions per channel name, in subscription order.
    channels: HashMap<String, Vec<Subscription<V>>>,
    /// Owner labels, for log lines only.
    owners: HashMap<OwnerId, String>,
}

impl<V> Registry<V> {
    fn label(&self, owner: OwnerId) -> String {
        self.owners
            .get(&owner)
            .cloned()
            .unwrap_or_else(|| owner.to_string())
    }
}

/// Process-wide named-channel publish/subscribe registry.
///
/// The payload type `V` is opaque to the bus. Share it between components
/// with an `Arc<ChannelBus<V>>`.
pub struct ChannelBus<V> {
    registry: Mutex<Registry<V>>,
    next_owner: AtomicU64,
    next_subscription: AtomicU64,
}

impl<V> Default for ChannelBus<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ChannelBus<V> {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                channels: HashMap::new(),
                owners: HashMap::new(),
            }),
            next_owner: AtomicU64::new(0),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Allocate a new owner identity for a component.
    pub fn register_owner(&self, label: impl Into<String>) -> OwnerId {
        let owner = OwnerId(self.next_owner.fetch_add(1, Ordering::Relaxed) + 1);
        let label = label.into();
        debug!("Registered {} as '{}'", owner, label);
        self.registry.lock().owners.insert(owner, label);
        owner
    }

    /// Remove all of an owner's subscriptions and forget its label.
    pub fn release_owner(&self, owner: OwnerId) {
        let removed = self.unsubscribe_owner(owner);
        let label = self.registry.lock().owners.remove(&owner);
        debug!(
            "Released {} ({} subscription(s) dropped)",
            label.unwrap_or_else(|| owner.to_string()),
            removed
        );
    }

    /// Register `handler` for `channel` on behalf of `owner`.
    ///
    /// An existing subscription of the same owner on the same channel is
    /// replaced; the new handler goes to the end of the delivery order.
    pub fn subscribe<F>(&self, channel: &str, owner: OwnerId, handler: F) -> SubscriptionId
    where
        F: Fn(&V) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed) + 1);
        let replaced = {
            let mut registry = self.registry.lock();
            let label = registry.label(owner);
            let subscriptions = registry.channels.entry(channel.to_string()).or_default();

            let replaced = subscriptions
                .iter()
                .position(|s| s.owner == owner)
                .map(|idx| subscriptions.remove(idx));

            subscriptions.push(Subscription {
                id,
                owner,
                handler: Arc::new(handler),
            });

            match &replaced {
                Some(old) => debug!(
                    "'{}' re-subscribed to '{}': {} replaces {}",
                    label, channel, id, old.id
                ),
                None => debug!("'{}' subscribed to '{}' ({})", label, channel, id),
            }
            replaced
        };
        // Dropped outside the lock: a handler's captures may touch the bus.
        drop(replaced);
        id
    }

    /// Invoke every handler currently registered on `channel` with `value`.
    ///
    /// Fire-and-forget: a channel without subscribers drops the value, and a
    /// panicking handler is logged and skipped.
    pub fn publish(&self, channel: &str, value: V) {
        let snapshot: Vec<(SubscriptionId, OwnerId, Handler<V>)> = {
            let registry = self.registry.lock();
            match registry.channels.get(channel) {
                Some(subscriptions) => subscriptions
                    .iter()
                    .map(|s| (s.id, s.owner, Arc::clone(&s.handler)))
                    .collect(),
                None => Vec::new(),
            }
        };

        if snapshot.is_empty() {
            trace!("Publish on '{}' dropped: no subscribers", channel);
            return;
        }

        trace!(
            "Publishing on '{}' to {} subscriber(s)",
            channel,
            snapshot.len()
        );

        for (id, owner, handler) in snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(&value)));
            if let Err(payload) = outcome {
                let label = self.registry.lock().label(owner);
                error!(
                    "Handler {} of '{}' panicked on channel '{}': {}",
                    id,
                    label,
                    channel,
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    /// Remove `owner`'s handler from `channel`. Returns whether one existed.
    pub fn unsubscribe(&self, channel: &str, owner: OwnerId) -> bool {
        let removed = {
            let mut registry = self.registry.lock();
            let label = registry.label(owner);
            let Some(subscriptions) = registry.channels.get_mut(channel) else {
                return false;
            };
            let removed = subscriptions
                .iter()
                .position(|s| s.owner == owner)
                .map(|idx| subscriptions.remove(idx));
            if subscriptions.is_empty() {
                registry.channels.remove(channel);
            }
            if removed.is_some() {
                debug!("'{}' unsubscribed from '{}'", label, channel);
            }
            removed
        };
        removed.is_some()
    }

    /// Remove a single subscription by handle. Returns whether it was active.
    pub fn cancel(&self, id: SubscriptionId) -> bool {
        let removed = {
            let mut registry = self.registry.lock();
            let mut found = None;
            for (channel, subscriptions) in registry.channels.iter_mut() {
                if let Some(idx) = subscriptions.iter().position(|s| s.id == id) {
                    found = Some((channel.clone(), subscriptions.remove(idx)));
                    break;
                }
            }
            if let Some((channel, _)) = &found {
                if registry.channels.get(channel).is_some_and(Vec::is_empty) {
                    registry.channels.remove(channel);
                }
                debug!("Cancelled {} on '{}'", id, channel);
            }
            found
        };
        removed.is_some()
    }

    /// Remove every subscription held by `owner`. Returns how many were removed.
    pub fn unsubscribe_owner(&self, owner: OwnerId) -> usize {
        let removed: Vec<Subscription<V>> = {
            let mut registry = self.registry.lock();
            let mut removed = Vec::new();
            registry.channels.retain(|_, subscriptions| {
                let mut idx = 0;
                while idx < subscriptions.len() {
                    if subscriptions[idx].owner == owner {
                        removed.push(subscriptions.remove(idx));
                    } else {
                        idx += 1;
                    }
                }
                !subscriptions.is_empty()
            });
            removed
        };
        removed.len()
    }

    /// Number of active subscriptions on `channel`.
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.registry
            .lock()
            .channels
            .get(channel)
            .map_or(0, Vec::len)
    }

    /// Whether `owner` currently holds a subscription on `channel`.
    pub fn is_subscribed(&self, channel: &str, owner: OwnerId) -> bool {
        self.registry
            .lock()
            .channels
            .get(channel)
            .is_some_and(|subs| subs.iter().any(|s| s.owner == owner))
    }

    /// Names of all channels with at least one subscriber, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.lock().channels.keys().cloned().collect();
        names.sort();
        names
    }
}

impl<V> fmt::Debug for ChannelBus<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry.lock();
        let mut channels: Vec<(&String, usize)> = registry
            .channels
            .iter()
            .map(|(name, subs)| (name, subs.len()))
            .collect();
        channels.sort();
        f.debug_struct("ChannelBus")
            .field("channels", &channels)
            .field("owners", &registry.owners.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
