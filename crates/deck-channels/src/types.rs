//! Core types for deck-channels

use std::fmt;
use std::sync::Arc;

/// Callback invoked with every value published on a channel.
pub type Handler<V> = Arc<dyn Fn(&V) + Send + Sync>;

/// Identity of a component holding subscriptions.
/// Allocated by [`crate::ChannelBus::register_owner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(pub(crate) u64);

impl OwnerId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "owner#{}", self.0)
    }
}

/// Handle returned by `subscribe`, usable to cancel exactly that registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}
