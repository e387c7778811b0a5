//! deck-channels: named-channel publish/subscribe for UI components.
//!
//! Features:
//! - Transient channels (no retained value, no replay for late subscribers)
//! - Delivery in subscription order over a snapshot of the subscriber list
//! - Per-handler panic isolation (the publisher never sees handler failures)
//! - One subscription per (owner, channel), replaced on re-subscribe

pub mod bus;
pub mod subscriber;
pub mod types;

pub use bus::ChannelBus;
pub use subscriber::Subscriber;
pub use types::{Handler, OwnerId, SubscriptionId};
