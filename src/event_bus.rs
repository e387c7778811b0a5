//! Application channels and the payload they carry.
//!
//! One `ChannelBus<Signal>` is shared by every page. Channel names for the
//! shared state come from the config; the few fixed ones live here.
//! Each page matches the variants it cares about and ignores the rest.

use crate::config::ChannelNames;
use crate::i18n::Language;
use crate::page_manager::Route;
use deck_channels::{ChannelBus, Subscriber};
use deck_users::User;
use std::sync::Arc;

pub type Bus = ChannelBus<Signal>;

/// Router announcements: the name of the route just entered.
pub const ROUTE_CHANGED: &str = "route-changed";
/// Published by the second page when it is entered.
pub const SECOND_PAGE_DATA: &str = "ch-second-page-data";
/// Free-form demo channel driven from the second page.
pub const DEMO_CHANNEL: &str = "demo-channel";

/// Everything that travels over the bus.
#[derive(Clone, Debug)]
pub enum Signal {
    Users(Vec<User>),
    SelectedUser(Option<Box<User>>), // Boxed to keep enum size small
    Language(Language),
    Loading(bool),
    Error(Option<String>),
    Route(Route),
    Custom(serde_json::Value),
}

impl Signal {
    /// Short variant name for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Signal::Users(_) => "users",
            Signal::SelectedUser(_) => "selected-user",
            Signal::Language(_) => "language",
            Signal::Loading(_) => "loading",
            Signal::Error(_) => "error",
            Signal::Route(_) => "route",
            Signal::Custom(_) => "custom",
        }
    }
}

/// The bus plus the configured channel names, with typed publish helpers.
#[derive(Clone)]
pub struct AppChannels {
    bus: Arc<Bus>,
    names: ChannelNames,
}

impl AppChannels {
    pub fn new(bus: Arc<Bus>, names: ChannelNames) -> Self {
        Self { bus, names }
    }

    pub fn bus(&self) -> &Arc<Bus> {
        &self.bus
    }

    pub fn names(&self) -> &ChannelNames {
        &self.names
    }

    /// A controller for one component, labelled for log lines.
    pub fn controller(&self, label: &str) -> Subscriber<Signal> {
        Subscriber::new(Arc::clone(&self.bus), label)
    }

    #[inline]
    pub fn send_users(&self, users: Vec<User>) {
        self.bus.publish(&self.names.users, Signal::Users(users));
    }

    #[inline]
    pub fn send_selected_user(&self, user: Option<User>) {
        self.bus.publish(
            &self.names.selected_user,
            Signal::SelectedUser(user.map(Box::new)),
        );
    }

    #[inline]
    pub fn send_language(&self, language: Language) {
        self.bus
            .publish(&self.names.language, Signal::Language(language));
    }

    #[inline]
    pub fn send_loading(&self, loading: bool) {
        self.bus.publish(&self.names.loading, Signal::Loading(loading));
    }

    #[inline]
    pub fn send_error(&self, message: Option<String>) {
        self.bus.publish(&self.names.errors, Signal::Error(message));
    }

    #[inline]
    pub fn send_route(&self, route: Route) {
        self.bus.publish(ROUTE_CHANGED, Signal::Route(route));
    }

    #[inline]
    pub fn send_custom(&self, channel: &str, payload: serde_json::Value) {
        self.bus.publish(channel, Signal::Custom(payload));
    }
}
