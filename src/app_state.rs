//! Shared application state, built once in `main` and handed to every page.

use crate::config::AppConfig;
use crate::event_bus::{AppChannels, Bus, Signal};
use crate::i18n::{self, Language};
use crate::page_manager::Route;
use crate::services::auth::AuthService;
use deck_channels::Subscriber;
use deck_users::UserSource;
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

/// Set by components whose state changed; the shell re-renders on its next tick.
#[derive(Clone, Default)]
pub struct RenderFlag(Arc<AtomicBool>);

impl RenderFlag {
    #[inline]
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether a render was requested.
    #[inline]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub channels: AppChannels,
    pub auth: AuthService,
    pub users: Arc<dyn UserSource>,
    pub render: RenderFlag,
    navigation: mpsc::UnboundedSender<Route>,
    language: Arc<Mutex<Language>>,
    _language_watch: Subscriber<Signal>,
}

impl AppState {
    /// Build the state. The receiver yields navigation requests made from
    /// background tasks (e.g. after a login completes).
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserSource>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Route>) {
        let bus = Arc::new(Bus::new());
        let channels = AppChannels::new(bus, config.channels.clone());
        let (navigation, navigation_rx) = mpsc::unbounded_channel();

        // Channels keep no value, so the last language is remembered here
        // for pages entered after the change.
        let language = Arc::new(Mutex::new(config.i18n.default_language));
        let language_watch = channels.controller("app-state");
        let current = Arc::clone(&language);
        language_watch.subscribe(&config.channels.language, move |signal| {
            if let Signal::Language(lang) = signal {
                *current.lock() = *lang;
            }
        });

        let state = Self {
            auth: AuthService::new(config.auth_latency()),
            config,
            channels,
            users,
            render: RenderFlag::default(),
            navigation,
            language,
            _language_watch: language_watch,
        };
        (Arc::new(state), navigation_rx)
    }

    pub fn language(&self) -> Language {
        *self.language.lock()
    }

    /// Translate `key` into the current language.
    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        i18n::translate_with_fallback(key, self.language(), self.config.i18n.fallback_language)
    }

    /// Ask the shell to navigate once the current event is handled.
    pub fn navigate(&self, route: Route) {
        debug!("Navigation requested: {}", route);
        if self.navigation.send(route).is_err() {
            warn!("Navigation receiver dropped, request ignored");
        }
    }

    pub fn request_render(&self) {
        self.render.request();
    }
}
