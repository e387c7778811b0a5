//! User list with debounced search.
//!
//! The list arrives over the users channel; the search box feeds a
//! `DebouncedFilter` that is local to this page.

use crate::app_state::AppState;
use crate::event_bus::Signal;
use crate::functions::formatting::{counts_line, heading, user_row};
use crate::i18n::Language;
use crate::page_manager::{Action, Entry, Handled, Page, PageFactory, Route};
use crate::pages::{guard, tr};
use crate::services::users::{find_user, spawn_refresh_users};
use deck_channels::Subscriber;
use deck_search::DebouncedFilter;
use deck_users::User;
use log::{debug, info};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct UsersFactory;

impl PageFactory for UsersFactory {
    fn route_name(&self) -> &'static str {
        "users"
    }

    fn create(&self, state: &Arc<AppState>) -> Box<dyn Page> {
        Box::new(UsersPage::new(Arc::clone(state)))
    }
}

#[derive(Default)]
struct UsersView {
    language: Language,
    loading: bool,
    error: Option<String>,
    /// At least one delivery on the users channel since entering.
    loaded: bool,
}

pub struct UsersPage {
    state: Arc<AppState>,
    controller: Subscriber<Signal>,
    view: Arc<Mutex<UsersView>>,
    filter: Arc<Mutex<DebouncedFilter<User>>>,
    loader: Option<JoinHandle<()>>,
}

impl UsersPage {
    pub fn new(state: Arc<AppState>) -> Self {
        let controller = state.channels.controller("users");
        let render = state.render.clone();
        let filter = DebouncedFilter::new(state.config.bounded_properties.search_debounce()).on_apply(
            move |term: &str, filtered: &[User]| {
                debug!("Users: '{}' matched {} user(s)", term, filtered.len());
                render.request();
            },
        );
        Self {
            state,
            controller,
            view: Arc::new(Mutex::new(UsersView::default())),
            filter: Arc::new(Mutex::new(filter)),
            loader: None,
        }
    }

    /// Start a fetch unless one is already running.
    fn load(&mut self) {
        if self.loader.as_ref().is_some_and(|task| !task.is_finished()) {
            debug!("Users: fetch already in flight");
            return;
        }
        self.loader = Some(spawn_refresh_users(&self.state));
    }

    /// Publish the selection and move to its detail page.
    fn select(&self, id: u64) -> Handled {
        let items = self.filter.lock().items();
        let user = find_user(&items, id).cloned();
        if user.is_none() {
            debug!("Users: {} not in the loaded list, detail page will fetch it", id);
        }
        self.state.channels.send_selected_user(user);
        Handled::Navigate(Route::UserDetail(id))
    }

    fn subscribe_all(&self) {
        let names = self.state.channels.names();
        let render = self.state.render.clone();

        let (view, filter, r) = (self.view.clone(), self.filter.clone(), render.clone());
        self.controller.subscribe(&names.users, move |signal| {
            if let Signal::Users(users) = signal {
                view.lock().loaded = true;
                filter.lock().set_items(users.clone());
                r.request();
            }
        });

        let (view, r) = (self.view.clone(), render.clone());
        self.controller.subscribe(&names.language, move |signal| {
            if let Signal::Language(lang) = signal {
                view.lock().language = *lang;
                r.request();
            }
        });

        let (view, r) = (self.view.clone(), render.clone());
        self.controller.subscribe(&names.loading, move |signal| {
            if let Signal::Loading(flag) = signal {
                view.lock().loading = *flag;
                r.request();
            }
        });

        let view = self.view.clone();
        self.controller.subscribe(&names.errors, move |signal| {
            if let Signal::Error(message) = signal {
                view.lock().error = message.clone();
                render.request();
            }
        });
    }
}

impl Page for UsersPage {
    fn on_enter(&mut self, route: &Route) -> Entry {
        if let Some(redirect) = guard(&self.state, route) {
            return redirect;
        }

        *self.view.lock() = UsersView {
            language: self.state.language(),
            ..UsersView::default()
        };
        self.subscribe_all();
        self.load();
        Entry::Entered
    }

    fn on_leave(&mut self) {
        self.filter.lock().teardown();
        self.controller.unsubscribe_all();
    }

    fn render(&self) -> String {
        let view = self.view.lock();
        let filter = self.filter.lock();
        let t = |key| tr(&self.state, view.language, key);

        let items = filter.items();
        let filtered = filter.filtered();
        let term = filter.term();

        let mut out = vec![heading(t("users.title")), t("users.subtitle").to_string()];
        if view.loading {
            out.push(t("users.loading").to_string());
        }
        if let Some(message) = &view.error {
            out.push(format!("! {}: {}", t("users.error"), message));
            out.push(format!("  [retry] {}", t("users.retry")));
        }
        if !view.loaded {
            return out.join("\n");
        }

        out.push(format!("{}: {}", t("users.search"), term));
        out.push(counts_line(
            t("users.total"),
            items.len(),
            t("users.filtered"),
            filtered.len(),
        ));
        out.push(String::new());

        if items.is_empty() {
            out.push(t("users.empty").to_string());
        } else if filtered.is_empty() {
            out.push(t("users.noResults").to_string());
        } else {
            out.extend(filtered.iter().map(user_row));
        }
        out.join("\n")
    }

    fn handle(&mut self, action: &Action) -> Handled {
        match action {
            Action::Search(term) => {
                self.filter.lock().on_input(term.clone());
                Handled::Done
            }
            Action::Clear => {
                self.filter.lock().clear();
                Handled::Done
            }
            Action::Reload => {
                info!("Users: reloading");
                self.state.users.invalidate();
                self.load();
                Handled::Done
            }
            Action::Retry => {
                self.load();
                Handled::Done
            }
            Action::Open(id) => self.select(*id),
            _ => Handled::Ignored,
        }
    }
}
