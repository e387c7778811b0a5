//! Home page: greeting plus the language toggle.

use crate::app_state::AppState;
use crate::event_bus::Signal;
use crate::functions::formatting::heading;
use crate::i18n::Language;
use crate::page_manager::{Action, Entry, Handled, Page, PageFactory, Route};
use crate::pages::{guard, tr};
use crate::services::auth::Role;
use deck_channels::Subscriber;
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct HomeFactory;

impl PageFactory for HomeFactory {
    fn route_name(&self) -> &'static str {
        "home"
    }

    fn create(&self, state: &Arc<AppState>) -> Box<dyn Page> {
        Box::new(HomePage::new(Arc::clone(state)))
    }
}

#[derive(Default)]
struct HomeView {
    language: Language,
    /// Set once the language changes while the page is mounted.
    changed_to: Option<Language>,
}

pub struct HomePage {
    state: Arc<AppState>,
    controller: Subscriber<Signal>,
    view: Arc<Mutex<HomeView>>,
}

impl HomePage {
    pub fn new(state: Arc<AppState>) -> Self {
        let controller = state.channels.controller("home");
        Self {
            state,
            controller,
            view: Arc::new(Mutex::new(HomeView::default())),
        }
    }
}

impl Page for HomePage {
    fn on_enter(&mut self, route: &Route) -> Entry {
        if let Some(redirect) = guard(&self.state, route) {
            return redirect;
        }

        let current = self.state.language();
        *self.view.lock() = HomeView {
            language: current,
            changed_to: None,
        };

        let view = Arc::clone(&self.view);
        let render = self.state.render.clone();
        self.controller
            .subscribe(&self.state.channels.names().language, move |signal| {
                if let Signal::Language(lang) = signal {
                    let mut view = view.lock();
                    if view.language != *lang {
                        view.changed_to = Some(*lang);
                    }
                    view.language = *lang;
                    render.request();
                }
            });

        // Announce the starting language for components mounted alongside.
        self.state.channels.send_language(current);
        Entry::Entered
    }

    fn on_leave(&mut self) {
        self.controller.unsubscribe_all();
    }

    fn render(&self) -> String {
        let view = self.view.lock();
        let t = |key| tr(&self.state, view.language, key);

        let mut out = vec![
            heading(t("app.title")),
            t("home.subtitle").to_string(),
            t("home.description").to_string(),
            String::new(),
            format!("{}: {}", t("navigation.language"), view.language.display_name()),
        ];
        if let Some(user) = self.state.auth.current_user() {
            let badge = if self.state.auth.has_role(Role::Admin) { " *" } else { "" };
            out.push(format!("@{} ({}){badge}", user.username, user.role));
        }
        if let Some(lang) = view.changed_to {
            out.push(format!("{} {}", t("home.languageChanged"), lang.display_name()));
        }
        out.join("\n")
    }

    fn handle(&mut self, action: &Action) -> Handled {
        match action {
            Action::Language(requested) => {
                let supported = &self.state.config.i18n.supported_languages;
                let next = requested.unwrap_or_else(|| self.state.language().next_in(supported));
                info!("Home: switching language to {}", next);
                self.state.channels.send_language(next);
                Handled::Done
            }
            _ => Handled::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::testing::*;

    #[tokio::test]
    async fn test_guest_is_redirected_to_login() {
        let (state, _, _rx) = state_with(FakeSource::new(Vec::new()));
        let mut page = HomePage::new(state.clone());
        assert_eq!(page.on_enter(&Route::Home), Entry::Redirect(Route::Login));
        assert!(!page.controller.is_subscribed("ch-language"));
    }

    #[tokio::test]
    async fn test_toggle_language_updates_view() {
        let (state, _, _rx) = state_with(FakeSource::new(Vec::new()));
        logged_in(&state).await;
        let mut page = HomePage::new(state.clone());
        assert_eq!(page.on_enter(&Route::Home), Entry::Entered);
        assert!(page.render().contains("Gestión de Usuarios"));
        assert!(page.render().contains("@admin (admin) *"));

        assert_eq!(page.handle(&Action::Language(None)), Handled::Done);
        assert_eq!(state.language(), Language::En);
        let text = page.render();
        assert!(text.starts_with("User Management"));
        assert!(text.contains("Language changed to English"));

        page.handle(&Action::Language(Some(Language::Es)));
        assert!(page.render().contains("Idioma cambiado a Español"));
    }

    #[tokio::test]
    async fn test_leave_unsubscribes() {
        let (state, _, _rx) = state_with(FakeSource::new(Vec::new()));
        logged_in(&state).await;
        let mut page = HomePage::new(state.clone());
        page.on_enter(&Route::Home);
        assert!(page.controller.is_subscribed("ch-language"));

        page.on_leave();
        assert!(!page.controller.is_subscribed("ch-language"));
        state.channels.send_language(Language::En);
        assert!(page.render().contains("Español"));
    }
}
