//! Navigation bar. Mounted once for the whole session, above every page.

use crate::app_state::AppState;
use crate::event_bus::{ROUTE_CHANGED, Signal};
use crate::i18n::Language;
use crate::page_manager::{Action, Handled, Route};
use crate::pages::tr;
use deck_channels::Subscriber;
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct NavView {
    language: Language,
    route: Option<Route>,
}

pub struct NavigationBar {
    state: Arc<AppState>,
    controller: Subscriber<Signal>,
    view: Arc<Mutex<NavView>>,
}

impl NavigationBar {
    pub fn new(state: Arc<AppState>) -> Self {
        let controller = state.channels.controller("navigation");
        let view = Arc::new(Mutex::new(NavView {
            language: state.language(),
            route: None,
        }));

        let (v, render) = (view.clone(), state.render.clone());
        controller.subscribe(ROUTE_CHANGED, move |signal| {
            if let Signal::Route(route) = signal {
                v.lock().route = Some(route.clone());
                render.request();
            }
        });

        let (v, render) = (view.clone(), state.render.clone());
        controller.subscribe(&state.channels.names().language, move |signal| {
            if let Signal::Language(lang) = signal {
                v.lock().language = *lang;
                render.request();
            }
        });

        Self {
            state,
            controller,
            view,
        }
    }

    pub fn render(&self) -> String {
        let view = self.view.lock();
        let t = |key| tr(&self.state, view.language, key);
        let active = view.route.as_ref().map(Route::name);

        let links = [
            ("home", t("navigation.home")),
            ("users", t("navigation.users")),
            ("second", t("navigation.second")),
        ]
        .iter()
        .map(|(name, label)| {
            if active == Some(*name) {
                format!("*{label}*")
            } else {
                label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ");

        let session = self.state.auth.auth_context();
        let who = match &session.user {
            Some(user) => format!("@{} ({}) [{}]", user.username, session.role, t("navigation.logout")),
            None => format!("@{} [{}]", t("navigation.guest"), t("navigation.login")),
        };

        format!(
            "{links}    {}: {}    {who}",
            t("navigation.language"),
            view.language.code()
        )
    }

    /// Language switching and logout work from any page.
    pub fn handle(&self, action: &Action) -> Handled {
        match action {
            Action::Language(requested) => {
                let supported = &self.state.config.i18n.supported_languages;
                let next = requested.unwrap_or_else(|| self.state.language().next_in(supported));
                self.state.channels.send_language(next);
                Handled::Done
            }
            Action::Logout => {
                self.state.auth.logout();
                info!("Session closed, back to login");
                Handled::Navigate(Route::Login)
            }
            _ => Handled::Ignored,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.controller.is_subscribed(ROUTE_CHANGED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::testing::*;

    #[test]
    fn test_tracks_route_and_language() {
        let (state, _, _rx) = state_with(FakeSource::new(Vec::new()));
        let nav = NavigationBar::new(state.clone());
        assert!(nav.is_mounted());
        assert!(nav.render().contains("@invitado [Iniciar sesión]"));

        state.channels.send_route(Route::Users);
        assert!(nav.render().starts_with("Inicio | *Usuarios* | Segunda Página"));

        assert_eq!(nav.handle(&Action::Language(None)), Handled::Done);
        let text = nav.render();
        assert!(text.contains("*Users*"));
        assert!(text.contains("Language: en"));
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let (state, _, _rx) = state_with(FakeSource::new(Vec::new()));
        logged_in(&state).await;
        let nav = NavigationBar::new(state.clone());
        assert!(nav.render().contains("@admin (admin) [Cerrar sesión]"));

        assert_eq!(nav.handle(&Action::Logout), Handled::Navigate(Route::Login));
        assert!(!state.auth.is_logged_in());
    }

    #[test]
    fn test_drop_unmounts() {
        let (state, _, _rx) = state_with(FakeSource::new(Vec::new()));
        {
            let _nav = NavigationBar::new(state.clone());
            assert_eq!(state.channels.bus().subscriber_count(ROUTE_CHANGED), 1);
        }
        assert_eq!(state.channels.bus().subscriber_count(ROUTE_CHANGED), 0);
    }
}
