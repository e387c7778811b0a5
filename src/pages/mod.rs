//! Pages and the navigation bar.
//!
//! Every page owns one bus controller. Handlers write into a view behind a
//! mutex and raise the render flag; `render` only reads the view.

pub mod home;
pub mod login;
pub mod navigation;
pub mod second;
pub mod user_detail;
pub mod users;

use crate::app_state::AppState;
use crate::i18n::{self, Language};
use crate::page_manager::{Entry, PageManager, Route};

pub use navigation::NavigationBar;

/// Register a factory for every routed page.
pub fn register_all(manager: &mut PageManager) {
    manager.register_factory(home::HomeFactory);
    manager.register_factory(login::LoginFactory);
    manager.register_factory(users::UsersFactory);
    manager.register_factory(user_detail::UserDetailFactory);
    manager.register_factory(second::SecondFactory);
}

/// Login guard shared by the protected pages.
pub(crate) fn guard(state: &AppState, route: &Route) -> Option<Entry> {
    if route.requires_auth() && !state.auth.is_logged_in() {
        Some(Entry::Redirect(Route::Login))
    } else {
        None
    }
}

/// Translate with the page's own view of the language.
#[inline]
pub(crate) fn tr(state: &AppState, language: Language, key: &'static str) -> &'static str {
    i18n::translate_with_fallback(key, language, state.config.i18n.fallback_language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::testing::*;

    #[tokio::test]
    async fn test_guard_redirects_guests_only() {
        let (state, _, _rx) = state_with(FakeSource::new(Vec::new()));
        assert_eq!(guard(&state, &Route::Users), Some(Entry::Redirect(Route::Login)));
        assert_eq!(guard(&state, &Route::Second), None);

        logged_in(&state).await;
        assert_eq!(guard(&state, &Route::Users), None);
    }

    #[test]
    fn test_register_all_covers_every_route() {
        let (state, _, _rx) = state_with(FakeSource::new(Vec::new()));
        let mut manager = PageManager::new(state);
        register_all(&mut manager);
        for route in [
            Route::Home,
            Route::Login,
            Route::Users,
            Route::UserDetail(1),
            Route::Second,
        ] {
            assert!(manager.route_names().contains(&route.name()));
        }
    }
}
