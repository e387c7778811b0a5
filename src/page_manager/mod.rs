use crate::app_state::AppState;
use crate::i18n::Language;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod factory;

pub use factory::PageFactory;

/// Redirects followed by one `navigate` call before giving up.
const MAX_REDIRECTS: usize = 4;

/// Every place the shell can be.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Users,
    UserDetail(u64),
    Second,
}

impl Route {
    /// Name used for page lookup and on the `route-changed` channel.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Login => "login",
            Route::Users => "users",
            Route::UserDetail(_) => "user-detail",
            Route::Second => "second",
        }
    }

    /// Whether entering the route needs a logged-in session.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Home | Route::Users | Route::UserDetail(_))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Login => f.write_str("/login"),
            Route::Users => f.write_str("/users"),
            Route::UserDetail(id) => write!(f, "/users/{id}"),
            Route::Second => f.write_str("/second"),
        }
    }
}

/// Accepts paths (`/`, `/users/3`) and names with an optional id
/// (`home`, `user-detail 3`).
impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('/');
        let mut parts = trimmed
            .split(|c: char| c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty());
        let name = parts.next().unwrap_or("");
        let id = parts.next();

        let parse_id = |raw: Option<&str>| -> Result<u64, String> {
            let raw = raw.ok_or_else(|| format!("route '{name}' needs an id"))?;
            raw.parse().map_err(|_| format!("invalid user id '{raw}'"))
        };

        match name {
            "" | "home" => Ok(Route::Home),
            "login" => Ok(Route::Login),
            "users" if id.is_some() => parse_id(id).map(Route::UserDetail),
            "users" => Ok(Route::Users),
            "user-detail" | "user" => parse_id(id).map(Route::UserDetail),
            "second" => Ok(Route::Second),
            other => Err(format!("unknown route '{other}'")),
        }
    }
}

/// Input forwarded from the shell to the active page.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Login { username: String, password: String },
    Logout,
    /// `None` toggles to the next supported language.
    Language(Option<Language>),
    Search(String),
    Clear,
    Reload,
    Open(u64),
    Retry,
    Demo,
    State,
}

/// Result of `Page::on_enter`.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    Entered,
    /// The page refused entry; go here instead.
    Redirect(Route),
}

/// Result of `Page::handle`.
#[derive(Clone, Debug, PartialEq)]
pub enum Handled {
    Ignored,
    Done,
    Navigate(Route),
}

/// A mounted page. Pages are created once and re-entered on later visits.
pub trait Page: Send {
    /// Mount: subscribe to channels and start loading. Guards run first so a
    /// redirecting page leaves nothing subscribed.
    fn on_enter(&mut self, route: &Route) -> Entry;

    /// Unmount: drop subscriptions and cancel pending work.
    fn on_leave(&mut self) {}

    fn render(&self) -> String;

    fn handle(&mut self, _action: &Action) -> Handled {
        Handled::Ignored
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("No page registered for route '{0}'")]
    NoPage(&'static str),

    #[error("Redirect loop while navigating to '{0}'")]
    RedirectLoop(Route),
}

/// The main manager that coordinates all pages.
pub struct PageManager {
    state: Arc<AppState>,
    factories: Vec<Box<dyn PageFactory>>,
    pages: HashMap<&'static str, Box<dyn Page>>,
    current: Option<Route>,
}

impl PageManager {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            factories: Vec::new(),
            pages: HashMap::new(),
            current: None,
        }
    }

    pub fn register_factory<F: PageFactory + 'static>(&mut self, factory: F) {
        debug!("Registered page '{}'", factory.route_name());
        self.factories.push(Box::new(factory));
    }

    pub fn current(&self) -> Option<&Route> {
        self.current.as_ref()
    }

    pub fn route_names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.route_name()).collect()
    }

    /// Leave the active page and enter `route`, following redirects.
    /// Returns the route actually entered.
    pub fn navigate(&mut self, route: Route) -> Result<Route, NavigationError> {
        let requested = route.clone();
        self.ensure_page(route.name())?;

        let previous = self.current.take();
        if let Some(page) = previous.as_ref().and_then(|prev| self.pages.get_mut(prev.name())) {
            page.on_leave();
        }

        let mut target = route;
        for _ in 0..=MAX_REDIRECTS {
            self.ensure_page(target.name())?;
            let Some(page) = self.pages.get_mut(target.name()) else {
                return Err(NavigationError::NoPage(target.name()));
            };

            match page.on_enter(&target) {
                Entry::Entered => {
                    self.report_transition(previous.as_ref(), &target);
                    self.current = Some(target.clone());
                    self.state.channels.send_route(target.clone());
                    self.state.request_render();
                    return Ok(target);
                }
                Entry::Redirect(next) => {
                    debug!("'{}' redirected to '{}'", target.name(), next.name());
                    target = next;
                }
            }
        }

        warn!("Gave up navigating to {} after {} redirects", requested, MAX_REDIRECTS);
        Err(NavigationError::RedirectLoop(requested))
    }

    /// Forward `action` to the active page and follow any navigation it asks for.
    pub fn dispatch(&mut self, action: &Action) -> Result<Handled, NavigationError> {
        let Some(current) = &self.current else {
            return Ok(Handled::Ignored);
        };
        let Some(page) = self.pages.get_mut(current.name()) else {
            return Ok(Handled::Ignored);
        };

        let handled = page.handle(action);
        match &handled {
            Handled::Navigate(route) => {
                self.navigate(route.clone())?;
            }
            Handled::Done => self.state.request_render(),
            Handled::Ignored => {}
        }
        Ok(handled)
    }

    /// Text view of the active page.
    pub fn render(&self) -> Option<String> {
        let current = self.current.as_ref()?;
        self.pages.get(current.name()).map(|page| page.render())
    }

    /// Leave the active page. Used on shutdown.
    pub fn shutdown(&mut self) {
        if let Some(current) = self.current.take() {
            if let Some(page) = self.pages.get_mut(current.name()) {
                page.on_leave();
            }
        }
    }

    fn ensure_page(&mut self, name: &'static str) -> Result<(), NavigationError> {
        if self.pages.contains_key(name) {
            return Ok(());
        }
        let factory = self
            .factories
            .iter()
            .find(|f| f.route_name() == name)
            .ok_or(NavigationError::NoPage(name))?;
        info!("Creating page '{}'", name);
        let page = factory.create(&self.state);
        self.pages.insert(name, page);
        Ok(())
    }

    fn report_transition(&self, from: Option<&Route>, to: &Route) {
        let transitions = &self.state.config.transitions;
        let from = from.map_or_else(|| "-".to_string(), |r| r.to_string());
        if transitions.enabled {
            debug!(
                "Transition '{}' ({} ms): {} -> {}",
                transitions.kind, transitions.duration_ms, from, to
            );
        } else {
            debug!("Navigated {} -> {}", from, to);
        }
    }
}
