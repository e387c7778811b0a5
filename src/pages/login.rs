//! Login form.

use crate::app_state::AppState;
use crate::event_bus::Signal;
use crate::functions::formatting::heading;
use crate::i18n::Language;
use crate::page_manager::{Action, Entry, Handled, Page, PageFactory, Route};
use crate::pages::tr;
use deck_channels::Subscriber;
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct LoginFactory;

impl PageFactory for LoginFactory {
    fn route_name(&self) -> &'static str {
        "login"
    }

    fn create(&self, state: &Arc<AppState>) -> Box<dyn Page> {
        Box::new(LoginPage::new(Arc::clone(state)))
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Notice {
    MissingFields,
    Failed(String),
}

#[derive(Default)]
struct LoginView {
    language: Language,
    submitting: bool,
    notice: Option<Notice>,
}

pub struct LoginPage {
    state: Arc<AppState>,
    controller: Subscriber<Signal>,
    view: Arc<Mutex<LoginView>>,
    pending: Option<JoinHandle<()>>,
}

impl LoginPage {
    pub fn new(state: Arc<AppState>) -> Self {
        let controller = state.channels.controller("login");
        Self {
            state,
            controller,
            view: Arc::new(Mutex::new(LoginView::default())),
            pending: None,
        }
    }

    fn submit(&mut self, username: &str, password: &str) {
        if username.trim().is_empty() || password.is_empty() {
            self.view.lock().notice = Some(Notice::MissingFields);
            return;
        }

        {
            let mut view = self.view.lock();
            view.submitting = true;
            view.notice = None;
        }

        let state = Arc::clone(&self.state);
        let view = Arc::clone(&self.view);
        let (username, password) = (username.trim().to_string(), password.to_string());
        if let Some(previous) = self.pending.take() {
            previous.abort();
        }
        self.pending = Some(tokio::spawn(async move {
            let result = state.auth.login(&username, &password).await;
            {
                let mut view = view.lock();
                view.submitting = false;
                if let Err(e) = &result {
                    view.notice = Some(Notice::Failed(e.to_string()));
                }
            }
            match result {
                Ok(_) => state.navigate(Route::Home),
                Err(_) => state.request_render(),
            }
        }));
    }
}

impl Page for LoginPage {
    fn on_enter(&mut self, _route: &Route) -> Entry {
        if self.state.auth.is_logged_in() {
            return Entry::Redirect(Route::Home);
        }

        *self.view.lock() = LoginView {
            language: self.state.language(),
            ..LoginView::default()
        };

        let view = Arc::clone(&self.view);
        let render = self.state.render.clone();
        self.controller
            .subscribe(&self.state.channels.names().language, move |signal| {
                if let Signal::Language(lang) = signal {
                    view.lock().language = *lang;
                    render.request();
                }
            });
        Entry::Entered
    }

    fn on_leave(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!("Login: abandoning pending attempt");
            pending.abort();
        }
        self.controller.unsubscribe_all();
    }

    fn render(&self) -> String {
        let view = self.view.lock();
        let t = |key| tr(&self.state, view.language, key);

        let mut out = vec![heading(t("login.title")), t("login.hint").to_string()];
        if view.submitting {
            out.push(t("login.loading").to_string());
        }
        match &view.notice {
            Some(Notice::MissingFields) => out.push(format!("! {}", t("login.missingFields"))),
            Some(Notice::Failed(message)) => out.push(format!("! {message}")),
            None => {}
        }
        out.join("\n")
    }

    fn handle(&mut self, action: &Action) -> Handled {
        match action {
            Action::Login { username, password } => {
                self.submit(username, password);
                Handled::Done
            }
            _ => Handled::Ignored,
        }
    }
}
