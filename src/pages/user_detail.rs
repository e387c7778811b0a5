//! Detail view for one user.

use crate::app_state::AppState;
use crate::event_bus::Signal;
use crate::functions::formatting::{avatar, heading, or_placeholder};
use crate::i18n::Language;
use crate::page_manager::{Action, Entry, Handled, Page, PageFactory, Route};
use crate::pages::{guard, tr};
use crate::services::users::spawn_load_user;
use deck_channels::Subscriber;
use deck_users::User;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct UserDetailFactory;

impl PageFactory for UserDetailFactory {
    fn route_name(&self) -> &'static str {
        "user-detail"
    }

    fn create(&self, state: &Arc<AppState>) -> Box<dyn Page> {
        Box::new(UserDetailPage::new(Arc::clone(state)))
    }
}

#[derive(Default)]
struct DetailView {
    language: Language,
    id: u64,
    user: Option<User>,
    loading: bool,
    error: Option<String>,
}

pub struct UserDetailPage {
    state: Arc<AppState>,
    controller: Subscriber<Signal>,
    view: Arc<Mutex<DetailView>>,
    loader: Option<JoinHandle<()>>,
}

impl UserDetailPage {
    pub fn new(state: Arc<AppState>) -> Self {
        let controller = state.channels.controller("user-detail");
        Self {
            state,
            controller,
            view: Arc::new(Mutex::new(DetailView::default())),
            loader: None,
        }
    }

    fn fetch(&mut self) {
        let id = self.view.lock().id;
        if let Some(previous) = self.loader.take() {
            previous.abort();
        }
        self.loader = Some(spawn_load_user(&self.state, id));
    }

    fn subscribe_all(&self) {
        let names = self.state.channels.names();
        let render = self.state.render.clone();

        let (view, r) = (self.view.clone(), render.clone());
        self.controller.subscribe(&names.selected_user, move |signal| {
            if let Signal::SelectedUser(Some(user)) = signal {
                let mut view = view.lock();
                // Selections for other ids belong to someone else.
                if user.id == view.id {
                    view.user = Some(user.as_ref().clone());
                    r.request();
                }
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

impl Page for UserDetailPage {
    fn on_enter(&mut self, route: &Route) -> Entry {
        if let Some(redirect) = guard(&self.state, route) {
            return redirect;
        }
        let Route::UserDetail(id) = *route else {
            return Entry::Redirect(Route::Users);
        };

        let known = {
            let mut view = self.view.lock();
            let keep = view.user.take().filter(|u| u.id == id);
            *view = DetailView {
                language: self.state.language(),
                id,
                user: keep,
                ..DetailView::default()
            };
            view.user.is_some()
        };

        self.subscribe_all();
        if !known {
            self.fetch();
        }
        Entry::Entered
    }

    fn on_leave(&mut self) {
        self.controller.unsubscribe_all();
    }

    fn render(&self) -> String {
        let view = self.view.lock();
        let t = |key| tr(&self.state, view.language, key);

        let mut out = vec![heading(t("userDetail.title"))];
        if view.loading {
            out.push(t("userDetail.loading").to_string());
        }

        match &view.user {
            Some(user) => {
                out.push(format!("{} {} (@{})", avatar(user), user.name, user.username));
                out.push(String::new());
                out.push(format!("[{}]", t("userDetail.personalInfo")));
                out.push(format!("  Email: {}", user.email));
                out.push(format!("  {}: {}", t("userDetail.phone"), user.phone));
                out.push(format!("[{}]", t("userDetail.contactInfo")));
                out.push(format!(
                    "  {}: {}",
                    t("userDetail.website"),
                    or_placeholder(Some(user.website.as_str()), t("userDetail.noWebsite"))
                ));
                out.push(format!(
                    "  {}: {}",
                    t("userDetail.company"),
                    or_placeholder(user.company_name(), t("userDetail.noCompany"))
                ));
                out.push(format!(
                    "  {}: {}",
                    t("userDetail.city"),
                    or_placeholder(user.city(), t("userDetail.noCity"))
                ));
                out.push(format!(
                    "  {}: {}",
                    t("userDetail.zipcode"),
                    or_placeholder(user.zipcode(), t("userDetail.noZipcode"))
                ));
            }
            None if !view.loading => {
                match &view.error {
                    Some(message) => {
                        out.push(format!("! {}: {}", t("userDetail.error"), message));
                        out.push(format!("  [retry] {}", t("users.retry")));
                    }
                    None => out.push(t("userDetail.notFound").to_string()),
                }
            }
            None => {}
        }

        out.push(String::new());
        out.push(format!("[go users] {}", t("userDetail.backToUsers")));
        out.join("\n")
    }

    fn handle(&mut self, action: &Action) -> Handled {
        match action {
            Action::Retry => {
                self.fetch();
                Handled::Done
            }
            _ => Handled::Ignored,
        }
    }
}
