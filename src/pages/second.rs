//! Second page: a playground for channels and page-local state.

use crate::app_state::AppState;
use crate::event_bus::{DEMO_CHANNEL, SECOND_PAGE_DATA, Signal};
use crate::functions::formatting::{fill_count, heading};
use crate::i18n::Language;
use crate::page_manager::{Action, Entry, Handled, Page, PageFactory, Route};
use crate::pages::tr;
use deck_channels::Subscriber;
use log::debug;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

pub struct SecondFactory;

impl PageFactory for SecondFactory {
    fn route_name(&self) -> &'static str {
        "second"
    }

    fn create(&self, state: &Arc<AppState>) -> Box<dyn Page> {
        Box::new(SecondPage::new(Arc::clone(state)))
    }
}

#[derive(Default)]
struct SecondView {
    language: Language,
    /// Last count seen on the demo channel.
    channel_count: u64,
    loaded_at: Option<String>,
}

pub struct SecondPage {
    state: Arc<AppState>,
    controller: Subscriber<Signal>,
    view: Arc<Mutex<SecondView>>,
    /// Survives leave/enter; the channel counter does not.
    visits: u64,
    sent: u64,
}

impl SecondPage {
    pub fn new(state: Arc<AppState>) -> Self {
        let controller = state.channels.controller("second");
        Self {
            state,
            controller,
            view: Arc::new(Mutex::new(SecondView::default())),
            visits: 0,
            sent: 0,
        }
    }
}

impl Page for SecondPage {
    fn on_enter(&mut self, _route: &Route) -> Entry {
        let language = self.state.language();
        let loaded_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        *self.view.lock() = SecondView {
            language,
            channel_count: 0,
            loaded_at: Some(loaded_at.clone()),
        };
        self.sent = 0;
        self.visits += 1;

        let names = self.state.channels.names();
        let (view, render) = (self.view.clone(), self.state.render.clone());
        self.controller.subscribe(&names.language, move |signal| {
            if let Signal::Language(lang) = signal {
                view.lock().language = *lang;
                render.request();
            }
        });

        let (view, render) = (self.view.clone(), self.state.render.clone());
        self.controller.subscribe(DEMO_CHANNEL, move |signal| {
            if let Signal::Custom(payload) = signal {
                let count = payload.get("count").and_then(|c| c.as_u64()).unwrap_or(0);
                debug!("Second: demo channel count {}", count);
                view.lock().channel_count = count;
                render.request();
            }
        });

        self.state.channels.send_custom(
            SECOND_PAGE_DATA,
            json!({
                "message": tr(&self.state, language, "second.loaded"),
                "timestamp": loaded_at,
            }),
        );
        Entry::Entered
    }

    fn on_leave(&mut self) {
        self.controller.unsubscribe_all();
    }

    fn render(&self) -> String {
        let view = self.view.lock();
        let t = |key| tr(&self.state, view.language, key);

        let mut out = vec![heading(t("second.title"))];
        if let Some(at) = &view.loaded_at {
            out.push(format!("{} ({})", t("second.loaded"), at));
        }
        out.push(format!("[demo] {}", fill_count(t("second.channelDemo"), view.channel_count)));
        out.push(format!("[state] {}", fill_count(t("second.stateDemo"), self.visits)));
        out.join("\n")
    }

    fn handle(&mut self, action: &Action) -> Handled {
        match action {
            Action::Demo => {
                self.sent += 1;
                self.state
                    .channels
                    .send_custom(DEMO_CHANNEL, json!({ "count": self.sent }));
                Handled::Done
            }
            Action::State => {
                self.visits += 1;
                Handled::Done
            }
            _ => Handled::Ignored,
        }
    }
}
