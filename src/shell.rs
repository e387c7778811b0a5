//! Line-oriented shell: reads commands from stdin and prints the active page.
//!
//! One loop owns the page manager. It wakes for stdin lines, navigation
//! requests from background tasks, and a render tick that redraws when some
//! component raised the render flag.

use crate::app_state::AppState;
use crate::error::AppError;
use crate::i18n::Language;
use crate::page_manager::{Action, Handled, PageManager, Route};
use crate::pages::NavigationBar;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const RENDER_POLL_INTERVAL_MS: u64 = 50;

const HELP: &str = "\
go <route> [id]      home | login | users | user-detail <id> | second
login <user> <pass>  start a session (admin/admin, user/user)
logout               end the session
lang [es|en]         switch language, or toggle
search <term>        filter the user list
clear | reload       reset the search | refetch the list
open <id>            show a user from the list
retry                repeat the last failed fetch
demo | state         second page demos
channels             list live channels
help | quit";

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Go(Route),
    Page(Action),
    Channels,
    Help,
    Quit,
    Empty,
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "" => Command::Empty,
        "go" => Command::Go(rest.parse()?),
        "login" => {
            let mut args = rest.split_whitespace();
            Command::Page(Action::Login {
                username: args.next().unwrap_or_default().to_string(),
                password: args.next().unwrap_or_default().to_string(),
            })
        }
        "logout" => Command::Page(Action::Logout),
        "lang" if rest.is_empty() => Command::Page(Action::Language(None)),
        "lang" => Command::Page(Action::Language(Some(rest.parse::<Language>()?))),
        "search" => Command::Page(Action::Search(rest.to_string())),
        "clear" => Command::Page(Action::Clear),
        "reload" => Command::Page(Action::Reload),
        "open" => {
            let id = rest
                .parse()
                .map_err(|_| format!("open needs a numeric id, got '{rest}'"))?;
            Command::Page(Action::Open(id))
        }
        "retry" => Command::Page(Action::Retry),
        "demo" => Command::Page(Action::Demo),
        "state" => Command::Page(Action::State),
        "channels" => Command::Channels,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(command)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    state: Arc<AppState>,
    manager: PageManager,
    nav: NavigationBar,
    /// One-shot message shown under the page.
    notice: Option<String>,
}

impl Shell {
    pub fn new(state: Arc<AppState>, manager: PageManager, nav: NavigationBar) -> Self {
        Self {
            state,
            manager,
            nav,
            notice: None,
        }
    }

    pub fn navigate(&mut self, route: Route) {
        if let Err(e) = self.manager.navigate(route) {
            warn!("{}", e);
            self.notice = Some(e.to_string());
            self.state.request_render();
        }
    }

    pub fn execute(&mut self, command: Command) -> Flow {
        match command {
            Command::Empty => {}
            Command::Quit => return Flow::Quit,
            Command::Go(route) => self.navigate(route),
            Command::Help => self.notice = Some(HELP.to_string()),
            Command::Channels => self.notice = Some(self.channel_report()),
            Command::Page(action) => self.dispatch(&action),
        }
        self.state.request_render();
        Flow::Continue
    }

    /// Active page first, then the navigation bar. The manager follows
    /// page navigation itself; only the bar's requests are followed here.
    fn dispatch(&mut self, action: &Action) {
        match self.manager.dispatch(action) {
            Ok(Handled::Ignored) => {}
            Ok(_) => return,
            Err(e) => {
                warn!("{}", e);
                self.notice = Some(e.to_string());
                return;
            }
        }

        match self.nav.handle(action) {
            Handled::Navigate(route) => self.navigate(route),
            Handled::Done => {}
            Handled::Ignored => {
                debug!("Unhandled action {:?}", action);
                self.notice = Some("Nothing to do on this page".to_string());
            }
        }
    }

    fn channel_report(&self) -> String {
        let bus = self.state.channels.bus();
        bus.channel_names()
            .iter()
            .map(|name| format!("{name}: {} subscriber(s)", bus.subscriber_count(name)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Navigation bar, active page and any pending notice.
    pub fn screen(&mut self) -> String {
        let mut out = vec![self.nav.render(), "-".repeat(60)];
        if let Some(page) = self.manager.render() {
            out.push(page);
        }
        if let Some(notice) = self.notice.take() {
            out.push(String::new());
            out.push(notice);
        }
        out.join("\n")
    }

    pub async fn run(mut self, mut navigation: mpsc::UnboundedReceiver<Route>) -> Result<(), AppError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut ticker = tokio::time::interval(Duration::from_millis(RENDER_POLL_INTERVAL_MS));

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("stdin closed");
                        break;
                    };
                    match parse_command(&line) {
                        Ok(command) => {
                            if self.execute(command) == Flow::Quit {
                                break;
                            }
                        }
                        Err(message) => {
                            self.notice = Some(message);
                            self.state.request_render();
                        }
                    }
                }
                Some(route) = navigation.recv() => {
                    self.navigate(route);
                }
                _ = ticker.tick() => {
                    if self.state.render.take() {
                        println!("\n{}\n> ", self.screen());
                    }
                }
            }
        }

        self.manager.shutdown();
        info!("Shell stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::testing::*;
    use crate::pages::register_all;

    fn shell() -> Shell {
        let (state, _, _rx) = state_with(FakeSource::new(sample_users()));
        let mut manager = PageManager::new(state.clone());
        register_all(&mut manager);
        let nav = NavigationBar::new(state.clone());
        Shell::new(state, manager, nav)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("go users/2"), Ok(Command::Go(Route::UserDetail(2))));
        assert_eq!(parse_command("go user-detail 4"), Ok(Command::Go(Route::UserDetail(4))));
        assert_eq!(parse_command("  "), Ok(Command::Empty));
        assert_eq!(
            parse_command("search  leanne graham "),
            Ok(Command::Page(Action::Search("leanne graham".to_string())))
        );
        assert_eq!(parse_command("search"), Ok(Command::Page(Action::Search(String::new()))));
        assert_eq!(
            parse_command("login admin"),
            Ok(Command::Page(Action::Login {
                username: "admin".to_string(),
                password: String::new(),
            }))
        );
        assert_eq!(parse_command("lang"), Ok(Command::Page(Action::Language(None))));
        assert_eq!(
            parse_command("lang EN"),
            Ok(Command::Page(Action::Language(Some(Language::En))))
        );
        assert!(parse_command("lang fr").is_err());
        assert!(parse_command("open x").is_err());
        assert!(parse_command("fly").is_err());
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
    }

    #[tokio::test]
    async fn test_guest_lands_on_login() {
        let mut shell = shell();
        shell.execute(Command::Go(Route::Users));
        assert_eq!(shell.manager.current(), Some(&Route::Login));
        assert!(shell.screen().contains("Usuarios de prueba"));
    }

    #[tokio::test]
    async fn test_language_falls_through_to_navigation_bar() {
        let mut shell = shell();
        shell.execute(Command::Go(Route::Second));
        shell.execute(Command::Page(Action::Language(Some(Language::En))));
        let screen = shell.screen();
        assert!(screen.contains("*Second Page*"));
        assert!(screen.contains("Second Page\n==========="));
    }

    #[tokio::test]
    async fn test_unhandled_action_leaves_notice() {
        let mut shell = shell();
        shell.execute(Command::Go(Route::Second));
        shell.execute(Command::Page(Action::Clear));
        assert!(shell.screen().ends_with("Nothing to do on this page"));
        assert!(!shell.screen().contains("Nothing to do"));
    }

    #[tokio::test]
    async fn test_channels_report() {
        let mut shell = shell();
        shell.execute(Command::Go(Route::Second));
        assert_eq!(shell.execute(Command::Channels), Flow::Continue);
        let screen = shell.screen();
        assert!(screen.contains("route-changed: 1 subscriber(s)"));
        assert!(screen.contains("demo-channel: 1 subscriber(s)"));
    }

    #[tokio::test]
    async fn test_open_navigates_once() {
        let mut shell = shell();
        logged_in(&shell.state).await;
        shell.execute(Command::Go(Route::Users));

        let announced = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let watcher = shell.state.channels.controller("watcher");
        let seen = announced.clone();
        watcher.subscribe(crate::event_bus::ROUTE_CHANGED, move |signal| {
            if let crate::event_bus::Signal::Route(route) = signal {
                seen.lock().push(route.to_string());
            }
        });

        shell.execute(Command::Page(Action::Open(2)));
        assert_eq!(*announced.lock(), vec!["/users/2"]);
        assert_eq!(shell.manager.current(), Some(&Route::UserDetail(2)));
    }

    #[tokio::test]
    async fn test_logout_from_any_page() {
        let mut shell = shell();
        logged_in(&shell.state).await;
        shell.execute(Command::Go(Route::Home));
        assert_eq!(shell.manager.current(), Some(&Route::Home));

        shell.execute(Command::Page(Action::Logout));
        assert_eq!(shell.manager.current(), Some(&Route::Login));
        assert_eq!(shell.execute(Command::Quit), Flow::Quit);
    }
}
