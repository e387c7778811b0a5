//! UserDeck - terminal user directory built on named pub/sub channels
//!
//! Single-threaded runtime; pages talk to each other only through the bus.

mod app_state;
mod config;
mod error;
mod event_bus;
mod functions;
mod i18n;
mod page_manager;
mod pages;
mod services;
mod shell;

use app_state::AppState;
use config::AppConfig;
use deck_users::UsersClient;
use log::info;
use page_manager::{PageManager, Route};
use pages::NavigationBar;
use shell::Shell;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting UserDeck...");

    // Optional config path as the first argument
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::resolve(config_path.as_deref())?;
    info!("Using API at {}", config.api_url);

    let client = UsersClient::new(config.api_url.clone(), config.bounded_properties.cache_timeout());
    let (state, navigation) = AppState::new(config, Arc::new(client));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let mut manager = PageManager::new(Arc::clone(&state));
        pages::register_all(&mut manager);
        info!("Registered pages: {}", manager.route_names().join(", "));

        info!("{} ready", state.t("app.title"));
        let nav = NavigationBar::new(Arc::clone(&state));
        let mut shell = Shell::new(state, manager, nav);
        shell.navigate(Route::Home);
        shell.run(navigation).await
    })?;

    Ok(())
}
