//! User fetch service.
//!
//! Every fetch follows the same protocol on the bus:
//! loading=true, error=None, then either the data or an error message,
//! then loading=false. The HTTP call itself runs on the blocking pool.

use crate::app_state::AppState;
use deck_users::{User, UsersError};
use log::{info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Fetch the user list and publish it on the users channel.
pub async fn refresh_users(state: Arc<AppState>) {
    let channels = &state.channels;
    channels.send_loading(true);
    channels.send_error(None);

    let source = Arc::clone(&state.users);
    let limit = state.config.bounded_properties.max_users;
    let result = tokio::task::spawn_blocking(move || source.list_users(limit)).await;

    match flatten(result) {
        Ok(users) => {
            info!("Publishing {} user(s)", users.len());
            channels.send_users(users);
        }
        Err(message) => {
            warn!("Loading users failed: {}", message);
            channels.send_error(Some(message));
        }
    }

    channels.send_loading(false);
}

/// Fetch one user and publish it on the selected-user channel.
pub async fn load_user(state: Arc<AppState>, id: u64) {
    let channels = &state.channels;
    channels.send_loading(true);
    channels.send_error(None);

    let source = Arc::clone(&state.users);
    let result = tokio::task::spawn_blocking(move || source.get_user(id)).await;

    match flatten(result) {
        Ok(user) => channels.send_selected_user(Some(user)),
        Err(message) => {
            warn!("Loading user {} failed: {}", id, message);
            channels.send_error(Some(message));
        }
    }

    channels.send_loading(false);
}

pub fn spawn_refresh_users(state: &Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(refresh_users(Arc::clone(state)))
}

pub fn spawn_load_user(state: &Arc<AppState>, id: u64) -> JoinHandle<()> {
    tokio::spawn(load_user(Arc::clone(state), id))
}

fn flatten<T>(
    result: Result<Result<T, UsersError>, tokio::task::JoinError>,
) -> Result<T, String> {
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => {
            warn!("User fetch task failed: {}", e);
            Err(UNKNOWN_ERROR.to_string())
        }
    }
}

/// Find a user by id in an already-loaded list.
pub fn find_user(users: &[User], id: u64) -> Option<&User> {
    users.iter().find(|u| u.id == id)
}
