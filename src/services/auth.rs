//! Authentication service.
//!
//! Demo-grade: two hardcoded accounts, no tokens, no persistence. The delay
//! stands in for a backend round-trip.

use log::{info, warn};
use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
    #[default]
    Guest,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Guest => "guest",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: u64,
    pub username: String,
    pub role: Role,
}

/// Snapshot handed to route guards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub is_logged_in: bool,
    pub user: Option<AuthUser>,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
}

pub struct AuthService {
    session: Mutex<Option<AuthUser>>,
    latency: Duration,
}

impl AuthService {
    pub fn new(latency: Duration) -> Self {
        Self {
            session: Mutex::new(None),
            latency,
        }
    }

    /// Check the credentials after the simulated latency. On success the
    /// session is replaced with the new user.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthUser, AuthError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let user = match (username, password) {
            ("admin", "admin") => AuthUser {
                id: 1,
                username: "admin".to_string(),
                role: Role::Admin,
            },
            ("user", "user") => AuthUser {
                id: 2,
                username: "user".to_string(),
                role: Role::User,
            },
            _ => {
                warn!("Rejected login for '{}'", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        info!("Logged in as '{}' ({})", user.username, user.role);
        *self.session.lock() = Some(user.clone());
        Ok(user)
    }

    pub fn logout(&self) {
        if let Some(user) = self.session.lock().take() {
            info!("Logged out '{}'", user.username);
        }
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.session.lock().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.lock().is_some()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.session
            .lock()
            .as_ref()
            .is_some_and(|user| user.role == role)
    }

    pub fn auth_context(&self) -> AuthContext {
        let user = self.current_user();
        AuthContext {
            is_logged_in: user.is_some(),
            role: user.as_ref().map_or(Role::Guest, |u| u.role),
            user,
        }
    }
}
