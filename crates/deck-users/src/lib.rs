//! deck-users - user directory model and HTTP client
//!
//! Features:
//! - serde model matching the JSONPlaceholder `/users` schema
//! - `UserSource` seam so pages can be driven by a fake in tests
//! - Blocking `ureq` client with a time-bounded list cache

pub mod client;
pub mod error;
pub mod types;

pub use client::{UserSource, UsersClient};
pub use error::UsersError;
pub use types::{Address, Company, Geo, User};
