//! Services shared by all pages.
//!
//! Services own the side effects (login, HTTP fetches) and report results by
//! publishing on the channel bus, never by calling pages directly.
//!
//! - `auth` - Hardcoded-credential session holder
//! - `users` - User list / user detail fetches published as channel signals

pub mod auth;
pub mod users;
