//! Single-user session layer.
//!
//! - [`store`] -- the mutex-guarded user record, notification settings,
//!   and token pair.
//! - [`request`] -- typed partial-update requests parsed from bodies.
//! - [`handlers`] -- the HTTP endpoints mounted under `auth.prefix`.

pub mod handlers;
pub mod request;
pub mod store;

pub use store::{AuthStore, AuthUser, NotificationSettings, SessionState};
