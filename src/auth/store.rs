//! Mutex-guarded session state for the single demo account.
//!
//! [`AuthStore`] owns the user record, notification settings, and the
//! access/refresh token pair behind one lock. Every operation takes the
//! lock once, reads or mutates, copies out what the caller needs, and
//! releases it before any serialization happens.
//!
//! The session has two states. It starts [`SessionState::Active`]; a
//! successful [`AuthStore::delete_account`] clears both tokens and moves
//! it to [`SessionState::Revoked`] for the rest of the process lifetime.
//! Nothing reissues tokens.

use parking_lot::Mutex;
use serde::Serialize;

use super::request::{LoginRequest, NotificationUpdate, PasswordChange, ProfileUpdate, RegisterRequest};
use crate::error::AuthError;

pub const DEFAULT_ACCESS_TOKEN: &str = "edge-access-token";
pub const DEFAULT_REFRESH_TOKEN: &str = "edge-refresh-token";

const BEARER_PREFIX: &[u8] = b"Bearer ";

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub bio: String,
    pub website: String,
    pub github: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Default for AuthUser {
    fn default() -> Self {
        Self {
            username: "demo".to_string(),
            display_name: "Demo User".to_string(),
            email: "demo@example.com".to_string(),
            bio: String::new(),
            website: String::new(),
            github: String::new(),
            password: "demo123456".to_string(),
        }
    }
}

impl std::fmt::Debug for AuthUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthUser")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("bio", &self.bio)
            .field("website", &self.website)
            .field("github", &self.github)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct NotificationSettings {
    pub email_notifications: bool,
    pub new_post_notifications: bool,
    pub comment_reply_notifications: bool,
    pub release_notifications: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            new_post_notifications: true,
            comment_reply_notifications: true,
            release_notifications: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Revoked,
}

/// Tokens and user snapshot returned by [`AuthStore::login`].
#[derive(Debug, Clone, Serialize)]
pub struct LoginGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshGrant {
    pub access_token: String,
}

#[derive(Debug)]
struct SessionRecord {
    user: AuthUser,
    notifications: NotificationSettings,
    access_token: String,
    refresh_token: String,
}

impl SessionRecord {
    /// Empty stored tokens never match, so a revoked session stays closed.
    fn authorize(&self, authorization: Option<&[u8]>) -> Result<(), AuthError> {
        let token = authorization
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .ok_or(AuthError::Unauthorized("unauthorized"))?;
        if self.access_token.is_empty() || token != self.access_token.as_bytes() {
            return Err(AuthError::Unauthorized("unauthorized"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct AuthStore {
    inner: Mutex<SessionRecord>,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_tokens(DEFAULT_ACCESS_TOKEN, DEFAULT_REFRESH_TOKEN)
    }

    #[must_use]
    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        Self {
            inner: Mutex::new(SessionRecord {
                user: AuthUser::default(),
                notifications: NotificationSettings::default(),
                access_token: access_token.to_string(),
                refresh_token: refresh_token.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        let record = self.inner.lock();
        if record.access_token.is_empty() {
            SessionState::Revoked
        } else {
            SessionState::Active
        }
    }

    /// Check an `Authorization` header value against the current access token.
    #[must_use]
    pub fn has_valid_bearer_token(&self, authorization: Option<&[u8]>) -> bool {
        self.inner.lock().authorize(authorization).is_ok()
    }

    /// Adopt the supplied identity and hand out the current tokens.
    ///
    /// There is no credential check: this bootstraps the demo identity.
    pub fn login(&self, request: LoginRequest) -> LoginGrant {
        let mut record = self.inner.lock();
        if let Some(username) = request.username {
            if record.user.display_name.is_empty() {
                record.user.display_name.clone_from(&username);
            }
            record.user.username = username;
        }
        if let Some(password) = request.password {
            record.user.password = password;
        }
        LoginGrant {
            access_token: record.access_token.clone(),
            refresh_token: record.refresh_token.clone(),
            user: record.user.clone(),
        }
    }

    pub fn register(&self, request: RegisterRequest) -> AuthUser {
        let mut record = self.inner.lock();
        record.user.display_name.clone_from(&request.username);
        record.user.username = request.username;
        record.user.email = request.email;
        record.user.password = request.password;
        record.user.clone()
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<RefreshGrant, AuthError> {
        let record = self.inner.lock();
        if refresh_token.is_empty() || refresh_token != record.refresh_token {
            return Err(AuthError::Unauthorized("refresh token invalid"));
        }
        Ok(RefreshGrant {
            access_token: record.access_token.clone(),
        })
    }

    /// Logout is stateless: the tokens stay valid afterwards.
    pub const fn logout(&self) {}

    pub fn me(&self, authorization: Option<&[u8]>) -> Result<AuthUser, AuthError> {
        let record = self.inner.lock();
        record.authorize(authorization)?;
        Ok(record.user.clone())
    }

    pub fn update_profile(
        &self,
        authorization: Option<&[u8]>,
        update: ProfileUpdate,
    ) -> Result<AuthUser, AuthError> {
        let mut record = self.inner.lock();
        record.authorize(authorization)?;
        let user = &mut record.user;
        if let Some(v) = update.display_name {
            user.display_name = v;
        }
        if let Some(v) = update.email {
            user.email = v;
        }
        if let Some(v) = update.bio {
            user.bio = v;
        }
        if let Some(v) = update.website {
            user.website = v;
        }
        if let Some(v) = update.github {
            user.github = v;
        }
        Ok(record.user.clone())
    }

    /// An empty `old_password` skips verification; an empty
    /// `new_password` leaves the stored password unchanged.
    pub fn update_password(
        &self,
        authorization: Option<&[u8]>,
        change: &PasswordChange,
    ) -> Result<(), AuthError> {
        let mut record = self.inner.lock();
        record.authorize(authorization)?;
        if !change.old_password.is_empty() && change.old_password != record.user.password {
            return Err(AuthError::BadRequest("old password incorrect"));
        }
        if !change.new_password.is_empty() {
            record.user.password.clone_from(&change.new_password);
        }
        Ok(())
    }

    pub fn update_notifications(
        &self,
        authorization: Option<&[u8]>,
        update: NotificationUpdate,
    ) -> Result<NotificationSettings, AuthError> {
        let mut record = self.inner.lock();
        record.authorize(authorization)?;
        let settings = &mut record.notifications;
        if let Some(v) = update.email_notifications {
            settings.email_notifications = v;
        }
        if let Some(v) = update.new_post_notifications {
            settings.new_post_notifications = v;
        }
        if let Some(v) = update.comment_reply_notifications {
            settings.comment_reply_notifications = v;
        }
        if let Some(v) = update.release_notifications {
            settings.release_notifications = v;
        }
        Ok(record.notifications)
    }

    /// Clear both tokens. Irreversible until the process restarts.
    pub fn delete_account(&self, authorization: Option<&[u8]>) -> Result<(), AuthError> {
        let mut record = self.inner.lock();
        record.authorize(authorization)?;
        record.access_token.clear();
        record.refresh_token.clear();
        Ok(())
    }

    #[must_use]
    pub fn notifications(&self) -> NotificationSettings {
        self.inner.lock().notifications
    }
}
