//! Typed views of auth request bodies.
//!
//! Each type is built from [`BodyFields`], so an absent or malformed
//! field simply stays `None` (or takes its documented default).

use crate::json_field::BodyFields;

/// Absent and empty fields are both `None`.
///
/// A login without a username keeps the current one instead of resetting
/// it to `demo`, so a bare login never undoes an earlier rename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    #[must_use]
    pub fn from_fields(fields: BodyFields<'_>) -> Self {
        let non_empty = |key: &str| fields.string(key).filter(|v| !v.is_empty());
        Self {
            username: non_empty("username"),
            password: non_empty("password"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub const DEFAULT_USERNAME: &'static str = "demo";
    pub const DEFAULT_EMAIL: &'static str = "demo@example.com";
    pub const DEFAULT_PASSWORD: &'static str = "demo123456";

    #[must_use]
    pub fn from_fields(fields: BodyFields<'_>) -> Self {
        Self {
            username: fields
                .string("username")
                .unwrap_or_else(|| Self::DEFAULT_USERNAME.to_string()),
            email: fields
                .string("email")
                .unwrap_or_else(|| Self::DEFAULT_EMAIL.to_string()),
            password: fields
                .string("password")
                .unwrap_or_else(|| Self::DEFAULT_PASSWORD.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub github: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn from_fields(fields: BodyFields<'_>) -> Self {
        Self {
            display_name: fields.string("display_name"),
            email: fields.string("email"),
            bio: fields.string("bio"),
            website: fields.string("website"),
            github: fields.string("github"),
        }
    }
}

/// Absent fields read as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

impl PasswordChange {
    #[must_use]
    pub fn from_fields(fields: BodyFields<'_>) -> Self {
        Self {
            old_password: fields.string("old_password").unwrap_or_default(),
            new_password: fields.string("new_password").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationUpdate {
    pub email_notifications: Option<bool>,
    pub new_post_notifications: Option<bool>,
    pub comment_reply_notifications: Option<bool>,
    pub release_notifications: Option<bool>,
}

impl NotificationUpdate {
    #[must_use]
    pub fn from_fields(fields: BodyFields<'_>) -> Self {
        Self {
            email_notifications: fields.bool("email_notifications"),
            new_post_notifications: fields.bool("new_post_notifications"),
            comment_reply_notifications: fields.bool("comment_reply_notifications"),
            release_notifications: fields.bool("release_notifications"),
        }
    }
}

/// Pulls `refresh_token` out of a refresh body; absent reads as empty.
#[must_use]
pub fn refresh_token(fields: BodyFields<'_>) -> String {
    fields.string("refresh_token").unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_ignores_empty_fields() {
        let req = LoginRequest::from_fields(BodyFields::new(r#"{"username":"","password":"pw"}"#));
        assert_eq!(req.username, None);
        assert_eq!(req.password.as_deref(), Some("pw"));
    }

    #[test]
    fn register_fills_defaults() {
        let req = RegisterRequest::from_fields(BodyFields::new(r#"{"username":"eve"}"#));
        assert_eq!(req.username, "eve");
        assert_eq!(req.email, RegisterRequest::DEFAULT_EMAIL);
        assert_eq!(req.password, RegisterRequest::DEFAULT_PASSWORD);
    }

    #[test]
    fn profile_keeps_present_empty_values() {
        let req = ProfileUpdate::from_fields(BodyFields::new(r#"{"bio":""}"#));
        assert_eq!(req.bio.as_deref(), Some(""));
        assert_eq!(req.email, None);
    }

    #[test]
    fn notifications_read_bools_only() {
        let req = NotificationUpdate::from_fields(BodyFields::new(
            r#"{"email_notifications":false,"release_notifications":"no"}"#,
        ));
        assert_eq!(req.email_notifications, Some(false));
        assert_eq!(req.release_notifications, None);
    }

    #[test]
    fn refresh_token_defaults_empty() {
        assert_eq!(refresh_token(BodyFields::new("{}")), "");
        assert_eq!(refresh_token(BodyFields::new(r#"{"refresh_token":"r"}"#)), "r");
    }
}
